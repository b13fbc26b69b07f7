//! Content-addressed blob storage on the local filesystem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use strata_core::ContentId;

use crate::error::{StoreError, StoreResult};
use crate::manifest::CacheManifest;

/// File extension for cached configuration blobs.
pub const BLOB_EXT: &str = "wgc";

/// Content-addressed store: one `<id>.wgc` file per blob under a root
/// directory.
///
/// Entries are created once on first receipt of an id and never mutated.
/// Writes publish atomically (temp file, then rename), so readers never
/// observe partial data. Concurrent reads and concurrent first-writes of
/// distinct ids are safe.
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, id: &ContentId) -> PathBuf {
        self.root.join(format!("{}.{}", id, BLOB_EXT))
    }

    /// Persist a blob, returning its content id.
    ///
    /// An already-present entry indicates a prior inconsistent state: it is
    /// logged and replaced rather than treated as a hard error.
    pub fn put(&self, bytes: &[u8]) -> StoreResult<ContentId> {
        let id = ContentId::of(bytes);
        let path = self.entry_path(&id);

        if path.exists() {
            tracing::warn!(%id, "cache entry already exists, this shouldn't happen; replacing it");
            fs::remove_file(&path)?;
        }

        let tmp = path.with_extension(format!("{}.tmp", BLOB_EXT));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!(%id, bytes = bytes.len(), "added cache entry");
        Ok(id)
    }

    /// Whether an entry exists for `id`.
    pub fn exists(&self, id: &ContentId) -> bool {
        self.entry_path(id).is_file()
    }

    /// Enumerate all cached ids, sorted.
    ///
    /// Files that do not parse as content ids are skipped.
    pub fn list(&self) -> StoreResult<Vec<ContentId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(BLOB_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match stem.parse::<ContentId>() {
                Ok(id) => ids.push(id),
                Err(_) => {
                    tracing::debug!(file = %path.display(), "skipping non-id file in cache dir");
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Snapshot the store contents as an outgoing cache manifest.
    pub fn manifest(&self) -> StoreResult<CacheManifest> {
        Ok(CacheManifest::new(self.list()?))
    }

    /// Load the blob stored under `id`.
    ///
    /// Fails with [`StoreError::NotFound`] if absent, and with
    /// [`StoreError::Corrupt`] if the stored bytes no longer hash to `id`
    /// (disk corruption or filename tampering).
    pub fn load(&self, id: &ContentId) -> StoreResult<Vec<u8>> {
        let bytes = fs::read(self.entry_path(id)).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(*id)
            } else {
                StoreError::Io(e)
            }
        })?;

        let actual = ContentId::of(&bytes);
        if actual != *id {
            return Err(StoreError::Corrupt {
                expected: *id,
                actual,
            });
        }
        Ok(bytes)
    }

    /// Delete the entry for `id`. Deleting an absent entry is not an error.
    pub fn delete(&self, id: &ContentId) -> StoreResult<()> {
        match fs::remove_file(self.entry_path(id)) {
            Ok(()) => {
                tracing::debug!(%id, "deleted cache entry");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

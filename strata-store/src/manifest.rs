//! Cache manifests.

use serde::{Deserialize, Serialize};

use strata_core::ContentId;

/// The ordered set of content ids a peer holds locally.
///
/// Sent once by a connecting peer as part of its hello; a read-only
/// snapshot, never updated mid-session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest(Vec<ContentId>);

impl CacheManifest {
    /// Build a manifest from a list of ids. The list is sorted and deduped.
    pub fn new(mut ids: Vec<ContentId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    /// An empty manifest.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the peer reported holding `id`.
    pub fn contains(&self, id: &ContentId) -> bool {
        self.0.binary_search(id).is_ok()
    }

    /// The ids in the manifest, in order.
    pub fn ids(&self) -> &[ContentId] {
        &self.0
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let a = ContentId::of(b"a");
        let b = ContentId::of(b"b");
        let c = ContentId::of(b"c");

        let manifest = CacheManifest::new(vec![b, a]);
        assert_eq!(manifest.len(), 2);
        assert!(manifest.contains(&a));
        assert!(manifest.contains(&b));
        assert!(!manifest.contains(&c));
    }

    #[test]
    fn test_sorted_and_deduped() {
        let a = ContentId::of(b"a");
        let b = ContentId::of(b"b");

        let manifest = CacheManifest::new(vec![b, a, b]);
        assert_eq!(manifest.len(), 2);
        let mut sorted = manifest.ids().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, manifest.ids());
    }

    #[test]
    fn test_empty() {
        let manifest = CacheManifest::empty();
        assert!(manifest.is_empty());
        assert!(!manifest.contains(&ContentId::of(b"x")));
    }
}

//! # Strata Core
//!
//! Foundation types for the Strata world-generation mod:
//! - Content identity for configuration blobs (SHA-256 derived, fixed-width)
//! - Transfer checksums for detecting in-flight corruption
//! - The world configuration type distributed to connecting peers
//! - Deterministic binary serialization
//!
//! Nothing in this crate performs I/O or depends on an async runtime.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod checksum;
pub mod config;
pub mod content_id;
pub mod error;
pub mod serialization;

// Re-export commonly used types at crate root
pub use checksum::TransferChecksum;
pub use config::{MapLayer, WorldConfig};
pub use content_id::{ContentId, CONTENT_ID_LEN};
pub use error::{CodecError, IdParseError};

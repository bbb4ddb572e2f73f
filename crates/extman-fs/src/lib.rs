//! Filesystem primitives for the extension manager
//!
//! Provides atomic document writes, recursive directory copies and the
//! SHA-256 digests used to derive stable extension identifiers.

pub mod checksum;
pub mod error;
pub mod io;
pub mod store;

pub use checksum::sha256_hex;
pub use error::{Error, Result};
pub use store::DocumentStore;

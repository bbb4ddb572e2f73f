//! Shared test utilities for the extension-manager workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: real git repositories usable as clone sources
//! - [`extension`]: [`TestExtension`] builder for on-disk extension sources
//! - [`archive`]: gzip tarball builders for release downloads

pub mod archive;
pub mod extension;
pub mod git;

pub use extension::TestExtension;

//! Page source storage for Folio books.
//!
//! A book's page sources live behind the [`Storage`] trait:
//!
//! - [`FsStorage`] reads from a directory on the local filesystem
//! - [`MockStorage`] keeps sources in memory (behind the `mock` feature)
//!
//! Each source carries an opaque revision that the site layer uses as the
//! cache etag for parsed documents.

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError};

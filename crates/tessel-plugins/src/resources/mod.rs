//! Bundled plugin resources.
//!
//! Resources are addressed by logical, forward-slash paths relative to the
//! package's `resources/` directory. A package may be a directory or a tar
//! archive; callers see the same API for both.

pub mod archive;
pub mod path;
mod store;

pub use archive::ArchiveCompression;
pub use path::{RESOURCES_DIR, normalize};
pub use store::{PackageKind, Resource, ResourceIter, ResourceStore};

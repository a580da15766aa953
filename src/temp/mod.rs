mod dir;
mod file;
mod registry;
mod report;
mod resource;

pub use dir::TempDir;
pub use file::TempFile;
pub use registry::Registry;
pub use report::{CleanupFailure, CleanupReport};
pub use resource::{ElementId, Resource, ResourceKind};

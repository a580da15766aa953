mod error;
pub(crate) mod utils;

use std::path::{Path, PathBuf};

pub use error::TempError;

/// Default file name prefix of generated temporary paths.
pub const DEFAULT_PREFIX: &str = ".tmp";

pub type Result<T> = std::result::Result<T, TempError>;

/// A capability over one temporary filesystem entity.
///
/// While the resource is live the entity at `path()` exists and is owned by this value only.
/// After a successful `destroy()` the entity is gone and the resource is inert.
pub trait TempResource {
    /// Current location of the entity on the host.
    fn path(&self) -> &Path;

    /// Returns true once the entity has been removed.
    fn is_destroyed(&self) -> bool;

    /// Moves the entity to `new_path`, preserving its content.
    /// * `new_path` must not exist, its parent must exist.
    ///
    /// An error returns if the resource is already destroyed.
    fn relocate<P: AsRef<Path>>(&mut self, new_path: P) -> Result<()>;

    /// Removes the entity from the host and marks the resource as destroyed.
    ///
    /// Calling it on a destroyed resource does nothing. If the removal fails the
    /// resource stays live, so the call may be retried.
    fn destroy(&mut self) -> Result<()>;
}

/// Where a new temporary resource is placed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Location {
    /// Unique name in the system temporary directory (or the registry's temp root).
    #[default]
    Generated,
    /// Unique name inside the given directory.
    GeneratedIn(PathBuf),
    /// Exactly this path. Creation fails if something is already there.
    Exact(PathBuf),
}

impl Location {
    pub fn exact<P: AsRef<Path>>(path: P) -> Self {
        Location::Exact(path.as_ref().to_path_buf())
    }

    pub fn generated_in<P: AsRef<Path>>(dir: P) -> Self {
        Location::GeneratedIn(dir.as_ref().to_path_buf())
    }

    /// Turns the location into a concrete host path.
    /// `Generated` is resolved against `default_root`.
    pub(crate) fn resolve(&self, default_root: &Path, prefix: &str) -> PathBuf {
        match self {
            Location::Generated => utils::unique_path(default_root, prefix),
            Location::GeneratedIn(dir) => utils::unique_path(dir, prefix),
            Location::Exact(path) => path.clone(),
        }
    }
}

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::{DEFAULT_PREFIX, Location, Result, TempError, TempResource, utils};

/// A temporary directory that is removed, with everything inside it,
/// when it is destroyed or dropped.
///
/// The directory itself is only a container marker: anything placed under
/// `path()` goes away together with it.
#[derive(Debug)]
pub struct TempDir {
    path: PathBuf, // host-related absolute path
    is_destroyed: bool,
    is_auto_clean: bool,
}

impl TempDir {
    /// Creates a directory with a unique name in the system temporary directory.
    pub fn new() -> Result<Self> {
        Self::create(Location::Generated)
    }

    /// Creates a directory at `location`. Parents are never created:
    /// a missing parent fails with `ParentNotFound`.
    pub fn create(location: Location) -> Result<Self> {
        Self::create_at(location.resolve(&std::env::temp_dir(), DEFAULT_PREFIX))
    }

    pub(crate) fn create_at(path: PathBuf) -> Result<Self> {
        std::fs::create_dir(&path).map_err(|e| TempError::on_create(&path, e))?;
        debug!(path = %path.display(), "created temp dir");

        Ok(Self {
            path,
            is_destroyed: false,
            is_auto_clean: true,
        })
    }

    /// Changes auto-clean flag.
    /// If auto-clean flag is true the directory tree will be removed on drop.
    pub fn set_auto_clean(&mut self, clean: bool) {
        self.is_auto_clean = clean;
    }

    /// Returns `path()/name`.
    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.path.join(name)
    }
}

impl TempResource for TempDir {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_destroyed(&self) -> bool {
        self.is_destroyed
    }

    fn relocate<P: AsRef<Path>>(&mut self, new_path: P) -> Result<()> {
        let new_path = new_path.as_ref();
        if self.is_destroyed {
            return Err(TempError::destroyed(&self.path, "relocate"));
        }
        utils::move_entry(&self.path, new_path)?;
        debug!(from = %self.path.display(), to = %new_path.display(), "relocated temp dir");
        self.path = new_path.to_path_buf();
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        if self.is_destroyed {
            return Ok(());
        }
        utils::rm_on_host(&self.path).map_err(|e| TempError::io(&self.path, e))?;
        self.is_destroyed = true;
        debug!(path = %self.path.display(), "destroyed temp dir");
        Ok(())
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        if !self.is_auto_clean {
            return;
        }
        if let Err(e) = self.destroy() {
            warn!(path = %self.path.display(), error = %e, "failed to remove temp dir");
        }
    }
}

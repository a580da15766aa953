use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{Result, TempResource};
use crate::{TempDir, TempFile};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Directory,
}

/// Identifies an element of a `Registry`. Ids are never reused within one registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the resource variants a `Registry` can own.
#[derive(Debug)]
pub enum Resource {
    File(TempFile),
    Directory(TempDir),
}

impl Resource {
    pub(crate) fn create_at(kind: ResourceKind, path: PathBuf) -> Result<Self> {
        match kind {
            ResourceKind::File => TempFile::create_at(path).map(Resource::File),
            ResourceKind::Directory => TempDir::create_at(path).map(Resource::Directory),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::File(_) => ResourceKind::File,
            Resource::Directory(_) => ResourceKind::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind() == ResourceKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind() == ResourceKind::Directory
    }

    pub fn as_file(&self) -> Option<&TempFile> {
        match self {
            Resource::File(file) => Some(file),
            Resource::Directory(_) => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut TempFile> {
        match self {
            Resource::File(file) => Some(file),
            Resource::Directory(_) => None,
        }
    }

    pub fn as_dir(&self) -> Option<&TempDir> {
        match self {
            Resource::Directory(dir) => Some(dir),
            Resource::File(_) => None,
        }
    }

    pub fn set_auto_clean(&mut self, clean: bool) {
        match self {
            Resource::File(file) => file.set_auto_clean(clean),
            Resource::Directory(dir) => dir.set_auto_clean(clean),
        }
    }
}

impl TempResource for Resource {
    fn path(&self) -> &Path {
        match self {
            Resource::File(file) => file.path(),
            Resource::Directory(dir) => dir.path(),
        }
    }

    fn is_destroyed(&self) -> bool {
        match self {
            Resource::File(file) => file.is_destroyed(),
            Resource::Directory(dir) => dir.is_destroyed(),
        }
    }

    fn relocate<P: AsRef<Path>>(&mut self, new_path: P) -> Result<()> {
        match self {
            Resource::File(file) => file.relocate(new_path),
            Resource::Directory(dir) => dir.relocate(new_path),
        }
    }

    fn destroy(&mut self) -> Result<()> {
        match self {
            Resource::File(file) => file.destroy(),
            Resource::Directory(dir) => dir.destroy(),
        }
    }
}

impl From<TempFile> for Resource {
    fn from(file: TempFile) -> Self {
        Resource::File(file)
    }
}

impl From<TempDir> for Resource {
    fn from(dir: TempDir) -> Self {
        Resource::Directory(dir)
    }
}

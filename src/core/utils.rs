use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;
use walkdir::WalkDir;

use super::{Result, TempError};

/// Builds `<dir>/<prefix><uuid>`.
pub fn unique_path<P: AsRef<Path>>(dir: P, prefix: &str) -> PathBuf {
    dir.as_ref()
        .join(format!("{}{}", prefix, Uuid::new_v4().simple()))
}

/// Removes a file or a whole directory tree. Symlinks are removed, not followed.
/// A missing `path` is an error.
pub fn rm_on_host<P: AsRef<Path>>(path: P) -> io::Result<()> {
    let path = path.as_ref();
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Checks that `path` is free and its parent directory exists.
pub fn ensure_vacant<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if fs::symlink_metadata(path).is_ok() {
        return Err(TempError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(TempError::ParentNotFound {
                path: parent.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Moves `from` to `to`. Falls back to copy + remove when a rename
/// cannot cross filesystems.
pub fn move_entry<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    ensure_vacant(to)?;

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            if let Err(e) = copy_entry(from, to) {
                // don't leave a half-copied tree behind
                let _ = rm_on_host(to);
                return Err(TempError::io(to, e));
            }
            rm_on_host(from).map_err(|e| TempError::io(from, e))
        }
        Err(e) => Err(TempError::io(from, e)),
    }
}

/// Copies a file, or a directory with all its content, to `to`.
fn copy_entry(from: &Path, to: &Path) -> io::Result<()> {
    if !fs::symlink_metadata(from)?.is_dir() {
        return fs::copy(from, to).map(|_| ());
    }

    for entry in WalkDir::new(from) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

//! Self-cleaning temporary file.
//!
//! A `TempFile` owns one regular file on the host together with an open read/write handle to
//! it. The file is removed by `destroy()` or, while auto-clean is on, when the value is dropped.
//!
//! ### Key Features:
//! - **Unique names**: generated locations use a UUID v4 so concurrent creators never collide.
//! - **Exclusive creation**: an exact location that is already occupied is never overwritten.
//! - **Byte stream**: `Read`, `Write` and `Seek` at the current offset.
//! - **Relocation**: the file can be moved while keeping content and stream position.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::{DEFAULT_PREFIX, Location, Result, TempError, TempResource, utils};

/// A temporary regular file that is removed when it is destroyed or dropped.
///
/// ### Example:
/// ```
/// use temp_kit::{TempFile, TempResource};
///
/// let mut file = TempFile::new().unwrap();
/// file.append_text("hello").unwrap();
/// assert_eq!(file.read_text().unwrap(), "hello");
///
/// let path = file.path().to_path_buf();
/// file.destroy().unwrap();
/// assert!(!path.exists());
/// ```
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,      // host-related absolute path
    file: Option<File>, // `None` once destroyed, or if a reopen failed
    is_destroyed: bool,
    is_auto_clean: bool,
}

impl TempFile {
    /// Creates an empty file with a unique name in the system temporary directory.
    pub fn new() -> Result<Self> {
        Self::create(Location::Generated)
    }

    /// Creates an empty file at `location`.
    /// * `Location::Exact` fails with `AlreadyExists` if the path is occupied and
    ///   with `ParentNotFound` if its parent directory is missing.
    pub fn create(location: Location) -> Result<Self> {
        Self::create_at(location.resolve(&std::env::temp_dir(), DEFAULT_PREFIX))
    }

    pub(crate) fn create_at(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| TempError::on_create(&path, e))?;
        debug!(path = %path.display(), "created temp file");

        Ok(Self {
            path,
            file: Some(file),
            is_destroyed: false,
            is_auto_clean: true,
        })
    }

    /// Changes auto-clean flag.
    /// If auto-clean flag is true the file will be removed on drop.
    pub fn set_auto_clean(&mut self, clean: bool) {
        self.is_auto_clean = clean;
    }

    /// Borrows the underlying open file.
    /// * `InvalidState` if the file is destroyed, `Io` if it is live but could not be reopened.
    pub fn as_file(&self) -> Result<&File> {
        self.file
            .as_ref()
            .ok_or_else(|| Self::unavailable(&self.path, self.is_destroyed))
    }

    /// Mutably borrows the underlying open file.
    pub fn as_file_mut(&mut self) -> Result<&mut File> {
        let Self {
            file,
            path,
            is_destroyed,
            ..
        } = self;
        file.as_mut()
            .ok_or_else(|| Self::unavailable(path.as_path(), *is_destroyed))
    }

    /// Writes `text` at the end of the file and flushes it,
    /// so a following read sees the new content.
    pub fn append_text(&mut self, text: &str) -> Result<()> {
        let path = self.path.clone();
        let file = self.as_file_mut()?;
        file.seek(SeekFrom::End(0))
            .and_then(|_| file.write_all(text.as_bytes()))
            .and_then(|_| file.flush())
            .map_err(|e| TempError::io(&path, e))
    }

    /// Rewinds and reads the whole file as UTF-8 text.
    pub fn read_text(&mut self) -> Result<String> {
        let path = self.path.clone();
        let file = self.as_file_mut()?;
        let mut text = String::new();
        file.seek(SeekFrom::Start(0))
            .and_then(|_| file.read_to_string(&mut text))
            .map_err(|e| TempError::io(&path, e))?;
        Ok(text)
    }

    /// Moves the stream position to the start of the file.
    pub fn rewind(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.as_file_mut()?
            .rewind()
            .map_err(|e| TempError::io(&path, e))
    }

    /// Current size of the file in bytes.
    pub fn size(&self) -> Result<u64> {
        let metadata = self
            .as_file()?
            .metadata()
            .map_err(|e| TempError::io(&self.path, e))?;
        Ok(metadata.len())
    }

    fn unavailable(path: &Path, is_destroyed: bool) -> TempError {
        if is_destroyed {
            TempError::destroyed(path, "access")
        } else {
            TempError::io(path, io::Error::other("file handle is not open"))
        }
    }

    /// Reopens the file after a failed move or removal, so a live handle stays usable.
    fn restore(&mut self, position: u64) {
        match Self::reopen(&self.path, position) {
            Ok(file) => self.file = Some(file),
            Err(e) => debug!(path = %self.path.display(), error = %e, "unable to reopen temp file"),
        }
    }

    fn reopen(path: &Path, position: u64) -> io::Result<File> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        file.seek(SeekFrom::Start(position))?;
        Ok(file)
    }

    /// Closes the handle and returns the stream position it had.
    fn close(&mut self) -> u64 {
        let position = self
            .file
            .as_mut()
            .and_then(|f| {
                let _ = f.flush();
                f.stream_position().ok()
            })
            .unwrap_or(0);
        self.file = None;
        position
    }
}

impl TempResource for TempFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_destroyed(&self) -> bool {
        self.is_destroyed
    }

    /// Moves the file to `new_path`.
    /// The handle is reopened at the new location with the same stream position.
    fn relocate<P: AsRef<Path>>(&mut self, new_path: P) -> Result<()> {
        let new_path = new_path.as_ref();
        if self.is_destroyed {
            return Err(TempError::destroyed(&self.path, "relocate"));
        }
        utils::ensure_vacant(new_path)?;

        let position = self.close();
        if let Err(e) = utils::move_entry(&self.path, new_path) {
            self.restore(position);
            return Err(e);
        }
        debug!(from = %self.path.display(), to = %new_path.display(), "relocated temp file");
        self.path = new_path.to_path_buf();

        let file = Self::reopen(&self.path, position).map_err(|e| TempError::io(&self.path, e))?;
        self.file = Some(file);
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        if self.is_destroyed {
            return Ok(());
        }

        let position = self.close();
        if let Err(e) = utils::rm_on_host(&self.path) {
            // still live: keep it usable for a retry
            self.restore(position);
            return Err(TempError::io(&self.path, e));
        }

        self.is_destroyed = true;
        debug!(path = %self.path.display(), "destroyed temp file");
        Ok(())
    }
}

impl Read for TempFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.as_file_mut()?.read(buf)
    }
}

impl Write for TempFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.as_file_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.as_file_mut()?.flush()
    }
}

impl Seek for TempFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.as_file_mut()?.seek(pos)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.is_auto_clean {
            return;
        }
        if let Err(e) = self.destroy() {
            warn!(path = %self.path.display(), error = %e, "failed to remove temp file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir as TestDir;

    mod creations {
        use super::*;

        #[test]
        fn test_new_in_system_temp_dir() {
            let file = TempFile::new().unwrap();

            assert_eq!(file.path().parent(), Some(std::env::temp_dir().as_path()));
            assert!(file.path().is_file());
            assert!(!file.is_destroyed());
            assert!(file.is_auto_clean);
        }

        #[test]
        fn test_create_generated_in() {
            let sandbox = setup_test_env();
            let file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();

            assert_eq!(file.path().parent(), Some(sandbox.path()));
            let name = file.path().file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with(DEFAULT_PREFIX));
        }

        #[test]
        fn test_create_exact() {
            let sandbox = setup_test_env();
            let path = sandbox.path().join("exact.txt");

            let file = TempFile::create(Location::exact(&path)).unwrap();

            assert_eq!(file.path(), path);
            assert!(path.is_file());
        }

        #[test]
        fn test_create_exact_existing_fails() {
            let sandbox = setup_test_env();
            let path = sandbox.path().join("taken.txt");
            std::fs::write(&path, b"original").unwrap();

            let result = TempFile::create(Location::exact(&path));

            assert!(matches!(result, Err(TempError::AlreadyExists { .. })));
            assert_eq!(std::fs::read(&path).unwrap(), b"original"); // untouched
        }

        #[test]
        fn test_create_exact_missing_parent_fails() {
            let sandbox = setup_test_env();
            let path = sandbox.path().join("no/such/file.txt");

            let result = TempFile::create(Location::exact(&path));

            assert!(matches!(result, Err(TempError::ParentNotFound { .. })));
        }
    }

    mod stream {
        use super::*;

        #[test]
        fn test_append_and_read_text() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();

            file.append_text("hello").unwrap();
            assert_eq!(file.read_text().unwrap(), "hello");

            file.append_text(", world").unwrap();
            assert_eq!(file.read_text().unwrap(), "hello, world");
            assert_eq!(file.size().unwrap(), 12);
        }

        #[test]
        fn test_write_seek_read() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();

            file.write_all(b"bytes").unwrap();
            file.flush().unwrap();
            file.rewind().unwrap();

            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            assert_eq!(content, b"bytes");
            assert_eq!(std::fs::read(file.path()).unwrap(), b"bytes");
        }

        #[test]
        fn test_stream_on_destroyed_fails() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();
            file.destroy().unwrap();

            assert!(file.write_all(b"late").is_err());
            assert!(matches!(
                file.append_text("late"),
                Err(TempError::InvalidState { .. })
            ));
            assert!(matches!(file.read_text(), Err(TempError::InvalidState { .. })));
            assert!(matches!(file.as_file(), Err(TempError::InvalidState { .. })));
        }
    }

    mod relocate {
        use super::*;

        #[test]
        fn test_relocate_preserves_content() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();
            let old_path = file.path().to_path_buf();
            let new_path = sandbox.path().join("moved.txt");

            file.append_text("hello").unwrap();
            file.relocate(&new_path).unwrap();

            assert_eq!(file.path(), new_path);
            assert!(!old_path.exists());
            assert_eq!(file.read_text().unwrap(), "hello");
        }

        #[test]
        fn test_relocate_keeps_position() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();
            file.write_all(b"abcdef").unwrap();
            file.seek(SeekFrom::Start(3)).unwrap();

            file.relocate(sandbox.path().join("moved.bin")).unwrap();

            let mut rest = String::new();
            file.read_to_string(&mut rest).unwrap();
            assert_eq!(rest, "def");
        }

        #[test]
        fn test_relocate_onto_existing_fails() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();
            let occupied = sandbox.path().join("occupied.txt");
            std::fs::write(&occupied, b"keep me").unwrap();
            let old_path = file.path().to_path_buf();

            let result = file.relocate(&occupied);

            assert!(matches!(result, Err(TempError::AlreadyExists { .. })));
            assert_eq!(file.path(), old_path);
            assert_eq!(std::fs::read(&occupied).unwrap(), b"keep me");
            file.append_text("still usable").unwrap();
        }

        #[test]
        fn test_relocate_failed_move_keeps_path() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();
            let old_path = file.path().to_path_buf();
            std::fs::remove_file(&old_path).unwrap(); // removed behind our back

            let result = file.relocate(sandbox.path().join("moved.txt"));

            // the move error is reported, not the reopen one
            match result {
                Err(TempError::Io { path, source }) => {
                    assert_eq!(path, old_path);
                    assert_eq!(source.kind(), io::ErrorKind::NotFound);
                }
                other => panic!("unexpected result: {:?}", other),
            }
            assert_eq!(file.path(), old_path);
            assert!(!file.is_destroyed());
            assert!(matches!(file.as_file(), Err(TempError::Io { .. })));
        }

        #[test]
        fn test_relocate_destroyed_fails() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();
            file.destroy().unwrap();

            let result = file.relocate(sandbox.path().join("anywhere"));

            assert!(matches!(result, Err(TempError::InvalidState { .. })));
        }
    }

    mod destroy {
        use super::*;

        #[test]
        fn test_destroy_removes_file() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();
            let path = file.path().to_path_buf();

            file.destroy().unwrap();

            assert!(file.is_destroyed());
            assert!(!path.exists());
        }

        #[test]
        fn test_destroy_is_idempotent() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();

            file.destroy().unwrap();
            file.destroy().unwrap();

            assert!(file.is_destroyed());
        }

        #[test]
        fn test_destroy_vanished_file_fails_and_stays_live() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();
            std::fs::remove_file(file.path()).unwrap(); // removed behind our back

            let result = file.destroy();

            assert!(matches!(result, Err(TempError::Io { .. })));
            assert!(!file.is_destroyed());
            // live but without an open handle: not reported as destroyed
            assert!(matches!(file.as_file(), Err(TempError::Io { .. })));
            assert!(matches!(file.read_text(), Err(TempError::Io { .. })));
        }

        #[test]
        fn test_drop_removes_file() {
            let sandbox = setup_test_env();
            let file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();
            let path = file.path().to_path_buf();

            drop(file);

            assert!(!path.exists());
        }

        #[test]
        fn test_drop_with_is_auto_clean_false() {
            let sandbox = setup_test_env();
            let mut file = TempFile::create(Location::generated_in(sandbox.path())).unwrap();
            file.set_auto_clean(false);
            let path = file.path().to_path_buf();

            drop(file);

            assert!(path.exists()); // The file must remain
        }
    }

    // Helper function: Creates a temporary directory for tests
    fn setup_test_env() -> TestDir {
        TestDir::new("tempfile_test").unwrap()
    }
}

//! Filesystem utilities for atomic operations.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use uuid::Uuid;

/// Suffix carried by every in-flight temporary file.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Whether a directory entry name belongs to an in-flight temporary file.
pub fn is_temp_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
}

/// Write `data` to a new, uniquely named temporary file inside `dir`.
///
/// The name starts with a dot and ends with [`TEMP_SUFFIX`], so it can never
/// collide with a published record. With `fsync` the contents are flushed to
/// the medium before returning.
///
/// On failure the partially written temp file is removed.
pub fn write_temp(dir: &Path, stem: &str, data: &[u8], fsync: bool) -> io::Result<PathBuf> {
    let temp_path = temp_path_for(dir, stem);

    let result: io::Result<()> = (|| {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(data)?;
        if fsync {
            file.sync_all()?;
        }
        Ok(())
    })();

    if let Err(err) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }
    Ok(temp_path)
}

fn temp_path_for(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!(".{}.{}{}", stem, Uuid::new_v4().simple(), TEMP_SUFFIX))
}

/// Atomically move `path` aside to a fresh temporary name in the same
/// directory.
///
/// Whoever gets `Some` owns exactly the file that was at `path` at that
/// instant; concurrent callers racing for the same file get `None`.
pub fn capture(path: &Path) -> io::Result<Option<PathBuf>> {
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        ));
    };
    let captured = temp_path_for(dir, &name.to_string_lossy());
    match fs::rename(path, &captured) {
        Ok(()) => Ok(Some(captured)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Publish a temp file at `destination` unless something is already there.
///
/// Uses a hard link, which fails atomically when the destination exists, so
/// two writers racing for the same name cannot both win and a reader never
/// sees a half-written file. Where the filesystem has no hard links this falls
/// back to an existence check followed by `rename`, which is not race-free.
///
/// The temp file is removed in every case.
///
/// # Returns
///
/// `Ok(true)` if published, `Ok(false)` if the destination already existed.
pub fn publish_no_clobber(temp_path: &Path, destination: &Path) -> io::Result<bool> {
    let outcome = match fs::hard_link(temp_path, destination) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) if err.kind() == io::ErrorKind::Unsupported => {
            if destination.exists() {
                Ok(false)
            } else {
                fs::rename(temp_path, destination).map(|()| true)
            }
        }
        Err(err) => Err(err),
    };

    // The published link (if any) keeps the data alive
    let _ = fs::remove_file(temp_path);
    outcome
}

/// Remove a file, treating "already absent" as success.
///
/// Returns whether a file was actually removed.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Recursively remove a directory, treating "already absent" as success.
pub fn remove_dir_all_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// An exclusive marker file, released when dropped.
///
/// Holders of the same path exclude each other across threads and processes.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Take the lock at `path` without waiting.
    ///
    /// Returns `None` while someone else holds it. A lock older than
    /// `stale_after` is assumed abandoned by a crashed holder and is broken.
    pub fn try_acquire(path: &Path, stale_after: Duration) -> io::Result<Option<Self>> {
        match Self::create(path) {
            Ok(lock) => return Ok(Some(lock)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }

        let stale = match fs::metadata(path) {
            Ok(meta) => meta
                .modified()?
                .elapsed()
                .map_or(false, |age| age >= stale_after),
            Err(err) if err.kind() == io::ErrorKind::NotFound => true,
            Err(err) => return Err(err),
        };
        if !stale {
            return Ok(None);
        }

        remove_file_if_exists(path)?;
        match Self::create(path) {
            Ok(lock) => Ok(Some(lock)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn create(path: &Path) -> io::Result<Self> {
        OpenOptions::new().write(true).create_new(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Open a file for reading, mapping "not found" to `None`.
pub fn open_if_exists(path: &Path) -> io::Result<Option<File>> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Read a file, mapping "not found" to `None`.
pub fn read_if_exists(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

//! Atomic TOML file operations.
//!
//! A thin layer for safe access to the TOML files lantern keeps on disk
//! (configuration and persisted state). Writes go through a temporary
//! file with an fsync before an atomic rename, so a crash mid-write
//! never leaves a torn file behind.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Errors that can occur during atomic TOML operations.
///
/// Lock acquisition failures surface as `Io`.
#[derive(Debug)]
pub enum AtomicTomlError {
    /// File I/O error.
    Io(std::io::Error),
    /// TOML parse error.
    Parse(toml::de::Error),
    /// TOML serialization error.
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for AtomicTomlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicTomlError::Io(e) => write!(f, "I/O error: {}", e),
            AtomicTomlError::Parse(e) => write!(f, "TOML parse error: {}", e),
            AtomicTomlError::Serialize(e) => write!(f, "TOML serialization error: {}", e),
        }
    }
}

impl std::error::Error for AtomicTomlError {}

impl From<std::io::Error> for AtomicTomlError {
    fn from(e: std::io::Error) -> Self {
        AtomicTomlError::Io(e)
    }
}

impl From<toml::de::Error> for AtomicTomlError {
    fn from(e: toml::de::Error) -> Self {
        AtomicTomlError::Parse(e)
    }
}

impl From<toml::ser::Error> for AtomicTomlError {
    fn from(e: toml::ser::Error) -> Self {
        AtomicTomlError::Serialize(e)
    }
}

/// A handle to a TOML file with atomic update semantics.
///
/// - Updates are all-or-nothing via tmp file + atomic rename
/// - A lock file serializes concurrent `update` calls
/// - Data is fsynced before the rename
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new handle for the file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    /// Loads the TOML file and deserializes it.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(toml::from_str(&content)?))
    }

    /// Saves data to the TOML file atomically.
    ///
    /// # Errors
    ///
    /// Fails if serialization or any filesystem step fails. The original
    /// file is untouched on failure.
    pub fn save(&self, data: &T) -> Result<(), AtomicTomlError> {
        let parent = self.parent_dir()?;
        fs::create_dir_all(parent)?;

        let rendered = toml::to_string_pretty(data)?;

        // The tmp file sits next to the target so the rename stays on
        // one filesystem
        let tmp_path = self.sibling_tmp_path()?;
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(rendered.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Performs a locked read-modify-write cycle and returns the data
    /// as written.
    ///
    /// The update function receives the current data (or `default_value`
    /// when the file is missing or empty) and mutates it in place. The
    /// exclusive lock is held across the reload, the mutation, and the
    /// write-back.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<T, AtomicTomlError>
    where
        F: FnOnce(&mut T) -> Result<(), AtomicTomlError>,
    {
        let _guard = LockGuard::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        f(&mut data)?;
        self.save(&data)?;

        Ok(data)
    }

    fn parent_dir(&self) -> Result<&Path, AtomicTomlError> {
        self.path.parent().ok_or_else(|| {
            AtomicTomlError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no parent directory",
            ))
        })
    }

    fn sibling_tmp_path(&self) -> Result<PathBuf, AtomicTomlError> {
        let file_name = self.path.file_name().ok_or_else(|| {
            AtomicTomlError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no file name",
            ))
        })?;

        Ok(self
            .parent_dir()?
            .join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// An exclusive lock on a sibling `.lock` file, released on drop.
struct LockGuard {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl LockGuard {
    fn acquire(path: &Path) -> Result<Self, AtomicTomlError> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .open(&lock_path)?;

        #[cfg(unix)]
        fs2::FileExt::lock_exclusive(&file)?;

        #[cfg(not(unix))]
        {
            // No file locking on non-Unix systems. Acceptable for a
            // single-user CLI.
        }

        Ok(LockGuard { file, lock_path })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestDoc {
        name: String,
        count: u32,
    }

    fn doc(name: &str, count: u32) -> TestDoc {
        TestDoc {
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let atomic_file = AtomicTomlFile::<TestDoc>::new(temp_dir.path().join("test.toml"));

        atomic_file.save(&doc("test", 42)).unwrap();

        let loaded = atomic_file.load().unwrap().unwrap();
        assert_eq!(loaded, doc("test", 42));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let atomic_file = AtomicTomlFile::<TestDoc>::new(temp_dir.path().join("missing.toml"));

        assert!(atomic_file.load().unwrap().is_none());
    }

    #[test]
    fn test_empty_file_loads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("empty.toml");
        std::fs::write(&file_path, "  \n").unwrap();

        let atomic_file = AtomicTomlFile::<TestDoc>::new(file_path);
        assert!(atomic_file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_applies_and_returns_written_data() {
        let temp_dir = TempDir::new().unwrap();
        let atomic_file = AtomicTomlFile::<TestDoc>::new(temp_dir.path().join("test.toml"));

        let written = atomic_file
            .update(doc("default", 0), |d| {
                d.count += 10;
                Ok(())
            })
            .unwrap();
        assert_eq!(written.count, 10);

        // A second update starts from what the first one wrote
        let written = atomic_file
            .update(doc("default", 0), |d| {
                d.count += 5;
                Ok(())
            })
            .unwrap();
        assert_eq!(written.count, 15);
        assert_eq!(atomic_file.load().unwrap().unwrap().count, 15);
    }

    #[test]
    fn test_failed_update_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let atomic_file = AtomicTomlFile::<TestDoc>::new(temp_dir.path().join("test.toml"));
        atomic_file.save(&doc("kept", 1)).unwrap();

        let result = atomic_file.update(doc("default", 0), |_| {
            Err(AtomicTomlError::Io(std::io::Error::other("rejected")))
        });

        assert!(result.is_err());
        assert_eq!(atomic_file.load().unwrap().unwrap(), doc("kept", 1));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.toml");
        let atomic_file = AtomicTomlFile::<TestDoc>::new(file_path.clone());

        atomic_file.save(&doc("test", 42)).unwrap();

        assert!(!temp_dir.path().join(".test.toml.tmp").exists());
        assert!(file_path.exists());
    }
}

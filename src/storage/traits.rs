//! Storage abstraction trait and common types.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{MicrosearchError, Result};

/// A trait for storage backends that hold the index files.
///
/// The engine never touches the filesystem directly; shard files, the
/// document stats file and stored documents all go through this interface so
/// that the backing store can be swapped (directory on disk, in memory).
///
/// No locking is implied by any method. Two writers that read, modify and
/// replace the same file race, and the later replacement wins.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Open a file for reading.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create (or truncate) a file for writing.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Check if a file exists.
    ///
    /// A failure to check (permissions, I/O) is an error, not `false`. An
    /// entry that exists but cannot be opened, such as a dangling link,
    /// counts as existing.
    fn file_exists(&self, name: &str) -> Result<bool>;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// List all files in the storage, sorted by name.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Rename a file, atomically replacing `new_name` if it exists.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Create a uniquely named temporary file.
    fn create_temp_output(&self, prefix: &str) -> Result<(String, Box<dyn StorageOutput>)>;
}

/// A trait for reading data from storage.
pub trait StorageInput: Read + Send + std::fmt::Debug {
    /// Get the size of the input stream.
    fn size(&self) -> Result<u64>;
}

/// A trait for writing data to storage.
pub trait StorageOutput: Write + Send + std::fmt::Debug {
    /// Flush and sync the output to storage.
    fn flush_and_sync(&mut self) -> Result<()>;

    /// Close the output stream, making its content visible.
    fn close(&mut self) -> Result<()>;
}

/// Configuration for storage backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Whether to fsync every file before it replaces its predecessor.
    pub sync_writes: bool,

    /// Buffer size for I/O operations.
    pub buffer_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            sync_writes: false,
            buffer_size: 65536,
        }
    }
}

/// Error types specific to storage operations.
#[derive(Debug, Clone)]
pub enum StorageError {
    /// File not found.
    FileNotFound(String),

    /// I/O error.
    IoError(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::FileNotFound(name) => write!(f, "File not found: {name}"),
            StorageError::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for MicrosearchError {
    fn from(err: StorageError) -> Self {
        MicrosearchError::storage(err.to_string())
    }
}

/// Read a whole file, returning `None` if it does not exist.
///
/// Any other failure is an error: a file that exists but cannot be read must
/// not look like an empty one.
pub fn read_optional(storage: &dyn Storage, name: &str) -> Result<Option<Vec<u8>>> {
    if !storage.file_exists(name)? {
        return Ok(None);
    }

    let mut input = storage.open_input(name)?;
    let mut buf = Vec::with_capacity(input.size()? as usize);
    input
        .read_to_end(&mut buf)
        .map_err(|e| MicrosearchError::storage(format!("Failed to read {name}: {e}")))?;
    Ok(Some(buf))
}

/// Replace `name` with `data` so that readers see either the old content or
/// the new content, never a partial file.
///
/// The bytes go to a temporary file first, which is then renamed over the
/// target.
pub fn write_atomic(storage: &dyn Storage, name: &str, data: &[u8]) -> Result<()> {
    let (temp_name, mut output) = storage.create_temp_output(name)?;

    let written = output
        .write_all(data)
        .map_err(|e| MicrosearchError::storage(format!("Failed to write {temp_name}: {e}")))
        .and_then(|_| output.close());
    drop(output);

    if let Err(e) = written {
        let _ = storage.delete_file(&temp_name);
        return Err(e);
    }

    storage.rename_file(&temp_name, name)
}

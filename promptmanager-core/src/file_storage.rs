//! # File Storage
//!
//! This module provides functionality for storing and retrieving prompts from the local filesystem.
//! Each prompt is stored as a single protobuf-encoded file named `{id}.pb` directly under the
//! base directory.
//!
//! Writes go to a temporary file in the base directory which is then renamed over the record,
//! so a record file always holds either the previous or the new version of a prompt.
//!
//! # Examples
//!
//! ```rust
//! use promptmanager_core::file_storage::FileStorage;
//! use promptmanager_core::prompt::Prompt;
//! use promptmanager_core::registry::PromptStorage;
//! use promptmanager_core::tokenizer::EstimatingTokenizer;
//! use tempfile::TempDir;
//!
//! let temp_dir = TempDir::new().unwrap();
//! let storage = FileStorage::new(temp_dir.path().join("prompts"));
//!
//! let prompt = Prompt::new(
//!     "greeting".to_string(),
//!     "Greeting".to_string(),
//!     "Hello, {{name}}!".to_string(),
//!     &EstimatingTokenizer,
//! );
//! storage.save(&prompt).expect("Failed to save prompt");
//!
//! let listing = storage.list_all().expect("Failed to list prompts");
//! assert_eq!(vec![prompt], listing.prompts);
//! ```

use crate::codec::{self, DecodeError, ValidationError};
use crate::prompt::{Prompt, is_valid_id};
use crate::registry::{Listing, PromptStorage, SkippedRecord};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

const RECORD_EXTENSION: &str = "pb";

#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("IO error at {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid base path, not a directory: {}", .0.display())]
    InvalidBasePath(PathBuf),
    #[error(transparent)]
    ValidationError(#[from] ValidationError),
    #[error("Unreadable prompt record {}: {source}", .path.display())]
    DecodeError {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

fn io_error(path: &Path, source: io::Error) -> FileStorageError {
    FileStorageError::IoError {
        path: path.to_path_buf(),
        source,
    }
}

/// A local file storage for Prompts.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// The directory where prompt files are stored.
    pub base_path: PathBuf,
}

impl PromptStorage for FileStorage {
    type Error = FileStorageError;

    /// Saves a prompt in the local file system.
    ///
    /// The prompt is validated and encoded before anything touches the disk. If `base_path`
    /// doesn't exist, it is created first. An existing record with the same id is replaced
    /// in full.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the prompt is saved correctly.
    /// * `FileStorageError::ValidationError` - If the prompt cannot be encoded.
    /// * `FileStorageError::InvalidBasePath` - If `base_path` exists but is not a directory.
    /// * `FileStorageError::IoError` - If the record could not be written.
    fn save(&self, prompt: &Prompt) -> Result<(), FileStorageError> {
        let bytes = codec::encode(prompt)?;
        let file_path = self.record_path(prompt.id())?;
        self.ensure_base_directory_exists()?;

        let mut temp_file =
            NamedTempFile::new_in(&self.base_path).map_err(|e| io_error(&self.base_path, e))?;
        temp_file
            .write_all(&bytes)
            .and_then(|()| temp_file.as_file().sync_all())
            .map_err(|e| io_error(&file_path, e))?;
        temp_file
            .persist(&file_path)
            .map_err(|e| io_error(&file_path, e.error))?;

        debug!(
            id = prompt.id(),
            path = %file_path.display(),
            bytes = bytes.len(),
            "saved prompt"
        );
        Ok(())
    }

    /// Deletes a prompt given its id.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the prompt was deleted or didn't exist.
    /// * `FileStorageError` - If the id is invalid or the file could not be deleted.
    fn remove(&self, id: &str) -> Result<(), FileStorageError> {
        let file_path = self.record_path(id)?;
        match fs::remove_file(&file_path) {
            Ok(()) => {
                debug!(id, path = %file_path.display(), "removed prompt");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(id, "prompt already absent");
                Ok(())
            }
            Err(err) => Err(io_error(&file_path, err)),
        }
    }

    /// Gets a prompt given its id.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Prompt))` - If the prompt is found.
    /// * `Ok(None)` - If there is no record for `id`.
    /// * `FileStorageError` - If the record exists but could not be read or decoded.
    fn get(&self, id: &str) -> Result<Option<Prompt>, FileStorageError> {
        let file_path = self.record_path(id)?;
        if !file_path.exists() {
            return Ok(None);
        }

        self.read_record(&file_path, id).map(Some)
    }

    /// Gets all prompts stored in the base directory, ordered by file name.
    ///
    /// Records that cannot be read are skipped, logged and reported in
    /// [`Listing::skipped`]. A missing base directory yields an empty listing.
    fn list_all(&self) -> Result<Listing, FileStorageError> {
        let mut listing = Listing::default();

        if !self.base_path.exists() {
            return Ok(listing);
        }
        if !self.base_path.is_dir() {
            return Err(FileStorageError::InvalidBasePath(self.base_path.clone()));
        }

        for entry in self.get_record_files()? {
            let file_path = entry.path();
            let Some(id) = record_id(file_path) else {
                continue;
            };

            match self.read_record(file_path, id) {
                Ok(prompt) => listing.prompts.push(prompt),
                Err(err) => {
                    warn!(path = %file_path.display(), error = %err, "skipping prompt record");
                    listing.skipped.push(SkippedRecord {
                        path: file_path.to_path_buf(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        debug!(
            path = %self.base_path.display(),
            prompts = listing.prompts.len(),
            skipped = listing.skipped.len(),
            "listed prompts"
        );
        Ok(listing)
    }
}

impl FileStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> FileStorage {
        FileStorage {
            base_path: base_path.into(),
        }
    }

    /// Creates the base directory if it is missing. Parent directories are not created.
    pub fn ensure_base_directory_exists(&self) -> Result<(), FileStorageError> {
        match fs::create_dir(&self.base_path) {
            Ok(()) => {
                debug!(path = %self.base_path.display(), "created prompt directory");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                if self.base_path.is_dir() {
                    Ok(())
                } else {
                    Err(FileStorageError::InvalidBasePath(self.base_path.clone()))
                }
            }
            Err(err) => Err(io_error(&self.base_path, err)),
        }
    }

    /// The file that holds the record for `id`.
    pub fn record_path(&self, id: &str) -> Result<PathBuf, FileStorageError> {
        if !is_valid_id(id) {
            return Err(ValidationError {
                problems: vec![format!(
                    "id {id:?} must be non-empty and contain no path separators"
                )],
            }
            .into());
        }
        Ok(self.base_path.join(format!("{id}.{RECORD_EXTENSION}")))
    }

    fn read_record(&self, file_path: &Path, id: &str) -> Result<Prompt, FileStorageError> {
        let bytes = fs::read(file_path).map_err(|e| io_error(file_path, e))?;
        let decode_error = |source: DecodeError| FileStorageError::DecodeError {
            path: file_path.to_path_buf(),
            source,
        };

        let prompt = codec::decode(&bytes).map_err(decode_error)?;
        if prompt.id() != id {
            return Err(decode_error(DecodeError::IdMismatch {
                expected: id.to_string(),
                found: prompt.id().to_string(),
            }));
        }
        Ok(prompt)
    }

    fn get_record_files(&self) -> Result<Vec<walkdir::DirEntry>, FileStorageError> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.base_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(self.base_path.as_path()).to_path_buf();
                io_error(&path, err.into())
            })?;
            // Symlinked records count; `path().is_file()` follows the link.
            if entry.path().is_file() && record_id(entry.path()).is_some() {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

/// The id encoded in a record file name, if `path` follows the `{id}.pb` convention.
fn record_id(path: &Path) -> Option<&str> {
    if path.extension()? != RECORD_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str().filter(|id| is_valid_id(id))
}

//! A filesystem store.
//!
//! Each file of the store is a JSON manifest of its datasets under a base directory.

use crate::{
    storage::{
        store_dataset, FileManifest, ListableDatasetStorageTraits, RawDatasetDescriptor,
        ReadableDatasetStorageTraits, StorageError, WritableDatasetStorageTraits, WriteMode,
    },
    virtual_dataset::VirtualDatasetDescriptor,
};

use parking_lot::RwLock;
use thiserror::Error;
use walkdir::WalkDir;

use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Component, Path, PathBuf},
};

/// A synchronous file system store.
#[derive(Debug)]
pub struct FilesystemStore {
    base_path: PathBuf,
    readonly: bool,
    lock: RwLock<()>,
}

impl FilesystemStore {
    /// Create a new file system store at a given `base_path`.
    ///
    /// # Errors
    /// Returns a [`FilesystemStoreCreateError`] if `base_directory`:
    ///   - is not valid, or
    ///   - it points to an existing file rather than a directory.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, FilesystemStoreCreateError> {
        let base_path = base_path.as_ref().to_path_buf();
        if base_path.to_str().is_none() {
            return Err(FilesystemStoreCreateError::InvalidBasePath(base_path));
        }

        let readonly = if base_path.exists() {
            // the path already exists, check if it is read only
            let md = std::fs::metadata(&base_path).map_err(FilesystemStoreCreateError::IOError)?;
            if !md.is_dir() {
                return Err(FilesystemStoreCreateError::InvalidBasePath(base_path));
            }
            md.permissions().readonly()
        } else {
            // the path does not exist, so try and create it. If this succeeds, the filesystem is not read only
            std::fs::create_dir_all(&base_path).map_err(FilesystemStoreCreateError::IOError)?;
            false
        };

        Ok(Self {
            base_path,
            readonly,
            lock: RwLock::default(),
        })
    }

    /// Returns true if the store is read only.
    #[must_use]
    pub fn readonly(&self) -> bool {
        self.readonly
    }

    /// Maps a file of the store to a filesystem [`PathBuf`].
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidFilePath`] if `file` is empty, absolute, or leaves the base directory.
    pub fn file_to_fspath(&self, file: &Path) -> Result<PathBuf, StorageError> {
        let valid = file.file_name().is_some()
            && file
                .components()
                .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if valid {
            Ok(self.base_path.join(file))
        } else {
            Err(StorageError::InvalidFilePath(file.to_path_buf()))
        }
    }

    /// Maps a filesystem path to a file of the store.
    fn fspath_to_file(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.base_path)
            .ok()
            .map(Path::to_path_buf)
    }
}

impl ReadableDatasetStorageTraits for FilesystemStore {
    fn get_manifest(&self, file: &Path) -> Result<Option<FileManifest>, StorageError> {
        let path = self.file_to_fspath(file)?;
        let _lock = self.lock.read();

        let reader = match File::open(path) {
            Ok(file) => BufReader::new(file),
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    return Ok(None);
                }
                return Err(err.into());
            }
        };
        serde_json::from_reader(reader)
            .map(Some)
            .map_err(|err| StorageError::InvalidManifest(file.to_path_buf(), err.to_string()))
    }
}

impl WritableDatasetStorageTraits for FilesystemStore {
    fn set_manifest(&self, file: &Path, manifest: &FileManifest) -> Result<(), StorageError> {
        if self.readonly {
            return Err(StorageError::ReadOnly);
        }
        let path = self.file_to_fspath(file)?;
        let bytes = serde_json::to_vec_pretty(manifest)
            .map_err(|err| StorageError::InvalidManifest(file.to_path_buf(), err.to_string()))?;

        let _lock = self.lock.write();

        // Create directories
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(path)?;
        file.write_all(&bytes)?;
        Ok(())
    }

    fn store_raw_dataset(&self, descriptor: &RawDatasetDescriptor) -> Result<(), StorageError> {
        store_dataset(
            self,
            &descriptor.path,
            &descriptor.node,
            descriptor.into(),
            WriteMode::AppendDataset,
        )
    }

    fn store_virtual_dataset(
        &self,
        file: &Path,
        mode: WriteMode,
        descriptor: &VirtualDatasetDescriptor,
    ) -> Result<(), StorageError> {
        store_dataset(
            self,
            file,
            &descriptor.node,
            descriptor.clone().into(),
            mode,
        )
    }
}

impl ListableDatasetStorageTraits for FilesystemStore {
    fn list_files(&self) -> Result<Vec<PathBuf>, StorageError> {
        let _lock = self.lock.read();
        Ok(WalkDir::new(&self.base_path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|v| v.path().is_file())
            .filter_map(|v| self.fspath_to_file(v.path()))
            .collect())
    }
}

/// A filesystem store creation error.
#[derive(Debug, Error)]
pub enum FilesystemStoreCreateError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// The path is not valid on this system.
    #[error("base path {0} is not valid")]
    InvalidBasePath(PathBuf),
}

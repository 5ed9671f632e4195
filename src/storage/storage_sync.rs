use std::path::{Path, PathBuf};

use crate::{node::NodePath, virtual_dataset::VirtualDatasetDescriptor};

use super::{
    FileManifest, RawDatasetDescriptor, StorageError, StoredDataset, WriteMode,
};

/// Readable storage traits.
pub trait ReadableDatasetStorageTraits: Send + Sync {
    /// Retrieve the manifest of `file`.
    ///
    /// Returns [`None`] if the file is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn get_manifest(&self, file: &Path) -> Result<Option<FileManifest>, StorageError>;

    /// Returns true if `file` exists.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn file_exists(&self, file: &Path) -> Result<bool, StorageError> {
        Ok(self.get_manifest(file)?.is_some())
    }

    /// Retrieve the dataset at `node` in `file`.
    ///
    /// Returns [`None`] if the file or node is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn get_dataset(
        &self,
        file: &Path,
        node: &NodePath,
    ) -> Result<Option<StoredDataset>, StorageError> {
        Ok(self
            .get_manifest(file)?
            .and_then(|mut manifest| manifest.remove(node)))
    }

    /// Retrieve the shape and data type of the dataset at `node` in `file`.
    ///
    /// Virtual datasets are described like raw datasets, so a virtual dataset can be a source of another.
    /// Returns [`None`] if the file or node is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn dataset(
        &self,
        file: &Path,
        node: &NodePath,
    ) -> Result<Option<RawDatasetDescriptor>, StorageError> {
        Ok(self
            .get_dataset(file, node)?
            .map(|dataset| dataset.to_raw_descriptor(file, node)))
    }

    /// Retrieve the virtual dataset at `node` in `file`.
    ///
    /// Returns [`None`] if the file or node is not found, or the dataset is not virtual.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn virtual_dataset(
        &self,
        file: &Path,
        node: &NodePath,
    ) -> Result<Option<VirtualDatasetDescriptor>, StorageError> {
        Ok(match self.get_dataset(file, node)? {
            Some(StoredDataset::Virtual(descriptor)) => Some(descriptor),
            _ => None,
        })
    }
}

/// Writable storage traits.
pub trait WritableDatasetStorageTraits: Send + Sync {
    /// Store the manifest of `file`, replacing the file.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn set_manifest(&self, file: &Path, manifest: &FileManifest) -> Result<(), StorageError>;

    /// Store a raw dataset described by `descriptor`.
    ///
    /// The dataset is added to its file, creating the file if it does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if a dataset already exists at the node or there is an underlying storage error.
    fn store_raw_dataset(&self, descriptor: &RawDatasetDescriptor) -> Result<(), StorageError>;

    /// Store the virtual dataset described by `descriptor` in `file` according to `mode`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if a dataset already exists at the node with [`WriteMode::AppendDataset`],
    /// or there is an underlying storage error.
    fn store_virtual_dataset(
        &self,
        file: &Path,
        mode: WriteMode,
        descriptor: &VirtualDatasetDescriptor,
    ) -> Result<(), StorageError>;
}

/// Listable storage traits.
pub trait ListableDatasetStorageTraits: Send + Sync {
    /// Retrieve all files in the store, sorted.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn list_files(&self) -> Result<Vec<PathBuf>, StorageError>;
}

/// A supertrait of [`ReadableDatasetStorageTraits`] and [`WritableDatasetStorageTraits`].
pub trait ReadableWritableDatasetStorageTraits:
    ReadableDatasetStorageTraits + WritableDatasetStorageTraits
{
}

/// A supertrait of [`ReadableDatasetStorageTraits`] and [`ListableDatasetStorageTraits`].
pub trait ReadableListableDatasetStorageTraits:
    ReadableDatasetStorageTraits + ListableDatasetStorageTraits
{
}

/// A supertrait of [`ReadableWritableDatasetStorageTraits`] and [`ListableDatasetStorageTraits`].
pub trait ReadableWritableListableDatasetStorageTraits:
    ReadableWritableDatasetStorageTraits + ListableDatasetStorageTraits
{
}

impl<T> ReadableWritableDatasetStorageTraits for T where
    T: ReadableDatasetStorageTraits + WritableDatasetStorageTraits
{
}

impl<T> ReadableListableDatasetStorageTraits for T where
    T: ReadableDatasetStorageTraits + ListableDatasetStorageTraits
{
}

impl<T> ReadableWritableListableDatasetStorageTraits for T where
    T: ReadableWritableDatasetStorageTraits + ListableDatasetStorageTraits
{
}

/// Store `dataset` at `node` in `file`.
///
/// This method reads the manifest of `file`, updates it, and replaces it.
/// Stores can use this internally to implement [`WritableDatasetStorageTraits`].
///
/// With [`WriteMode::Create`] any existing contents of `file` are discarded.
/// With [`WriteMode::AppendDataset`] the dataset is added to the existing contents.
///
/// # Errors
/// Returns [`StorageError::DatasetExists`] if `node` exists in `file` with [`WriteMode::AppendDataset`],
/// or a [`StorageError`] if an underlying store operation fails.
pub fn store_dataset<T: ?Sized + ReadableWritableDatasetStorageTraits>(
    storage: &T,
    file: &Path,
    node: &NodePath,
    dataset: StoredDataset,
    mode: WriteMode,
) -> Result<(), StorageError> {
    let mut manifest = match mode {
        WriteMode::Create => FileManifest::new(),
        WriteMode::AppendDataset => storage.get_manifest(file)?.unwrap_or_default(),
    };
    if manifest.contains(node) {
        return Err(StorageError::DatasetExists {
            file: file.to_path_buf(),
            node: node.clone(),
        });
    }
    manifest.insert(node.clone(), dataset);
    storage.set_manifest(file, &manifest)
}

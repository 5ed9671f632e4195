//! An in-memory store.

use parking_lot::RwLock;

use crate::{
    node::NodePath,
    storage::{
        store_dataset, FileManifest, ListableDatasetStorageTraits, RawDatasetDescriptor,
        ReadableDatasetStorageTraits, StorageError, StoredDataset, WritableDatasetStorageTraits,
        WriteMode,
    },
    virtual_dataset::VirtualDatasetDescriptor,
};

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// An in-memory store.
#[derive(Debug)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<PathBuf, FileManifest>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: RwLock::default(),
        }
    }

    /// Erase `file`, returning true if it existed.
    pub fn erase_file(&self, file: &Path) -> bool {
        self.files.write().remove(file).is_some()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadableDatasetStorageTraits for MemoryStore {
    fn get_manifest(&self, file: &Path) -> Result<Option<FileManifest>, StorageError> {
        Ok(self.files.read().get(file).cloned())
    }

    fn file_exists(&self, file: &Path) -> Result<bool, StorageError> {
        Ok(self.files.read().contains_key(file))
    }

    fn get_dataset(
        &self,
        file: &Path,
        node: &NodePath,
    ) -> Result<Option<StoredDataset>, StorageError> {
        Ok(self
            .files
            .read()
            .get(file)
            .and_then(|manifest| manifest.get(node))
            .cloned())
    }
}

impl WritableDatasetStorageTraits for MemoryStore {
    fn set_manifest(&self, file: &Path, manifest: &FileManifest) -> Result<(), StorageError> {
        self.files
            .write()
            .insert(file.to_path_buf(), manifest.clone());
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

impl ListableDatasetStorageTraits for MemoryStore {
    fn list_files(&self) -> Result<Vec<PathBuf>, StorageError> {
        Ok(self.files.read().keys().cloned().collect())
    }
}

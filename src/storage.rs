//! Dataset storage ([stores](store) and the persistence boundary).
//!
//! A store holds "files", each a collection of datasets addressed by [`NodePath`].
//! A dataset is either raw (a shape and data type backed by bytes elsewhere) or virtual (a [`VirtualDatasetDescriptor`](crate::virtual_dataset::VirtualDatasetDescriptor)).
//!
//! This module defines abstract store interfaces, includes an in-memory and a filesystem store,
//! and has functions for discovering source files and naming the default output file.

mod storage_sync;
pub mod store;
mod stored_dataset;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    data_type::DataType,
    node::{NodePath, NodePathError},
    selection::ArrayShape,
};

pub use self::storage_sync::{
    store_dataset, ListableDatasetStorageTraits, ReadableDatasetStorageTraits,
    ReadableListableDatasetStorageTraits, ReadableWritableDatasetStorageTraits,
    ReadableWritableListableDatasetStorageTraits, WritableDatasetStorageTraits,
};
pub use self::stored_dataset::{FileManifest, StoredDataset};

/// [`Arc`] wrapped readable storage.
pub type ReadableStorage = Arc<dyn ReadableDatasetStorageTraits>;

/// [`Arc`] wrapped readable and writable storage.
pub type ReadableWritableStorage = Arc<dyn ReadableWritableDatasetStorageTraits>;

/// [`Arc`] wrapped readable, writable, and listable storage.
pub type ReadableWritableListableStorage = Arc<dyn ReadableWritableListableDatasetStorageTraits>;

/// The file extension of source and output files.
pub const FILE_EXTENSION: &str = "h5";

/// The suffix appended to a file prefix to form the default output file name.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "vds.h5";

/// A raw dataset: the node of a dataset within a file, its shape, and its data type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDatasetDescriptor {
    /// The file holding the dataset.
    pub path: PathBuf,
    /// The node of the dataset within the file.
    pub node: NodePath,
    /// The shape of the dataset.
    pub shape: ArrayShape,
    /// The data type of the dataset.
    pub data_type: DataType,
}

impl RawDatasetDescriptor {
    /// Create a new raw dataset descriptor.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        node: NodePath,
        shape: ArrayShape,
        data_type: DataType,
    ) -> Self {
        Self {
            path: path.into(),
            node,
            shape,
            data_type,
        }
    }
}

/// The mode used to write a virtual dataset to its output file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Create the output file, replacing any existing file.
    #[default]
    Create,
    /// Add the dataset to the output file, creating the file if it does not exist.
    ///
    /// Fails if the node already exists.
    AppendDataset,
}

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write operation was attempted on a read only store.
    #[error("a write operation was attempted on a read only store")]
    ReadOnly,
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An error parsing the manifest of a file.
    #[error("error parsing manifest for {0}: {1}")]
    InvalidManifest(PathBuf, String),
    /// A file path that cannot be stored.
    #[error("invalid file path {0}")]
    InvalidFilePath(PathBuf),
    /// An invalid node path.
    #[error("invalid node path {0}")]
    NodePathError(#[from] NodePathError),
    /// A dataset already exists at the node.
    #[error("dataset {node} already exists in {file}")]
    DatasetExists {
        /// The file.
        file: PathBuf,
        /// The node.
        node: NodePath,
    },
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Return the default output file for source files sharing `prefix`: `<prefix>vds.h5`.
#[must_use]
pub fn default_output_for_prefix(prefix: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}{DEFAULT_OUTPUT_SUFFIX}"))
}

/// Return the default output file for `files`: their longest common prefix followed by `vds.h5`.
///
/// If the common prefix is a whole file name, its extension is replaced by `_`.
#[must_use]
pub fn default_output(files: &[PathBuf]) -> PathBuf {
    let names: Vec<String> = files.iter().map(|file| path_to_string(file)).collect();
    let prefix = names.split_first().map_or_else(String::new, |(first, rest)| {
        let length = rest.iter().fold(first.len(), |length, name| {
            first
                .char_indices()
                .zip(name.chars())
                .take_while(|((index, a), b)| *index < length && a == b)
                .last()
                .map_or(0, |((index, a), _)| index + a.len_utf8())
        });
        first[..length].to_string()
    });
    match prefix.strip_suffix(&format!(".{FILE_EXTENSION}")) {
        Some(stem) => default_output_for_prefix(&format!("{stem}_")),
        None => default_output_for_prefix(&prefix),
    }
}

/// Discover the source files in `storage` sharing `prefix`.
///
/// Returns the sorted `*.h5` files whose path starts with `prefix`, excluding the default output file `<prefix>vds.h5`.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn discover_files<TStorage: ?Sized + ListableDatasetStorageTraits>(
    storage: &TStorage,
    prefix: &str,
) -> Result<Vec<PathBuf>, StorageError> {
    let output = default_output_for_prefix(prefix);
    let extension = format!(".{FILE_EXTENSION}");
    let mut files: Vec<PathBuf> = storage
        .list_files()?
        .into_iter()
        .filter(|file| {
            let name = path_to_string(file);
            name.starts_with(prefix) && name.ends_with(&extension) && *file != output
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::MemoryStore;

    #[test]
    fn default_output_common_prefix() {
        let files: Vec<PathBuf> = vec![
            "stripe_1.h5".into(),
            "stripe_2.h5".into(),
            "stripe_3.h5".into(),
        ];
        assert_eq!(default_output(&files), PathBuf::from("stripe_vds.h5"));
        let files: Vec<PathBuf> = vec!["raw/a_000.h5".into(), "raw/a_001.h5".into()];
        assert_eq!(default_output(&files), PathBuf::from("raw/a_00vds.h5"));
        assert_eq!(
            default_output(&["single.h5".into()]),
            PathBuf::from("single_vds.h5")
        );
        assert_eq!(default_output(&[]), PathBuf::from("vds.h5"));
    }

    #[test]
    fn discover_files_prefix() {
        let store = MemoryStore::new();
        for file in ["stripe_2.h5", "stripe_1.h5", "stripe_vds.h5", "stripe_1.txt", "other_1.h5"] {
            store
                .store_raw_dataset(&RawDatasetDescriptor::new(
                    file,
                    NodePath::default(),
                    vec![1, 256, 2048],
                    DataType::UInt16,
                ))
                .unwrap();
        }
        assert_eq!(
            discover_files(&store, "stripe_").unwrap(),
            vec![PathBuf::from("stripe_1.h5"), PathBuf::from("stripe_2.h5")]
        );
        assert!(discover_files(&store, "missing_").unwrap().is_empty());
    }

    #[test]
    fn write_mode_serde() {
        assert_eq!(
            serde_json::to_string(&WriteMode::AppendDataset).unwrap(),
            r#""append_dataset""#
        );
        assert_eq!(WriteMode::default(), WriteMode::Create);
    }
}

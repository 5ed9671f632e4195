use std::path::PathBuf;

use derive_more::From;

use crate::storage::{
    default_output, default_output_for_prefix, discover_files, ListableDatasetStorageTraits,
    StorageError,
};

/// The source files of a virtual dataset.
#[derive(Clone, Debug, PartialEq, Eq, From)]
pub enum SourceFiles {
    /// Every `*.h5` file in the store whose path starts with the prefix.
    Prefix(String),
    /// An explicit list of files, in order.
    Explicit(Vec<PathBuf>),
}

impl From<&str> for SourceFiles {
    fn from(prefix: &str) -> Self {
        Self::Prefix(prefix.to_string())
    }
}

impl SourceFiles {
    /// Resolve the list of source files, discovering them in `storage` if given by prefix.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the files cannot be listed.
    pub fn resolve<TStorage: ?Sized + ListableDatasetStorageTraits>(
        &self,
        storage: &TStorage,
    ) -> Result<Vec<PathBuf>, StorageError> {
        match self {
            Self::Prefix(prefix) => discover_files(storage, prefix),
            Self::Explicit(files) => Ok(files.clone()),
        }
    }

    /// Return the default output file for these source files.
    #[must_use]
    pub fn default_output(&self) -> PathBuf {
        match self {
            Self::Prefix(prefix) => default_output_for_prefix(prefix),
            Self::Explicit(files) => default_output(files),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::MemoryStore;
    use crate::storage::{RawDatasetDescriptor, WritableDatasetStorageTraits};
    use crate::{data_type::DataType, node::NodePath};

    #[test]
    fn source_files_resolve() {
        let store = MemoryStore::new();
        for file in ["scan_1.h5", "scan_2.h5", "scan_vds.h5", "other.h5"] {
            store
                .store_raw_dataset(&RawDatasetDescriptor::new(
                    file,
                    NodePath::default(),
                    vec![1, 2, 2],
                    DataType::UInt8,
                ))
                .unwrap();
        }
        let files = SourceFiles::from("scan_");
        assert_eq!(
            files.resolve(&store).unwrap(),
            vec![PathBuf::from("scan_1.h5"), PathBuf::from("scan_2.h5")]
        );
        assert_eq!(files.default_output(), PathBuf::from("scan_vds.h5"));

        let files = SourceFiles::from(vec![PathBuf::from("b.h5"), PathBuf::from("a.h5")]);
        assert_eq!(
            files.resolve(&store).unwrap(),
            vec![PathBuf::from("b.h5"), PathBuf::from("a.h5")]
        );
    }
}

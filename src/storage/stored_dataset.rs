use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    data_type::DataType, node::NodePath, selection::ArrayShape,
    virtual_dataset::VirtualDatasetDescriptor,
};

use super::RawDatasetDescriptor;

/// A dataset held in a file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredDataset {
    /// A raw dataset.
    Raw {
        /// The shape.
        shape: ArrayShape,
        /// The data type.
        data_type: DataType,
    },
    /// A virtual dataset.
    Virtual(VirtualDatasetDescriptor),
}

impl StoredDataset {
    /// Return the shape of the dataset.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        match self {
            Self::Raw { shape, .. } => shape,
            Self::Virtual(descriptor) => &descriptor.shape,
        }
    }

    /// Return the data type of the dataset.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Raw { data_type, .. } => *data_type,
            Self::Virtual(descriptor) => descriptor.data_type,
        }
    }

    /// Returns true if the dataset is virtual.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::Virtual(_))
    }

    /// Describe the dataset at `node` in `file` as a raw dataset.
    ///
    /// A virtual dataset presents its shape and data type to readers like any other dataset.
    #[must_use]
    pub fn to_raw_descriptor(&self, file: &Path, node: &NodePath) -> RawDatasetDescriptor {
        RawDatasetDescriptor::new(file, node.clone(), self.shape().to_vec(), self.data_type())
    }
}

impl From<&RawDatasetDescriptor> for StoredDataset {
    fn from(descriptor: &RawDatasetDescriptor) -> Self {
        Self::Raw {
            shape: descriptor.shape.clone(),
            data_type: descriptor.data_type,
        }
    }
}

impl From<VirtualDatasetDescriptor> for StoredDataset {
    fn from(descriptor: VirtualDatasetDescriptor) -> Self {
        Self::Virtual(descriptor)
    }
}

/// The contents of a file: its datasets keyed by node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FileManifest {
    datasets: BTreeMap<NodePath, StoredDataset>,
}

impl FileManifest {
    /// Create a new empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dataset at `node`.
    #[must_use]
    pub fn get(&self, node: &NodePath) -> Option<&StoredDataset> {
        self.datasets.get(node)
    }

    /// Returns true if the manifest has a dataset at `node`.
    #[must_use]
    pub fn contains(&self, node: &NodePath) -> bool {
        self.datasets.contains_key(node)
    }

    /// Insert `dataset` at `node`, returning the replaced dataset if any.
    pub fn insert(&mut self, node: NodePath, dataset: StoredDataset) -> Option<StoredDataset> {
        self.datasets.insert(node, dataset)
    }

    /// Remove and return the dataset at `node`.
    pub fn remove(&mut self, node: &NodePath) -> Option<StoredDataset> {
        self.datasets.remove(node)
    }

    /// Return the nodes of the datasets in the manifest.
    pub fn nodes(&self) -> impl Iterator<Item = &NodePath> {
        self.datasets.keys()
    }

    /// Return the number of datasets in the manifest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Returns true if the manifest has no datasets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill_value::FillValue;

    #[test]
    fn file_manifest_json() {
        let mut manifest = FileManifest::new();
        let raw = RawDatasetDescriptor::new(
            "stripe_1.h5",
            NodePath::default(),
            vec![1, 256, 2048],
            DataType::UInt16,
        );
        assert!(manifest
            .insert(NodePath::default(), StoredDataset::from(&raw))
            .is_none());
        let descriptor = VirtualDatasetDescriptor {
            node: NodePath::new("/entry/data").unwrap(),
            shape: vec![1, 515, 2048],
            data_type: DataType::UInt16,
            fill_value: FillValue::default(),
            mappings: vec![],
        };
        manifest.insert(descriptor.node.clone(), descriptor.into());

        let json = serde_json::to_string(&manifest).unwrap();
        assert_eq!(
            json,
            r#"{"datasets":{"/entry/data":{"kind":"virtual","node":"/entry/data","shape":[1,515,2048],"data_type":"uint16","fill_value":-1.0,"mappings":[]},"data":{"kind":"raw","shape":[1,256,2048],"data_type":"uint16"}}}"#
        );
        let manifest_json: FileManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(manifest_json, manifest);

        let virtual_dataset = manifest.get(&NodePath::new("/entry/data").unwrap()).unwrap();
        assert!(virtual_dataset.is_virtual());
        assert_eq!(
            virtual_dataset.to_raw_descriptor(Path::new("vds.h5"), &NodePath::default()),
            RawDatasetDescriptor::new(
                "vds.h5",
                NodePath::default(),
                vec![1, 515, 2048],
                DataType::UInt16
            )
        );
        assert_eq!(manifest.len(), 2);
        assert!(manifest.remove(&NodePath::default()).is_some());
        assert!(!manifest.contains(&NodePath::default()));
    }
}

use serde::{Deserialize, Serialize};

use crate::{
    data_type::DataType, fill_value::FillValue, node::NodePath, selection::ArrayShape,
};

use super::VirtualMapping;

/// A virtual dataset ready to be persisted: its node, shape, data type, fill value, and mappings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VirtualDatasetDescriptor {
    /// The node of the virtual dataset.
    pub node: NodePath,
    /// The shape of the virtual dataset.
    pub shape: ArrayShape,
    /// The data type of the virtual dataset.
    pub data_type: DataType,
    /// The fill value for elements not backed by any source.
    pub fill_value: FillValue,
    /// The mappings, in the order they were produced.
    pub mappings: Vec<VirtualMapping>,
}

impl VirtualDatasetDescriptor {
    /// Return the total number of elements of the virtual dataset.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Return the number of bytes the virtual dataset presents to readers.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.num_elements() * self.data_type.size() as u64
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    data_type::DataType,
    fill_value::FillValue,
    node::NodePath,
    selection::{ArrayShape, AxisSelector, Selection, SelectionError},
};

use super::{VirtualDatasetDescriptor, VirtualSourceRegion};

/// A mapping from a region of a raw dataset to a region of a virtual dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMapping {
    /// The region of the virtual dataset.
    pub target: Selection,
    /// The file holding the raw dataset.
    pub source_path: PathBuf,
    /// The node of the raw dataset.
    pub source_node: NodePath,
    /// The region of the raw dataset.
    pub source: Selection,
}

/// The layout of a virtual dataset.
///
/// Mappings are kept in assignment order. The layout does not check that mappings are disjoint or cover the target.
#[derive(Clone, Debug, PartialEq)]
pub struct VirtualLayout {
    shape: ArrayShape,
    data_type: DataType,
    fill_value: FillValue,
    mappings: Vec<VirtualMapping>,
}

impl VirtualLayout {
    /// Create a new empty layout of a virtual dataset with `shape` and `data_type`.
    #[must_use]
    pub fn new(shape: ArrayShape, data_type: DataType, fill_value: FillValue) -> Self {
        Self {
            shape,
            data_type,
            fill_value,
            mappings: Vec::new(),
        }
    }

    /// Map `source` onto the region of the virtual dataset selected by `selectors`.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionError`] if `selectors` cannot be resolved against the shape of the virtual dataset.
    pub fn assign(
        &mut self,
        selectors: &[AxisSelector],
        source: VirtualSourceRegion,
    ) -> Result<(), SelectionError> {
        let target = Selection::new(&self.shape, selectors)?;
        let (source_path, source_node, source) = source.into_parts();
        log::debug!(
            "{}:{}{} -> {}",
            source_path.display(),
            source_node,
            source,
            target
        );
        self.mappings.push(VirtualMapping {
            target,
            source_path,
            source_node,
            source,
        });
        Ok(())
    }

    /// Return the shape of the virtual dataset.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Return the data type of the virtual dataset.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Return the fill value of the virtual dataset.
    #[must_use]
    pub fn fill_value(&self) -> FillValue {
        self.fill_value
    }

    /// Return the mappings in assignment order.
    #[must_use]
    pub fn mappings(&self) -> &[VirtualMapping] {
        &self.mappings
    }

    /// Bind the layout to `node`, producing a descriptor for persistence.
    #[must_use]
    pub fn into_descriptor(self, node: NodePath) -> VirtualDatasetDescriptor {
        VirtualDatasetDescriptor {
            node,
            shape: self.shape,
            data_type: self.data_type,
            fill_value: self.fill_value,
            mappings: self.mappings,
        }
    }
}

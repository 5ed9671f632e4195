use std::path::{Path, PathBuf};

use crate::{
    data_type::DataType,
    node::NodePath,
    selection::{ArrayShape, AxisSelector, Selection, SelectionError},
    storage::RawDatasetDescriptor,
};

/// A raw dataset that can back regions of a virtual dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualSource {
    path: PathBuf,
    node: NodePath,
    shape: ArrayShape,
    data_type: DataType,
    max_shape: ArrayShape,
}

/// A selected region of a [`VirtualSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualSourceRegion {
    path: PathBuf,
    node: NodePath,
    selection: Selection,
}

impl VirtualSource {
    /// Create a new virtual source for the dataset at `node` in the file at `path`.
    ///
    /// The maximum shape defaults to `shape`.
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
            max_shape: shape.clone(),
            shape,
            data_type,
        }
    }

    /// Set the maximum shape of a resizable source.
    ///
    /// # Errors
    ///
    /// Returns
    ///  - [`SelectionError::Dimension`] if `max_shape` does not match the dimensionality of the source, or
    ///  - [`SelectionError::InvalidSelection`] if any axis of `max_shape` is smaller than the shape.
    pub fn with_max_shape(mut self, max_shape: ArrayShape) -> Result<Self, SelectionError> {
        if max_shape.len() != self.shape.len() {
            return Err(SelectionError::Dimension {
                got: max_shape.len(),
                expected: self.shape.len(),
            });
        }
        if std::iter::zip(&max_shape, &self.shape).any(|(max, length)| max < length) {
            return Err(SelectionError::InvalidSelection(format!(
                "maximum shape {max_shape:?} is smaller than shape {:?}",
                self.shape
            )));
        }
        self.max_shape = max_shape;
        Ok(self)
    }

    /// Return the path of the file holding the source.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the node of the source within its file.
    #[must_use]
    pub fn node(&self) -> &NodePath {
        &self.node
    }

    /// Return the shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Return the maximum shape.
    #[must_use]
    pub fn max_shape(&self) -> &[u64] {
        &self.max_shape
    }

    /// Return the data type.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Select a region of the source.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionError`] if `selectors` cannot be resolved against the source shape.
    pub fn select(&self, selectors: &[AxisSelector]) -> Result<VirtualSourceRegion, SelectionError> {
        Ok(self.region(Selection::new(&self.shape, selectors)?))
    }

    /// Select the whole source.
    #[must_use]
    pub fn select_all(&self) -> VirtualSourceRegion {
        self.region(Selection::all(&self.shape))
    }

    fn region(&self, selection: Selection) -> VirtualSourceRegion {
        VirtualSourceRegion {
            path: self.path.clone(),
            node: self.node.clone(),
            selection,
        }
    }
}

impl From<RawDatasetDescriptor> for VirtualSource {
    fn from(descriptor: RawDatasetDescriptor) -> Self {
        Self::new(
            descriptor.path,
            descriptor.node,
            descriptor.shape,
            descriptor.data_type,
        )
    }
}

impl VirtualSourceRegion {
    /// Return the path of the file holding the source.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the node of the source within its file.
    #[must_use]
    pub fn node(&self) -> &NodePath {
        &self.node
    }

    /// Return the selection of the source.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn into_parts(self) -> (PathBuf, NodePath, Selection) {
        (self.path, self.node, self.selection)
    }
}

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    geometry::DimensionError,
    node::NodePath,
    selection::SelectionError,
    source_meta::{MissingSourceError, SourceMetaError, SourceMismatchError},
    storage::StorageError,
};

/// The target node of an output file is already populated.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("output file {file} already has a dataset {node}")]
pub struct DestinationConflictError {
    file: PathBuf,
    node: NodePath,
}

impl DestinationConflictError {
    /// Create a new destination conflict error.
    #[must_use]
    pub fn new(file: PathBuf, node: NodePath) -> Self {
        Self { file, node }
    }

    /// Return the output file.
    #[must_use]
    pub fn file(&self) -> &std::path::Path {
        &self.file
    }

    /// Return the conflicting node.
    #[must_use]
    pub fn node(&self) -> &NodePath {
        &self.node
    }
}

/// A virtual dataset generation error.
#[derive(Debug, Error)]
pub enum VdsError {
    /// An invalid selection.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// The sources disagree on an attribute that must be identical.
    #[error(transparent)]
    SourceMismatch(#[from] SourceMismatchError),
    /// A source does not exist.
    #[error(transparent)]
    MissingSource(#[from] MissingSourceError),
    /// The sources or geometry parameters have incompatible dimensions.
    #[error(transparent)]
    Dimension(#[from] DimensionError),
    /// The target node of the output file is already populated.
    #[error(transparent)]
    DestinationConflict(#[from] DestinationConflictError),
    /// A storage error.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<SourceMetaError> for VdsError {
    fn from(err: SourceMetaError) -> Self {
        match err {
            SourceMetaError::SourceMismatch(err) => Self::SourceMismatch(err),
            SourceMetaError::MissingSource(err) => Self::MissingSource(err),
            SourceMetaError::Dimension(err) => Self::Dimension(err),
            SourceMetaError::Storage(err) => Self::Storage(err),
        }
    }
}

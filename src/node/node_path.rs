use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::DEFAULT_NODE;

/// The path of a dataset node within a file.
///
/// Node paths may be relative (`data`) or absolute (`/entry/instrument/data`).
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[display("{_0}")]
pub struct NodePath(String);

/// An invalid node path.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid node path {0:?}")]
pub struct NodePathError(String);

impl NodePath {
    /// Create a new node path from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`NodePathError`] if `path` is not valid according to [`NodePath::validate`()].
    pub fn new(path: &str) -> Result<Self, NodePathError> {
        if Self::validate(path) {
            Ok(Self(path.to_string()))
        } else {
            Err(NodePathError(path.to_string()))
        }
    }

    /// Extracts a string slice containing the node path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates a node path:
    /// - it must not be empty or the root `/`,
    /// - it must not end with `/`, and
    /// - it must not contain empty components (i.e. a `//` substring).
    #[must_use]
    pub fn validate(path: &str) -> bool {
        !path.is_empty() && path != "/" && !path.ends_with('/') && !path.contains("//")
    }
}

impl Default for NodePath {
    fn default() -> Self {
        Self(DEFAULT_NODE.to_string())
    }
}

impl TryFrom<&str> for NodePath {
    type Error = NodePathError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl TryFrom<String> for NodePath {
    type Error = NodePathError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        Self::new(&path)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.0
    }
}

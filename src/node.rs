//! Dataset nodes within a file.
//!
//! A dataset is addressed by the file that holds it and a [`NodePath`] inside that file.

mod node_path;

pub use node_path::{NodePath, NodePathError};

/// The default node of raw and virtual datasets.
pub const DEFAULT_NODE: &str = "data";

//! Generator configuration options.

use std::path::{Path, PathBuf};

use crate::{fill_value::FillValue, node::NodePath, storage::WriteMode};

/// Configuration options for a [`VdsGenerator`](crate::generator::VdsGenerator).
///
/// A [`Config`] is passed to each generator explicitly. There is no global configuration.
///
/// # Node Configuration Options
///
/// ## Source Node
///  > default: `data`
///
/// The node of the raw dataset in every source file.
///
/// ## Target Node
///  > default: `data`
///
/// The node of the virtual dataset in the output file.
///
/// # Output Configuration Options
///
/// ## Fill Value
///  > default: `-1`
///
/// The value of virtual dataset elements that are not backed by any source, such as gaps between modules.
///
/// ## Output
///  > default: [`None`]
///
/// The output file. If [`None`], the output is `<prefix>vds.h5` where `<prefix>` is the common prefix of the source file names.
///
/// ## Mode
///  > default: [`WriteMode::Create`]
///
/// [`WriteMode::Create`] replaces the output file.
/// [`WriteMode::AppendDataset`] adds the virtual dataset to an existing output file, and fails if the target node already exists.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    source_node: NodePath,
    target_node: NodePath,
    fill_value: FillValue,
    output: Option<PathBuf>,
    mode: WriteMode,
}

#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Config {
            source_node: NodePath::default(),
            target_node: NodePath::default(),
            fill_value: FillValue::default(),
            output: None,
            mode: WriteMode::Create,
        }
    }
}

impl Config {
    /// Get the [source node](#source-node) configuration.
    #[must_use]
    pub fn source_node(&self) -> &NodePath {
        &self.source_node
    }

    /// Set the [source node](#source-node) configuration.
    pub fn set_source_node(&mut self, source_node: NodePath) -> &mut Self {
        self.source_node = source_node;
        self
    }

    /// Get the [target node](#target-node) configuration.
    #[must_use]
    pub fn target_node(&self) -> &NodePath {
        &self.target_node
    }

    /// Set the [target node](#target-node) configuration.
    pub fn set_target_node(&mut self, target_node: NodePath) -> &mut Self {
        self.target_node = target_node;
        self
    }

    /// Get the [fill value](#fill-value) configuration.
    #[must_use]
    pub fn fill_value(&self) -> FillValue {
        self.fill_value
    }

    /// Set the [fill value](#fill-value) configuration.
    pub fn set_fill_value(&mut self, fill_value: FillValue) -> &mut Self {
        self.fill_value = fill_value;
        self
    }

    /// Get the [output](#output) configuration.
    #[must_use]
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Set the [output](#output) configuration.
    pub fn set_output(&mut self, output: Option<PathBuf>) -> &mut Self {
        self.output = output;
        self
    }

    /// Get the [mode](#mode) configuration.
    #[must_use]
    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Set the [mode](#mode) configuration.
    pub fn set_mode(&mut self, mode: WriteMode) -> &mut Self {
        self.mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.source_node().as_str(), "data");
        assert_eq!(config.target_node().as_str(), "data");
        assert_eq!(config.fill_value(), FillValue::new(-1.0));
        assert_eq!(config.output(), None);
        assert_eq!(config.mode(), WriteMode::Create);
    }

    #[test]
    fn config_set() {
        let mut config = Config::default();
        config
            .set_target_node(NodePath::new("/entry/detector/data").unwrap())
            .set_fill_value(FillValue::from(0))
            .set_output(Some("stripes_vds.h5".into()))
            .set_mode(WriteMode::AppendDataset);
        assert_eq!(config.target_node().as_str(), "/entry/detector/data");
        assert_eq!(config.fill_value().value(), 0.0);
        assert_eq!(config.output(), Some(Path::new("stripes_vds.h5")));
        assert_eq!(config.mode(), WriteMode::AppendDataset);
        assert_eq!(config.source_node().as_str(), "data");
    }
}

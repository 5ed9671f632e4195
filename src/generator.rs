//! Virtual dataset generation.
//!
//! A [`VdsGenerator`] ties together a store, a set of [`SourceFiles`], a [`Geometry`] and a [`Config`].
//! [`VdsGenerator::generate_vds`] runs the whole pipeline:
//!  1. the source files are resolved, discovering them by prefix if needed,
//!  2. the [`SourceMeta`] of the sources is read from the store (or synthesised from an [`EmptySource`]) and validated,
//!  3. the geometry builds a [`VirtualLayout`](crate::virtual_dataset::VirtualLayout),
//!  4. the output file is checked for a conflicting dataset, and
//!  5. the [`VirtualDatasetDescriptor`] is written to the store once.
//!
//! The layout is computed before the output is touched, so a failed run leaves the store unchanged.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use vdsgen::{
//!     config::Config,
//!     data_type::DataType,
//!     generator::{SourceFiles, VdsGenerator},
//!     geometry::StripeAssembly,
//!     node::NodePath,
//!     storage::{store::MemoryStore, RawDatasetDescriptor, WritableDatasetStorageTraits},
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! for file in ["stripe_1.h5", "stripe_2.h5"] {
//!     store.store_raw_dataset(&RawDatasetDescriptor::new(
//!         file,
//!         NodePath::default(),
//!         vec![1, 256, 2048],
//!         DataType::UInt16,
//!     ))?;
//! }
//!
//! let generator = VdsGenerator::new(
//!     store.clone(),
//!     SourceFiles::from("stripe_"),
//!     StripeAssembly::new(3, 123),
//!     Config::default(),
//! )?;
//! let vds = generator.generate_vds()?;
//! assert_eq!(vds.shape, vec![1, 515, 2048]);
//! assert_eq!(generator.output(), std::path::PathBuf::from("stripe_vds.h5"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod generator_errors;
mod source_files;

use std::{path::PathBuf, sync::Arc};

pub use generator_errors::{DestinationConflictError, VdsError};
pub use source_files::SourceFiles;

use crate::{
    config::Config,
    geometry::{DimensionError, Geometry},
    source_meta::{EmptySource, SourceMeta},
    storage::{
        ListableDatasetStorageTraits, ReadableDatasetStorageTraits, WritableDatasetStorageTraits,
        WriteMode,
    },
    virtual_dataset::{VirtualDatasetDescriptor, VirtualLayout, VirtualSource},
};

/// A virtual dataset generator.
///
/// The generator holds a store of source and output files, the source files, a geometry, and a configuration.
#[derive(Debug)]
pub struct VdsGenerator<TStorage: ?Sized, TGeometry> {
    storage: Arc<TStorage>,
    files: SourceFiles,
    geometry: TGeometry,
    config: Config,
    empty_source: Option<EmptySource>,
}

impl<TStorage: ?Sized, TGeometry: Geometry> VdsGenerator<TStorage, TGeometry> {
    /// Create a new virtual dataset generator.
    ///
    /// # Errors
    /// Returns [`DimensionError::TooManySources`] if `files` is an explicit list with more files than `geometry` accepts.
    pub fn new(
        storage: Arc<TStorage>,
        files: SourceFiles,
        geometry: TGeometry,
        config: Config,
    ) -> Result<Self, VdsError> {
        if let SourceFiles::Explicit(files) = &files {
            if !files.is_empty() {
                geometry.validate_num_sources(files.len())?;
            }
        }
        Ok(Self {
            storage,
            files,
            geometry,
            config,
            empty_source: None,
        })
    }

    /// Describe the sources with `empty_source` instead of reading them from the store.
    ///
    /// This allows a virtual dataset to be created before its sources are written.
    #[must_use]
    pub fn with_empty_source(mut self, empty_source: EmptySource) -> Self {
        self.empty_source = Some(empty_source);
        self
    }

    /// Return the source files.
    #[must_use]
    pub fn files(&self) -> &SourceFiles {
        &self.files
    }

    /// Return the geometry.
    #[must_use]
    pub fn geometry(&self) -> &TGeometry {
        &self.geometry
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return the empty source, if any.
    #[must_use]
    pub fn empty_source(&self) -> Option<&EmptySource> {
        self.empty_source.as_ref()
    }

    /// Return the output file.
    ///
    /// This is the [output](Config#output) of the configuration if set, otherwise the default output of the source files.
    #[must_use]
    pub fn output(&self) -> PathBuf {
        self.config
            .output()
            .map_or_else(|| self.files.default_output(), std::path::Path::to_path_buf)
    }
}

impl<TStorage, TGeometry> VdsGenerator<TStorage, TGeometry>
where
    TStorage: ?Sized + ReadableDatasetStorageTraits + ListableDatasetStorageTraits,
    TGeometry: Geometry,
{
    /// Resolve the source files.
    ///
    /// Files discovered by prefix exclude the [`output`](VdsGenerator::output) file.
    ///
    /// # Errors
    /// Returns
    ///  - [`DimensionError::NoSources`] if there are no source files,
    ///  - [`DimensionError::TooManySources`] if there are more source files than the geometry accepts, or
    ///  - a [`StorageError`](crate::storage::StorageError) if the files cannot be listed.
    pub fn source_files(&self) -> Result<Vec<PathBuf>, VdsError> {
        let mut files = self.files.resolve(&*self.storage)?;
        if let SourceFiles::Prefix(_) = self.files {
            let output = self.output();
            files.retain(|file| *file != output);
        }
        if files.is_empty() {
            return Err(DimensionError::NoSources.into());
        }
        self.geometry.validate_num_sources(files.len())?;
        Ok(files)
    }

    /// Build the layout of the virtual dataset without touching the output file.
    ///
    /// # Errors
    /// Returns a [`VdsError`] if the sources are missing or inconsistent, or are incompatible with the geometry.
    pub fn build_layout(&self) -> Result<VirtualLayout, VdsError> {
        let files = self.source_files()?;
        let node = self.config.source_node();
        let aggregation = self.geometry.frame_aggregation();
        let descriptors = match &self.empty_source {
            Some(empty_source) => empty_source.descriptors(&files, node, aggregation)?,
            None => SourceMeta::inspect(&*self.storage, &files, node)?,
        };
        let meta = SourceMeta::from_descriptors(&descriptors, aggregation)?;
        log::debug!(
            "{} of {} sources with {meta}",
            self.geometry.name(),
            descriptors.len()
        );

        let sources: Vec<VirtualSource> = descriptors.into_iter().map(VirtualSource::from).collect();
        self.geometry
            .build_layout(&sources, &meta, self.config.fill_value())
    }
}

impl<TStorage, TGeometry> VdsGenerator<TStorage, TGeometry>
where
    TStorage: ?Sized
        + ReadableDatasetStorageTraits
        + WritableDatasetStorageTraits
        + ListableDatasetStorageTraits,
    TGeometry: Geometry,
{
    /// Generate the virtual dataset and write it to the output file.
    ///
    /// Returns the descriptor of the virtual dataset as written.
    ///
    /// # Errors
    /// Returns
    ///  - [`DestinationConflictError`] if the mode is [`WriteMode::AppendDataset`] and the target node exists in the output file, or
    ///  - any error of [`build_layout`](VdsGenerator::build_layout) or of the store.
    pub fn generate_vds(&self) -> Result<VirtualDatasetDescriptor, VdsError> {
        let layout = self.build_layout()?;

        let output = self.output();
        let node = self.config.target_node();
        let mode = self.config.mode();
        if mode == WriteMode::AppendDataset && self.storage.get_dataset(&output, node)?.is_some() {
            return Err(DestinationConflictError::new(output, node.clone()).into());
        }

        let descriptor = layout.into_descriptor(node.clone());
        self.storage
            .store_virtual_dataset(&output, mode, &descriptor)?;
        log::info!(
            "{} wrote {}:{} with shape {:?} from {} mappings",
            self.geometry.name(),
            output.display(),
            node,
            descriptor.shape,
            descriptor.mappings.len()
        );
        Ok(descriptor)
    }
}

//! A rust library for computing the mappings of HDF5 virtual datasets (VDS) over detector frames.
//!
//! A virtual dataset is not stored directly.
//! It is defined by an ordered list of mappings from regions of raw datasets onto regions of the virtual dataset, resolved lazily on read.
//! `vdsgen` computes these mappings without touching pixel data.
//!
//! ## Getting Started
//! - [`generator::VdsGenerator`] runs the full pipeline: resolve sources, validate their metadata, build a layout and write it.
//! - [`geometry`] lists the supported layouts and the [`Geometry`](geometry::Geometry) trait for new ones.
//! - [`selection`] is the hyperslab algebra that every mapping is expressed in.
//! - [`storage`] is the persistence boundary. Datasets are described, not stored, so stores hold manifests of dataset descriptors.
//!
//! ## Example
//! ```rust
//! # use std::{path::PathBuf, sync::Arc};
//! use vdsgen::{
//!     config::Config,
//!     data_type::DataType,
//!     generator::{SourceFiles, VdsGenerator},
//!     geometry::Reshape,
//!     node::NodePath,
//!     storage::{store::MemoryStore, RawDatasetDescriptor, WritableDatasetStorageTraits},
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! store.store_raw_dataset(&RawDatasetDescriptor::new(
//!     "scan.h5",
//!     NodePath::default(),
//!     vec![12, 512, 512],
//!     DataType::Float32,
//! ))?;
//!
//! // 4 rows of 3 points, scanned in a snake
//! let reshape = Reshape::new(vec![4, 3])?.with_alternate(vec![false, true])?;
//! let generator = VdsGenerator::new(
//!     store,
//!     SourceFiles::from(vec![PathBuf::from("scan.h5")]),
//!     reshape,
//!     Config::default(),
//! )?;
//! let layout = generator.build_layout()?;
//! assert_eq!(layout.shape(), &[4, 3, 512, 512]);
//! assert_eq!(layout.mappings().len(), 12);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
// #![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod data_type;
pub mod fill_value;
pub mod generator;
pub mod geometry;
pub mod node;
pub mod selection;
pub mod source_meta;
pub mod storage;
pub mod virtual_dataset;

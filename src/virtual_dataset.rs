//! Virtual dataset descriptions.
//!
//! A virtual dataset is defined by an ordered list of mappings from regions of raw datasets to regions of the virtual dataset.
//!  - A [`VirtualSource`] describes a raw dataset. Selecting from it produces a [`VirtualSourceRegion`].
//!  - A [`VirtualLayout`] accumulates [`VirtualMapping`]s by assigning source regions to target selections.
//!  - A [`VirtualDatasetDescriptor`] is a finished layout bound to a node, ready to be persisted.

mod virtual_dataset_descriptor;
mod virtual_layout;
mod virtual_source;

pub use virtual_dataset_descriptor::VirtualDatasetDescriptor;
pub use virtual_layout::{VirtualLayout, VirtualMapping};
pub use virtual_source::{VirtualSource, VirtualSourceRegion};

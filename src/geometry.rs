//! Virtual dataset geometries.
//!
//! A [`Geometry`] maps the regions of one or more sources onto a virtual dataset.
//! Geometries are pure: the same sources and metadata always produce the same [`VirtualLayout`], with mappings in the same order.
//!
//! Included geometries:
//!  - [`StripeAssembly`]: stack horizontal stripes into a taller frame with gaps between stripes and modules.
//!  - [`GapFill`]: re-insert gaps between the chips of a tiled sensor.
//!  - [`ExcaliburGapFill`]: [`GapFill`] for a 1 or 3 module Excalibur detector.
//!  - [`Interleave`]: merge the frames of multiple sources in round robin blocks.
//!  - [`Reshape`]: reshape the frame axis, optionally in a snake scan order.

mod excalibur;
mod gap_fill;
mod interleave;
mod reshape;
mod stripe_assembly;

use std::path::PathBuf;

use thiserror::Error;

pub use excalibur::ExcaliburGapFill;
pub use gap_fill::GapFill;
pub use interleave::Interleave;
pub use reshape::Reshape;
pub use stripe_assembly::StripeAssembly;

use crate::{
    fill_value::FillValue,
    generator::VdsError,
    source_meta::{FrameAggregation, SourceMeta},
    virtual_dataset::{VirtualLayout, VirtualSource},
};

/// A dimension error.
///
/// The sources or geometry parameters are inconsistent with the shape arithmetic of a geometry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DimensionError {
    /// There are no sources.
    #[error("no source files")]
    NoSources,
    /// More sources than the geometry accepts.
    #[error("{geometry} accepts at most {max} source files, got {got}")]
    TooManySources {
        /// The geometry.
        geometry: &'static str,
        /// The maximum number of sources.
        max: usize,
        /// The number of sources.
        got: usize,
    },
    /// A source has an unsupported number of dimensions.
    #[error("source {file} has {got} dimensions, expected {expected}")]
    SourceDimensionality {
        /// The source file.
        file: PathBuf,
        /// The dimensionality of the source.
        got: usize,
        /// The supported dimensionality.
        expected: &'static str,
    },
    /// Empty sources described with per-file frame counts that do not match the number of files.
    #[error("empty source frames {frames:?} must have one frame count for each of {files} files")]
    EmptySourceFrames {
        /// The frame counts.
        frames: Vec<u64>,
        /// The number of files.
        files: usize,
    },
    /// An unsupported number of Excalibur modules.
    #[error("unsupported number of excalibur modules {0}, expected 1 or 3")]
    UnsupportedModuleCount(u64),
    /// A spacing list does not have one entry per grid row or column.
    #[error("{axis} spacing {spacing:?} must have {expected} entries")]
    SpacingLength {
        /// The axis of the spacing, `x` or `y`.
        axis: char,
        /// The spacing.
        spacing: Vec<u64>,
        /// The size of the grid along the axis.
        expected: u64,
    },
    /// A chip grid with no chips or empty chips.
    #[error("a {grid_y}x{grid_x} grid of {sub_height}x{sub_width} chips is empty")]
    EmptyGrid {
        /// The number of chip rows.
        grid_y: u64,
        /// The number of chip columns.
        grid_x: u64,
        /// The chip height.
        sub_height: u64,
        /// The chip width.
        sub_width: u64,
    },
    /// A source frame that is not a grid of chips.
    #[error("a {height}x{width} frame is not a {grid_y}x{grid_x} grid of {sub_height}x{sub_width} chips")]
    ChipGrid {
        /// The frame height.
        height: u64,
        /// The frame width.
        width: u64,
        /// The number of chip rows.
        grid_y: u64,
        /// The number of chip columns.
        grid_x: u64,
        /// The chip height.
        sub_height: u64,
        /// The chip width.
        sub_width: u64,
    },
    /// A zero block size.
    #[error("block size must be at least 1")]
    ZeroBlockSize,
    /// Frame counts that cannot be interleaved without gaps or overlaps.
    #[error("frame counts {frames:?} are not a round robin distribution of blocks of {block_size} frames")]
    NonRoundRobin {
        /// The frame count of each source.
        frames: Vec<u64>,
        /// The block size.
        block_size: u64,
    },
    /// Sources with no frame axis.
    #[error("sources have no frame axis")]
    MissingFrameAxis,
    /// A shape with a different number of frames to the sources.
    #[error("cannot reshape {frames} frames into {new_shape:?}")]
    ShapeMismatch {
        /// The number of source frames.
        frames: u64,
        /// The requested shape.
        new_shape: Vec<u64>,
    },
    /// An empty shape.
    #[error("shape must have at least one axis")]
    EmptyShape,
    /// A shape with a zero length axis.
    #[error("shape {0:?} has a zero length axis")]
    ZeroLengthAxis(Vec<u64>),
    /// A shape whose size does not fit in a `u64`.
    #[error("the size of a dataset overflows u64")]
    Overflow,
    /// Alternation flags that do not have one entry per axis.
    #[error("alternate {alternate:?} must have one entry per axis of {new_shape:?}")]
    AlternateLength {
        /// The alternation flags.
        alternate: Vec<bool>,
        /// The requested shape.
        new_shape: Vec<u64>,
    },
}

/// Geometry traits.
pub trait Geometry: Send + Sync {
    /// The name of the geometry.
    fn name(&self) -> &'static str;

    /// How the frames of multiple sources are aggregated into a [`SourceMeta`].
    fn frame_aggregation(&self) -> FrameAggregation {
        FrameAggregation::Uniform
    }

    /// The maximum number of sources, if limited.
    fn max_sources(&self) -> Option<usize> {
        None
    }

    /// Check that the geometry accepts `num_sources` sources.
    ///
    /// # Errors
    /// Returns [`DimensionError::NoSources`] if `num_sources` is zero
    /// or [`DimensionError::TooManySources`] if it exceeds [`max_sources`](Geometry::max_sources).
    fn validate_num_sources(&self, num_sources: usize) -> Result<(), DimensionError> {
        if num_sources == 0 {
            return Err(DimensionError::NoSources);
        }
        match self.max_sources() {
            Some(max) if num_sources > max => Err(DimensionError::TooManySources {
                geometry: self.name(),
                max,
                got: num_sources,
            }),
            _ => Ok(()),
        }
    }

    /// Build the layout of the virtual dataset from `sources` described by `meta`.
    ///
    /// # Errors
    /// Returns a [`VdsError`] if the sources or geometry parameters are inconsistent.
    fn build_layout(
        &self,
        sources: &[VirtualSource],
        meta: &SourceMeta,
        fill_value: FillValue,
    ) -> Result<VirtualLayout, VdsError>;
}

impl<T: ?Sized + Geometry> Geometry for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn frame_aggregation(&self) -> FrameAggregation {
        (**self).frame_aggregation()
    }

    fn max_sources(&self) -> Option<usize> {
        (**self).max_sources()
    }

    fn build_layout(
        &self,
        sources: &[VirtualSource],
        meta: &SourceMeta,
        fill_value: FillValue,
    ) -> Result<VirtualLayout, VdsError> {
        (**self).build_layout(sources, meta, fill_value)
    }
}

/// Force the final entry of `spacing` to zero, warning if it was not.
fn trim_final_spacing(mut spacing: Vec<u64>, axis: char) -> Vec<u64> {
    if let Some(last) = spacing.last_mut() {
        if *last != 0 {
            log::warn!("final {axis} spacing {last} ignored");
            *last = 0;
        }
    }
    spacing
}

/// Alternating spacing: `even` after even indices and `odd` after odd indices, with no spacing after the final entry.
fn alternating_spacing(len: u64, even: u64, odd: u64) -> Vec<u64> {
    (0..len)
        .map(|i| {
            if i + 1 == len {
                0
            } else if i % 2 == 0 {
                even
            } else {
                odd
            }
        })
        .collect()
}

/// The number of elements in `shape`.
fn checked_product(shape: &[u64]) -> Result<u64, DimensionError> {
    shape
        .iter()
        .try_fold(1u64, |product, &length| product.checked_mul(length))
        .ok_or(DimensionError::Overflow)
}

/// The extent of `count` runs of `size` elements, each followed by the corresponding `spacing`.
fn gapped_extent(size: u64, count: u64, spacing: &[u64]) -> Result<u64, DimensionError> {
    spacing
        .iter()
        .fold(size.checked_mul(count), |extent, &gap| {
            extent.and_then(|extent| extent.checked_add(gap))
        })
        .ok_or(DimensionError::Overflow)
}

/// The offsets of consecutive runs of `size` elements, each followed by the corresponding `spacing`.
fn gapped_offsets(size: u64, spacing: &[u64]) -> Vec<u64> {
    spacing
        .iter()
        .scan(0, |offset, gap| {
            let start = *offset;
            *offset += size + gap;
            Some(start)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_helpers() {
        assert_eq!(alternating_spacing(6, 3, 123), vec![3, 123, 3, 123, 3, 0]);
        assert_eq!(alternating_spacing(1, 3, 123), vec![0]);
        assert!(alternating_spacing(0, 3, 123).is_empty());
        assert_eq!(trim_final_spacing(vec![1, 2, 3], 'x'), vec![1, 2, 0]);
        assert_eq!(gapped_offsets(256, &[3, 123, 0]), vec![0, 259, 638]);
        assert_eq!(gapped_extent(256, 3, &[3, 123, 0]), Ok(894));
        assert_eq!(
            gapped_extent(u64::MAX / 2, 2, &[1, 0]),
            Err(DimensionError::Overflow)
        );
        assert_eq!(gapped_extent(u64::MAX, 2, &[0, 0]), Err(DimensionError::Overflow));
    }

    #[test]
    fn checked_shape_product() {
        assert_eq!(checked_product(&[]), Ok(1));
        assert_eq!(checked_product(&[3, 5, 4]), Ok(60));
        assert_eq!(checked_product(&[3, 0, 4]), Ok(0));
        assert_eq!(
            checked_product(&[u64::MAX, 2]),
            Err(DimensionError::Overflow)
        );
    }

    #[test]
    fn validate_num_sources() {
        let reshape = Reshape::new(vec![2, 3]).unwrap();
        assert_eq!(reshape.validate_num_sources(1), Ok(()));
        assert_eq!(
            reshape.validate_num_sources(2),
            Err(DimensionError::TooManySources {
                geometry: "reshape",
                max: 1,
                got: 2
            })
        );
        assert_eq!(
            StripeAssembly::new(3, 123).validate_num_sources(0),
            Err(DimensionError::NoSources)
        );
        assert_eq!(StripeAssembly::new(3, 123).validate_num_sources(6), Ok(()));
    }
}

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use super::{AxisSlab, Hyperslab, SelectionError};

/// An index expression for one axis of a dataset.
///
/// Negative slice bounds and indices count back from the end of the axis,
/// and slice bounds beyond the axis are clamped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AxisSelector {
    /// Every element of the axis (`:`).
    Full,
    /// A slice `start:stop:step`, with a positive `step`.
    Range {
        /// The first element, defaults to `0`.
        start: Option<i64>,
        /// The end of the slice (exclusive), defaults to the axis length.
        stop: Option<i64>,
        /// The step, defaults to `1`.
        step: Option<i64>,
    },
    /// A single element. The axis is dropped from the logical shape of the selection.
    Index(i64),
    /// As many [`Full`](AxisSelector::Full) selectors as needed to match the dimensionality of the dataset (`...`).
    Ellipsis,
    /// A strided block selection.
    Hyperslab(Hyperslab),
}

/// Convert an element offset to a signed index, saturating out-of-range offsets so they fail validation.
fn to_index(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl AxisSelector {
    /// Create a contiguous slice `start:stop`.
    #[must_use]
    pub fn range(start: u64, stop: u64) -> Self {
        Self::Range {
            start: Some(to_index(start)),
            stop: Some(to_index(stop)),
            step: None,
        }
    }

    /// Create a single element selection at `index`.
    #[must_use]
    pub fn index(index: u64) -> Self {
        Self::Index(to_index(index))
    }

    /// Create a strided block selection along an axis.
    #[must_use]
    pub fn strided_blocks(start: u64, count: u64, stride: u64, block: u64) -> Self {
        Self::Hyperslab(
            Hyperslab::new()
                .with_start(to_index(start))
                .with_count(to_index(count))
                .with_stride(to_index(stride))
                .with_block(to_index(block)),
        )
    }

    /// Resolve the selector against an axis of length `axis_length`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidSelection`] if
    ///  - a slice step is not positive,
    ///  - an index is out of range,
    ///  - a hyperslab is invalid (see [`Hyperslab::resolve`]), or
    ///  - the selector is an unexpanded [`Ellipsis`](AxisSelector::Ellipsis).
    pub fn resolve(&self, axis_length: u64) -> Result<AxisSlab, SelectionError> {
        match self {
            Self::Full => Ok(AxisSlab::contiguous(0, axis_length)),
            Self::Range { start, stop, step } => resolve_range(*start, *stop, *step, axis_length),
            Self::Index(index) => {
                let length = i128::from(axis_length);
                let index = i128::from(*index);
                let index = if index < 0 { index + length } else { index };
                if (0..length).contains(&index) {
                    u64::try_from(index)
                        .map(AxisSlab::index)
                        .map_err(|_| SelectionError::InvalidSelection(index.to_string()))
                } else {
                    Err(SelectionError::InvalidSelection(format!(
                        "index {index} is out of range for an axis of length {axis_length}"
                    )))
                }
            }
            Self::Hyperslab(hyperslab) => hyperslab.resolve(axis_length),
            Self::Ellipsis => Err(SelectionError::InvalidSelection(
                "an ellipsis cannot be resolved against a single axis".to_string(),
            )),
        }
    }
}

fn resolve_range(
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
    axis_length: u64,
) -> Result<AxisSlab, SelectionError> {
    let length = i128::from(axis_length);
    let step = i128::from(step.unwrap_or(1));
    if step <= 0 {
        return Err(SelectionError::InvalidSelection(format!(
            "slice step {step} must be positive"
        )));
    }
    let clamp = |bound: Option<i64>, default: i128| match bound {
        None => default,
        Some(bound) => {
            let bound = i128::from(bound);
            let bound = if bound < 0 { bound + length } else { bound };
            bound.clamp(0, length)
        }
    };
    let start = clamp(start, 0);
    let stop = clamp(stop, length);
    let count = if stop > start {
        (stop - start + step - 1) / step
    } else {
        0
    };
    let to_u64 = |value: i128| {
        u64::try_from(value)
            .map_err(|_| SelectionError::InvalidSelection(format!("slice bound {value} out of range")))
    };
    Ok(AxisSlab {
        start: to_u64(start)?,
        count: to_u64(count)?,
        stride: to_u64(step)?,
        block: 1,
        scalar: false,
    })
}

impl From<RangeFull> for AxisSelector {
    fn from(_range: RangeFull) -> Self {
        Self::Full
    }
}

impl From<Range<u64>> for AxisSelector {
    fn from(range: Range<u64>) -> Self {
        Self::range(range.start, range.end)
    }
}

impl From<RangeFrom<u64>> for AxisSelector {
    fn from(range: RangeFrom<u64>) -> Self {
        Self::Range {
            start: Some(to_index(range.start)),
            stop: None,
            step: None,
        }
    }
}

impl From<RangeTo<u64>> for AxisSelector {
    fn from(range: RangeTo<u64>) -> Self {
        Self::Range {
            start: None,
            stop: Some(to_index(range.end)),
            step: None,
        }
    }
}

impl From<i64> for AxisSelector {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<u64> for AxisSelector {
    fn from(index: u64) -> Self {
        Self::index(index)
    }
}

impl From<Hyperslab> for AxisSelector {
    fn from(hyperslab: Hyperslab) -> Self {
        Self::Hyperslab(hyperslab)
    }
}

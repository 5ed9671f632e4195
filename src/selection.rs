//! Hyperslab selections.
//!
//! A [`Selection`] resolves a list of per-axis index expressions ([`AxisSelector`]) against the shape of a dataset.
//! Every axis resolves to an [`AxisSlab`]: a `(start, count, stride, block)` hyperslab, plus a flag marking axes selected with an integer index.
//!
//! Selections are immutable. They describe either the region of a raw dataset that backs part of a virtual dataset,
//! or the region of the virtual dataset where it lands.

mod axis_selector;
mod broadcast;
mod hyperslab;

pub use axis_selector::AxisSelector;
pub use hyperslab::{AxisSlab, Hyperslab};

use itertools::Itertools;
use num::Integer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The shape of a dataset or selection.
pub type ArrayShape = Vec<u64>;

/// Indices into a dataset.
pub type ArrayIndices = Vec<u64>;

/// A selection error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// A malformed, out of range, or overlapping index expression.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    /// More index expressions than dataset dimensions.
    #[error("{got} index expressions supplied for a dataset with {expected} dimensions")]
    Dimension {
        /// The number of index expressions (excluding an ellipsis).
        got: usize,
        /// The dataset dimensionality.
        expected: usize,
    },
    /// A shape that cannot be broadcast across a selection.
    #[error("cannot broadcast {target_shape:?} across a selection with shape {selection_shape:?}")]
    Broadcast {
        /// The shape being broadcast.
        target_shape: ArrayShape,
        /// The logical shape of the selection.
        selection_shape: ArrayShape,
    },
}

/// A hyperslab selection of a dataset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// The shape of the selected dataset.
    array_shape: ArrayShape,
    /// The selection along each axis.
    axes: Vec<AxisSlab>,
}

impl Selection {
    /// Resolve `selectors` against a dataset with `array_shape`.
    ///
    /// Missing trailing selectors select every element of their axis.
    /// A single [`AxisSelector::Ellipsis`] expands to as many full selectors as needed.
    ///
    /// # Errors
    ///
    /// Returns
    ///  - [`SelectionError::InvalidSelection`] if there is more than one ellipsis or a selector is invalid for its axis, or
    ///  - [`SelectionError::Dimension`] if there are more selectors (other than an ellipsis) than axes.
    pub fn new(array_shape: &[u64], selectors: &[AxisSelector]) -> Result<Self, SelectionError> {
        let ellipses = selectors
            .iter()
            .filter(|selector| matches!(selector, AxisSelector::Ellipsis))
            .count();
        if ellipses > 1 {
            return Err(SelectionError::InvalidSelection(
                "an index can only have a single ellipsis".to_string(),
            ));
        }
        let explicit = selectors.len() - ellipses;
        if explicit > array_shape.len() {
            return Err(SelectionError::Dimension {
                got: explicit,
                expected: array_shape.len(),
            });
        }

        let fill = array_shape.len() - explicit;
        let mut expanded = Vec::with_capacity(array_shape.len());
        for selector in selectors {
            if matches!(selector, AxisSelector::Ellipsis) {
                expanded.extend(std::iter::repeat(AxisSelector::Full).take(fill));
            } else {
                expanded.push(*selector);
            }
        }
        if ellipses == 0 {
            expanded.extend(std::iter::repeat(AxisSelector::Full).take(fill));
        }

        let axes = std::iter::zip(&expanded, array_shape)
            .map(|(selector, &axis_length)| selector.resolve(axis_length))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            array_shape: array_shape.to_vec(),
            axes,
        })
    }

    /// Select every element of a dataset with `array_shape`.
    #[must_use]
    pub fn all(array_shape: &[u64]) -> Self {
        Self {
            array_shape: array_shape.to_vec(),
            axes: array_shape
                .iter()
                .map(|&axis_length| AxisSlab::contiguous(0, axis_length))
                .collect(),
        }
    }

    /// Return the shape of the selected dataset.
    #[must_use]
    pub fn array_shape(&self) -> &[u64] {
        &self.array_shape
    }

    /// Return the selection along each axis.
    #[must_use]
    pub fn axes(&self) -> &[AxisSlab] {
        &self.axes
    }

    /// Return the dimensionality of the selected dataset.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.axes.len()
    }

    /// Return the logical shape of the selection: the block counts of every non-scalar axis.
    #[must_use]
    pub fn logical_shape(&self) -> ArrayShape {
        self.axes
            .iter()
            .filter(|axis| !axis.scalar)
            .map(|axis| axis.count)
            .collect()
    }

    /// Return the number of selected elements.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.axes.iter().map(AxisSlab::num_elements).product()
    }

    /// Returns true if the selection covers the whole dataset.
    #[must_use]
    pub fn is_all(&self) -> bool {
        std::iter::zip(&self.axes, &self.array_shape).all(|(axis, &axis_length)| {
            axis.start == 0 && axis.stride == axis.block && axis.num_elements() == axis_length
        })
    }

    /// Return the start of each axis.
    #[must_use]
    pub fn start(&self) -> ArrayIndices {
        self.axes.iter().map(|axis| axis.start).collect()
    }

    /// Return the block count of each axis.
    #[must_use]
    pub fn count(&self) -> ArrayShape {
        self.axes.iter().map(|axis| axis.count).collect()
    }

    /// Return the stride of each axis.
    #[must_use]
    pub fn stride(&self) -> ArrayShape {
        self.axes.iter().map(|axis| axis.stride).collect()
    }

    /// Return the block size of each axis.
    #[must_use]
    pub fn block(&self) -> ArrayShape {
        self.axes.iter().map(|axis| axis.block).collect()
    }
}

impl core::fmt::Display for Selection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}]", self.axes.iter().join(", "))
    }
}

/// Return the row-major radices of `shape`.
///
/// The radix of the last axis is 1 and the radix of every other axis is the product of the lengths of the axes after it.
#[must_use]
pub fn row_major_radices(shape: &[u64]) -> ArrayShape {
    let mut radices = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        radices[axis] = radices[axis + 1] * shape[axis + 1];
    }
    radices
}

/// Decompose a linearised `index` into per-axis indices using row-major `radices`.
#[must_use]
pub fn unravel_index(index: u64, radices: &[u64]) -> ArrayIndices {
    let mut remainder = index;
    radices
        .iter()
        .map(|&radix| {
            let (quotient, rest) = Integer::div_rem(&remainder, &radix);
            remainder = rest;
            quotient
        })
        .collect()
}

use num::Integer;
use serde::{Deserialize, Serialize};

use super::SelectionError;

/// A requested strided block selection along one axis.
///
/// Each component is optional and takes a default when resolved against an axis with [`Hyperslab::resolve`]:
///  - `start`: `0`,
///  - `stride`: `1`,
///  - `block`: `1`, and
///  - `count`: `(axis_length - 1) / block` (rounded down).
///
/// The following examples use an axis of 11 elements, with selected elements marked `s`.
/// ```text
/// start 0, count 3, stride 4, block 2
/// s s _ _ s s _ _ s s _
/// ```
/// ```text
/// start 2, count 2, stride 3, block 1
/// _ _ s _ _ s _ _ _ _ _
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hyperslab {
    start: Option<i64>,
    count: Option<i64>,
    stride: Option<i64>,
    block: Option<i64>,
}

/// A resolved selection along one axis.
///
/// Selects `count` blocks of `block` elements, with the first block at `start` and subsequent blocks `stride` elements apart.
/// A `scalar` axis was selected with an integer index and is dropped from the logical shape of a [`Selection`](super::Selection).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisSlab {
    /// The first selected element.
    pub start: u64,
    /// The number of blocks.
    pub count: u64,
    /// The distance between the starts of consecutive blocks.
    pub stride: u64,
    /// The number of elements in each block.
    pub block: u64,
    /// Whether the axis was selected with an integer index.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub scalar: bool,
}

impl Hyperslab {
    /// Create a new hyperslab request with every component unspecified.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: None,
            count: None,
            stride: None,
            block: None,
        }
    }

    /// Set the start.
    #[must_use]
    pub const fn with_start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the number of blocks.
    #[must_use]
    pub const fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    /// Set the stride.
    #[must_use]
    pub const fn with_stride(mut self, stride: i64) -> Self {
        self.stride = Some(stride);
        self
    }

    /// Set the block size.
    #[must_use]
    pub const fn with_block(mut self, block: i64) -> Self {
        self.block = Some(block);
        self
    }

    /// Resolve the hyperslab against an axis of length `axis_length`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidSelection`] if
    ///  - any component is negative, or the stride or block is zero,
    ///  - the block is larger than the stride, so consecutive blocks would overlap, or
    ///  - the hyperslab does not fit within the axis.
    pub fn resolve(&self, axis_length: u64) -> Result<AxisSlab, SelectionError> {
        let length = i128::from(axis_length);
        let start = i128::from(self.start.unwrap_or(0));
        let stride = i128::from(self.stride.unwrap_or(1));
        let block = i128::from(self.block.unwrap_or(1));
        if start < 0 || stride < 0 || block < 0 || self.count.is_some_and(|count| count < 0) {
            return Err(SelectionError::InvalidSelection(format!(
                "hyperslab {self:?} has a negative component"
            )));
        }
        if stride == 0 || block == 0 {
            return Err(SelectionError::InvalidSelection(format!(
                "hyperslab {self:?} has a zero stride or block"
            )));
        }
        if block > stride {
            return Err(SelectionError::InvalidSelection(format!(
                "hyperslab block {block} is larger than stride {stride}"
            )));
        }
        let count = match self.count {
            Some(count) => i128::from(count),
            None => Integer::div_floor(&(length - 1), &block),
        };
        if count < 0 {
            return Err(SelectionError::InvalidSelection(format!(
                "hyperslab {self:?} selects nothing from an axis of length {axis_length}"
            )));
        }

        let end = start + block + (count - 1) * (stride - 1) - 1;
        if end >= length {
            return Err(SelectionError::InvalidSelection(format!(
                "hyperslab {self:?} ends at {end}, beyond an axis of length {axis_length}"
            )));
        }

        let to_u64 = |value: i128| {
            u64::try_from(value).map_err(|_| {
                SelectionError::InvalidSelection(format!("hyperslab component {value} out of range"))
            })
        };
        Ok(AxisSlab {
            start: to_u64(start)?,
            count: to_u64(count)?,
            stride: to_u64(stride)?,
            block: to_u64(block)?,
            scalar: false,
        })
    }
}

impl AxisSlab {
    /// Create a contiguous run of `count` elements starting at `start`.
    #[must_use]
    pub const fn contiguous(start: u64, count: u64) -> Self {
        Self {
            start,
            count,
            stride: 1,
            block: 1,
            scalar: false,
        }
    }

    /// Create a scalar selection of the element at `index`.
    #[must_use]
    pub const fn index(index: u64) -> Self {
        Self {
            start: index,
            count: 1,
            stride: 1,
            block: 1,
            scalar: true,
        }
    }

    /// Return the number of selected elements along the axis.
    #[must_use]
    pub const fn num_elements(&self) -> u64 {
        self.count * self.block
    }

    /// Returns an iterator over the selected indices along the axis in increasing order.
    pub fn iter_indices(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.count).flat_map(move |i| {
            let block_start = self.start + i * self.stride;
            block_start..block_start + self.block
        })
    }
}

impl core::fmt::Display for AxisSlab {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.scalar {
            write!(f, "{}", self.start)
        } else if self.block == 1 {
            let stop = match self.count {
                0 => self.start,
                count => self.start + (count - 1) * self.stride + 1,
            };
            write!(f, "{}:{}", self.start, stop)?;
            if self.stride != 1 {
                write!(f, ":{}", self.stride)?;
            }
            Ok(())
        } else {
            write!(
                f,
                "{}+{};{}(Bx{})",
                self.start, self.count, self.stride, self.block
            )
        }
    }
}

use crate::{
    fill_value::FillValue,
    generator::VdsError,
    selection::{row_major_radices, unravel_index, AxisSelector},
    source_meta::SourceMeta,
    virtual_dataset::{VirtualLayout, VirtualSource},
};

use super::{checked_product, DimensionError, Geometry};

/// Reshape the frame axes of a source.
///
/// Frames are laid out in row-major order over `new_shape`.
/// With alternation, axis `a > 0` flagged in `alternate` is traversed in reverse on every odd pass of axis `a - 1`,
/// as in a snake scan. The first axis is never reversed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reshape {
    new_shape: Vec<u64>,
    alternate: Option<Vec<bool>>,
}

impl Reshape {
    /// Create a new reshape into `new_shape`.
    ///
    /// # Errors
    /// Returns [`DimensionError::EmptyShape`] if `new_shape` is empty,
    /// [`DimensionError::ZeroLengthAxis`] if an axis has zero length,
    /// or [`DimensionError::Overflow`] if the number of frames does not fit in a `u64`.
    pub fn new(new_shape: Vec<u64>) -> Result<Self, DimensionError> {
        if new_shape.is_empty() {
            return Err(DimensionError::EmptyShape);
        }
        if new_shape.contains(&0) {
            return Err(DimensionError::ZeroLengthAxis(new_shape));
        }
        checked_product(&new_shape)?;
        Ok(Self {
            new_shape,
            alternate: None,
        })
    }

    /// Set the axes to alternate.
    ///
    /// # Errors
    /// Returns [`DimensionError::AlternateLength`] if `alternate` does not have one entry per axis of the new shape.
    pub fn with_alternate(mut self, alternate: Vec<bool>) -> Result<Self, DimensionError> {
        if alternate.len() == self.new_shape.len() {
            self.alternate = Some(alternate);
            Ok(self)
        } else {
            Err(DimensionError::AlternateLength {
                alternate,
                new_shape: self.new_shape,
            })
        }
    }

    /// Return the new shape.
    #[must_use]
    pub fn new_shape(&self) -> &[u64] {
        &self.new_shape
    }

    /// Return the alternated axes, excluding the first axis which is never alternated.
    fn alternated_axes(&self) -> Vec<usize> {
        self.alternate.as_ref().map_or_else(Vec::new, |alternate| {
            alternate
                .iter()
                .enumerate()
                .skip(1)
                .filter_map(|(axis, &alternate)| alternate.then_some(axis))
                .collect()
        })
    }

    /// Return the coordinates in the new shape of the frame at `index`.
    #[must_use]
    pub fn frame_coordinates(&self, index: u64) -> Vec<u64> {
        let radices = row_major_radices(&self.new_shape);
        self.coordinates(index, &radices, &self.alternated_axes())
    }

    fn coordinates(&self, index: u64, radices: &[u64], alternated_axes: &[usize]) -> Vec<u64> {
        let mut coordinates = unravel_index(index, radices);
        for &axis in alternated_axes {
            let cycle = index / radices[axis - 1];
            if cycle % 2 == 1 {
                coordinates[axis] = self.new_shape[axis] - 1 - coordinates[axis];
            }
        }
        coordinates
    }
}

impl Geometry for Reshape {
    fn name(&self) -> &'static str {
        "reshape"
    }

    fn max_sources(&self) -> Option<usize> {
        Some(1)
    }

    fn build_layout(
        &self,
        sources: &[VirtualSource],
        meta: &SourceMeta,
        fill_value: FillValue,
    ) -> Result<VirtualLayout, VdsError> {
        self.validate_num_sources(sources.len())?;
        let source = &sources[0];
        let num_frames = checked_product(meta.frames())?;
        if checked_product(&self.new_shape)? != num_frames {
            return Err(DimensionError::ShapeMismatch {
                frames: num_frames,
                new_shape: self.new_shape.clone(),
            }
            .into());
        }

        let target_shape = self
            .new_shape
            .iter()
            .copied()
            .chain([meta.height(), meta.width()])
            .collect();
        let mut layout = VirtualLayout::new(target_shape, meta.data_type(), fill_value);

        let alternated_axes = self.alternated_axes();
        if alternated_axes.is_empty() {
            layout.assign(&[], source.select_all())?;
            return Ok(layout);
        }

        let radices = row_major_radices(&self.new_shape);
        let source_radices = row_major_radices(meta.frames());
        let indices = |coordinates: Vec<u64>| -> Vec<AxisSelector> {
            coordinates.into_iter().map(AxisSelector::index).collect()
        };
        for index in 0..num_frames {
            let region = source.select(&indices(unravel_index(index, &source_radices)))?;
            let target = indices(self.coordinates(index, &radices, &alternated_axes));
            layout.assign(&target, region)?;
        }
        Ok(layout)
    }
}

use crate::{
    fill_value::FillValue,
    generator::VdsError,
    selection::AxisSelector,
    source_meta::SourceMeta,
    virtual_dataset::{VirtualLayout, VirtualSource},
};

use super::{gapped_extent, gapped_offsets, trim_final_spacing, DimensionError, Geometry};

/// The maximum number of chunks the frame axis is split into.
const MAX_FRAME_CHUNKS: u64 = 10;

/// Re-insert the gaps between the chips of a tiled sensor.
///
/// The source holds a `grid_y` by `grid_x` grid of `sub_height` by `sub_width` chips packed without gaps.
/// In the virtual dataset, chip column `i` is followed by `x_spacing[i]` columns and chip row `j` by `y_spacing[j]` rows.
///
/// The first axis of the source is split into at most 10 chunks of frames,
/// and each chunk of each chip is mapped separately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GapFill {
    sub_width: u64,
    sub_height: u64,
    grid_x: u64,
    grid_y: u64,
    x_spacing: Vec<u64>,
    y_spacing: Vec<u64>,
    target_frame_shape: [u64; 2],
}

impl GapFill {
    /// Create a new gap fill.
    ///
    /// A non-zero final entry of `x_spacing` or `y_spacing` is replaced with zero.
    ///
    /// # Errors
    /// Returns
    ///  - [`DimensionError::EmptyGrid`] if any of the grid or chip dimensions are zero, or
    ///  - [`DimensionError::SpacingLength`] if `x_spacing` or `y_spacing` does not have one entry per chip column or row, or
    ///  - [`DimensionError::Overflow`] if the height or width of a frame of the virtual dataset does not fit in a `u64`.
    pub fn new(
        sub_width: u64,
        sub_height: u64,
        grid_x: u64,
        grid_y: u64,
        x_spacing: Vec<u64>,
        y_spacing: Vec<u64>,
    ) -> Result<Self, DimensionError> {
        if sub_width == 0 || sub_height == 0 || grid_x == 0 || grid_y == 0 {
            return Err(DimensionError::EmptyGrid {
                grid_y,
                grid_x,
                sub_height,
                sub_width,
            });
        }
        for (axis, spacing, expected) in [('x', &x_spacing, grid_x), ('y', &y_spacing, grid_y)] {
            if spacing.len() as u64 != expected {
                return Err(DimensionError::SpacingLength {
                    axis,
                    spacing: spacing.clone(),
                    expected,
                });
            }
        }
        let x_spacing = trim_final_spacing(x_spacing, 'x');
        let y_spacing = trim_final_spacing(y_spacing, 'y');
        let target_frame_shape = [
            gapped_extent(sub_height, grid_y, &y_spacing)?,
            gapped_extent(sub_width, grid_x, &x_spacing)?,
        ];
        Ok(Self {
            sub_width,
            sub_height,
            grid_x,
            grid_y,
            x_spacing,
            y_spacing,
            target_frame_shape,
        })
    }

    /// Return the spacing after each chip column.
    #[must_use]
    pub fn x_spacing(&self) -> &[u64] {
        &self.x_spacing
    }

    /// Return the spacing after each chip row.
    #[must_use]
    pub fn y_spacing(&self) -> &[u64] {
        &self.y_spacing
    }

    /// Return the height and width of a frame of the virtual dataset.
    #[must_use]
    pub fn target_frame_shape(&self) -> [u64; 2] {
        self.target_frame_shape
    }

    fn chip_grid_error(&self, meta: &SourceMeta) -> DimensionError {
        DimensionError::ChipGrid {
            height: meta.height(),
            width: meta.width(),
            grid_y: self.grid_y,
            grid_x: self.grid_x,
            sub_height: self.sub_height,
            sub_width: self.sub_width,
        }
    }
}

impl Geometry for GapFill {
    fn name(&self) -> &'static str {
        "gap fill"
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
        let Some((&num_frames, inner_frames)) = meta.frames().split_first() else {
            return Err(DimensionError::MissingFrameAxis.into());
        };
        if meta.height() != self.grid_y * self.sub_height
            || meta.width() != self.grid_x * self.sub_width
        {
            return Err(self.chip_grid_error(meta).into());
        }

        let target_shape = meta
            .frames()
            .iter()
            .copied()
            .chain(self.target_frame_shape())
            .collect();
        let mut layout = VirtualLayout::new(target_shape, meta.data_type(), fill_value);

        let y_offsets = gapped_offsets(self.sub_height, &self.y_spacing);
        let x_offsets = gapped_offsets(self.sub_width, &self.x_spacing);
        let chunk = std::cmp::max(num_frames / MAX_FRAME_CHUNKS, 1);
        let mut frame = 0;
        while frame < num_frames {
            let frames =
                AxisSelector::range(frame, std::cmp::min(frame.saturating_add(chunk), num_frames));
            for (row, &y) in (0..self.grid_y).zip(&y_offsets) {
                for (column, &x) in (0..self.grid_x).zip(&x_offsets) {
                    let axes = |y: u64, x: u64| {
                        std::iter::once(frames.clone())
                            .chain(inner_frames.iter().map(|_| AxisSelector::Full))
                            .chain([
                                AxisSelector::range(y, y + self.sub_height),
                                AxisSelector::range(x, x + self.sub_width),
                            ])
                            .collect::<Vec<_>>()
                    };
                    let region = source.select(&axes(row * self.sub_height, column * self.sub_width))?;
                    layout.assign(&axes(y, x), region)?;
                }
            }
            frame = frame.saturating_add(chunk);
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data_type::DataType, node::NodePath};

    fn source(shape: &[u64]) -> (Vec<VirtualSource>, SourceMeta) {
        let (frames, frame) = shape.split_at(shape.len() - 2);
        (
            vec![VirtualSource::new(
                "tiles.h5",
                NodePath::default(),
                shape.to_vec(),
                DataType::Int32,
            )],
            SourceMeta::new(frames.to_vec(), frame[0], frame[1], DataType::Int32),
        )
    }

    #[test]
    fn gap_fill_2x2() {
        let geometry = GapFill::new(2, 2, 2, 2, vec![1, 0], vec![1, 0]).unwrap();
        assert_eq!(geometry.target_frame_shape(), [5, 5]);
        let (sources, meta) = source(&[3, 4, 4]);
        let layout = geometry
            .build_layout(&sources, &meta, FillValue::default())
            .unwrap();
        assert_eq!(layout.shape(), &[3, 5, 5]);
        // 3 frames in chunks of 1, 4 chips per frame
        assert_eq!(layout.mappings().len(), 12);
        let chips: Vec<(Vec<u64>, Vec<u64>)> = layout.mappings()[..4]
            .iter()
            .map(|mapping| (mapping.source.start(), mapping.target.start()))
            .collect();
        assert_eq!(
            chips,
            vec![
                (vec![0, 0, 0], vec![0, 0, 0]),
                (vec![0, 0, 2], vec![0, 0, 3]),
                (vec![0, 2, 0], vec![0, 3, 0]),
                (vec![0, 2, 2], vec![0, 3, 3]),
            ]
        );
        assert!(layout
            .mappings()
            .iter()
            .all(|mapping| mapping.target.count() == vec![1, 2, 2]));
    }

    #[test]
    fn gap_fill_frame_chunks() {
        let geometry = GapFill::new(2, 2, 2, 2, vec![1, 0], vec![1, 0]).unwrap();
        let (sources, meta) = source(&[25, 4, 4]);
        let layout = geometry
            .build_layout(&sources, &meta, FillValue::default())
            .unwrap();
        // chunks of 2 frames: ceil(25 / 2) = 13
        assert_eq!(layout.mappings().len(), 13 * 4);
        let last = layout.mappings().last().unwrap();
        assert_eq!(last.target.start(), vec![24, 3, 3]);
        assert_eq!(last.target.count(), vec![1, 2, 2]);
        let covered: u64 = layout
            .mappings()
            .iter()
            .map(|mapping| mapping.target.num_elements())
            .sum();
        assert_eq!(covered, 25 * 4 * 4);
    }

    #[test]
    fn gap_fill_inner_frame_axes() {
        let geometry = GapFill::new(3, 2, 1, 2, vec![0], vec![4, 0]).unwrap();
        let (sources, meta) = source(&[4, 2, 4, 3]);
        let layout = geometry
            .build_layout(&sources, &meta, FillValue::default())
            .unwrap();
        assert_eq!(layout.shape(), &[4, 2, 8, 3]);
        assert_eq!(layout.mappings().len(), 4 * 2);
        assert_eq!(layout.mappings()[1].target.start(), vec![0, 0, 6, 0]);
        assert_eq!(layout.mappings()[1].target.count(), vec![1, 2, 2, 3]);
    }

    #[test]
    fn gap_fill_final_spacing_ignored() {
        let geometry = GapFill::new(2, 2, 2, 2, vec![1, 7], vec![1, 7]).unwrap();
        assert_eq!(geometry.x_spacing(), &[1, 0]);
        assert_eq!(geometry.y_spacing(), &[1, 0]);
        assert_eq!(geometry.target_frame_shape(), [5, 5]);
    }

    #[test]
    fn gap_fill_idempotent() {
        let geometry = GapFill::new(2, 2, 2, 2, vec![1, 0], vec![1, 0]).unwrap();
        let (sources, meta) = source(&[25, 4, 4]);
        let first = geometry
            .build_layout(&sources, &meta, FillValue::default())
            .unwrap();
        let second = geometry
            .build_layout(&sources, &meta, FillValue::default())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn gap_fill_overflow() {
        assert_eq!(
            GapFill::new(2, u64::MAX / 2, 1, 2, vec![0], vec![2, 0]),
            Err(DimensionError::Overflow)
        );
        assert_eq!(
            GapFill::new(u64::MAX, 2, 2, 1, vec![0, 0], vec![0]),
            Err(DimensionError::Overflow)
        );
        assert_eq!(
            GapFill::new(u64::MAX - 1, 2, 1, 1, vec![1], vec![0])
                .unwrap()
                .target_frame_shape(),
            [2, u64::MAX - 1]
        );
    }

    #[test]
    fn gap_fill_invalid() {
        assert!(matches!(
            GapFill::new(2, 2, 2, 2, vec![1], vec![1, 0]),
            Err(DimensionError::SpacingLength { axis: 'x', .. })
        ));
        assert!(matches!(
            GapFill::new(2, 2, 2, 2, vec![1, 0], vec![1, 0, 0]),
            Err(DimensionError::SpacingLength { axis: 'y', .. })
        ));
        assert!(matches!(
            GapFill::new(2, 0, 2, 2, vec![1, 0], vec![1, 0]),
            Err(DimensionError::EmptyGrid { .. })
        ));

        let geometry = GapFill::new(2, 2, 2, 2, vec![1, 0], vec![1, 0]).unwrap();
        let (sources, meta) = source(&[3, 4, 5]);
        assert!(matches!(
            geometry.build_layout(&sources, &meta, FillValue::default()),
            Err(VdsError::Dimension(DimensionError::ChipGrid { .. }))
        ));
        let (sources, meta) = source(&[4, 4]);
        assert!(matches!(
            geometry.build_layout(&sources, &meta, FillValue::default()),
            Err(VdsError::Dimension(DimensionError::MissingFrameAxis))
        ));
        let (mut sources, meta) = source(&[3, 4, 4]);
        sources.push(sources[0].clone());
        assert!(matches!(
            geometry.build_layout(&sources, &meta, FillValue::default()),
            Err(VdsError::Dimension(DimensionError::TooManySources { .. }))
        ));
    }
}

use crate::{
    fill_value::FillValue,
    generator::VdsError,
    source_meta::SourceMeta,
    virtual_dataset::{VirtualLayout, VirtualSource},
};

use super::{alternating_spacing, DimensionError, GapFill, Geometry};

/// The width and height of an Excalibur chip.
pub const EXCALIBUR_CHIP_SIZE: u64 = 256;

/// The number of chip columns of an Excalibur detector.
pub const EXCALIBUR_CHIP_COLUMNS: u64 = 8;

/// A [`GapFill`] for an Excalibur detector with 1 or 3 modules.
///
/// Each module is 2 rows of 8 chips of 256x256 pixels.
/// Chip columns are separated by `chip_spacing`, and chip rows alternate between `chip_spacing` (within a module) and `module_spacing` (between modules).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExcaliburGapFill {
    modules: u64,
    gap_fill: GapFill,
}

impl ExcaliburGapFill {
    /// Create a new Excalibur gap fill.
    ///
    /// # Errors
    /// Returns [`DimensionError::UnsupportedModuleCount`] if `modules` is not 1 or 3.
    pub fn new(modules: u64, chip_spacing: u64, module_spacing: u64) -> Result<Self, DimensionError> {
        let grid_y = match modules {
            1 => 2,
            3 => 6,
            _ => return Err(DimensionError::UnsupportedModuleCount(modules)),
        };
        let x_spacing = alternating_spacing(EXCALIBUR_CHIP_COLUMNS, chip_spacing, chip_spacing);
        let y_spacing = alternating_spacing(grid_y, chip_spacing, module_spacing);
        let gap_fill = GapFill::new(
            EXCALIBUR_CHIP_SIZE,
            EXCALIBUR_CHIP_SIZE,
            EXCALIBUR_CHIP_COLUMNS,
            grid_y,
            x_spacing,
            y_spacing,
        )?;
        Ok(Self { modules, gap_fill })
    }

    /// Return the number of modules.
    #[must_use]
    pub fn modules(&self) -> u64 {
        self.modules
    }

    /// Return the underlying gap fill.
    #[must_use]
    pub fn gap_fill(&self) -> &GapFill {
        &self.gap_fill
    }
}

impl Geometry for ExcaliburGapFill {
    fn name(&self) -> &'static str {
        "excalibur gap fill"
    }

    fn max_sources(&self) -> Option<usize> {
        self.gap_fill.max_sources()
    }

    fn build_layout(
        &self,
        sources: &[VirtualSource],
        meta: &SourceMeta,
        fill_value: FillValue,
    ) -> Result<VirtualLayout, VdsError> {
        self.validate_num_sources(sources.len())?;
        self.gap_fill.build_layout(sources, meta, fill_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data_type::DataType, node::NodePath};

    #[test]
    fn excalibur_spacing() {
        let geometry = ExcaliburGapFill::new(3, 3, 123).unwrap();
        assert_eq!(geometry.gap_fill().x_spacing(), &[3, 3, 3, 3, 3, 3, 3, 0]);
        assert_eq!(geometry.gap_fill().y_spacing(), &[3, 123, 3, 123, 3, 0]);
        assert_eq!(geometry.gap_fill().target_frame_shape(), [1791, 2069]);

        let geometry = ExcaliburGapFill::new(1, 3, 123).unwrap();
        assert_eq!(geometry.gap_fill().y_spacing(), &[3, 0]);
        assert_eq!(geometry.gap_fill().target_frame_shape(), [515, 2069]);
    }

    #[test]
    fn excalibur_unsupported_modules() {
        for modules in [0, 2, 4] {
            assert_eq!(
                ExcaliburGapFill::new(modules, 3, 123),
                Err(DimensionError::UnsupportedModuleCount(modules))
            );
        }
    }

    #[test]
    fn excalibur_3_modules() {
        let geometry = ExcaliburGapFill::new(3, 3, 123).unwrap();
        let source = VirtualSource::new(
            "excalibur.h5",
            NodePath::default(),
            vec![100, 1536, 2048],
            DataType::UInt16,
        );
        let meta = SourceMeta::new(vec![100], 1536, 2048, DataType::UInt16);
        let layout = geometry
            .build_layout(&[source], &meta, FillValue::default())
            .unwrap();
        assert_eq!(layout.shape(), &[100, 1791, 2069]);
        assert_eq!(layout.mappings().len(), 10 * 6 * 8);
        let last = layout.mappings().last().unwrap();
        assert_eq!(last.source.start(), vec![90, 1280, 1792]);
        assert_eq!(last.target.start(), vec![90, 1535, 1813]);
        assert_eq!(last.target.count(), vec![10, 256, 256]);
    }
}

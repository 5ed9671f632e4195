use crate::{
    fill_value::FillValue,
    generator::VdsError,
    selection::AxisSelector,
    source_meta::SourceMeta,
    virtual_dataset::{VirtualLayout, VirtualSource},
};

use super::{alternating_spacing, gapped_extent, gapped_offsets, Geometry};

/// Stack sources holding horizontal stripes of a frame into one taller frame.
///
/// Stripe `i` is followed by `stripe_spacing` rows if `i` is even, or `module_spacing` rows if `i` is odd.
/// There is no spacing after the final stripe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripeAssembly {
    stripe_spacing: u64,
    module_spacing: u64,
}

impl StripeAssembly {
    /// Create a new stripe assembly.
    #[must_use]
    pub fn new(stripe_spacing: u64, module_spacing: u64) -> Self {
        Self {
            stripe_spacing,
            module_spacing,
        }
    }

    /// Return the spacing after each of `num_stripes` stripes.
    #[must_use]
    pub fn spacing(&self, num_stripes: usize) -> Vec<u64> {
        alternating_spacing(
            num_stripes as u64,
            self.stripe_spacing,
            self.module_spacing,
        )
    }
}

impl Geometry for StripeAssembly {
    fn name(&self) -> &'static str {
        "stripe assembly"
    }

    fn build_layout(
        &self,
        sources: &[VirtualSource],
        meta: &SourceMeta,
        fill_value: FillValue,
    ) -> Result<VirtualLayout, VdsError> {
        self.validate_num_sources(sources.len())?;

        let spacing = self.spacing(sources.len());
        let height = meta.height();
        let target_height = gapped_extent(height, sources.len() as u64, &spacing)?;
        let target_shape = meta
            .frames()
            .iter()
            .copied()
            .chain([target_height, meta.width()])
            .collect();
        let mut layout = VirtualLayout::new(target_shape, meta.data_type(), fill_value);

        let frames = vec![AxisSelector::Full; meta.frames().len()];
        for (source, y) in std::iter::zip(sources, gapped_offsets(height, &spacing)) {
            let mut selectors = frames.clone();
            selectors.push(AxisSelector::range(y, y + height));
            layout.assign(&selectors, source.select_all())?;
        }
        Ok(layout)
    }
}

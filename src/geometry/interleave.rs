use crate::{
    fill_value::FillValue,
    generator::VdsError,
    selection::AxisSelector,
    source_meta::{FrameAggregation, SourceMeta},
    virtual_dataset::{VirtualLayout, VirtualSource},
};

use super::{checked_product, DimensionError, Geometry};

/// Merge the frames of multiple sources into one timeline in round robin blocks.
///
/// Source `i` of `N` contributes its full blocks of `block_size` frames to target frames
/// `i*block_size + k*N*block_size ..` for each block `k`.
/// Frames that do not fill a final block follow the round robin region, in source order.
///
/// The number of full blocks of each source must be non-increasing in source order and differ by at most one,
/// so that every target frame is backed by exactly one source frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interleave {
    block_size: u64,
}

impl Interleave {
    /// Create a new interleave with blocks of `block_size` frames.
    ///
    /// # Errors
    /// Returns [`DimensionError::ZeroBlockSize`] if `block_size` is zero.
    pub fn new(block_size: u64) -> Result<Self, DimensionError> {
        if block_size == 0 {
            Err(DimensionError::ZeroBlockSize)
        } else {
            Ok(Self { block_size })
        }
    }

    /// Return the block size.
    #[must_use]
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    fn validate_round_robin(&self, frames: &[u64]) -> Result<(), DimensionError> {
        let blocks: Vec<u64> = frames.iter().map(|n| n / self.block_size).collect();
        let non_increasing = blocks.windows(2).all(|pair| pair[0] >= pair[1]);
        let balanced = match (blocks.first(), blocks.last()) {
            (Some(first), Some(last)) => first.abs_diff(*last) <= 1,
            _ => true,
        };
        if non_increasing && balanced {
            Ok(())
        } else {
            Err(DimensionError::NonRoundRobin {
                frames: frames.to_vec(),
                block_size: self.block_size,
            })
        }
    }
}

impl Geometry for Interleave {
    fn name(&self) -> &'static str {
        "interleave"
    }

    fn frame_aggregation(&self) -> FrameAggregation {
        FrameAggregation::PerFile
    }

    fn build_layout(
        &self,
        sources: &[VirtualSource],
        meta: &SourceMeta,
        fill_value: FillValue,
    ) -> Result<VirtualLayout, VdsError> {
        self.validate_num_sources(sources.len())?;
        let frames = meta.frames();
        if frames.len() != sources.len() {
            return Err(DimensionError::EmptySourceFrames {
                frames: frames.to_vec(),
                files: sources.len(),
            }
            .into());
        }
        self.validate_round_robin(frames)?;

        let block_size = self.block_size;
        let num_sources = sources.len() as u64;
        let total_frames = frames
            .iter()
            .try_fold(0u64, |total, &n| total.checked_add(n))
            .ok_or(DimensionError::Overflow)?;
        let stride = checked_product(&[num_sources, block_size])?;
        let mut layout = VirtualLayout::new(
            vec![total_frames, meta.height(), meta.width()],
            meta.data_type(),
            fill_value,
        );

        let mut remainder_start: u64 = frames.iter().map(|n| n / block_size * block_size).sum();
        for ((i, source), &num_frames) in sources.iter().enumerate().zip(frames) {
            let blocks = num_frames / block_size;
            let interleaved_frames = blocks * block_size;
            if blocks > 0 {
                let target = AxisSelector::strided_blocks(
                    i as u64 * block_size,
                    blocks,
                    stride,
                    block_size,
                );
                let region = source.select(&[AxisSelector::range(0, interleaved_frames)])?;
                layout.assign(&[target], region)?;
            }
            let remainder = num_frames - interleaved_frames;
            if remainder > 0 {
                let target = AxisSelector::range(remainder_start, remainder_start + remainder);
                let region = source.select(&[AxisSelector::range(interleaved_frames, num_frames)])?;
                layout.assign(&[target], region)?;
                remainder_start += remainder;
            }
        }
        Ok(layout)
    }
}

//! Vertical stacker: deterministic placement along the stacking axis.

use duotype_types::Aabb;
use kernel_bridge::SolidHandle;
use tracing::debug;

use crate::kernel_ext::KernelBundle;
use crate::pair::PairSolid;
use crate::types::PipelineError;

/// A pair solid moved into its slot.
#[derive(Debug, Clone)]
pub struct PlacedPair {
    pub index: usize,
    pub handle: SolidHandle,
    /// Translation that was applied; pegs for this index reuse it verbatim.
    pub offset: [f64; 3],
    /// Bounding box after placement.
    pub bbox: Aabb,
}

/// All placed pairs plus the final high-water mark.
#[derive(Debug, Clone)]
pub struct StackedAssembly {
    pub placed: Vec<PlacedPair>,
    pub mark: f64,
}

/// Running placement state. The high-water mark starts at zero and never
/// decreases: a valid pair lands with its minimum y at mark (index 0) or
/// mark + spacing, and pushes the mark to its new maximum y; a skipped pair
/// advances the mark by 1.5 x spacing, a visibly wider gap in the print.
#[derive(Debug)]
pub struct Stacker {
    spacing: f64,
    mark: f64,
}

impl Stacker {
    pub fn new(spacing: f64) -> Self {
        Self { spacing, mark: 0.0 }
    }

    pub fn mark(&self) -> f64 {
        self.mark
    }

    /// Translate `pair` into its slot and advance the mark.
    pub fn place(
        &mut self,
        kb: &mut dyn KernelBundle,
        pair: PairSolid,
    ) -> Result<PlacedPair, PipelineError> {
        let gap = if pair.index == 0 { 0.0 } else { self.spacing };
        let target_min_y = self.mark + gap;
        let offset = [0.0, target_min_y - pair.bbox.min[1], 0.0];
        let handle = kb.translated(&pair.handle, offset)?;
        let bbox = pair.bbox.translated(offset);
        debug_assert!(bbox.max[1] >= self.mark, "placement went backwards");
        self.mark = bbox.max[1];
        debug!(index = pair.index, target_min_y, mark = self.mark, "pair placed");
        Ok(PlacedPair {
            index: pair.index,
            handle,
            offset,
            bbox,
        })
    }

    /// Advance past a skipped pair without adding geometry.
    pub fn skip(&mut self) {
        self.mark += 1.5 * self.spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_bridge::{Kernel, KernelIntrospect, MockKernel};

    fn unit_pair(kernel: &mut MockKernel, index: usize) -> PairSolid {
        let handle = kernel.cylinder(1.0, 2.0).unwrap();
        let bbox = kernel.bounding_box(&handle).unwrap();
        PairSolid {
            index,
            handle,
            bbox,
        }
    }

    #[test]
    fn first_pair_lands_at_zero() {
        let mut kernel = MockKernel::new();
        let mut stacker = Stacker::new(6.0);
        let pair = unit_pair(&mut kernel, 0);
        let placed = stacker.place(&mut kernel, pair).unwrap();
        assert!((placed.bbox.min[1]).abs() < 1e-12);
        assert!((stacker.mark() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn later_pairs_leave_one_spacing_gap() {
        let mut kernel = MockKernel::new();
        let mut stacker = Stacker::new(6.0);
        let first = unit_pair(&mut kernel, 0);
        let second = unit_pair(&mut kernel, 1);
        let p0 = stacker.place(&mut kernel, first).unwrap();
        let p1 = stacker.place(&mut kernel, second).unwrap();
        assert!((p1.bbox.min[1] - (p0.bbox.max[1] + 6.0)).abs() < 1e-12);
    }

    #[test]
    fn skip_advances_by_one_and_a_half_spacings() {
        let mut kernel = MockKernel::new();
        let mut stacker = Stacker::new(6.0);
        stacker.skip();
        assert!((stacker.mark() - 9.0).abs() < 1e-12);
        // The pair after a leading skip still gets its index > 0 gap.
        let pair = unit_pair(&mut kernel, 1);
        let placed = stacker.place(&mut kernel, pair).unwrap();
        assert!((placed.bbox.min[1] - 15.0).abs() < 1e-12);
    }

    #[test]
    fn placement_translation_is_reported() {
        let mut kernel = MockKernel::new();
        let mut stacker = Stacker::new(6.0);
        let handle = kernel.cylinder(1.0, 2.0).unwrap();
        let shifted = kernel.translated(&handle, [0.0, -5.0, 0.0]).unwrap();
        let bbox = kernel.bounding_box(&shifted).unwrap();
        let placed = stacker
            .place(
                &mut kernel,
                PairSolid {
                    index: 0,
                    handle: shifted,
                    bbox,
                },
            )
            .unwrap();
        // min y was -6, target 0, so the offset is +6 on y only.
        assert_eq!(placed.offset, [0.0, 6.0, 0.0]);
    }
}

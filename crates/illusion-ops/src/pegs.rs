//! Support peg inserter: cylinders under masked character positions.

use duotype_types::PegParams;
use kernel_bridge::SolidHandle;
use tracing::debug;

use crate::kernel_ext::KernelBundle;
use crate::stack::PlacedPair;
use crate::types::PipelineError;

/// Build one peg per active mask position that has a placed pair.
///
/// Each peg is a cylinder with its base circle at z = 0, translated by the
/// exact offset the pair at that index received, so it sits under the
/// character it supports. Skipped pairs never get a peg; mask positions past
/// the end of the mask are inactive.
pub fn build_pegs(
    kb: &mut dyn KernelBundle,
    params: &PegParams,
    placed: &[PlacedPair],
) -> Result<Vec<SolidHandle>, PipelineError> {
    let mut pegs = Vec::new();
    for pair in placed {
        if !params.mask.is_active(pair.index) {
            continue;
        }
        let peg = kb.cylinder(params.radius, params.height)?;
        let moved = kb.translated(&peg, pair.offset)?;
        debug!(index = pair.index, offset_y = pair.offset[1], "support peg added");
        pegs.push(moved);
    }
    Ok(pegs)
}

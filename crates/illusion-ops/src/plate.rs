//! Base plate builder: padded, corner-filleted slab below the assembly.

use duotype_types::{Aabb, BaseParams};
use kernel_bridge::{PlaneBasis, Profile, SolidHandle};
use tracing::info;

use crate::kernel_ext::KernelBundle;
use crate::stack::PlacedPair;
use crate::types::PipelineError;

/// The plate solid plus the fillet radius that was actually used.
#[derive(Debug, Clone)]
pub struct PlateSolid {
    pub handle: SolidHandle,
    pub bbox: Aabb,
    pub fillet_radius: f64,
}

/// Overall envelope of the placed pairs and pegs.
///
/// When every pair was skipped there is no geometry to measure; the envelope
/// degenerates to a line along the stacking axis up to the high-water mark,
/// so the plate still covers the length the skips consumed.
pub fn assembly_bounds(
    kb: &mut dyn KernelBundle,
    placed: &[PlacedPair],
    pegs: &[SolidHandle],
    mark: f64,
) -> Result<Aabb, PipelineError> {
    let mut bbox: Option<Aabb> = placed.iter().map(|p| p.bbox).reduce(|a, b| a.union(&b));
    for peg in pegs {
        let b = kb.bounding_box(peg)?;
        bbox = Some(match bbox {
            Some(acc) => acc.union(&b),
            None => b,
        });
    }
    Ok(bbox.unwrap_or_else(|| Aabb::new([0.0, 0.0, 0.0], [0.0, mark.max(0.0), 0.0])))
}

/// Corner radius for the plate: (assembly x-extent / 2) x fillet fraction,
/// never exceeding half the plate's shorter horizontal side. The fraction is
/// clamped to [0, 1] first, so an over-range slider value cannot ask the
/// kernel for an impossible fillet.
pub fn fillet_radius(
    assembly_x_extent: f64,
    plate_width: f64,
    plate_length: f64,
    fillet_frac: f64,
) -> f64 {
    let frac = fillet_frac.clamp(0.0, 1.0);
    let raw = assembly_x_extent / 2.0 * frac;
    raw.min(plate_width.min(plate_length) / 2.0).max(0.0)
}

/// Build the plate under `assembly_bbox`.
///
/// Footprint: assembly extents plus `padding` on all four horizontal sides,
/// centered on the stacking axis in x, starting at min y - padding in y.
/// The slab occupies z in [-height, 0]. The vertical-edge fillet comes from
/// extruding a rounded-rectangle profile, which yields the same solid as
/// filleting a box's vertical edges after the fact.
pub fn build_plate(
    kb: &mut dyn KernelBundle,
    assembly_bbox: &Aabb,
    base: &BaseParams,
) -> Result<PlateSolid, PipelineError> {
    let [x_extent, y_extent, _] = assembly_bbox.extents();
    let width = x_extent + 2.0 * base.padding;
    let length = y_extent + 2.0 * base.padding;
    let radius = fillet_radius(x_extent, width, length, base.fillet_frac);

    let profile = Profile::rounded_rect(width, length, radius);
    let plane = PlaneBasis::ground();
    let slab = kb.extrude_profile(&profile, &plane, plane.normal(), base.height)?;
    let handle = kb.translated(
        &slab,
        [
            -width / 2.0,
            assembly_bbox.min[1] - base.padding,
            -base.height,
        ],
    )?;
    let bbox = kb.bounding_box(&handle)?;
    info!(width, length, radius, "base plate built");
    Ok(PlateSolid {
        handle,
        bbox,
        fillet_radius: radius,
    })
}

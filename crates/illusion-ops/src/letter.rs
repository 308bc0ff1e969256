//! Glyph solid builder: one character → extruded, centered, rotated blank.

use duotype_types::Aabb;
use kernel_bridge::{GlyphOutliner, PlaneBasis, SolidHandle};
use tracing::debug;

use crate::kernel_ext::KernelBundle;
use crate::types::PipelineError;

/// Extruded, centered, rotated solid for one character.
#[derive(Debug, Clone)]
pub struct LetterBlank {
    pub ch: char,
    pub angle_deg: f64,
    pub font_size: f64,
    pub depth: f64,
    pub handle: SolidHandle,
    pub bbox: Aabb,
}

/// Build the blank for `ch`.
///
/// The outline stands upright in the XZ plane and extrudes along −Y to a
/// depth of twice the font size. It is then shifted so the reading direction
/// is centered on x = 0 and the extrusion is centered about y = 0 (the glyph
/// keeps its natural baseline at z = 0), and finally rotated about the
/// vertical axis by `angle_deg`.
pub fn build_letter(
    kb: &mut dyn KernelBundle,
    outliner: &dyn GlyphOutliner,
    ch: char,
    angle_deg: f64,
    font_size: f64,
) -> Result<LetterBlank, PipelineError> {
    let depth = 2.0 * font_size;
    let profile = outliner.outline(ch, font_size)?;
    let plane = PlaneBasis::upright();
    let solid = kb.extrude_profile(&profile, &plane, plane.normal(), depth)?;

    let bbox = kb.bounding_box(&solid)?;
    let x_shift = -(bbox.min[0] + bbox.max[0]) / 2.0;
    let centered = kb.translated(&solid, [x_shift, depth / 2.0, 0.0])?;
    let rotated = kb.rotated_z(&centered, angle_deg.to_radians())?;
    let bbox = kb.bounding_box(&rotated)?;
    debug!(ch = %ch, angle_deg, ?bbox, "letter blank built");

    Ok(LetterBlank {
        ch,
        angle_deg,
        font_size,
        depth,
        handle: rotated,
        bbox,
    })
}

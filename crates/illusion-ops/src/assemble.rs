//! Assembly finalizer: compound, recenter, tessellate.

use duotype_types::Aabb;
use kernel_bridge::{RenderMesh, SolidHandle};
use tracing::info;

use crate::kernel_ext::KernelBundle;
use crate::types::PipelineError;

/// The finished model, ready for export.
#[derive(Debug, Clone)]
pub struct FinalModel {
    pub handle: SolidHandle,
    pub bbox: Aabb,
    pub mesh: RenderMesh,
}

/// Chord tolerance for the preview/export mesh, relative to the letter size
/// so small and large prints tessellate to comparable quality.
pub fn mesh_tolerance(font_size: f64) -> f64 {
    (font_size * 0.005).max(1e-3)
}

/// Merge `parts` into one compound, center it on the stacking axis, and
/// tessellate.
///
/// `text_bbox` is the envelope of the letters and pegs before the plate was
/// added; shifting by half its y-extent puts the text run symmetric about
/// y = 0 while the plate keeps its padding overhang.
pub fn finalize(
    kb: &mut dyn KernelBundle,
    parts: &[SolidHandle],
    text_bbox: &Aabb,
    tolerance: f64,
) -> Result<FinalModel, PipelineError> {
    let compound = kb.compound(parts)?;
    let y_extent = text_bbox.extents()[1];
    let handle = kb.translated(&compound, [0.0, -y_extent / 2.0, 0.0])?;
    let bbox = kb.bounding_box(&handle)?;
    let mesh = kb.tessellate(&handle, tolerance)?;
    info!(
        parts = parts.len(),
        triangles = mesh.triangle_count(),
        "assembly finalized"
    );
    Ok(FinalModel { handle, bbox, mesh })
}

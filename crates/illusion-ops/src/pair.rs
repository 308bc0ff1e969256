//! Pair intersector: two oppositely rotated blanks → one dual-readable solid.

use duotype_types::Aabb;
use kernel_bridge::{GlyphError, GlyphOutliner, SolidHandle};
use tracing::warn;

use crate::kernel_ext::KernelBundle;
use crate::letter::build_letter;
use crate::types::PipelineError;

/// Viewing angle for text A.
pub const ANGLE_A_DEG: f64 = 45.0;
/// Viewing angle for text B.
pub const ANGLE_B_DEG: f64 = 135.0;

/// Intersection solid for one character pair.
#[derive(Debug, Clone)]
pub struct PairSolid {
    pub index: usize,
    pub handle: SolidHandle,
    pub bbox: Aabb,
}

/// Outcome of building one pair: geometry, or a spacing-only skip.
#[derive(Debug, Clone)]
pub enum PairOutcome {
    Built(PairSolid),
    Skipped { index: usize, reason: String },
}

/// Build the dual-readable solid for the characters at `index`.
///
/// Recoverable failures (a glyph the font cannot produce, an empty outline,
/// a boolean intersection with no volume) become `Skipped`, worth a widened
/// spacing gap downstream. Anything else propagates and fails the render,
/// so real bugs are not masked as unsupported characters.
pub fn build_pair(
    kb: &mut dyn KernelBundle,
    outliner: &dyn GlyphOutliner,
    index: usize,
    ch_a: char,
    ch_b: char,
    font_size: f64,
) -> Result<PairOutcome, PipelineError> {
    match intersect_pair(kb, outliner, index, ch_a, ch_b, font_size) {
        Ok(pair) => Ok(PairOutcome::Built(pair)),
        Err(e) if is_skippable(&e) => {
            warn!(index, ch_a = %ch_a, ch_b = %ch_b, reason = %e, "character pair skipped");
            Ok(PairOutcome::Skipped {
                index,
                reason: e.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}

fn intersect_pair(
    kb: &mut dyn KernelBundle,
    outliner: &dyn GlyphOutliner,
    index: usize,
    ch_a: char,
    ch_b: char,
    font_size: f64,
) -> Result<PairSolid, PipelineError> {
    let a = build_letter(kb, outliner, ch_a, ANGLE_A_DEG, font_size)?;
    let b = build_letter(kb, outliner, ch_b, ANGLE_B_DEG, font_size)?;
    let handle = kb.boolean_intersect(&a.handle, &b.handle)?;
    let bbox = kb.bounding_box(&handle)?;
    Ok(PairSolid {
        index,
        handle,
        bbox,
    })
}

fn is_skippable(e: &PipelineError) -> bool {
    match e {
        PipelineError::Font(g) => matches!(
            g,
            GlyphError::UnsupportedGlyph { .. } | GlyphError::EmptyOutline { .. }
        ),
        PipelineError::Kernel(k) => k.is_geometric(),
        _ => false,
    }
}

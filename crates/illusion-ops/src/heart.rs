//! Heart lamp body: a hollow heart shell lying on its side with a text run
//! fused in, top faces flush at z = 0.
//!
//! The outline is the classic one-line-two-arcs construction on a 5-unit
//! grid: from the tip at the origin, a straight edge to the upper lobe, an
//! arc out to the notch, and the mirror image below. The cavity reuses the
//! same contour scaled about the footprint center, so the wall follows the
//! outline shape without a second boolean pass.

use kernel_bridge::{Contour, GlyphError, GlyphOutliner, PathSeg, PlaneBasis, Profile, SolidHandle};
use tracing::{debug, warn};

use crate::assemble::FinalModel;
use crate::kernel_ext::KernelBundle;
use crate::types::PipelineError;

/// Dimensions of the lamp, all in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartParams {
    /// Height of one lobe half, i.e. 5x the construction grid unit.
    pub heart_height: f64,
    /// Wall thickness between the outline and the cavity.
    pub wall_thickness: f64,
    /// Extrusion depth of the shell.
    pub body_depth: f64,
    /// Em size of the text run.
    pub text_size: f64,
    /// Extrusion depth of the text run.
    pub text_depth: f64,
}

impl HeartParams {
    /// Lamp proportions tied to the request font size, so one slider scales
    /// the whole object: a 25x outline with a half-em wall, and text at 5x
    /// the em sunk half an em deep.
    pub fn from_font_size(font_size: f64) -> Self {
        Self {
            heart_height: 25.0 * font_size,
            wall_thickness: font_size / 2.0,
            body_depth: 0.75 * font_size,
            text_size: 5.0 * font_size,
            text_depth: font_size / 2.0,
        }
    }
}

/// Heart outline on its side: tip at the origin, notch at `[3.5f, 0]`,
/// mirror-symmetric about the x axis. `factor` is the grid unit
/// (`heart_height / 5`).
fn heart_contour(factor: f64) -> Contour {
    let f = factor;
    Contour {
        start: [0.0, 0.0],
        segs: vec![
            PathSeg::Line {
                to: [2.0 * f, 2.0 * f],
            },
            PathSeg::Arc {
                via: [4.0 * f, f],
                to: [3.5 * f, 0.0],
            },
            PathSeg::Arc {
                via: [4.0 * f, -f],
                to: [2.0 * f, -2.0 * f],
            },
            // Implicit close back to the tip.
        ],
    }
}

/// The same contour scaled by `s` about `center`.
fn scaled_about(contour: &Contour, center: [f64; 2], s: f64) -> Contour {
    let map = |p: [f64; 2]| {
        [
            center[0] + (p[0] - center[0]) * s,
            center[1] + (p[1] - center[1]) * s,
        ]
    };
    Contour {
        start: map(contour.start),
        segs: contour
            .segs
            .iter()
            .map(|seg| match *seg {
                PathSeg::Line { to } => PathSeg::Line { to: map(to) },
                PathSeg::Arc { via, to } => PathSeg::Arc {
                    via: map(via),
                    to: map(to),
                },
            })
            .collect(),
    }
}

/// Build the lamp: hollow shell plus the text run, compounded and meshed.
///
/// The shell occupies z in `[-body_depth, 0]`; the text run is rotated to
/// read along the symmetry axis, centered on the footprint, and ends flush
/// with the shell's top face. Characters the outliner cannot advance are
/// dropped from the run with a warning; spaces advance the pen without
/// adding geometry.
pub fn build_heart_lamp(
    kb: &mut dyn KernelBundle,
    outliner: &dyn GlyphOutliner,
    text: &str,
    params: &HeartParams,
    tolerance: f64,
) -> Result<FinalModel, PipelineError> {
    let factor = params.heart_height / 5.0;
    // The cavity is the outline shrunk about its center; the scale that
    // leaves `wall_thickness` of material is 1 - t / (2 * factor).
    let scale = 1.0 - params.wall_thickness / (2.0 * factor);
    if !(scale > 0.0 && scale < 1.0) {
        return Err(PipelineError::InvalidRequest {
            reason: format!(
                "wall thickness {} leaves no cavity in a heart of height {}",
                params.wall_thickness, params.heart_height
            ),
        });
    }

    let outer = heart_contour(factor);
    let (omin, omax) = outer.bounds();
    let center = [(omin[0] + omax[0]) / 2.0, (omin[1] + omax[1]) / 2.0];
    let inner = scaled_about(&outer, center, scale);
    let shell_profile = Profile::new(vec![outer, inner]);

    let plane = PlaneBasis::ground();
    let shell = kb.extrude_profile(&shell_profile, &plane, plane.normal(), params.body_depth)?;
    let shell = kb.translated(&shell, [0.0, 0.0, -params.body_depth])?;
    let shell_bbox = kb.bounding_box(&shell)?;
    debug!(factor, scale, "heart shell extruded");

    let mut parts = vec![shell];
    if let Some(run) = build_text_run(kb, outliner, text, params)? {
        let run_bbox = kb.bounding_box(&run)?;
        let target = shell_bbox.center();
        let run_center = run_bbox.center();
        // Centered on the footprint, top flush with the shell rim.
        let placed = kb.translated(
            &run,
            [
                target[0] - run_center[0],
                target[1] - run_center[1],
                -run_bbox.max[2],
            ],
        )?;
        parts.push(placed);
    }

    let handle = kb.compound(&parts)?;
    let bbox = kb.bounding_box(&handle)?;
    let mesh = kb.tessellate(&handle, tolerance)?;
    debug!(triangles = mesh.triangle_count(), "heart lamp meshed");
    Ok(FinalModel { handle, bbox, mesh })
}

/// Lay the text out along +x, compound it, and rotate it to read down the
/// heart's symmetry axis. `None` when no character produced geometry.
fn build_text_run(
    kb: &mut dyn KernelBundle,
    outliner: &dyn GlyphOutliner,
    text: &str,
    params: &HeartParams,
) -> Result<Option<SolidHandle>, PipelineError> {
    let plane = PlaneBasis::ground();
    let mut pen = 0.0;
    let mut parts: Vec<SolidHandle> = Vec::new();
    for ch in text.chars() {
        let advance = match outliner.advance(ch, params.text_size) {
            Ok(a) => a,
            Err(e) => {
                warn!(ch = %ch, reason = %e, "character dropped from the lamp text");
                continue;
            }
        };
        match outliner.outline(ch, params.text_size) {
            Ok(profile) => {
                let glyph = kb.extrude_profile(&profile, &plane, plane.normal(), params.text_depth)?;
                parts.push(kb.translated(&glyph, [pen, 0.0, 0.0])?);
            }
            // Space-like characters advance the pen without geometry.
            Err(GlyphError::EmptyOutline { .. }) | Err(GlyphError::UnsupportedGlyph { .. }) => {}
            Err(e) => return Err(e.into()),
        }
        pen += advance;
    }
    if parts.is_empty() {
        return Ok(None);
    }
    let run = kb.compound(&parts)?;
    let rotated = kb.rotated_z(&run, 270f64.to_radians())?;
    Ok(Some(rotated))
}

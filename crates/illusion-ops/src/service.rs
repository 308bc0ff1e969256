//! Render orchestration: validate, build, export, report.
//!
//! One `RenderService` owns the output directory and serializes renders
//! through a mutex; kernel work is CPU-bound and the output files have
//! fixed names, so concurrent renders would race on both. The kernel and
//! the outliner arrive per call: a request never sees handles or cached
//! state from an earlier one.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use duotype_types::{OutputFormat, RenderMode, RenderRequest, RenderWarning};
use file_export::{output_file_name, write_step, write_stl, ExportError, PREVIEW_FILE_NAME};
use kernel_bridge::{GlyphOutliner, KernelError, SolidHandle};
use tracing::{debug, info, warn};

use crate::assemble::{finalize, mesh_tolerance, FinalModel};
use crate::heart::{build_heart_lamp, HeartParams};
use crate::kernel_ext::KernelBundle;
use crate::pair::{build_pair, PairOutcome};
use crate::pegs::build_pegs;
use crate::plate::{assembly_bounds, build_plate};
use crate::stack::{StackedAssembly, Stacker};
use crate::types::{CancelToken, PairDisposition, PipelineError, RenderOutcome};

/// Stateless render front end bound to one output directory.
pub struct RenderService {
    workdir: PathBuf,
    in_flight: Mutex<()>,
}

impl RenderService {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            in_flight: Mutex::new(()),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run one request to completion: build the model, write the preview
    /// mesh and the named output file, and report what was placed.
    ///
    /// `cancel` is polled between character pairs; a cancelled render
    /// returns `PipelineError::Cancelled` without writing any file.
    pub fn render(
        &self,
        kb: &mut dyn KernelBundle,
        outliner: &dyn GlyphOutliner,
        request: &RenderRequest,
        cancel: &CancelToken,
    ) -> Result<RenderOutcome, PipelineError> {
        // A poisoned lock only means an earlier render panicked; the guard
        // payload is unit, so continuing is sound.
        let _guard = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        validate(request)?;
        let warnings = collect_warnings(request);
        for w in &warnings {
            warn!(warning = %w, "request accepted with warning");
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        debug!(mode = ?request.mode, stem = %request.output_stem, "render started");

        let (model, pairs) = match request.mode {
            RenderMode::DualText => render_dual_text(kb, outliner, request, cancel)?,
            RenderMode::HeartLamp => {
                let params = HeartParams::from_font_size(request.font_size);
                let model = build_heart_lamp(
                    kb,
                    outliner,
                    &request.text_a,
                    &params,
                    mesh_tolerance(request.font_size),
                )?;
                (model, Vec::new())
            }
        };

        let preview_path = self.workdir.join(PREVIEW_FILE_NAME);
        write_stl(&preview_path, &model.mesh)?;
        let output_path = self
            .workdir
            .join(output_file_name(&request.output_stem, request.format));
        match request.format {
            OutputFormat::Stl => write_stl(&output_path, &model.mesh)?,
            OutputFormat::Step => {
                let step_text = kb.export_step(&model.handle).map_err(|e| match e {
                    KernelError::NotSupported { .. } => {
                        PipelineError::Export(ExportError::StepUnavailable {
                            reason: e.to_string(),
                        })
                    }
                    other => PipelineError::Kernel(other),
                })?;
                write_step(&output_path, &step_text)?;
            }
        }

        info!(
            output = %output_path.display(),
            pairs = pairs.len(),
            warnings = warnings.len(),
            "render complete"
        );
        Ok(RenderOutcome {
            output_path,
            preview_path,
            warnings,
            pairs,
            bounding_box: model.bbox,
        })
    }
}

/// Reject requests the pipeline cannot act on. Everything here is a caller
/// mistake, reported before any kernel work starts.
fn validate(request: &RenderRequest) -> Result<(), PipelineError> {
    let fail = |reason: String| Err(PipelineError::InvalidRequest { reason });
    if !(request.font_size.is_finite() && request.font_size > 0.0) {
        return fail(format!(
            "font size must be positive, got {}",
            request.font_size
        ));
    }
    if !(request.spacing_frac.is_finite() && request.spacing_frac >= 0.0) {
        return fail(format!(
            "spacing fraction must be non-negative, got {}",
            request.spacing_frac
        ));
    }
    if !(request.base.height.is_finite() && request.base.height > 0.0) {
        return fail(format!(
            "base height must be positive, got {}",
            request.base.height
        ));
    }
    if !(request.base.padding.is_finite() && request.base.padding >= 0.0) {
        return fail(format!(
            "base padding must be non-negative, got {}",
            request.base.padding
        ));
    }
    if !request.base.fillet_frac.is_finite() {
        return fail(format!(
            "fillet fraction must be finite, got {}",
            request.base.fillet_frac
        ));
    }
    if let Some(pegs) = &request.pegs {
        if !(pegs.height.is_finite() && pegs.height > 0.0) {
            return fail(format!("peg height must be positive, got {}", pegs.height));
        }
        if !(pegs.radius.is_finite() && pegs.radius > 0.0) {
            return fail(format!("peg radius must be positive, got {}", pegs.radius));
        }
    }
    let stem = request.output_stem.as_str();
    if stem.is_empty() {
        return fail("output name must not be empty".to_owned());
    }
    if stem == "." || stem == ".." || stem.contains('/') || stem.contains('\\') {
        return fail(format!("output name {stem:?} must stay in the output directory"));
    }
    if matches!(request.mode, RenderMode::DualText) && request.pair_count() == 0 {
        return fail("both texts must contain at least one character".to_owned());
    }
    Ok(())
}

/// Non-fatal conditions worth reporting. All of them concern the dual-text
/// layout; the lamp uses one text and has no plate to collide with.
fn collect_warnings(request: &RenderRequest) -> Vec<RenderWarning> {
    let mut warnings = Vec::new();
    if !matches!(request.mode, RenderMode::DualText) {
        return warnings;
    }
    let len_a = request.text_a.chars().count();
    let len_b = request.text_b.chars().count();
    if len_a != len_b {
        warnings.push(RenderWarning::LengthMismatch {
            len_a,
            len_b,
            rendered: request.pair_count(),
        });
    }
    if let Some(pegs) = &request.pegs {
        let mask_len = pegs.mask.len();
        if !pegs.mask.is_empty() && mask_len != request.pair_count() {
            warnings.push(RenderWarning::MaskLength {
                mask_len,
                text_len: request.pair_count(),
            });
        }
    }
    if request
        .text_a
        .chars()
        .chain(request.text_b.chars())
        .any(char::is_lowercase)
    {
        warnings.push(RenderWarning::LowercaseInput);
    }
    warnings
}

/// The stacked dual-text pipeline: pairs, placement, pegs, plate, recenter.
fn render_dual_text(
    kb: &mut dyn KernelBundle,
    outliner: &dyn GlyphOutliner,
    request: &RenderRequest,
    cancel: &CancelToken,
) -> Result<(FinalModel, Vec<PairDisposition>), PipelineError> {
    let mut stacker = Stacker::new(request.spacing());
    let mut dispositions = Vec::new();
    let mut placed = Vec::new();
    for (index, (ch_a, ch_b)) in request
        .text_a
        .chars()
        .zip(request.text_b.chars())
        .enumerate()
    {
        if cancel.is_cancelled() {
            info!(index, "render cancelled between pairs");
            return Err(PipelineError::Cancelled);
        }
        match build_pair(kb, outliner, index, ch_a, ch_b, request.font_size)? {
            PairOutcome::Built(pair) => {
                let p = stacker.place(kb, pair)?;
                dispositions.push(PairDisposition::Placed {
                    index,
                    chars: [ch_a, ch_b],
                    offset_y: p.offset[1],
                    max_y: p.bbox.max[1],
                });
                placed.push(p);
            }
            PairOutcome::Skipped { reason, .. } => {
                stacker.skip();
                dispositions.push(PairDisposition::Skipped {
                    index,
                    chars: [ch_a, ch_b],
                    reason,
                });
            }
        }
    }

    let assembly = StackedAssembly {
        placed,
        mark: stacker.mark(),
    };
    let pegs = match &request.pegs {
        Some(params) => build_pegs(kb, params, &assembly.placed)?,
        None => Vec::new(),
    };
    // Envelope of letters and pegs before the plate joins; the final
    // recentering is measured against this, not the padded plate.
    let text_bbox = assembly_bounds(kb, &assembly.placed, &pegs, assembly.mark)?;
    let plate = build_plate(kb, &text_bbox, &request.base)?;

    let mut parts: Vec<SolidHandle> =
        Vec::with_capacity(assembly.placed.len() + pegs.len() + 1);
    parts.extend(assembly.placed.iter().map(|p| p.handle.clone()));
    parts.extend(pegs.iter().cloned());
    parts.push(plate.handle.clone());
    let model = finalize(kb, &parts, &text_bbox, mesh_tolerance(request.font_size))?;
    Ok((model, dispositions))
}

#[cfg(test)]
mod tests {
    use duotype_types::{PegMask, PegParams};

    use super::*;

    fn request(a: &str, b: &str) -> RenderRequest {
        RenderRequest::new(a, b, "/tmp/unused.ttf")
    }

    #[test]
    fn empty_common_prefix_is_rejected() {
        let err = validate(&request("", "AB")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRequest { .. }));
    }

    #[test]
    fn output_stem_cannot_escape_the_workdir() {
        let mut req = request("AB", "CD");
        req.output_stem = "../evil".to_owned();
        assert!(validate(&req).is_err());
        req.output_stem = "evil/sub".to_owned();
        assert!(validate(&req).is_err());
        req.output_stem = "..".to_owned();
        assert!(validate(&req).is_err());
        req.output_stem = "gift".to_owned();
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        let mut req = request("AB", "CD");
        req.font_size = 0.0;
        assert!(validate(&req).is_err());

        let mut req = request("AB", "CD");
        req.spacing_frac = -0.1;
        assert!(validate(&req).is_err());

        let mut req = request("AB", "CD");
        req.base.height = 0.0;
        assert!(validate(&req).is_err());

        let mut req = request("AB", "CD");
        req.pegs = Some(PegParams {
            radius: 0.0,
            ..PegParams::new(PegMask::new("X_"))
        });
        assert!(validate(&req).is_err());
    }

    #[test]
    fn warnings_cover_length_mask_and_case() {
        let mut req = request("ABc", "XY");
        req.pegs = Some(PegParams::new(PegMask::new("X")));
        let w = collect_warnings(&req);
        assert_eq!(w.len(), 3);
        assert!(matches!(
            w[0],
            RenderWarning::LengthMismatch {
                len_a: 3,
                len_b: 2,
                rendered: 2
            }
        ));
        assert!(matches!(
            w[1],
            RenderWarning::MaskLength {
                mask_len: 1,
                text_len: 2
            }
        ));
        assert_eq!(w[2], RenderWarning::LowercaseInput);
    }

    #[test]
    fn matched_upper_case_input_warns_about_nothing() {
        let mut req = request("AB", "CD");
        req.pegs = Some(PegParams::new(PegMask::new("X_")));
        assert!(collect_warnings(&req).is_empty());
    }

    #[test]
    fn heart_mode_carries_no_dual_text_warnings() {
        let mut req = request("ab", "much longer");
        req.mode = RenderMode::HeartLamp;
        assert!(collect_warnings(&req).is_empty());
    }
}

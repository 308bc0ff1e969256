use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use duotype_types::{Aabb, RenderWarning};
use file_export::ExportError;
use kernel_bridge::{GlyphError, KernelError};
use serde::Serialize;

/// Fatal errors for one render request. Per-character failures never appear
/// here; they are absorbed as skips inside the pair stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("font error: {0}")]
    Font(#[from] GlyphError),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),

    #[error("render cancelled")]
    Cancelled,
}

/// Best-effort cancellation flag, checked between character pairs. An
/// in-progress kernel boolean is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What happened to one character pair, in input order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum PairDisposition {
    /// The pair produced geometry; `offset_y` is the translation applied to
    /// move it into place.
    Placed {
        index: usize,
        chars: [char; 2],
        offset_y: f64,
        max_y: f64,
    },
    /// The pair contributed only a widened spacing gap.
    Skipped {
        index: usize,
        chars: [char; 2],
        reason: String,
    },
}

/// Result of a successful render.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutcome {
    /// The user-named file in the requested format.
    pub output_path: PathBuf,
    /// The fixed-name preview mesh.
    pub preview_path: PathBuf,
    /// Non-fatal conditions surfaced to the user.
    pub warnings: Vec<RenderWarning>,
    /// Per-pair placement report, index order.
    pub pairs: Vec<PairDisposition>,
    /// Bounding box of the exported solid.
    pub bounding_box: Aabb,
}

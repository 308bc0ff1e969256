use std::path::PathBuf;

/// Errors from converting or writing output files. All of these are fatal
/// for the render request that triggered the export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mesh has no triangles to export")]
    NoTriangles,

    #[error("mesh refers to vertex {index} but only {count} exist")]
    IndexOutOfRange { index: u32, count: usize },

    #[error("STEP export is not available: {reason}")]
    StepUnavailable { reason: String },
}

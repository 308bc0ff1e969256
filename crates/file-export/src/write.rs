//! Output file writing. Every write goes to a `.tmp` sibling first and is
//! renamed into place, so a failed render never leaves a truncated file in
//! the user-visible slot.

use std::fs;
use std::path::{Path, PathBuf};

use duotype_types::OutputFormat;
use kernel_bridge::RenderMesh;
use tracing::{info, warn};

use crate::stl::render_mesh_to_stl;
use crate::types::ExportError;

/// Fixed-name mesh written on every render for the viewer.
pub const PREVIEW_FILE_NAME: &str = "preview.stl";

const TMP_SUFFIX: &str = ".tmp";

/// File name for the user-named output in the requested format.
pub fn output_file_name(stem: &str, format: OutputFormat) -> String {
    format!("{stem}.{}", format.extension())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(TMP_SUFFIX);
    path.with_file_name(name)
}

/// Write `bytes` to `path` via a temp sibling plus rename.
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes).map_err(|source| ExportError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize the mesh as binary STL and write it atomically.
pub fn write_stl(path: &Path, mesh: &RenderMesh) -> Result<(), ExportError> {
    let bytes = render_mesh_to_stl(mesh)?;
    write_bytes_atomic(path, &bytes)?;
    info!(path = %path.display(), triangles = mesh.triangle_count(), "wrote STL");
    Ok(())
}

/// Write STEP text atomically.
pub fn write_step(path: &Path, step_text: &str) -> Result<(), ExportError> {
    write_bytes_atomic(path, step_text.as_bytes())?;
    info!(path = %path.display(), bytes = step_text.len(), "wrote STEP");
    Ok(())
}

/// Remove leftovers from earlier runs: the preview mesh and any `.tmp`
/// siblings a crashed write left behind. Best-effort; returns the number of
/// files removed.
pub fn clean_stale_outputs(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot scan output directory");
            return 0;
        }
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name == PREVIEW_FILE_NAME || name.ends_with(TMP_SUFFIX) {
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %entry.path().display(), error = %e, "cannot remove stale file"),
            }
        }
    }
    removed
}

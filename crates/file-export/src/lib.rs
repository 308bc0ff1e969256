pub mod stl;
pub mod types;
pub mod write;

pub use stl::render_mesh_to_stl;
pub use types::ExportError;
pub use write::{
    clean_stale_outputs, output_file_name, write_step, write_stl, PREVIEW_FILE_NAME,
};

pub mod glyph;
pub mod mock_kernel;
pub mod primitives;
pub mod profile;
pub mod tessellation;
pub mod traits;
pub mod truck_introspect;
pub mod truck_kernel;
pub mod types;

pub use glyph::{BlockOutliner, FontOutliner, GlyphError, GlyphOutliner};
pub use mock_kernel::MockKernel;
pub use profile::{Contour, PathSeg, PlaneBasis, Profile};
pub use traits::*;
pub use truck_kernel::TruckKernel;
pub use types::*;

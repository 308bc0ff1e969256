pub mod assemble;
pub mod heart;
pub mod kernel_ext;
pub mod letter;
pub mod pair;
pub mod pegs;
pub mod plate;
pub mod service;
pub mod stack;
pub mod types;

pub use assemble::{finalize, mesh_tolerance, FinalModel};
pub use heart::{build_heart_lamp, HeartParams};
pub use kernel_ext::KernelBundle;
pub use letter::{build_letter, LetterBlank};
pub use pair::{build_pair, PairOutcome, PairSolid, ANGLE_A_DEG, ANGLE_B_DEG};
pub use pegs::build_pegs;
pub use plate::{assembly_bounds, build_plate, fillet_radius, PlateSolid};
pub use service::RenderService;
pub use stack::{PlacedPair, StackedAssembly, Stacker};
pub use types::*;

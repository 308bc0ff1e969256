pub mod bbox;
pub mod mask;
pub mod params;
pub mod warn;

pub use bbox::*;
pub use mask::*;
pub use params::*;
pub use warn::*;

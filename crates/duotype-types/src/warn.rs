use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-fatal condition surfaced to the caller alongside the render result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RenderWarning {
    /// Input texts differ in length; only the common prefix is rendered.
    LengthMismatch {
        len_a: usize,
        len_b: usize,
        rendered: usize,
    },
    /// Non-empty peg mask whose length differs from the rendered text length.
    /// Missing positions are treated as inactive.
    MaskLength { mask_len: usize, text_len: usize },
    /// Lowercase letters have descenders that can poke through the base plate.
    LowercaseInput,
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderWarning::LengthMismatch {
                len_a,
                len_b,
                rendered,
            } => write!(
                f,
                "texts have different lengths ({len_a} vs {len_b}); rendering the first {rendered} characters"
            ),
            RenderWarning::MaskLength { mask_len, text_len } => write!(
                f,
                "peg mask length {mask_len} does not match text length {text_len}; unmatched letters get no peg"
            ),
            RenderWarning::LowercaseInput => {
                write!(f, "lowercase letters may descend below the base plate")
            }
        }
    }
}

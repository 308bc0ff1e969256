use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::mask::PegMask;

/// File format of the named export. The preview is always binary STL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Stl,
    Step,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Stl => "stl",
            OutputFormat::Step => "step",
        }
    }
}

/// Which model the render service builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RenderMode {
    /// Stacked dual-readable letter pairs on a base plate.
    DualText,
    /// Hollow heart shell with the first text fused onto it.
    HeartLamp,
}

/// Base plate parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseParams {
    /// Plate thickness; the plate occupies z in [-height, 0].
    pub height: f64,
    /// Horizontal margin added around the assembly footprint.
    pub padding: f64,
    /// Corner fillet radius as a fraction of half the footprint width,
    /// clamped to [0, 1] before use.
    pub fillet_frac: f64,
}

impl Default for BaseParams {
    fn default() -> Self {
        Self {
            height: 1.0,
            padding: 2.0,
            fillet_frac: 0.8,
        }
    }
}

/// Support peg parameters. A peg is a cylinder standing on the plate top
/// under a selected letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PegParams {
    pub mask: PegMask,
    /// Cylinder height above z = 0.
    pub height: f64,
    /// Cylinder radius, used as given.
    pub radius: f64,
}

impl PegParams {
    pub fn new(mask: PegMask) -> Self {
        Self {
            mask,
            height: 1.0,
            radius: 2.0,
        }
    }
}

/// One render request. Fully describes the model to build; the service
/// keeps no state between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub mode: RenderMode,
    /// Text read from the first viewing angle.
    pub text_a: String,
    /// Text read from the second viewing angle.
    pub text_b: String,
    /// Resolved font file path.
    pub font_path: PathBuf,
    /// Letter height in model units.
    pub font_size: f64,
    /// Gap between stacked letters as a fraction of the font size.
    pub spacing_frac: f64,
    pub base: BaseParams,
    pub pegs: Option<PegParams>,
    pub format: OutputFormat,
    /// File stem of the named export; the extension comes from `format`.
    pub output_stem: String,
}

impl RenderRequest {
    /// Request with the interactive defaults filled in.
    pub fn new(
        text_a: impl Into<String>,
        text_b: impl Into<String>,
        font_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            mode: RenderMode::DualText,
            text_a: text_a.into(),
            text_b: text_b.into(),
            font_path: font_path.into(),
            font_size: 20.0,
            spacing_frac: 0.3,
            base: BaseParams::default(),
            pegs: None,
            format: OutputFormat::Stl,
            output_stem: "file".to_owned(),
        }
    }

    /// Extrusion depth of each glyph blank, twice the letter height so the
    /// 45-degree intersection never runs out of material.
    pub fn extrusion_depth(&self) -> f64 {
        2.0 * self.font_size
    }

    /// Absolute gap between stacked letters.
    pub fn spacing(&self) -> f64 {
        self.font_size * self.spacing_frac
    }

    /// Number of character pairs rendered: the common prefix length.
    pub fn pair_count(&self) -> usize {
        self.text_a
            .chars()
            .count()
            .min(self.text_b.chars().count())
    }
}

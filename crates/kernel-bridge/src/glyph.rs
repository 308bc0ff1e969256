//! Glyph outline extraction.
//!
//! Fonts are read with ttf-parser; béziers are flattened to polylines with a
//! chord tolerance relative to the requested size, so small text never gets
//! more segments than the kernel can usefully consume.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::profile::Profile;

/// Chord tolerance for bézier flattening, as a fraction of the font size.
const FLATTEN_TOL_FRAC: f64 = 0.005;

/// Errors while turning a character into a profile. All of them are
/// properties of the font or the character, not of the kernel; letter-pair
/// builders absorb them as skips.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GlyphError {
    #[error("failed to read font {path}: {message}", path = .path.display())]
    FontRead { path: PathBuf, message: String },

    #[error("failed to parse font data: {message}")]
    FontParse { message: String },

    #[error("font has no glyph for {ch:?}")]
    UnsupportedGlyph { ch: char },

    #[error("glyph for {ch:?} has an empty outline")]
    EmptyOutline { ch: char },
}

/// Source of closed glyph outline profiles.
///
/// `font_size` is the em size in model units, so a capital letter comes out
/// roughly 0.7 x font_size tall, the same convention typesetting engines
/// use. The outline sits on its natural baseline (v = 0) with the glyph's
/// own side bearings; callers center it from its measured bounds.
pub trait GlyphOutliner {
    fn outline(&self, ch: char, font_size: f64) -> Result<Profile, GlyphError>;

    /// Horizontal pen advance for `ch` at `font_size`, for laying out a run
    /// of characters. Defined even for characters whose outline is empty
    /// (spaces advance the pen without producing geometry).
    fn advance(&self, ch: char, font_size: f64) -> Result<f64, GlyphError>;
}

/// Outliner backed by a TrueType/OpenType font file.
///
/// Owns the raw font bytes; the zero-copy face view is re-parsed per call,
/// which is cheap (header reads only) and avoids a self-referential borrow.
#[derive(Debug)]
pub struct FontOutliner {
    data: Vec<u8>,
}

impl FontOutliner {
    pub fn from_file(path: &Path) -> Result<Self, GlyphError> {
        let data = std::fs::read(path).map_err(|e| GlyphError::FontRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, GlyphError> {
        ttf_parser::Face::parse(&data, 0).map_err(|e| GlyphError::FontParse {
            message: e.to_string(),
        })?;
        Ok(Self { data })
    }
}

impl GlyphOutliner for FontOutliner {
    fn outline(&self, ch: char, font_size: f64) -> Result<Profile, GlyphError> {
        let face = ttf_parser::Face::parse(&self.data, 0).map_err(|e| GlyphError::FontParse {
            message: e.to_string(),
        })?;
        let glyph = face
            .glyph_index(ch)
            .ok_or(GlyphError::UnsupportedGlyph { ch })?;
        let scale = font_size / f64::from(face.units_per_em());
        let mut pen = OutlinePen::new(scale, font_size * FLATTEN_TOL_FRAC);
        face.outline_glyph(glyph, &mut pen);
        let loops = pen.finish();
        tracing::debug!(ch = %ch, contours = loops.len(), "outlined glyph");
        Profile::from_polylines(loops).ok_or(GlyphError::EmptyOutline { ch })
    }

    fn advance(&self, ch: char, font_size: f64) -> Result<f64, GlyphError> {
        let face = ttf_parser::Face::parse(&self.data, 0).map_err(|e| GlyphError::FontParse {
            message: e.to_string(),
        })?;
        let glyph = face
            .glyph_index(ch)
            .ok_or(GlyphError::UnsupportedGlyph { ch })?;
        let advance = face
            .glyph_hor_advance(glyph)
            .ok_or(GlyphError::UnsupportedGlyph { ch })?;
        Ok(f64::from(advance) * font_size / f64::from(face.units_per_em()))
    }
}

/// ttf-parser outline sink that scales font units and flattens béziers.
struct OutlinePen {
    scale: f64,
    tolerance: f64,
    contours: Vec<Vec<[f64; 2]>>,
    current: Vec<[f64; 2]>,
}

impl OutlinePen {
    fn new(scale: f64, tolerance: f64) -> Self {
        Self {
            scale,
            tolerance,
            contours: Vec::new(),
            current: Vec::new(),
        }
    }

    fn at(&self, x: f32, y: f32) -> [f64; 2] {
        [f64::from(x) * self.scale, f64::from(y) * self.scale]
    }

    fn last(&self) -> [f64; 2] {
        *self.current.last().unwrap_or(&[0.0, 0.0])
    }

    fn push(&mut self, p: [f64; 2]) {
        if let Some(&q) = self.current.last() {
            if (p[0] - q[0]).abs() < 1e-12 && (p[1] - q[1]).abs() < 1e-12 {
                return;
            }
        }
        self.current.push(p);
    }

    fn flush(&mut self) {
        if self.current.len() >= 3 {
            self.contours.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
    }

    fn finish(mut self) -> Vec<Vec<[f64; 2]>> {
        self.flush();
        self.contours
    }

    /// Uniform-parameter segment count from a chord deviation bound:
    /// subdividing a bézier n times reduces its deviation by n^2.
    fn segments_for(&self, deviation: f64) -> usize {
        if deviation <= self.tolerance {
            1
        } else {
            ((deviation / self.tolerance).sqrt().ceil() as usize).clamp(2, 64)
        }
    }
}

impl ttf_parser::OutlineBuilder for OutlinePen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        self.current.push(self.at(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.at(x, y);
        self.push(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.last();
        let c = self.at(x1, y1);
        let p2 = self.at(x, y);
        // Deviation of a quadratic from its chord is at most |p0 - 2c + p2|/4.
        let dev = {
            let dx = p0[0] - 2.0 * c[0] + p2[0];
            let dy = p0[1] - 2.0 * c[1] + p2[1];
            (dx * dx + dy * dy).sqrt() / 4.0
        };
        let n = self.segments_for(dev);
        for i in 1..=n {
            let t = i as f64 / n as f64;
            let s = 1.0 - t;
            let px = s * s * p0[0] + 2.0 * s * t * c[0] + t * t * p2[0];
            let py = s * s * p0[1] + 2.0 * s * t * c[1] + t * t * p2[1];
            self.push([px, py]);
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.last();
        let c1 = self.at(x1, y1);
        let c2 = self.at(x2, y2);
        let p3 = self.at(x, y);
        // Cubic deviation bound from the two second differences.
        let d1 = {
            let dx = p0[0] - 2.0 * c1[0] + c2[0];
            let dy = p0[1] - 2.0 * c1[1] + c2[1];
            (dx * dx + dy * dy).sqrt()
        };
        let d2 = {
            let dx = c1[0] - 2.0 * c2[0] + p3[0];
            let dy = c1[1] - 2.0 * c2[1] + p3[1];
            (dx * dx + dy * dy).sqrt()
        };
        let dev = 0.75 * d1.max(d2);
        let n = self.segments_for(dev);
        for i in 1..=n {
            let t = i as f64 / n as f64;
            let s = 1.0 - t;
            let px = s * s * s * p0[0]
                + 3.0 * s * s * t * c1[0]
                + 3.0 * s * t * t * c2[0]
                + t * t * t * p3[0];
            let py = s * s * s * p0[1]
                + 3.0 * s * s * t * c1[1]
                + 3.0 * s * t * t * c2[1]
                + t * t * t * p3[1];
            self.push([px, py]);
        }
    }

    fn close(&mut self) {
        self.flush();
    }
}

/// Deterministic outliner for tests. Every character is a solid rectangle
/// of the requested size; characters in `unsupported` fail like a missing
/// glyph, and the space character has an empty outline like in real fonts.
pub struct BlockOutliner {
    /// Rectangle width as a fraction of the font size.
    pub width_frac: f64,
    pub unsupported: HashSet<char>,
}

impl BlockOutliner {
    pub fn new() -> Self {
        Self {
            width_frac: 0.6,
            unsupported: HashSet::new(),
        }
    }

    pub fn with_unsupported(chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            width_frac: 0.6,
            unsupported: chars.into_iter().collect(),
        }
    }
}

impl Default for BlockOutliner {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphOutliner for BlockOutliner {
    fn outline(&self, ch: char, font_size: f64) -> Result<Profile, GlyphError> {
        if self.unsupported.contains(&ch) {
            return Err(GlyphError::UnsupportedGlyph { ch });
        }
        if ch == ' ' {
            return Err(GlyphError::EmptyOutline { ch });
        }
        let w = font_size * self.width_frac;
        let h = font_size;
        Ok(Profile::from_polylines(vec![vec![
            [0.0, 0.0],
            [w, 0.0],
            [w, h],
            [0.0, h],
        ]])
        .expect("rectangle is a valid profile"))
    }

    fn advance(&self, ch: char, font_size: f64) -> Result<f64, GlyphError> {
        if self.unsupported.contains(&ch) {
            return Err(GlyphError::UnsupportedGlyph { ch });
        }
        // Glyph width plus a fixed tracking gap.
        Ok(font_size * (self.width_frac + 0.15))
    }
}

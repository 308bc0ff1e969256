//! Font directory index.
//!
//! A fonts directory holds one subdirectory per family; a family holds
//! either styled files named `Prefix-Style.ttf` or plain `.ttf` files.
//! Hidden entries (leading dot) are ignored everywhere. The index never
//! opens the font files; it only maps (family, style) to a path.

use std::path::{Path, PathBuf};

use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum FontIndexError {
    #[error("cannot read {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no font family named {family:?}")]
    UnknownFamily { family: String },

    #[error("family {family:?} contains no .ttf files")]
    NoFonts { family: String },

    #[error("family {family:?} has no style named {style:?}")]
    UnknownStyle { family: String, style: String },
}

/// One selectable font file inside a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontVariant {
    /// Style parsed from `Prefix-Style.ttf`; `None` for a bare `.ttf` whose
    /// name carries no dash.
    pub style: Option<String>,
    pub path: PathBuf,
}

impl FontVariant {
    /// Name shown in listings: the style if there is one, the file name
    /// otherwise.
    pub fn label(&self) -> String {
        match &self.style {
            Some(style) => style.clone(),
            None => self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Index over one fonts directory.
pub struct FontIndex {
    root: PathBuf,
}

impl FontIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Family names: non-hidden subdirectories, sorted.
    pub fn families(&self) -> Result<Vec<String>, FontIndexError> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| FontIndexError::Io {
            path: self.root.clone(),
            source,
        })?;
        let mut families = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            if entry.path().is_dir() {
                families.push(name);
            }
        }
        families.sort();
        debug!(root = %self.root.display(), count = families.len(), "listed font families");
        Ok(families)
    }

    /// Variants of one family, sorted by label.
    ///
    /// When any styled `Prefix-Style.ttf` file exists the bare files are
    /// not offered; otherwise every `.ttf` is its own variant.
    pub fn variants(&self, family: &str) -> Result<Vec<FontVariant>, FontIndexError> {
        let dir = self.family_dir(family)?;
        let entries = std::fs::read_dir(&dir).map_err(|source| FontIndexError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut styled = Vec::new();
        let mut bare = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !is_ttf(&path) {
                continue;
            }
            let stem = name.trim_end_matches(".ttf");
            match stem.split_once('-') {
                Some((_, style)) if !style.is_empty() => styled.push(FontVariant {
                    style: Some(style.to_owned()),
                    path,
                }),
                _ => bare.push(FontVariant { style: None, path }),
            }
        }

        let mut variants = if styled.is_empty() { bare } else { styled };
        if variants.is_empty() {
            return Err(FontIndexError::NoFonts {
                family: family.to_owned(),
            });
        }
        variants.sort_by(|a, b| a.label().cmp(&b.label()));
        debug!(family, count = variants.len(), "listed font variants");
        Ok(variants)
    }

    /// Path for (family, optional style).
    ///
    /// Without a style the `Regular` variant is preferred when present,
    /// falling back to the first variant in label order.
    pub fn resolve(&self, family: &str, style: Option<&str>) -> Result<PathBuf, FontIndexError> {
        let variants = self.variants(family)?;
        match style {
            Some(wanted) => variants
                .iter()
                .find(|v| v.label() == wanted)
                .map(|v| v.path.clone())
                .ok_or_else(|| FontIndexError::UnknownStyle {
                    family: family.to_owned(),
                    style: wanted.to_owned(),
                }),
            None => {
                let regular = variants
                    .iter()
                    .find(|v| v.label().eq_ignore_ascii_case("regular"));
                Ok(regular.unwrap_or(&variants[0]).path.clone())
            }
        }
    }

    fn family_dir(&self, family: &str) -> Result<PathBuf, FontIndexError> {
        let dir = self.root.join(family);
        if family.starts_with('.') || !dir.is_dir() {
            return Err(FontIndexError::UnknownFamily {
                family: family.to_owned(),
            });
        }
        Ok(dir)
    }
}

fn is_ttf(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("ttf"))
        .unwrap_or(false)
}

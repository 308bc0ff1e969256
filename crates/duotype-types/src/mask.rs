use serde::{Deserialize, Serialize};

/// Per-letter support peg selection.
///
/// Position `i` controls the character pair at index `i`: the active symbol
/// `'X'` requests a peg there, every other character leaves the letter
/// unsupported. Positions past the end of a short mask are inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PegMask(String);

impl PegMask {
    /// The only symbol that requests a peg.
    pub const ACTIVE: char = 'X';
    /// Conventional placeholder for "no peg".
    pub const INACTIVE: char = '_';

    pub fn new(mask: impl Into<String>) -> Self {
        Self(mask.into())
    }

    /// Mask requesting a peg under the first letter only, the UI default.
    pub fn first_only(len: usize) -> Self {
        let mut s = String::with_capacity(len);
        for i in 0..len {
            s.push(if i == 0 { Self::ACTIVE } else { Self::INACTIVE });
        }
        Self(s)
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.0.chars().nth(index) == Some(Self::ACTIVE)
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_active_symbol_requests_a_peg() {
        let mask = PegMask::new("X_xo");
        assert!(mask.is_active(0));
        assert!(!mask.is_active(1));
        assert!(!mask.is_active(2));
        assert!(!mask.is_active(3));
    }

    #[test]
    fn positions_past_the_end_are_inactive() {
        let mask = PegMask::new("XX");
        assert!(mask.is_active(1));
        assert!(!mask.is_active(2));
        assert!(!mask.is_active(100));
    }

    #[test]
    fn first_only_matches_the_ui_default() {
        assert_eq!(PegMask::first_only(4).as_str(), "X___");
        assert_eq!(PegMask::first_only(0).as_str(), "");
    }
}

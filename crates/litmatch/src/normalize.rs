//! Byte normalization shared by the compiler and the scanner.
//!
//! Patterns are keyed by their normalized form; the scanner re-applies the
//! same rules bytewise to the haystack so the comparison key, not the raw
//! bytes, drives equality. Word classification stays on raw bytes.

/// Stateless byte-level normalizer configured by the two comparison options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    /// Fold ASCII letters to lowercase before comparison.
    pub fold_case: bool,
    /// Treat ASCII punctuation as ignorable during comparison.
    pub skip_punct: bool,
}

impl Normalizer {
    pub fn new(fold_case: bool, skip_punct: bool) -> Self {
        Self {
            fold_case,
            skip_punct,
        }
    }

    /// Map one raw byte to its comparison form, or `None` when the byte is
    /// ignorable and contributes nothing to the comparison key.
    #[inline]
    pub fn normalize_byte(&self, b: u8) -> Option<u8> {
        if self.skip_punct && is_ignorable(b) {
            return None;
        }
        Some(if self.fold_case {
            b.to_ascii_lowercase()
        } else {
            b
        })
    }

    /// Normalized form of a whole pattern: ignorable bytes dropped, the rest
    /// folded. The result may be empty.
    pub fn normalize(&self, raw: &[u8]) -> Vec<u8> {
        raw.iter().filter_map(|&b| self.normalize_byte(b)).collect()
    }
}

/// Word class used by the anchoring predicates: ASCII alphanumeric or `_`.
#[inline]
pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Line separators recognized by the `line_start`/`line_end` anchors.
#[inline]
pub fn is_line_break(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

/// Bytes skipped during comparison when punctuation-ignoring is enabled.
#[inline]
pub fn is_ignorable(b: u8) -> bool {
    b.is_ascii_punctuation()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_case_only() {
        let n = Normalizer::new(true, false);
        assert_eq!(n.normalize(b"F'oo"), b"f'oo");
        assert_eq!(n.normalize_byte(b'A'), Some(b'a'));
        assert_eq!(n.normalize_byte(b'-'), Some(b'-'));
    }

    #[test]
    fn skip_punct_drops_ignorables() {
        let n = Normalizer::new(true, true);
        assert_eq!(n.normalize(b"f'oo"), b"foo");
        assert_eq!(n.normalize(b"--"), b"");
        assert_eq!(n.normalize_byte(b'\''), None);
    }

    #[test]
    fn word_class_is_independent_of_punct() {
        assert!(is_word_byte(b'_'));
        assert!(is_ignorable(b'_'));
        assert!(is_word_byte(b'7'));
        assert!(!is_word_byte(b' '));
        assert!(is_line_break(b'\n'));
        assert!(is_line_break(b'\r'));
        assert!(!is_line_break(b' '));
    }
}

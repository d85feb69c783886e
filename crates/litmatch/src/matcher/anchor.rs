//! Positional anchoring predicates. Each enabled predicate must hold for a
//! candidate to survive; they compose by logical AND and always inspect raw
//! haystack bytes, never normalized ones.

use crate::matcher::MatchOptions;
use crate::normalize::{is_line_break, is_word_byte};

/// True when the candidate span `[start, end)` satisfies every anchor
/// enabled in `opts`.
pub(crate) fn accepts(hay: &[u8], start: usize, end: usize, opts: &MatchOptions) -> bool {
    if (opts.word_boundary || opts.word_prefix) && !starts_word(hay, start) {
        return false;
    }
    if (opts.word_boundary || opts.word_suffix) && !ends_word(hay, end) {
        return false;
    }
    if opts.line_start && !(start == 0 || is_line_break(hay[start - 1])) {
        return false;
    }
    if opts.line_end && !(end == hay.len() || is_line_break(hay[end])) {
        return false;
    }
    true
}

/// Haystack start counts as non-word.
#[inline]
fn starts_word(hay: &[u8], start: usize) -> bool {
    start == 0 || !is_word_byte(hay[start - 1])
}

/// Haystack end counts as non-word.
#[inline]
fn ends_word(hay: &[u8], end: usize) -> bool {
    end == hay.len() || !is_word_byte(hay[end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(f: impl Fn(&mut MatchOptions)) -> MatchOptions {
        let mut o = MatchOptions::default();
        f(&mut o);
        o
    }

    #[test]
    fn no_anchors_accepts_everything() {
        assert!(accepts(b"foobar", 1, 4, &MatchOptions::default()));
    }

    #[test]
    fn word_boundary_needs_both_sides() {
        let o = opts(|o| o.word_boundary = true);
        let hay = b"land and inland";
        assert!(accepts(hay, 5, 8, &o)); // "and" as a word
        assert!(!accepts(hay, 1, 4, &o)); // "and" inside "land"
        assert!(!accepts(hay, 9, 11, &o)); // "in" starting "inland"
    }

    #[test]
    fn prefix_and_suffix_are_one_sided() {
        let hay = b"foobar foo";
        let p = opts(|o| o.word_prefix = true);
        let s = opts(|o| o.word_suffix = true);
        assert!(accepts(hay, 0, 3, &p)); // "foo" heads "foobar"
        assert!(!accepts(hay, 3, 6, &p)); // "bar" is mid-word
        assert!(accepts(hay, 3, 6, &s)); // "bar" ends the word
        assert!(!accepts(hay, 0, 3, &s));
    }

    #[test]
    fn line_anchors_respect_breaks_and_edges() {
        let hay = b"abc\ndef";
        let ls = opts(|o| o.line_start = true);
        let le = opts(|o| o.line_end = true);
        assert!(accepts(hay, 0, 3, &ls));
        assert!(accepts(hay, 4, 7, &ls)); // after the newline
        assert!(!accepts(hay, 1, 3, &ls));
        assert!(accepts(hay, 0, 3, &le)); // newline follows
        assert!(accepts(hay, 4, 7, &le)); // haystack end
        assert!(!accepts(hay, 4, 6, &le));
    }

    #[test]
    fn line_start_and_end_demand_a_whole_line() {
        let hay = b"before\nexactline\nafter";
        let o = opts(|o| {
            o.line_start = true;
            o.line_end = true;
        });
        assert!(accepts(hay, 7, 16, &o));
        assert!(!accepts(hay, 7, 12, &o));
        assert!(!accepts(hay, 8, 16, &o));
    }
}

//! Core scan loop over one haystack range.
//!
//! Every non-ignorable position is probed against the short-key table, and
//! the long-pattern automaton advances by normalized byte in the same pass.
//! Candidates are reported in original haystack coordinates: a ring of raw
//! positions maps automaton hits (which live in normalized space) back to
//! the raw offset of their first normalized byte, so interior ignorable
//! bytes land inside the span while exterior ones never do.

use crate::matcher::{anchor, MatchOptions, MatchStats};
use crate::normalize::Normalizer;
use crate::store::{pack_short_key, PatternStore};

/// Raw candidate span before overlap resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub start: usize,
    pub end: usize,
}

/// Scan `hay`, owning candidates whose start offset falls in
/// `[range_start, range_end)`. The loop reads past `range_end` until enough
/// normalized bytes are consumed that no owned long match can still be open,
/// so chunked scans find boundary-spanning matches exactly once.
pub(crate) fn scan_range(
    store: &PatternStore,
    norm: Normalizer,
    opts: &MatchOptions,
    hay: &[u8],
    range_start: usize,
    range_end: usize,
) -> (Vec<Candidate>, MatchStats) {
    let mut cands = Vec::new();
    let mut stats = MatchStats::default();
    let largest = store.stats.largest_pattern_length as usize;
    let probe_short = !store.short.is_empty();
    let run_auto = !store.auto.is_empty();

    let mut ring = PosRing::new(largest.max(1));
    let mut state = 0u32;
    let mut past_end = 0usize;

    let mut i = range_start;
    while i < hay.len() {
        if i >= range_end && (!run_auto || past_end >= largest) {
            break;
        }
        if i < range_end {
            stats.bytes_scanned += 1;
        }
        let b = hay[i];
        let Some(c) = norm.normalize_byte(b) else {
            i += 1;
            continue;
        };
        if i >= range_end {
            past_end += 1;
        }

        if probe_short && i < range_end {
            short_probe(store, norm, opts, hay, i, &mut cands, &mut stats);
        }

        if run_auto {
            state = store.auto.step(state, c);
            ring.push(i);
            for &pat in store.auto.outputs(state) {
                let plen = store.patterns[pat as usize].len as usize;
                let Some(start) = ring.nth_back(plen - 1) else {
                    continue;
                };
                if start < range_start || start >= range_end {
                    continue;
                }
                stats.candidates += 1;
                let end = i + 1;
                if anchor::accepts(hay, start, end, opts) {
                    stats.long_hits += 1;
                    cands.push(Candidate { start, end });
                }
            }
        }
        i += 1;
    }

    (cands, stats)
}

/// Try every short key length starting at non-ignorable position `i`,
/// skipping ignorable bytes between key bytes. Spans end on the raw
/// position of their last normalized byte.
fn short_probe(
    store: &PatternStore,
    norm: Normalizer,
    opts: &MatchOptions,
    hay: &[u8],
    i: usize,
    cands: &mut Vec<Candidate>,
    stats: &mut MatchStats,
) {
    let mut key = [0u8; 4];
    let mut n = 0usize;
    let mut j = i;
    while j < hay.len() && n < 4 {
        if let Some(c) = norm.normalize_byte(hay[j]) {
            key[n] = c;
            n += 1;
            if store.short.contains(&pack_short_key(&key[..n])) {
                stats.candidates += 1;
                let end = j + 1;
                if anchor::accepts(hay, i, end, opts) {
                    stats.short_hits += 1;
                    cands.push(Candidate { start: i, end });
                }
            }
        }
        j += 1;
    }
}

/// Fixed-capacity ring of the raw positions of the most recent normalized
/// bytes consumed by the automaton.
struct PosRing {
    buf: Vec<usize>,
    count: usize,
}

impl PosRing {
    fn new(cap: usize) -> Self {
        Self {
            buf: vec![0; cap],
            count: 0,
        }
    }

    #[inline]
    fn push(&mut self, pos: usize) {
        let cap = self.buf.len();
        self.buf[self.count % cap] = pos;
        self.count += 1;
    }

    /// Position of the normalized byte `k` steps back, 0 being the most
    /// recently pushed.
    #[inline]
    fn nth_back(&self, k: usize) -> Option<usize> {
        if k >= self.count || k >= self.buf.len() {
            return None;
        }
        let cap = self.buf.len();
        Some(self.buf[(self.count - 1 - k) % cap])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_maps_back_through_wraparound() {
        let mut r = PosRing::new(3);
        assert_eq!(r.nth_back(0), None);
        for p in [10, 20, 30, 40] {
            r.push(p);
        }
        assert_eq!(r.nth_back(0), Some(40));
        assert_eq!(r.nth_back(2), Some(20));
        assert_eq!(r.nth_back(3), None); // evicted
    }
}

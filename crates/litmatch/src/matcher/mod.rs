//! Matching engine: opens a compiled pattern store and scans haystacks.
//!
//! A `Matcher` owns its tuning state (thread pool, chunk size) and a
//! mutable statistics cell; the store itself is immutable and shareable.

use std::path::Path;

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;

use crate::compile::{CompileOptions, Compiler};
use crate::error::{Error, Result};
use crate::normalize::Normalizer;
use crate::store::{PatternStore, DEFAULT_CHUNK_SIZE};

pub(crate) mod anchor;
pub(crate) mod scan;

use scan::Candidate;

/// Per-scan behavior flags. All are independently toggleable and compose
/// freely; the default scans with no normalization beyond what the store
/// was compiled with, no anchoring, and no overlap filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Fold case at scan time even if the store was compiled without it.
    pub case_insensitive: bool,
    /// Skip punctuation at scan time even if the store was compiled
    /// without it.
    pub ignore_punctuation: bool,
    /// Per start offset, keep only candidates of maximal length.
    pub longest_only: bool,
    /// Greedy left-to-right selection of pairwise disjoint spans.
    pub no_overlap: bool,
    pub word_boundary: bool,
    pub word_prefix: bool,
    pub word_suffix: bool,
    pub line_start: bool,
    pub line_end: bool,
}

/// One reported match. `bytes` is the verbatim unnormalized haystack slice
/// at `[offset, offset + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'h> {
    pub offset: usize,
    pub length: usize,
    pub bytes: &'h [u8],
}

/// Mutable scan counters owned by a `Matcher`. All fields reset to zero as
/// one locked operation and never go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// Matches reported after anchoring and overlap resolution.
    pub total_hits: u64,
    /// Anchored short-path candidates.
    pub short_hits: u64,
    /// Anchored long-path candidates.
    pub long_hits: u64,
    /// Raw candidates found before anchoring.
    pub candidates: u64,
    /// Haystack bytes visited.
    pub bytes_scanned: u64,
}

impl MatchStats {
    fn merge(&mut self, other: &MatchStats) {
        self.total_hits += other.total_hits;
        self.short_hits += other.short_hits;
        self.long_hits += other.long_hits;
        self.candidates += other.candidates;
        self.bytes_scanned += other.bytes_scanned;
    }
}

/// Read-only matching engine over one compiled pattern store.
pub struct Matcher {
    store: PatternStore,
    pool: rayon::ThreadPool,
    threads: usize,
    chunk_size: usize,
    stats: Mutex<MatchStats>,
}

impl Matcher {
    /// Open a compiled store file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_store(PatternStore::open(path)?)
    }

    /// Wrap an already-loaded store.
    pub fn from_store(store: PatternStore) -> Result<Self> {
        let threads = default_threads();
        Ok(Self {
            store,
            pool: build_pool(threads)?,
            threads,
            chunk_size: DEFAULT_CHUNK_SIZE,
            stats: Mutex::new(MatchStats::default()),
        })
    }

    /// Compile a newline-delimited pattern buffer in memory and open the
    /// resulting store directly, without touching the filesystem.
    pub fn from_buffer(patterns: &[u8], opts: CompileOptions) -> Result<Self> {
        let mut c = Compiler::new(Path::new(""), opts);
        c.add_pattern_lines(patterns)?;
        let image = c.finalize_to_bytes()?;
        Self::from_store(PatternStore::from_bytes(&image)?)
    }

    /// Compile a raw pattern-list file on the fly and open it.
    pub fn from_pattern_file(path: impl AsRef<Path>, opts: CompileOptions) -> Result<Self> {
        let buf = std::fs::read(path.as_ref())?;
        Self::from_buffer(&buf, opts)
    }

    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    /// Scan `haystack` and return every accepted match, ordered by offset
    /// ascending, then length ascending. Blocks until the whole haystack
    /// has been scanned.
    pub fn scan<'h>(&self, haystack: &'h [u8], opts: &MatchOptions) -> Result<Vec<Match<'h>>> {
        let norm = Normalizer::new(
            self.store.case_insensitive || opts.case_insensitive,
            self.store.ignore_punctuation || opts.ignore_punctuation,
        );

        let mut delta = MatchStats::default();
        let mut cands: Vec<Candidate>;
        if self.threads <= 1 || haystack.len() <= self.chunk_size {
            let (c, d) = scan::scan_range(&self.store, norm, opts, haystack, 0, haystack.len());
            cands = c;
            delta.merge(&d);
        } else {
            let ranges: Vec<(usize, usize)> = (0..haystack.len())
                .step_by(self.chunk_size)
                .map(|s| (s, (s + self.chunk_size).min(haystack.len())))
                .collect();
            let per_chunk: Vec<(Vec<Candidate>, MatchStats)> = self.pool.install(|| {
                ranges
                    .par_iter()
                    .map(|&(s, e)| scan::scan_range(&self.store, norm, opts, haystack, s, e))
                    .collect()
            });
            cands = Vec::new();
            for (c, d) in per_chunk {
                cands.extend(c);
                delta.merge(&d);
            }
        }

        // no_overlap's greedy selection is only correct over the globally
        // ordered candidate stream, so sort before resolving.
        cands.sort_by_key(|c| (c.start, c.end));
        let selected = resolve_overlaps(cands, opts);
        delta.total_hits = selected.len() as u64;
        self.stats.lock().merge(&delta);
        tracing::debug!(
            hits = selected.len(),
            bytes = haystack.len(),
            "scan complete"
        );

        Ok(selected
            .into_iter()
            .map(|c| Match {
                offset: c.start,
                length: c.end - c.start,
                bytes: &haystack[c.start..c.end],
            })
            .collect())
    }

    pub fn match_stats(&self) -> MatchStats {
        *self.stats.lock()
    }

    pub fn reset_match_stats(&self) {
        *self.stats.lock() = MatchStats::default();
    }

    /// Set the worker thread count; 0 selects the platform default. The
    /// prior setting is kept on failure.
    pub fn set_threads(&mut self, n: i32) -> Result<()> {
        if n < 0 {
            return Err(Error::InvalidArgument(format!(
                "thread count must be >= 0, got {n}"
            )));
        }
        let threads = if n == 0 {
            default_threads()
        } else {
            n as usize
        };
        self.pool = build_pool(threads)?;
        self.threads = threads;
        Ok(())
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Set the per-worker chunk size in bytes; 0 selects the default
    /// (4096). The prior setting is kept on failure.
    pub fn set_chunk_size(&mut self, n: i64) -> Result<()> {
        if n < 0 {
            return Err(Error::InvalidArgument(format!(
                "chunk size must be >= 0, got {n}"
            )));
        }
        self.chunk_size = if n == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            n as usize
        };
        Ok(())
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn build_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| Error::InvalidArgument(e.to_string()))
}

/// Apply `longest_only` / `no_overlap` over the sorted candidate stream.
fn resolve_overlaps(cands: Vec<Candidate>, opts: &MatchOptions) -> Vec<Candidate> {
    if !opts.longest_only && !opts.no_overlap {
        return cands;
    }
    let mut out = Vec::new();
    let mut cursor = 0usize;
    let mut i = 0;
    while i < cands.len() {
        let start = cands[i].start;
        let mut j = i;
        while j < cands.len() && cands[j].start == start {
            j += 1;
        }
        // Sorted by end within the group, so the maximal length is last.
        let max_end = cands[j - 1].end;
        if opts.no_overlap {
            if start >= cursor {
                out.push(Candidate {
                    start,
                    end: max_end,
                });
                cursor = max_end;
            }
        } else {
            for c in &cands[i..j] {
                if c.end == max_end {
                    out.push(*c);
                }
            }
        }
        i = j;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(start: usize, end: usize) -> Candidate {
        Candidate { start, end }
    }

    #[test]
    fn default_keeps_everything() {
        let cands = vec![c(2, 5), c(2, 6), c(4, 7)];
        let opts = MatchOptions::default();
        assert_eq!(resolve_overlaps(cands.clone(), &opts), cands);
    }

    #[test]
    fn longest_only_keeps_maximal_per_start() {
        let opts = MatchOptions {
            longest_only: true,
            ..Default::default()
        };
        let out = resolve_overlaps(vec![c(2, 5), c(2, 6), c(4, 7)], &opts);
        assert_eq!(out, vec![c(2, 6), c(4, 7)]);
    }

    #[test]
    fn no_overlap_is_greedy_left_to_right() {
        let opts = MatchOptions {
            no_overlap: true,
            ..Default::default()
        };
        // The 4..7 span starts inside the emitted 2..6 span and is dropped.
        let out = resolve_overlaps(vec![c(2, 5), c(2, 6), c(4, 7), c(6, 9)], &opts);
        assert_eq!(out, vec![c(2, 6), c(6, 9)]);
    }
}

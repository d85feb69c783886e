//! Pattern store: the compiled on-disk artifact shared by compiler and
//! matcher. Serialization lives in `store/writer.rs`, loading and structural
//! validation in `store/reader.rs`.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::automaton::Automaton;
use crate::error::Result;

/// Store format constants.
pub const MAGIC: u32 = 0x4C49_544D; // "LITM"
pub const VERSION: u32 = 2;
pub const HEADER_LEN: usize = 68;

pub(crate) const FLAG_CASE_INSENSITIVE: u32 = 1;
pub(crate) const FLAG_IGNORE_PUNCT: u32 = 1 << 1;
pub(crate) const FLAG_MASK: u32 = FLAG_CASE_INSENSITIVE | FLAG_IGNORE_PUNCT;

/// Default scan chunk size selected when `set_chunk_size(0)` is requested.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Aggregate statistics computed at compile time, immutable thereafter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatternStoreStats {
    /// Distinct long (blob-backed) patterns.
    pub stored_pattern_count: u32,
    /// Distinct short (packed-key) patterns.
    pub short_pattern_count: u32,
    /// Sum of raw pattern lengths as submitted, before normalization.
    pub total_input_bytes: u64,
    /// Sum of normalized blob lengths; short patterns contribute nothing.
    pub total_stored_bytes: u64,
    /// Min/max over normalized lengths across both variants.
    pub smallest_pattern_length: u32,
    pub largest_pattern_length: u32,
}

/// Blob reference for one long pattern: normalized bytes at `off..off+len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRef {
    pub off: u32,
    pub len: u32,
}

/// A loaded, immutable pattern store. Safe to share across concurrent scans.
pub struct PatternStore {
    pub(crate) case_insensitive: bool,
    pub(crate) ignore_punctuation: bool,
    pub(crate) stats: PatternStoreStats,
    /// Packed `(len, bytes)` keys of all short patterns.
    pub(crate) short: HashSet<u64>,
    pub(crate) auto: Automaton,
    pub(crate) patterns: Vec<PatternRef>,
    pub(crate) blob: Vec<u8>,
}

impl PatternStore {
    /// Open and validate a compiled store file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        reader::open(path.as_ref())
    }

    /// Parse a store from serialized bytes (e.g. an in-memory compile).
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        reader::parse(buf)
    }

    pub fn stats(&self) -> PatternStoreStats {
        self.stats
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn ignore_punctuation(&self) -> bool {
        self.ignore_punctuation
    }

    /// Normalized bytes of one long pattern, verbatim from the blob.
    pub fn stored_pattern(&self, idx: usize) -> Option<&[u8]> {
        let p = self.patterns.get(idx)?;
        self.blob.get(p.off as usize..(p.off + p.len) as usize)
    }
}

/// Pack a short pattern's normalized form (1..=4 bytes) into its table key:
/// length in the high half, zero-padded little-endian bytes in the low half.
#[inline]
pub(crate) fn pack_short_key(norm: &[u8]) -> u64 {
    debug_assert!(!norm.is_empty() && norm.len() <= 4);
    let mut low = [0u8; 4];
    low[..norm.len()].copy_from_slice(norm);
    ((norm.len() as u64) << 32) | u64::from(u32::from_le_bytes(low))
}

pub(crate) mod reader;
pub(crate) mod writer;

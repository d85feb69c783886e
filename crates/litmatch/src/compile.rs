//! Pattern store compiler: ingests raw patterns, deduplicates by normalized
//! key, classifies short vs. long, and serializes the store at finalize
//! time. Failure links are built once, after all patterns are known.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::automaton::TrieBuilder;
use crate::error::{Error, Result};
use crate::normalize::Normalizer;
use crate::store::writer::{StoreParts, StoreWriter};
use crate::store::{pack_short_key, PatternRef, PatternStoreStats};

/// Normalization options fixed at compile time and recorded in the store
/// header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub case_insensitive: bool,
    pub ignore_punctuation: bool,
}

/// Single-writer store builder. Patterns accumulate through `add_pattern`;
/// `finalize` runs the deferred automaton build and commits the artifact.
pub struct Compiler {
    path: PathBuf,
    norm: Normalizer,
    opts: CompileOptions,
    seen: HashSet<Vec<u8>>,
    short: BTreeSet<u64>,
    trie: TrieBuilder,
    patterns: Vec<PatternRef>,
    blob: Vec<u8>,
    stats: PatternStoreStats,
}

impl Compiler {
    pub fn new(output_path: impl AsRef<Path>, opts: CompileOptions) -> Self {
        Self {
            path: output_path.as_ref().to_path_buf(),
            norm: Normalizer::new(opts.case_insensitive, opts.ignore_punctuation),
            opts,
            seen: HashSet::new(),
            short: BTreeSet::new(),
            trie: TrieBuilder::new(),
            patterns: Vec::new(),
            blob: Vec::new(),
            stats: PatternStoreStats::default(),
        }
    }

    /// Register one pattern. Duplicate normalized keys are silently
    /// absorbed; a pattern that normalizes to nothing is rejected.
    pub fn add_pattern(&mut self, pattern: &[u8]) -> Result<()> {
        let key = self.norm.normalize(pattern);
        if key.is_empty() {
            return Err(Error::InvalidPattern(format!(
                "pattern {:?} is empty after normalization",
                String::from_utf8_lossy(pattern)
            )));
        }
        // Raw length counts for every submission, duplicates included.
        self.stats.total_input_bytes += pattern.len() as u64;
        if !self.seen.insert(key.clone()) {
            return Ok(());
        }

        let norm_len = key.len() as u32;
        if self.distinct_count() == 0 {
            self.stats.smallest_pattern_length = norm_len;
            self.stats.largest_pattern_length = norm_len;
        } else {
            self.stats.smallest_pattern_length = self.stats.smallest_pattern_length.min(norm_len);
            self.stats.largest_pattern_length = self.stats.largest_pattern_length.max(norm_len);
        }

        if key.len() <= 4 {
            self.short.insert(pack_short_key(&key));
            self.stats.short_pattern_count += 1;
        } else {
            let idx = self.patterns.len() as u32;
            let off = self.blob.len() as u32;
            self.blob.extend_from_slice(&key);
            self.patterns.push(PatternRef { off, len: norm_len });
            self.trie.insert(&key, idx);
            self.stats.stored_pattern_count += 1;
            self.stats.total_stored_bytes += u64::from(norm_len);
        }
        Ok(())
    }

    /// Statistics over patterns added so far.
    pub fn stats(&self) -> PatternStoreStats {
        self.stats
    }

    /// Build failure links, serialize all sections, and commit the store.
    pub fn finalize(self) -> Result<PatternStoreStats> {
        let stats = self.stats;
        let (path, owned) = self.into_parts();
        StoreWriter::new(&path).write(&owned.as_parts())?;
        tracing::debug!(
            path = %path.display(),
            short = stats.short_pattern_count,
            stored = stats.stored_pattern_count,
            "compiled pattern store"
        );
        Ok(stats)
    }

    /// Like `finalize`, but yields the serialized image instead of writing
    /// it out. Used by the matcher's compile-on-open convenience paths.
    pub(crate) fn finalize_to_bytes(self) -> Result<Vec<u8>> {
        let (_path, owned) = self.into_parts();
        Ok(crate::store::writer::encode(&owned.as_parts()))
    }

    fn into_parts(self) -> (PathBuf, OwnedParts) {
        let short_keys: Vec<u64> = self.short.into_iter().collect();
        (
            self.path,
            OwnedParts {
                opts: self.opts,
                stats: self.stats,
                short_keys,
                auto: self.trie.finish(),
                patterns: self.patterns,
                blob: self.blob,
            },
        )
    }

    fn distinct_count(&self) -> u32 {
        self.stats.stored_pattern_count + self.stats.short_pattern_count
    }

    /// Compile a newline-delimited pattern list file into a store at
    /// `output_path`.
    pub fn compile_from_filename(
        output_path: impl AsRef<Path>,
        input_path: impl AsRef<Path>,
        opts: CompileOptions,
    ) -> Result<PatternStoreStats> {
        let buf = std::fs::read(input_path.as_ref())?;
        Self::compile_from_buffer(output_path, &buf, opts)
    }

    /// Compile patterns from an in-memory newline-delimited buffer.
    pub fn compile_from_buffer(
        output_path: impl AsRef<Path>,
        buffer: &[u8],
        opts: CompileOptions,
    ) -> Result<PatternStoreStats> {
        let mut c = Compiler::new(output_path, opts);
        c.add_pattern_lines(buffer)?;
        c.finalize()
    }

    pub(crate) fn add_pattern_lines(&mut self, buffer: &[u8]) -> Result<()> {
        for line in buffer.split(|&b| b == b'\n') {
            let line = match line.last() {
                Some(b'\r') => &line[..line.len() - 1],
                _ => line,
            };
            if line.is_empty() {
                continue;
            }
            self.add_pattern(line)?;
        }
        Ok(())
    }
}

struct OwnedParts {
    opts: CompileOptions,
    stats: PatternStoreStats,
    short_keys: Vec<u64>,
    auto: crate::automaton::Automaton,
    patterns: Vec<PatternRef>,
    blob: Vec<u8>,
}

impl OwnedParts {
    fn as_parts(&self) -> StoreParts<'_> {
        StoreParts {
            case_insensitive: self.opts.case_insensitive,
            ignore_punctuation: self.opts.ignore_punctuation,
            stats: self.stats,
            short_keys: &self.short_keys,
            auto: &self.auto,
            patterns: &self.patterns,
            blob: &self.blob,
        }
    }
}

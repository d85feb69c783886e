//! Multi-pattern literal matcher: compile a set of byte patterns into a
//! compact on-disk store, then scan haystacks for every occurrence.
//!
//! Patterns are split by normalized length into a packed-key hash table
//! (<= 4 bytes) and an Aho-Corasick automaton over a shared byte blob
//! (>= 5 bytes). Matching composes case folding, punctuation skipping,
//! word/line anchoring and overlap resolution; scans parallelize over
//! haystack chunks.

pub mod automaton;
pub mod compile;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod store;

pub use crate::compile::{CompileOptions, Compiler};
pub use crate::error::{Error, Result};
pub use crate::matcher::{Match, MatchOptions, MatchStats, Matcher};
pub use crate::store::{PatternStore, PatternStoreStats};

/// Crate version as a `major.minor.patch` string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Convenience one-shot: compile a newline-delimited pattern list file into
/// a store at `out` and return the compile-time statistics.
pub fn compile_pattern_file(
    out: impl AsRef<std::path::Path>,
    input: impl AsRef<std::path::Path>,
    opts: CompileOptions,
) -> Result<PatternStoreStats> {
    Compiler::compile_from_filename(out, input, opts)
}

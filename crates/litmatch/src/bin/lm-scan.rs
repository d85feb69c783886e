use anyhow::Result;
use clap::Parser;
use litmatch::{CompileOptions, MatchOptions, Matcher, PatternStore};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lm-scan",
    about = "Scan a file against a compiled store or raw pattern list"
)]
struct Args {
    /// Compiled store, or a raw pattern list (detected by magic)
    patterns: std::path::PathBuf,
    /// File to scan
    file: std::path::PathBuf,
    #[arg(long)]
    case_insensitive: bool,
    #[arg(long)]
    ignore_punct: bool,
    #[arg(long)]
    longest_only: bool,
    #[arg(long)]
    no_overlap: bool,
    #[arg(long)]
    word_boundary: bool,
    #[arg(long)]
    word_prefix: bool,
    #[arg(long)]
    word_suffix: bool,
    #[arg(long)]
    line_start: bool,
    #[arg(long)]
    line_end: bool,
    /// Worker threads (0 = platform default)
    #[arg(long, default_value_t = 0)]
    threads: i32,
    /// Scan chunk size in bytes (0 = default 4096)
    #[arg(long, default_value_t = 0)]
    chunk_size: i64,
    /// Emit matches as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    let args = Args::parse();

    let raw = std::fs::read(&args.patterns)?;
    let compile_opts = CompileOptions {
        case_insensitive: args.case_insensitive,
        ignore_punctuation: args.ignore_punct,
    };
    let mut matcher = if raw.len() >= 4 && raw[..4] == litmatch::store::MAGIC.to_le_bytes() {
        Matcher::from_store(PatternStore::from_bytes(&raw)?)?
    } else {
        Matcher::from_buffer(&raw, compile_opts)?
    };
    matcher.set_threads(args.threads)?;
    matcher.set_chunk_size(args.chunk_size)?;

    let opts = MatchOptions {
        case_insensitive: args.case_insensitive,
        ignore_punctuation: args.ignore_punct,
        longest_only: args.longest_only,
        no_overlap: args.no_overlap,
        word_boundary: args.word_boundary,
        word_prefix: args.word_prefix,
        word_suffix: args.word_suffix,
        line_start: args.line_start,
        line_end: args.line_end,
    };
    let haystack = std::fs::read(&args.file)?;
    let matches = matcher.scan(&haystack, &opts)?;

    for m in &matches {
        let text = String::from_utf8_lossy(m.bytes);
        if args.json {
            println!(
                "{}",
                json!({ "offset": m.offset, "length": m.length, "match": text })
            );
        } else {
            println!("{}\t{}\t{}", m.offset, m.length, text);
        }
    }
    tracing::info!(
        hits = matches.len(),
        bytes = haystack.len(),
        "scan finished"
    );
    Ok(())
}

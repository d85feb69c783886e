use anyhow::Result;
use clap::Parser;
use litmatch::{CompileOptions, Compiler};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lm-compile", about = "Compile a pattern list into a store")]
struct Args {
    /// Newline-delimited pattern list
    input: std::path::PathBuf,
    /// Output store path
    out: std::path::PathBuf,
    /// Fold ASCII case during comparison
    #[arg(long)]
    case_insensitive: bool,
    /// Ignore ASCII punctuation during comparison
    #[arg(long)]
    ignore_punct: bool,
    /// Print compile statistics as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    let args = Args::parse();
    let opts = CompileOptions {
        case_insensitive: args.case_insensitive,
        ignore_punctuation: args.ignore_punct,
    };
    let stats = Compiler::compile_from_filename(&args.out, &args.input, opts)?;
    if args.json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!(
            "wrote {}: {} short + {} stored patterns, {} blob bytes, lengths {}..{}",
            args.out.display(),
            stats.short_pattern_count,
            stats.stored_pattern_count,
            stats.total_stored_bytes,
            stats.smallest_pattern_length,
            stats.largest_pattern_length
        );
    }
    Ok(())
}

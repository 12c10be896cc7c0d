//! request-preprocess: Normalize JSON records with a preprocessing plan
//!
//! Usage:
//!   # Read a JSON document from a file
//!   request-preprocess --plan plan.json request.json
//!
//!   # Process a top-level array element by element, from stdin
//!   cat requests.json | request-preprocess --plan plan.json --compact
//!
//!   # Process newline-delimited JSON
//!   request-preprocess --plan plan.json --ndjson events.jsonl
//!
//! Set RUST_LOG=request_preprocessor=debug to see which handlers ran.

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use request_preprocessor::{preprocess_json, CompiledPlan, PreprocessPlan};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "request-preprocess")]
#[command(about = "Normalize JSON records with a preprocessing plan", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Plan file naming the transformers and modifiers to run
    #[arg(long, short = 'p', value_name = "PLAN")]
    plan: String,

    /// Process newline-delimited JSON (one JSON object per line)
    #[arg(long)]
    ndjson: bool,

    /// Write single-line JSON instead of pretty-printed output
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let plan = PreprocessPlan::from_path(&args.plan)?
        .compile::<Value>()
        .with_context(|| format!("Invalid plan: {}", args.plan))?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open input: {path}"))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let count = if args.ndjson {
        preprocess_json(reader, &mut out, &plan)?
    } else {
        process_document(reader, &mut out, &plan, args.compact)?
    };

    out.flush()?;
    info!(records = count, "preprocessing complete");
    Ok(())
}

/// Process one JSON document using SIMD-accelerated parsing.
/// A top-level array is treated as a list of records.
fn process_document<W: Write>(
    mut reader: Box<dyn BufRead>,
    writer: &mut W,
    plan: &CompiledPlan<Value>,
    compact: bool,
) -> Result<usize> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;

    let mut document: Value =
        simd_json::serde::from_slice(&mut content).context("Failed to parse JSON input")?;

    let count = match &mut document {
        Value::Array(records) => {
            for (index, record) in records.iter_mut().enumerate() {
                plan.apply(record)
                    .with_context(|| format!("Failed to preprocess record {index}"))?;
            }
            records.len()
        }
        record => {
            plan.apply(record)?;
            1
        }
    };

    if compact {
        serde_json::to_writer(&mut *writer, &document)?;
    } else {
        serde_json::to_writer_pretty(&mut *writer, &document)?;
    }
    writeln!(writer)?;

    Ok(count)
}

pub mod cli;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

pub use error::{Error, Result};
pub use model::{Field, FieldKind, GeometryBlock, GeometryKind, Step, Summary, Warning};

use std::fs;
use std::path::Path;

use anyhow::Context;
use log::info;

/// Summarise VTF text. Never fails: whatever can't be understood ends up in
/// `Summary::warnings`.
pub fn parse(text: &str) -> Summary {
    processor::assemble(parser::BlockReader::new(text))
}

/// Read and summarise a file.
pub fn load(path: &Path) -> Result<Summary> {
    let text = parser::read_source(path)?;
    Ok(parse(&text))
}

pub fn run(args: &cli::Cli) -> anyhow::Result<()> {
    info!(input = args.input.display().to_string(); "Inspecting VTF file");

    // 1. ── Parse ──────────────────────────────────────────────────────
    let summary =
        load(&args.input).with_context(|| format!("Inspecting {}", args.input.display()))?;
    if args.strict && summary.block_count == 0 {
        return Err(Error::NoBlocks {
            path: args.input.clone(),
        }
        .into());
    }
    info!(
        steps = summary.steps.len(),
        warnings = summary.warnings.len();
        "File summarised"
    );

    // 2. ── Render ─────────────────────────────────────────────────────
    let rendered = if args.json {
        writer::json::render(&summary).with_context(|| "Serialising summary")?
    } else {
        writer::report::render(&summary)
    };

    // 3. ── Write output ───────────────────────────────────────────────
    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Writing {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(())
}

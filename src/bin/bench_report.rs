use clap::Parser;
use std::{fs, path::PathBuf};

use linksneo4j::{logging, ReportError, ResultsTable};

#[derive(Parser, Debug)]
#[command(name = "bench-report")]
#[command(about = "Builds the Doublets vs Neo4j comparison table from bencher output")]
struct Args {
    /// Output of `cargo bench -- --output-format bencher`.
    #[arg(long, default_value = "out.txt")]
    input: PathBuf,

    /// Where the Markdown table is written.
    #[arg(long, default_value = "results.md")]
    output: PathBuf,

    /// Render the table even when some benchmarks have no result.
    #[arg(long)]
    allow_missing: bool,
}

fn main() {
    logging::init_tracing();
    if let Err(err) = run(Args::parse()) {
        tracing::error!(error = %err, "bench-report failed");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), ReportError> {
    let text = fs::read_to_string(&args.input)?;
    let table = ResultsTable::parse(&text)?;

    if args.allow_missing {
        let missing = table.missing();
        if !missing.is_empty() {
            tracing::warn!(count = missing.len(), missing = %missing.join(", "), "rendering incomplete table");
        }
    } else {
        table.check_complete()?;
    }

    let markdown = table.to_markdown();
    println!("{markdown}");
    fs::write(&args.output, format!("{markdown}\n"))?;
    tracing::info!(output = %args.output.display(), "wrote results table");
    Ok(())
}

use anyhow::Result;
use ascconv::{config::UnionConfig, logging, pipeline::union};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "union-pedimentos")]
#[command(
    about = "Collapse pedimento detail rows into one row per Pedimento, summing PrecioUnitario"
)]
struct Args {
    /// Input files, or directories to search for .txt/.asc files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the workbook and CSV (default: next to each input)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    logging::init("info");

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{:#}", e);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = UnionConfig::default();
    info!(key = %config.plan.key, "union by key");
    let summary = union::run(&args.inputs, args.output.as_deref(), &config)?;
    info!(
        converted = summary.converted,
        empty = summary.empty,
        failed = summary.failed,
        "all done"
    );
    Ok(())
}

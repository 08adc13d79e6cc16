use anyhow::Result;
use ascconv::{config::BulkConfig, logging, pipeline::bulk};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "ascconv")]
#[command(about = "Convert pipe-delimited .asc extracts into Excel workbooks")]
struct Args {
    /// Directory containing .asc files (searched recursively)
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Directory to save output files (default: <directory>/processed_output)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init("info");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) run; failures are reported, never turned into an exit code ──
    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{:#}", e);
    }
}

fn run(args: &Args) -> Result<()> {
    info!("startup");
    let config = BulkConfig::default();
    let summary = bulk::run(&args.directory, args.output.as_deref(), &config)?;
    info!(
        converted = summary.converted,
        empty = summary.empty,
        failed = summary.failed,
        "all done"
    );
    Ok(())
}

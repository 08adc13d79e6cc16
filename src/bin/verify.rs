use anyhow::{Context, Result};
use ascconv::{
    config::UnionConfig,
    discover::collect_inputs,
    logging,
    verify::{verify_file, FileReport},
};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "verify")]
#[command(about = "Check the union-by-Pedimento invariants for pipe-delimited extracts")]
struct Args {
    /// Input files, or directories to search for .txt/.asc files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Print a JSON report instead of the PASS/FAIL table
    #[arg(long)]
    json: bool,
}

fn main() {
    logging::init("warn");

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{:#}", e);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = UnionConfig::default();

    // 1) Expand directories into files
    let files = collect_inputs(&args.inputs, &config.extensions)?;
    if files.is_empty() {
        info!("no input files found");
        return Ok(());
    }

    // 2) In parallel: union each file in memory and re-check it
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| verify_file(path, &config))
        .collect();

    // 3) Report
    if args.json {
        let out = serde_json::to_string_pretty(&reports).context("serializing report")?;
        println!("{}", out);
        return Ok(());
    }

    for report in &reports {
        println!("\n{}  ({} rows, {} keys)", report.path, report.rows, report.groups);
        if let Some(err) = &report.error {
            println!("  FAIL: {}", err);
            continue;
        }
        for check in &report.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            println!("  {}: {: <30} {}", status, check.name, check.detail);
        }
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    println!("\n{:-<55}", "");
    println!("{: <25} {:>15}", "files checked", reports.len());
    println!("{: <25} {:>15}", "files failing", failed);

    Ok(())
}

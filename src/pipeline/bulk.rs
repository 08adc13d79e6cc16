use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::info;

use crate::config::{BulkConfig, DEFAULT_OUTPUT_DIR};
use crate::discover::discover;
use crate::emit::{write_workbook, Sheet};
use crate::ingest::read_file;
use crate::pipeline::{file_stem, log_coercion, run_batch, BatchSummary, Outcome};
use crate::transform::{bulk, normalize};

pub const SHEET_NAME: &str = "Sheet1";

/// Convert every matching file under `directory` into `<output>/<stem>.xlsx`.
///
/// `output` defaults to `<directory>/processed_output` and is never searched
/// for inputs.
pub fn run(directory: &Path, output: Option<&Path>, config: &BulkConfig) -> Result<BatchSummary> {
    let start = Instant::now();
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| directory.join(DEFAULT_OUTPUT_DIR));

    if output_dir.is_dir() {
        info!("using output directory: {}", output_dir.display());
    } else {
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("creating output directory {}", output_dir.display()))?;
        info!("created output directory: {}", output_dir.display());
    }

    let files = discover(directory, &config.extensions, Some(&output_dir))?;
    if files.is_empty() {
        info!(
            "no .{} files found in {} or subdirectories",
            config.extensions.join("/."),
            directory.display()
        );
        return Ok(BatchSummary::default());
    }
    info!(
        "found {} files to process in {} (recursive)",
        files.len(),
        directory.display()
    );

    let summary = run_batch(&files, |path| convert_file(path, &output_dir, config));
    info!(elapsed = ?start.elapsed(), "bulk conversion done");
    Ok(summary)
}

pub fn output_path(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    Ok(output_dir.join(format!("{}.xlsx", file_stem(input)?)))
}

/// Decode, normalize and coerce one file, then write it as a single sheet.
/// Rows are kept exactly as they are; nothing is grouped.
#[tracing::instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn convert_file(path: &Path, output_dir: &Path, config: &BulkConfig) -> Result<Outcome> {
    let output = output_path(path, output_dir)?;
    info!("processing {} -> {}", path.display(), output.display());

    let records = read_file(path, &config.ingest)
        .with_context(|| format!("reading {}", path.display()))?;
    if records.is_empty() {
        return Ok(Outcome::Empty);
    }

    let mut records = normalize(records, &config.normalize);
    let report = bulk(&mut records, &config.targets);
    log_coercion(path, &report);

    write_workbook(
        &output,
        &[Sheet {
            name: SHEET_NAME,
            records: &records,
        }],
    )?;
    Ok(Outcome::Written(vec![output]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;

    const SAMPLE: &str = "ClaveDocumento|Name|Date|TotalFletes|TotalSeguros|TotalEmbalajes|TotalIncrementables|TotalDeducibles|PesoBrutoMercancia|TipoCambio|ExtraCol
1001|Doc 1 Part 1|2023-01-01|10.5|5.0|1.0|2.0|0.0|100.0|20.5|A
1001|Doc 1 Part 2|2023-01-01|20.0|5.0|1.0|2.0|0.0|50.0|20.5|B
1002|Doc 2 Only|2023-01-02|100.0|10.0|0.0|0.0|5.0|200.0|19.8|C
";

    #[test]
    fn converts_directory_into_default_output() -> Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("test_data.asc"), SAMPLE)?;
        fs::create_dir_all(dir.path().join("sub"))?;
        fs::write(dir.path().join("sub/second.ASC"), SAMPLE)?;

        let summary = run(dir.path(), None, &BulkConfig::default())?;
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failed, 0);

        let out = dir.path().join(DEFAULT_OUTPUT_DIR);
        assert!(out.join("test_data.xlsx").is_file());
        assert!(out.join("second.xlsx").is_file());

        // outputs are not picked up again on a second run
        let again = run(dir.path(), None, &BulkConfig::default())?;
        assert_eq!(again.converted, 2);
        Ok(())
    }

    #[test]
    fn header_only_file_is_skipped_and_batch_continues() -> Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        let out = tempfile::tempdir()?;
        fs::write(dir.path().join("a_empty.asc"), "ClaveDocumento|TotalFletes\n")?;
        fs::write(dir.path().join("b_full.asc"), SAMPLE)?;

        let summary = run(dir.path(), Some(out.path()), &BulkConfig::default())?;
        assert_eq!(
            summary,
            BatchSummary {
                converted: 1,
                empty: 1,
                failed: 0
            }
        );
        assert!(!out.path().join("a_empty.xlsx").exists());
        assert!(out.path().join("b_full.xlsx").is_file());
        Ok(())
    }

    #[test]
    fn undecodable_file_still_converts() -> Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("legacy.asc");
        fs::write(&input, b"ClaveDocumento|Descripci\x81n|TotalFletes\n1001|x\x81y|10.5\n")?;

        let outcome = convert_file(&input, dir.path(), &BulkConfig::default())?;
        assert_eq!(outcome, Outcome::Written(vec![dir.path().join("legacy.xlsx")]));
        Ok(())
    }

    #[test]
    fn no_inputs_is_not_an_error() -> Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        let summary = run(dir.path(), None, &BulkConfig::default())?;
        assert_eq!(summary, BatchSummary::default());
        assert!(dir.path().join(DEFAULT_OUTPUT_DIR).is_dir());
        Ok(())
    }
}

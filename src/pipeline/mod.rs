//! Per-file conversion flows and the batch loop that drives them.

pub mod bulk;
pub mod union;

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::transform::CoercionReport;

/// Result of converting one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Paths of the files written.
    Written(Vec<PathBuf>),
    /// No data rows after the header; nothing was written.
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub empty: usize,
    pub failed: usize,
}

/// Run `convert` over every file. A failing file is logged with its path and
/// cause and the loop moves on; nothing here aborts the batch.
pub fn run_batch<F>(files: &[PathBuf], mut convert: F) -> BatchSummary
where
    F: FnMut(&Path) -> Result<Outcome>,
{
    let mut summary = BatchSummary::default();
    for path in files {
        match convert(path) {
            Ok(Outcome::Written(outputs)) => {
                for out in &outputs {
                    info!(path = %path.display(), "wrote {}", out.display());
                }
                summary.converted += 1;
            }
            Ok(Outcome::Empty) => {
                info!("skipping empty file: {}", path.display());
                summary.empty += 1;
            }
            Err(e) => {
                error!("error processing {}: {:#}", path.display(), e);
                summary.failed += 1;
            }
        }
    }
    info!(
        converted = summary.converted,
        empty = summary.empty,
        failed = summary.failed,
        "batch finished"
    );
    summary
}

/// Base name of `path` without its extension, used to name outputs.
pub(crate) fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("no file name in {}", path.display()))
}

/// Values that failed to parse are not reported one by one; one line per
/// file carries the count.
pub(crate) fn log_coercion(path: &Path, report: &CoercionReport) {
    if report.parse_warnings > 0 {
        warn!(
            path = %path.display(),
            count = report.parse_warnings,
            columns = ?report.warning_columns,
            "non-numeric values in aggregation columns set to 0"
        );
    }
    debug!(
        columns = ?report.columns,
        parsed = report.parsed,
        defaulted = report.defaulted,
        "numeric coercion"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_do_not_stop_the_batch() {
        crate::logging::init_test_logging();
        let files: Vec<PathBuf> = ["a.asc", "b.asc", "c.asc", "d.asc"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let mut seen = Vec::new();
        let summary = run_batch(&files, |p| {
            seen.push(p.to_path_buf());
            match p.to_str() {
                Some("b.asc") => Err(anyhow!("boom")),
                Some("c.asc") => Ok(Outcome::Empty),
                _ => Ok(Outcome::Written(vec![p.with_extension("xlsx")])),
            }
        });

        assert_eq!(seen, files);
        assert_eq!(
            summary,
            BatchSummary {
                converted: 2,
                empty: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn stem_drops_only_the_last_extension() -> Result<()> {
        assert_eq!(file_stem(Path::new("/x/1766810_551.txt"))?, "1766810_551");
        assert_eq!(file_stem(Path::new("dir/a.b.asc"))?, "a.b");
        assert!(file_stem(Path::new("/")).is_err());
        Ok(())
    }
}

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::config::UnionConfig;
use crate::discover::collect_inputs;
use crate::emit::{write_csv, write_workbook, Sheet};
use crate::ingest::read_file;
use crate::pipeline::{file_stem, log_coercion, run_batch, BatchSummary, Outcome};
use crate::transform::{normalize, union_by_key};

pub const ORIGINAL_SHEET: &str = "original";
pub const AGGREGATED_SHEET: &str = "agregado";
pub const FINAL_SHEET: &str = "final";

/// Run the union flow over `inputs` (files, or directories to search).
pub fn run(inputs: &[PathBuf], output: Option<&Path>, config: &UnionConfig) -> Result<BatchSummary> {
    if let Some(dir) = output {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let files = collect_inputs(inputs, &config.extensions)?;
    if files.is_empty() {
        info!("nothing to process");
        return Ok(BatchSummary::default());
    }
    info!("found {} files to process", files.len());

    Ok(run_batch(&files, |path| convert_file(path, output, config)))
}

/// `<dir>/<stem>_with_aggregation.xlsx` and `<dir>/<stem>_final.csv`, where
/// `dir` defaults to the input's own directory.
pub fn output_paths(input: &Path, output_dir: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
    let stem = file_stem(input)?;
    let dir = match output_dir {
        Some(d) => d.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    Ok((
        dir.join(format!("{}_with_aggregation.xlsx", stem)),
        dir.join(format!("{}_final.csv", stem)),
    ))
}

/// Collapse one file to a row per key and write the workbook and CSV.
///
/// Either both outputs exist afterwards or neither does.
#[tracing::instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn convert_file(path: &Path, output_dir: Option<&Path>, config: &UnionConfig) -> Result<Outcome> {
    let (xlsx_path, csv_path) = output_paths(path, output_dir)?;

    let records = read_file(path, &config.ingest)
        .with_context(|| format!("reading {}", path.display()))?;
    if records.is_empty() {
        return Ok(Outcome::Empty);
    }
    let records = normalize(records, &config.normalize);

    let union = union_by_key(records, &config.plan)
        .with_context(|| format!("grouping {} by {}", path.display(), config.plan.key))?;
    log_coercion(path, &union.coercion);

    write_workbook(
        &xlsx_path,
        &[
            Sheet {
                name: ORIGINAL_SHEET,
                records: &union.original,
            },
            Sheet {
                name: AGGREGATED_SHEET,
                records: &union.aggregated,
            },
            Sheet {
                name: FINAL_SHEET,
                records: &union.merged,
            },
        ],
    )?;

    if let Err(e) = write_csv(&csv_path, &union.merged) {
        if let Err(rm) = fs::remove_file(&xlsx_path) {
            warn!(error = %rm, "could not remove {}", xlsx_path.display());
        }
        return Err(e);
    }

    info!(
        rows = union.original.rows.len(),
        groups = union.merged.rows.len(),
        "sheets '{}', '{}' and '{}' written",
        ORIGINAL_SHEET,
        AGGREGATED_SHEET,
        FINAL_SHEET
    );
    Ok(Outcome::Written(vec![xlsx_path, csv_path]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::logging::init_test_logging;

    const PEDIMENTOS: &str = "Pedimento|atente|PrecioUnitario|Descripcion
3001|3420|10.5|Tornillo
3001|3420|20.0|Tuerca
3002|3420|N/A|Arandela
";

    #[test]
    fn writes_workbook_and_final_csv_next_to_input() -> Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("1766810_551.txt");
        fs::write(&input, PEDIMENTOS)?;

        let outcome = convert_file(&input, None, &UnionConfig::default())?;
        let xlsx = dir.path().join("1766810_551_with_aggregation.xlsx");
        let csv = dir.path().join("1766810_551_final.csv");
        assert_eq!(outcome, Outcome::Written(vec![xlsx.clone(), csv.clone()]));
        assert!(xlsx.is_file());

        let text = fs::read_to_string(&csv)?;
        assert_eq!(
            text,
            "Pedimento,Patente,PrecioUnitario,Descripcion\n3001,3420,30.5,Tornillo\n3002,3420,0,Arandela\n"
        );
        Ok(())
    }

    #[test]
    fn missing_columns_fail_with_schema_error() -> Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("sin_precio.txt");
        fs::write(&input, "Pedimento|Descripcion\n1|x\n")?;

        let err = convert_file(&input, None, &UnionConfig::default()).unwrap_err();
        let schema = err
            .downcast_ref::<SchemaError>()
            .expect("schema error in chain");
        assert_eq!(schema.missing, vec!["PrecioUnitario"]);
        assert!(!dir.path().join("sin_precio_final.csv").exists());
        Ok(())
    }

    #[test]
    fn lossy_fallback_output_carries_replacement_marker() -> Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("out");
        let input = dir.path().join("raro.txt");
        fs::write(&input, b"Pedimento|PrecioUnitario|Descripcion\n1|2|a\x81b\n")?;

        let summary = run(&[input], Some(&out), &UnionConfig::default())?;
        assert_eq!(summary.converted, 1);
        let text = fs::read_to_string(out.join("raro_final.csv"))?;
        assert!(text.contains("a\u{FFFD}b"));
        Ok(())
    }

    #[test]
    fn batch_continues_past_bad_files() -> Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.txt"), "Otro|Campo\n1|2\n")?;
        fs::write(dir.path().join("b.txt"), "Pedimento|PrecioUnitario\n")?;
        fs::write(dir.path().join("c.txt"), PEDIMENTOS)?;

        let summary = run(&[dir.path().to_path_buf()], None, &UnionConfig::default())?;
        assert_eq!(
            summary,
            BatchSummary {
                converted: 1,
                empty: 1,
                failed: 1
            }
        );
        assert!(dir.path().join("c_final.csv").is_file());
        Ok(())
    }
}

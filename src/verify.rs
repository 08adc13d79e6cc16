//! Independent re-check of the union flow's output against its input.

use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

use crate::config::UnionConfig;
use crate::error::SchemaError;
use crate::ingest::read_file;
use crate::table::{RecordSet, Value};
use crate::transform::{coerce_numeric, normalize, union_by_key, UnionPlan};

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl Check {
    fn new(name: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub rows: usize,
    pub groups: usize,
    pub checks: Vec<Check>,
    pub error: Option<String>,
}

impl FileReport {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.checks.iter().all(|c| c.passed)
    }
}

/// Read, normalize and union one file, then check the result.
pub fn verify_file(path: &Path, config: &UnionConfig) -> FileReport {
    let mut report = FileReport {
        path: path.display().to_string(),
        rows: 0,
        groups: 0,
        checks: Vec::new(),
        error: None,
    };

    let records = match read_file(path, &config.ingest) {
        Ok(r) => normalize(r, &config.normalize),
        Err(e) => {
            report.error = Some(e.to_string());
            return report;
        }
    };
    report.rows = records.rows.len();

    match verify_union(&records, &config.plan) {
        Ok((groups, checks)) => {
            report.groups = groups;
            report.checks = checks;
        }
        Err(e) => report.error = Some(e.to_string()),
    }
    report
}

/// Run the union over a copy of `input` and compare it with sums and
/// representatives recomputed straight from the raw rows.
///
/// Returns the number of groups and one check per property.
pub fn verify_union(input: &RecordSet, plan: &UnionPlan) -> Result<(usize, Vec<Check>), SchemaError> {
    let out = union_by_key(input.clone(), plan)?;
    let merged = &out.merged;
    let key_idx = input.column_index(&plan.key).ok_or_else(|| SchemaError {
        missing: vec![plan.key.clone()],
        present: input.columns.clone(),
    })?;
    let target_names = &out.aggregated.columns[1..];
    let targets: Vec<usize> = target_names
        .iter()
        .filter_map(|name| input.column_index(name))
        .collect();

    // key -> (first row, per-target sums), rebuilt without the transform code
    let mut expected: IndexMap<&str, (usize, Vec<f64>)> = IndexMap::new();
    for (row_idx, row) in input.rows.iter().enumerate() {
        let Some(key) = row[key_idx].as_text().filter(|k| !k.trim().is_empty()) else {
            continue;
        };
        let entry = expected
            .entry(key)
            .or_insert_with(|| (row_idx, vec![0.0; targets.len()]));
        for (sum, &t) in entry.1.iter_mut().zip(&targets) {
            *sum += raw_number(&row[t]);
        }
    }

    let mut checks = Vec::new();

    checks.push(Check::new(
        "one row per key",
        merged.rows.len() == expected.len(),
        format!("{} rows for {} distinct keys", merged.rows.len(), expected.len()),
    ));

    let non_numeric = merged
        .rows
        .iter()
        .flat_map(|row| targets.iter().map(move |&t| &row[t]))
        .filter(|v| !v.as_number().is_some_and(f64::is_finite))
        .count();
    checks.push(Check::new(
        "targets numeric",
        non_numeric == 0,
        format!("{} non-numeric target values", non_numeric),
    ));

    for (slot, (&t, name)) in targets.iter().zip(target_names).enumerate() {
        let mismatch = merged.rows.iter().find_map(|row| {
            let key = row[key_idx].as_text()?;
            let want = expected.get(key)?.1[slot];
            let got = row[t].as_number().unwrap_or(f64::NAN);
            (got != want).then(|| format!("key {}: expected {}, got {}", key, want, got))
        });
        checks.push(Check::new(
            format!("sum {}", name),
            mismatch.is_none(),
            mismatch.unwrap_or_else(|| "group sums match input".into()),
        ));
    }

    let pass_through_mismatch = merged.rows.iter().find_map(|row| {
        let key = row[key_idx].as_text()?;
        let (first, _) = expected.get(key)?;
        let source = &input.rows[*first];
        (0..row.len())
            .filter(|c| !targets.contains(c))
            .find(|&c| row[c] != source[c])
            .map(|c| format!("key {}: column {} differs from first row", key, merged.columns[c]))
    });
    checks.push(Check::new(
        "pass-through from first row",
        pass_through_mismatch.is_none(),
        pass_through_mismatch.unwrap_or_else(|| "representative rows match".into()),
    ));

    Ok((expected.len(), checks))
}

fn raw_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        Value::Text(s) => coerce_numeric(s).unwrap_or(0.0),
        Value::Missing => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;

    #[test]
    fn union_output_passes_all_checks() -> Result<()> {
        let input = RecordSet::from_strings(
            ["Pedimento", "PrecioUnitario", "TipoCambio"],
            vec![
                vec!["1001", "10.5", "20.5"],
                vec!["1001", "20.0", "21.0"],
                vec!["1002", "N/A", "19.8"],
                vec!["", "7", "1"],
            ],
        );
        let (groups, checks) = verify_union(&input, &UnionConfig::default().plan)?;
        assert_eq!(groups, 2);
        assert!(checks.iter().all(|c| c.passed), "{:?}", checks);
        assert!(checks.iter().any(|c| c.name == "sum PrecioUnitario"));
        Ok(())
    }

    #[test]
    fn missing_key_column_is_an_error_not_column_zero() {
        let input = RecordSet::from_strings(["Otro", "Total"], vec![vec!["1", "2"]]);
        let plan = UnionPlan {
            key: "Pedimento".into(),
            required: vec![],
            targets: crate::transform::ColumnSelector::new(["Total"], Vec::<String>::new()),
        };
        let err = verify_union(&input, &plan).unwrap_err();
        assert_eq!(err.missing, vec!["Pedimento"]);
    }

    #[test]
    fn verify_file_reports_schema_problems() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("x.txt");
        fs::write(&path, "Pedimento|Otro\n1|2\n")?;
        let report = verify_file(&path, &UnionConfig::default());
        assert!(!report.passed());
        assert!(report.error.as_deref().is_some_and(|e| e.contains("PrecioUnitario")));
        Ok(())
    }

    #[test]
    fn report_serializes_to_json() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ok.txt");
        fs::write(&path, "Pedimento|PrecioUnitario\n1|2\n1|3\n")?;
        let report = verify_file(&path, &UnionConfig::default());
        assert!(report.passed());
        let json = serde_json::to_value(&report)?;
        assert_eq!(json["groups"], 1);
        assert_eq!(json["rows"], 2);
        Ok(())
    }
}

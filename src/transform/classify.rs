use crate::table::{RecordSet, Value};

/// Picks aggregation-target columns by name prefix or by exact name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelector {
    pub prefixes: Vec<String>,
    pub exact: Vec<String>,
}

impl ColumnSelector {
    pub fn new<P, E>(prefixes: P, exact: E) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            exact: exact.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, column: &str) -> bool {
        self.prefixes.iter().any(|p| column.starts_with(p.as_str()))
            || self.exact.iter().any(|e| e == column)
    }

    /// Indices of the target columns present in `columns`, in column order.
    ///
    /// Schemas differ between extracts, so this is evaluated per file.
    pub fn select(&self, columns: &[String]) -> Vec<usize> {
        columns
            .iter()
            .enumerate()
            .filter(|(_, c)| self.matches(c))
            .map(|(i, _)| i)
            .collect()
    }
}

/// What numeric coercion did to one record set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercionReport {
    /// Names of the coerced columns, in column order.
    pub columns: Vec<String>,
    /// Values that parsed as numbers.
    pub parsed: usize,
    /// Empty or missing values set to zero.
    pub defaulted: usize,
    /// Non-empty values that did not parse and were set to zero.
    pub parse_warnings: usize,
    /// Columns with at least one parse warning.
    pub warning_columns: Vec<String>,
}

/// Parse a numeric field. Surrounding whitespace and `,` thousands
/// separators are ignored; `NaN` and infinities are rejected.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let cleaned = if trimmed.contains(',') {
        trimmed.replace(',', "")
    } else {
        trimmed.to_string()
    };
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Replace every value of the `targets` columns with a number.
///
/// Coercion policy: anything that is not a number becomes exactly `0.0`.
/// Blank input is zero without comment; non-blank input that fails to parse
/// is zero and counted in `parse_warnings`. Other columns are left as-is.
pub fn coerce(records: &mut RecordSet, targets: &[usize]) -> CoercionReport {
    let mut report = CoercionReport {
        columns: targets.iter().map(|&i| records.columns[i].clone()).collect(),
        ..Default::default()
    };
    let mut warned = vec![false; targets.len()];

    for row in &mut records.rows {
        for (slot, &col) in targets.iter().enumerate() {
            let number = match &row[col] {
                Value::Number(n) => {
                    report.parsed += 1;
                    *n
                }
                Value::Missing => {
                    report.defaulted += 1;
                    0.0
                }
                Value::Text(s) if s.trim().is_empty() => {
                    report.defaulted += 1;
                    0.0
                }
                Value::Text(s) => match coerce_numeric(s) {
                    Some(n) => {
                        report.parsed += 1;
                        n
                    }
                    None => {
                        report.parse_warnings += 1;
                        warned[slot] = true;
                        0.0
                    }
                },
            };
            row[col] = Value::Number(number);
        }
    }

    report.warning_columns = targets
        .iter()
        .zip(&warned)
        .filter(|&(_, &w)| w)
        .map(|(&i, _)| records.columns[i].clone())
        .collect();
    report
}

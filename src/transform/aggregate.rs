use indexmap::{map::Entry, IndexMap};
use tracing::{debug, warn};

use crate::error::SchemaError;
use crate::table::{RecordSet, Value};
use crate::transform::classify::{coerce, ColumnSelector, CoercionReport};

/// Bulk flow: coerce the target columns in place. Rows are neither merged nor
/// reordered.
pub fn bulk(records: &mut RecordSet, targets: &ColumnSelector) -> CoercionReport {
    let selected = targets.select(&records.columns);
    debug!(targets = selected.len(), rows = records.rows.len(), "bulk coercion");
    coerce(records, &selected)
}

/// How to collapse rows into one row per document.
#[derive(Debug, Clone)]
pub struct UnionPlan {
    /// Column whose raw value identifies a group.
    pub key: String,
    /// Columns that must be present for the plan to apply, key included.
    pub required: Vec<String>,
    /// Columns summed across each group. The key is never summed.
    pub targets: ColumnSelector,
}

impl UnionPlan {
    pub fn check_schema(&self, records: &RecordSet) -> Result<(), SchemaError> {
        let missing: Vec<String> = std::iter::once(&self.key)
            .chain(self.required.iter().filter(|r| **r != self.key))
            .filter(|name| records.column_index(name).is_none())
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError {
                missing,
                present: records.columns.clone(),
            })
        }
    }
}

/// The three views produced by the union flow. `aggregated` and `merged`
/// share the same first-appearance key order.
#[derive(Debug, Clone)]
pub struct UnionOutput {
    /// Every input row, targets coerced.
    pub original: RecordSet,
    /// Key plus the summed target columns, one row per key.
    pub aggregated: RecordSet,
    /// One row per key with the full schema: pass-through values from the
    /// first row of the group, targets replaced by the group sums.
    pub merged: RecordSet,
    pub coercion: CoercionReport,
    /// Rows left out of grouping because their key was empty.
    pub missing_keys: usize,
}

struct Group {
    first_row: usize,
    sums: Vec<f64>,
}

/// Union flow: one output row per distinct key value, in order of first
/// appearance.
///
/// The first row seen for a key is the representative for every pass-through
/// column. Target columns hold the sum of the coerced values of all rows in
/// the group, added in input order so the result does not depend on anything
/// but the input.
pub fn union_by_key(mut records: RecordSet, plan: &UnionPlan) -> Result<UnionOutput, SchemaError> {
    plan.check_schema(&records)?;
    let key_idx = records
        .column_index(&plan.key)
        .ok_or_else(|| SchemaError {
            missing: vec![plan.key.clone()],
            present: records.columns.clone(),
        })?;

    let targets: Vec<usize> = plan
        .targets
        .select(&records.columns)
        .into_iter()
        .filter(|&i| i != key_idx)
        .collect();
    let coercion = coerce(&mut records, &targets);

    let mut groups: IndexMap<String, Group> = IndexMap::new();
    let mut missing_keys = 0;
    for (row_idx, row) in records.rows.iter().enumerate() {
        let key = match &row[key_idx] {
            Value::Text(k) if !k.trim().is_empty() => k.clone(),
            _ => {
                missing_keys += 1;
                continue;
            }
        };
        let values = targets.iter().map(|&t| row[t].as_number().unwrap_or(0.0));
        match groups.entry(key) {
            Entry::Occupied(mut e) => {
                for (sum, v) in e.get_mut().sums.iter_mut().zip(values) {
                    *sum += v;
                }
            }
            Entry::Vacant(e) => {
                e.insert(Group {
                    first_row: row_idx,
                    sums: values.collect(),
                });
            }
        }
    }

    if missing_keys > 0 {
        warn!(
            key = %plan.key,
            rows = missing_keys,
            "rows without a key left out of grouping"
        );
    }

    let target_names: Vec<String> = targets.iter().map(|&t| records.columns[t].clone()).collect();
    let mut aggregated = RecordSet::new(
        std::iter::once(plan.key.clone()).chain(target_names).collect(),
        Vec::with_capacity(groups.len()),
    );
    let mut merged = RecordSet::new(records.columns.clone(), Vec::with_capacity(groups.len()));

    for (key, group) in &groups {
        let mut row = records.rows[group.first_row].clone();
        for (&t, &sum) in targets.iter().zip(&group.sums) {
            row[t] = Value::Number(sum);
        }
        merged.rows.push(row);

        aggregated.rows.push(
            std::iter::once(Value::Text(key.clone()))
                .chain(group.sums.iter().map(|&s| Value::Number(s)))
                .collect(),
        );
    }

    debug!(
        rows = records.rows.len(),
        groups = groups.len(),
        "union by {}",
        plan.key
    );

    Ok(UnionOutput {
        original: records,
        aggregated,
        merged,
        coercion,
        missing_keys,
    })
}

use std::collections::HashSet;
use tracing::debug;

use crate::config::NormalizeRules;
use crate::table::RecordSet;

/// Clean up column names: strip BOM artifacts and surrounding whitespace,
/// apply the configured aliases, then make names unique.
///
/// Row values and row order are never touched, and running it on its own
/// output changes nothing.
pub fn normalize(mut records: RecordSet, rules: &NormalizeRules) -> RecordSet {
    let renamed: Vec<String> = records
        .columns
        .iter()
        .map(|raw| {
            let cleaned = clean_column_name(raw);
            let canonical = rules.canonical(&cleaned).to_string();
            if canonical != *raw {
                debug!(from = %raw, to = %canonical, "renamed column");
            }
            canonical
        })
        .collect();

    records.columns = dedupe(renamed);
    records
}

/// Trim whitespace and drop byte-order marks left over from decoding.
pub fn clean_column_name(raw: &str) -> String {
    raw.replace('\u{FEFF}', "").trim().to_string()
}

impl NormalizeRules {
    /// Follow aliases until a name has none. Bounded, so a cycle in the
    /// table cannot loop forever.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        let mut current = name;
        for _ in 0..=self.aliases.len() {
            match self.aliases.iter().find(|(from, _)| from == current) {
                Some((_, to)) if to != current => current = to.as_str(),
                _ => break,
            }
        }
        current
    }
}

/// Later duplicates of `X` become `X.1`, `X.2`, ...
fn dedupe(names: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .map(|name| {
            if used.insert(name.clone()) {
                return name;
            }
            let mut n = 1;
            let unique = loop {
                let candidate = format!("{}.{}", name, n);
                if !used.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            };
            used.insert(unique.clone());
            unique
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn sample() -> RecordSet {
        RecordSet::from_strings(
            ["\u{FEFF}Pedimento", " atente ", "PrecioUnitario\t", "Total"],
            vec![vec!["1", "3420", "1.5", "x"], vec!["2", "3420", "", "y"]],
        )
    }

    #[test]
    fn trims_strips_bom_and_applies_aliases() {
        let rs = normalize(sample(), &NormalizeRules::default());
        assert_eq!(rs.columns, vec!["Pedimento", "Patente", "PrecioUnitario", "Total"]);
    }

    #[test]
    fn leaves_values_and_order_alone() {
        let before = sample();
        let after = normalize(before.clone(), &NormalizeRules::default());
        assert_eq!(after.rows, before.rows);
        assert_eq!(after.rows[1][2], Value::Missing);
    }

    #[test]
    fn is_idempotent() {
        let rules = NormalizeRules::default();
        let once = normalize(sample(), &rules);
        let twice = normalize(once.clone(), &rules);
        assert_eq!(once, twice);
    }

    #[test]
    fn alias_onto_existing_name_is_made_unique() {
        let rs = RecordSet::from_strings(["Patente", "patente", " Patente"], Vec::<Vec<&str>>::new());
        let rs = normalize(rs, &NormalizeRules::default());
        assert_eq!(rs.columns, vec!["Patente", "Patente.1", "Patente.2"]);
        assert_eq!(normalize(rs.clone(), &NormalizeRules::default()), rs);
    }

    #[test]
    fn chained_aliases_resolve_fully() {
        let rules = NormalizeRules {
            aliases: vec![("a".into(), "b".into()), ("b".into(), "c".into())],
        };
        assert_eq!(rules.canonical("a"), "c");
        let cyclic = NormalizeRules {
            aliases: vec![("x".into(), "y".into()), ("y".into(), "x".into())],
        };
        // terminates
        let _ = cyclic.canonical("x");
    }
}

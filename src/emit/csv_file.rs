use anyhow::{Context, Result};
use std::path::Path;

use crate::table::{RecordSet, Value};

/// Write `records` as comma-separated UTF-8 with a header row.
pub fn write_csv(path: &Path, records: &RecordSet) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating csv {}", path.display()))?;
    wtr.write_record(&records.columns)?;
    for row in &records.rows {
        wtr.write_record(row.iter().map(Value::render))?;
    }
    wtr.flush()
        .with_context(|| format!("flushing csv {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_header_and_rendered_values() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("final.csv");
        let rs = RecordSet::new(
            vec!["Pedimento".into(), "PrecioUnitario".into(), "Descripcion".into()],
            vec![
                vec![
                    Value::Text("3001".into()),
                    Value::Number(30.5),
                    Value::Text("Tornillo, acero".into()),
                ],
                vec![Value::Text("3002".into()), Value::Number(4.0), Value::Missing],
            ],
        );
        write_csv(&path, &rs)?;

        let text = fs::read_to_string(&path)?;
        assert_eq!(
            text,
            "Pedimento,PrecioUnitario,Descripcion\n3001,30.5,\"Tornillo, acero\"\n3002,4,\n"
        );
        Ok(())
    }
}

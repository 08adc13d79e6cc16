use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::debug;

use crate::table::{RecordSet, Value};

/// One named worksheet to write.
pub struct Sheet<'a> {
    pub name: &'a str,
    pub records: &'a RecordSet,
}

/// Write `sheets` into a new workbook at `path`, replacing any existing file.
///
/// Header row in bold, numbers as numeric cells, text as strings, missing
/// values left blank.
pub fn write_workbook(path: &Path, sheets: &[Sheet<'_>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet.name)
            .with_context(|| format!("invalid sheet name {:?}", sheet.name))?;

        for (col, name) in sheet.records.columns.iter().enumerate() {
            let col = u16::try_from(col).context("too many columns for a worksheet")?;
            worksheet.write_string_with_format(0, col, name, &header_format)?;
        }

        for (row_idx, row) in sheet.records.rows.iter().enumerate() {
            let xl_row = u32::try_from(row_idx + 1).context("too many rows for a worksheet")?;
            for (col, value) in row.iter().enumerate() {
                let col = u16::try_from(col).context("too many columns for a worksheet")?;
                match value {
                    Value::Missing => {}
                    Value::Text(s) => {
                        worksheet.write_string(xl_row, col, s)?;
                    }
                    Value::Number(n) => {
                        worksheet.write_number(xl_row, col, *n)?;
                    }
                }
            }
        }
        debug!(sheet = sheet.name, rows = sheet.records.rows.len(), "sheet written");
    }

    workbook
        .save(path)
        .with_context(|| format!("saving workbook {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;

    #[test]
    fn writes_multi_sheet_workbook() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.xlsx");
        let rs = RecordSet::new(
            vec!["Pedimento".into(), "PrecioUnitario".into(), "Nota".into()],
            vec![vec![
                Value::Text("1".into()),
                Value::Number(2.5),
                Value::Missing,
            ]],
        );

        write_workbook(
            &path,
            &[
                Sheet { name: "original", records: &rs },
                Sheet { name: "final", records: &rs },
            ],
        )?;

        let bytes = fs::read(&path)?;
        // xlsx is a zip container
        assert!(bytes.starts_with(b"PK"));
        Ok(())
    }

    #[test]
    fn bad_sheet_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let rs = RecordSet::default();
        let result = write_workbook(
            &dir.path().join("bad.xlsx"),
            &[Sheet { name: "a/b", records: &rs }],
        );
        assert!(result.is_err());
    }
}

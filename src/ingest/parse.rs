use csv::ReaderBuilder;
use tracing::debug;

use crate::table::{RecordSet, Value};

#[derive(Debug)]
pub struct ParsedTable {
    pub records: RecordSet,
    /// Lines dropped because their field count did not match the header.
    pub skipped_lines: usize,
}

/// Parse delimited text whose first record is the header.
///
/// Quotes carry no meaning, so a stray `"` stays inside its field and
/// cannot swallow the lines after it. Lines with the wrong number of fields
/// are dropped and counted. A trailing
/// delimiter on the header line (an empty last column name) is tolerated by
/// dropping that column, together with the matching empty field on data lines.
pub fn parse_delimited(text: &str, delimiter: u8) -> ParsedTable {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true) // field-count mismatches are handled below, not by the reader
        .quoting(false) // `"` is data here (inch marks in descriptions)
        .from_reader(text.as_bytes());

    let mut records = rdr.records();
    let mut skipped_lines = 0;

    let mut columns: Vec<String> = loop {
        match records.next() {
            Some(Ok(header)) => break header.iter().map(str::to_string).collect(),
            Some(Err(e)) => {
                debug!(error = %e, "unreadable header line, trying next line");
                skipped_lines += 1;
            }
            None => {
                return ParsedTable {
                    records: RecordSet::default(),
                    skipped_lines,
                }
            }
        }
    };

    let trailing_delimiter = columns.len() > 1 && columns.last().is_some_and(|c| c.is_empty());
    if trailing_delimiter {
        columns.pop();
    }
    let width = columns.len();

    let mut rows = Vec::new();
    for (idx, result) in records.enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(line = idx + 2, error = %e, "unreadable line skipped");
                skipped_lines += 1;
                continue;
            }
        };

        let mut fields: Vec<&str> = record.iter().collect();
        if trailing_delimiter && fields.len() == width + 1 && fields[width].is_empty() {
            fields.pop();
        }
        if fields.len() != width {
            debug!(
                line = idx + 2,
                expected = width,
                found = fields.len(),
                "malformed line skipped"
            );
            skipped_lines += 1;
            continue;
        }

        rows.push(fields.into_iter().map(Value::from_field).collect());
    }

    ParsedTable {
        records: RecordSet::new(columns, rows),
        skipped_lines,
    }
}

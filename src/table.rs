/// One cell of a record set.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    /// Raw text as it appeared in the source file.
    Text(String),
    /// Only ever produced by numeric coercion.
    Number(f64),
}

impl Value {
    pub fn from_field(raw: &str) -> Self {
        if raw.is_empty() {
            Value::Missing
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text form used for CSV output and group keys.
    pub fn render(&self) -> String {
        match self {
            Value::Missing => String::new(),
            Value::Text(s) => s.clone(),
            Value::Number(n) => n.to_string(),
        }
    }
}

/// Tabular contents of one input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    /// Column names, from the header row of the file.
    pub columns: Vec<String>,
    /// Each data row, with exactly one value per column.
    pub rows: Vec<Vec<Value>>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Build from string cells; empty strings become `Value::Missing`.
    pub fn from_strings<C, R, S>(columns: C, rows: R) -> Self
    where
        C: IntoIterator<Item = S>,
        R: IntoIterator<Item = Vec<S>>,
        S: AsRef<str>,
    {
        Self {
            columns: columns.into_iter().map(|c| c.as_ref().to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|r| r.iter().map(|v| Value::from_field(v.as_ref())).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }
}

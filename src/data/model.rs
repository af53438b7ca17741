use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single raw cell as read from the source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what spreadsheet readers hand back.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Dates and durations kept as text, they are never scores.
    Date(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // `12.0` prints as `12`, `12.5` as `12.5`
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell without any string parsing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – loader output, labels untouched
// ---------------------------------------------------------------------------

/// A table exactly as the source file described it.
///
/// Every row has `headers.len()` cells; the loader pads short rows with
/// [`CellValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// Source rows skipped because every cell was empty.
    pub blank_rows: usize,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            blank_rows: 0,
        }
    }

    /// Append a row, padding or truncating it to the header width.
    /// Rows with nothing but empty cells are skipped.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        if row.iter().all(CellValue::is_null) {
            self.blank_rows += 1;
            return;
        }
        row.resize(self.headers.len(), CellValue::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Column – the six canonical columns
// ---------------------------------------------------------------------------

/// Canonical columns every normalized table carries.
///
/// Deserializes from either the canonical label (`"Evaluare"`) or the
/// English name (`"evaluation"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "Nume", alias = "name")]
    Name,
    #[serde(rename = "Clasa", alias = "class")]
    Class,
    #[serde(rename = "Proba", alias = "subject")]
    Subject,
    #[serde(rename = "Evaluare", alias = "evaluation")]
    Evaluation,
    #[serde(rename = "Simulare", alias = "mock")]
    Mock,
    #[serde(rename = "Bacalaureat", alias = "final")]
    Final,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Name,
        Column::Class,
        Column::Subject,
        Column::Evaluation,
        Column::Mock,
        Column::Final,
    ];

    /// Header label of the column in the source spreadsheets.
    pub fn label(self) -> &'static str {
        match self {
            Column::Name => "Nume",
            Column::Class => "Clasa",
            Column::Subject => "Proba",
            Column::Evaluation => "Evaluare",
            Column::Mock => "Simulare",
            Column::Final => "Bacalaureat",
        }
    }

    pub fn from_label(label: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.label() == label)
    }

    pub fn is_score(self) -> bool {
        matches!(self, Column::Evaluation | Column::Mock | Column::Final)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one (student, class, subject) observation
// ---------------------------------------------------------------------------

/// One row of the normalized table. `None` is the missing marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub name: Option<String>,
    pub class: Option<String>,
    pub subject: Option<String>,
    pub evaluation: Option<f64>,
    pub mock: Option<f64>,
    pub final_score: Option<f64>,
}

impl Record {
    /// The text value of a label column; `None` for score columns.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Name => self.name.as_deref(),
            Column::Class => self.class.as_deref(),
            Column::Subject => self.subject.as_deref(),
            _ => None,
        }
    }

    /// The value of a score column; `None` for label columns.
    pub fn score(&self, column: Column) -> Option<f64> {
        match column {
            Column::Evaluation => self.evaluation,
            Column::Mock => self.mock,
            Column::Final => self.final_score,
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ScoreTable – the normalized dataset
// ---------------------------------------------------------------------------

/// Normalized records in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoreTable {
    pub records: Vec<Record>,
}

impl ScoreTable {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Copy out the records at `indices`, in the order given.
    pub fn select(&self, indices: &[usize]) -> ScoreTable {
        ScoreTable {
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ScoreTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

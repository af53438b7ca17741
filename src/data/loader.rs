use std::io::Cursor;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Input formats
// ---------------------------------------------------------------------------

/// Tabular formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Excel / OpenDocument workbook; the first worksheet is read.
    Spreadsheet,
    Csv,
    /// Records-oriented JSON: `[{ "Nume": "Ana", "Evaluare": 7 }, ...]`
    Json,
    Parquet,
}

impl InputFormat {
    pub fn from_extension(ext: &str) -> Result<Self, LoadError> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(InputFormat::Spreadsheet),
            "csv" => Ok(InputFormat::Csv),
            "json" => Ok(InputFormat::Json),
            "parquet" | "pq" => Ok(InputFormat::Parquet),
            other => Err(LoadError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a score table from a file.  Dispatch by extension.
pub fn load_file(path: &Path) -> Result<RawTable, LoadError> {
    let format = InputFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    let table = load_bytes(&bytes, format)?;
    log::info!(
        "Loaded {} rows from {} with columns {:?}",
        table.len(),
        path.display(),
        table.headers
    );
    Ok(table)
}

/// Parse an in-memory upload.
pub fn load_bytes(bytes: &[u8], format: InputFormat) -> Result<RawTable, LoadError> {
    let table = match format {
        InputFormat::Spreadsheet => load_spreadsheet(bytes)?,
        InputFormat::Csv => load_csv(bytes)?,
        InputFormat::Json => load_json(bytes)?,
        InputFormat::Parquet => load_parquet(bytes)?,
    };
    log::debug!(
        "Parsed {:?} input: {} rows, {} columns",
        format,
        table.len(),
        table.headers.len()
    );
    if table.blank_rows > 0 {
        log::debug!("Skipped {} blank rows", table.blank_rows);
    }
    Ok(table)
}

/// Header text for column `idx`; blank headers get a positional name.
fn header_label(idx: usize, cell: &CellValue) -> String {
    if cell.is_null() {
        format!("Unnamed: {idx}")
    } else {
        cell.to_string()
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet, first row as header. Format is sniffed from content.
fn load_spreadsheet(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| header_label(i, &spreadsheet_cell(cell)))
            .collect(),
        None => Vec::new(),
    };

    let mut table = RawTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(spreadsheet_cell).collect());
    }
    Ok(table)
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Empty | Data::Error(_) => CellValue::Null,
        other => CellValue::Date(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Cell types are guessed per value.
fn load_csv(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| header_label(i, &CellValue::String(h.to_string())))
        .collect();

    let mut table = RawTable::new(headers);
    for result in reader.records() {
        let record = result?;
        table.push_row(record.iter().map(guess_cell_type).collect());
    }
    Ok(table)
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Nume": "Ana", "Clasa": "12A", "Evaluare": 7, "Simulare": 8 },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys, in order of first appearance.
fn load_json(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let mut table = RawTable::new(headers);
    for obj in objects {
        let row = table
            .headers
            .iter()
            .map(|h| obj.get(h).map(json_cell).unwrap_or(CellValue::Null))
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

fn json_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file: one column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?;
    let headers = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut table = RawTable::new(headers);
    for batch_result in reader {
        let batch = batch_result?;
        if batch.num_columns() != table.headers.len() {
            return Err(LoadError::Malformed(format!(
                "record batch has {} columns, schema has {}",
                batch.num_columns(),
                table.headers.len()
            )));
        }
        for row in 0..batch.num_rows() {
            table.push_row(
                batch
                    .columns()
                    .iter()
                    .map(|col| arrow_cell(col, row))
                    .collect(),
            );
        }
    }
    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            CellValue::Date(array_value_to_string(col, row).unwrap_or_default())
        }
        _ => CellValue::String(array_value_to_string(col, row).unwrap_or_default()),
    }
}

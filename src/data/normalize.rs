use std::collections::BTreeMap;

use super::model::{CellValue, Column, RawTable, Record, ScoreTable};
use crate::config::ColumnAliases;

// ---------------------------------------------------------------------------
// Label cleaning
// ---------------------------------------------------------------------------

/// Trim a header label and fold embedded line breaks into single spaces.
pub fn clean_label(label: &str) -> String {
    label
        .trim()
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Numeric value of a score cell. Anything that is not a finite number
/// becomes missing.
pub fn coerce_score(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::String(s) => s.trim().parse::<f64>().ok()?,
        other => other.as_f64()?,
    };
    value.is_finite().then_some(value)
}

/// Text value of a label cell; empty cells are missing.
pub fn coerce_text(cell: &CellValue) -> Option<String> {
    if cell.is_null() {
        None
    } else {
        Some(cell.to_string())
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Turn a raw table into records over the six canonical columns.
///
/// Total: unknown columns are dropped, absent canonical columns are filled
/// with missing values, unparseable scores become missing.
pub fn normalize(raw: &RawTable, aliases: &ColumnAliases) -> ScoreTable {
    let positions = resolve_columns(&raw.headers, aliases);

    for column in Column::ALL {
        if !positions.contains_key(&column) {
            log::warn!("Column '{column}' not found in input, filling with missing values");
        }
    }

    let cell = |row: &[CellValue], column: Column| -> Option<CellValue> {
        positions
            .get(&column)
            .and_then(|&idx| row.get(idx))
            .cloned()
    };

    let records: Vec<Record> = raw
        .rows
        .iter()
        .map(|row| {
            let row = row.as_slice();
            let text = |column| cell(row, column).as_ref().and_then(coerce_text);
            let score = |column| cell(row, column).as_ref().and_then(coerce_score);
            Record {
                name: text(Column::Name),
                class: text(Column::Class),
                subject: text(Column::Subject),
                evaluation: score(Column::Evaluation),
                mock: score(Column::Mock),
                final_score: score(Column::Final),
            }
        })
        .collect();

    for column in Column::ALL
        .into_iter()
        .filter(|c| c.is_score() && positions.contains_key(c))
    {
        let numeric = records.iter().filter(|r| r.score(column).is_some()).count();
        log::debug!(
            "Column '{column}': {numeric} of {} cells numeric",
            records.len()
        );
    }

    ScoreTable::from_records(records)
}

/// Position of each canonical column among the raw headers.
/// When several headers resolve to the same column the first one wins.
fn resolve_columns(headers: &[String], aliases: &ColumnAliases) -> BTreeMap<Column, usize> {
    let mut positions = BTreeMap::new();
    for (idx, header) in headers.iter().enumerate() {
        let label = clean_label(header);
        let Some(column) = aliases.resolve(&label) else {
            log::debug!("Ignoring extra column '{label}'");
            continue;
        };
        if positions.contains_key(&column) {
            log::warn!("Duplicate source column '{label}' for '{column}', keeping the first");
            continue;
        }
        positions.insert(column, idx);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn raw(headers: &[&str], rows: Vec<Vec<CellValue>>) -> RawTable {
        let mut table = RawTable::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    #[test]
    fn clean_label_trims_and_folds_newlines() {
        assert_eq!(clean_label("  Evaluare \n"), "Evaluare");
        assert_eq!(clean_label("Nota\nfinala"), "Nota finala");
        assert_eq!(clean_label("Nota\r\nfinala"), "Nota finala");
        assert_eq!(clean_label(" \tClasa\t"), "Clasa");
    }

    #[test]
    fn coerce_score_accepts_numbers_only() {
        assert_eq!(coerce_score(&CellValue::Integer(7)), Some(7.0));
        assert_eq!(coerce_score(&CellValue::Float(8.25)), Some(8.25));
        assert_eq!(coerce_score(&s(" 9.5 ")), Some(9.5));
        assert_eq!(coerce_score(&s("1e1")), Some(10.0));
        assert_eq!(coerce_score(&s("absent")), None);
        assert_eq!(coerce_score(&s("7,5")), None);
        assert_eq!(coerce_score(&s("")), None);
        assert_eq!(coerce_score(&s("NaN")), None);
        assert_eq!(coerce_score(&s("inf")), None);
        assert_eq!(coerce_score(&CellValue::Float(f64::NAN)), None);
        assert_eq!(coerce_score(&CellValue::Bool(true)), None);
        assert_eq!(coerce_score(&CellValue::Date("2024-06-01".into())), None);
        assert_eq!(coerce_score(&CellValue::Null), None);
    }

    #[test]
    fn coerce_text_renders_numbers() {
        assert_eq!(coerce_text(&CellValue::Integer(12)), Some("12".into()));
        assert_eq!(coerce_text(&CellValue::Float(12.0)), Some("12".into()));
        assert_eq!(coerce_text(&s("")), None);
        assert_eq!(coerce_text(&CellValue::Null), None);
    }

    #[test]
    fn messy_labels_resolve_to_canonical_columns() {
        let table = normalize(
            &raw(
                &[" Nume ", "Clasa\n", "Proba", "Evaluare", "Simulare", "Bacalaureat "],
                vec![vec![
                    s("Ana"),
                    s("12A"),
                    s("Mate"),
                    CellValue::Integer(7),
                    s("8"),
                    CellValue::Float(9.5),
                ]],
            ),
            &ColumnAliases::default(),
        );
        assert_eq!(
            table.records[0],
            Record {
                name: Some("Ana".into()),
                class: Some("12A".into()),
                subject: Some("Mate".into()),
                evaluation: Some(7.0),
                mock: Some(8.0),
                final_score: Some(9.5),
            }
        );
    }

    #[test]
    fn absent_columns_are_backfilled_and_extras_ignored() {
        let table = normalize(
            &raw(
                &["Observatii", "Nume", "Evaluare"],
                vec![
                    vec![s("x"), s("Ana"), CellValue::Integer(7)],
                    vec![s("y"), s("Bogdan"), s("n/a")],
                ],
            ),
            &ColumnAliases::default(),
        );
        assert_eq!(table.len(), 2);
        for record in &table {
            assert_eq!(record.class, None);
            assert_eq!(record.subject, None);
            assert_eq!(record.mock, None);
            assert_eq!(record.final_score, None);
        }
        assert_eq!(table.records[0].evaluation, Some(7.0));
        assert_eq!(table.records[1].evaluation, None);
    }

    #[test]
    fn empty_source_keeps_zero_rows() {
        let table = normalize(&RawTable::default(), &ColumnAliases::default());
        assert!(table.is_empty());
    }

    #[test]
    fn aliases_rename_source_labels() {
        let aliases = ColumnAliases::default()
            .with("Elev", Column::Name)
            .with("Nota Bac", Column::Final);
        let table = normalize(
            &raw(
                &["Elev", "Nota\nBac"],
                vec![vec![s("Ana"), CellValue::Integer(9)]],
            ),
            &aliases,
        );
        assert_eq!(table.records[0].name.as_deref(), Some("Ana"));
        assert_eq!(table.records[0].final_score, Some(9.0));
    }

    #[test]
    fn first_duplicate_column_wins() {
        let aliases = ColumnAliases::default().with("Nota", Column::Evaluation);
        let table = normalize(
            &raw(
                &["Evaluare", "Nota"],
                vec![vec![CellValue::Integer(5), CellValue::Integer(9)]],
            ),
            &aliases,
        );
        assert_eq!(table.records[0].evaluation, Some(5.0));
    }
}

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{Column, Record, ScoreTable};

// ---------------------------------------------------------------------------
// Filter predicate: one optional equality restriction per dimension
// ---------------------------------------------------------------------------

/// Restriction for one filter dimension.
///
/// `All` is a distinct variant, so no data value can ever be mistaken for
/// "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn only(value: impl Into<String>) -> Self {
        Selection::Only(value.into())
    }

    /// Whether a record value passes this restriction. Missing values only
    /// pass when nothing is restricted.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(wanted.as_str()),
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v.as_str()),
        }
    }
}

/// Active class and subject restrictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub class: Selection,
    pub subject: Selection,
}

impl FilterState {
    pub fn new(class: Selection, subject: Selection) -> Self {
        Self { class, subject }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.class.matches(record.class.as_deref())
            && self.subject.matches(record.subject.as_deref())
    }

    /// Change the class restriction. The subject restriction is reset to
    /// `All` when `table` no longer offers it under the new class.
    pub fn set_class(&mut self, table: &ScoreTable, class: Selection) {
        self.class = class;
        let offered = match &self.subject {
            Selection::All => true,
            Selection::Only(subject) => subject_options(table, &self.class).contains(subject),
        };
        if !offered {
            log::debug!("{:?} not offered for {:?}, resetting", self.subject, self.class);
            self.subject = Selection::All;
        }
    }
}

// ---------------------------------------------------------------------------
// Applying filters
// ---------------------------------------------------------------------------

/// Return indices of records that pass all active filters, in table order.
pub fn filtered_indices(table: &ScoreTable, filters: &FilterState) -> Vec<usize> {
    table
        .iter()
        .enumerate()
        .filter(|(_, record)| filters.matches(record))
        .map(|(i, _)| i)
        .collect()
}

/// The sub-table of records passing all active filters.
pub fn apply(table: &ScoreTable, filters: &FilterState) -> ScoreTable {
    let indices = filtered_indices(table, filters);
    log::debug!("Filter {:?} kept {} of {} rows", filters, indices.len(), table.len());
    table.select(&indices)
}

// ---------------------------------------------------------------------------
// Filter options
// ---------------------------------------------------------------------------

/// Values offered for each dimension under the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub classes: Vec<String>,
    pub subjects: Vec<String>,
}

/// Order for option lists: numeric values first by value, then text.
/// Class codes stored as numbers in a spreadsheet sort as `9, 10, 12`.
fn option_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Sorted distinct non-missing values of a text column.
pub fn distinct_values<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    column: Column,
) -> Vec<String> {
    let mut values: Vec<&str> = records
        .into_iter()
        .filter_map(|r| r.text(column))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    values.sort_by(|a, b| option_order(a, b));
    values.into_iter().map(str::to_string).collect()
}

/// Classes offered before any class restriction is applied.
pub fn class_options(table: &ScoreTable) -> Vec<String> {
    distinct_values(table, Column::Class)
}

/// Subjects offered once the class restriction is applied.
pub fn subject_options(table: &ScoreTable, class: &Selection) -> Vec<String> {
    distinct_values(
        table.iter().filter(|r| class.matches(r.class.as_deref())),
        Column::Subject,
    )
}

pub fn filter_options(table: &ScoreTable, filters: &FilterState) -> FilterOptions {
    FilterOptions {
        classes: class_options(table),
        subjects: subject_options(table, &filters.class),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, class: Option<&str>, subject: Option<&str>) -> Record {
        Record {
            name: Some(name.to_string()),
            class: class.map(str::to_string),
            subject: subject.map(str::to_string),
            ..Record::default()
        }
    }

    fn sample() -> ScoreTable {
        ScoreTable::from_records(vec![
            record("Ana", Some("12B"), Some("Mate")),
            record("Bogdan", Some("12A"), Some("Romana")),
            record("Carmen", Some("12A"), Some("Mate")),
            record("Dan", None, Some("Fizica")),
            record("Elena", Some("12B"), None),
        ])
    }

    fn names(table: &ScoreTable) -> Vec<&str> {
        table.iter().filter_map(|r| r.name.as_deref()).collect()
    }

    #[test]
    fn no_restriction_keeps_everything_in_order() {
        let table = sample();
        assert_eq!(apply(&table, &FilterState::default()), table);
    }

    #[test]
    fn both_predicates_must_hold() {
        let filters = FilterState::new(Selection::only("12A"), Selection::only("Mate"));
        assert_eq!(names(&apply(&sample(), &filters)), vec!["Carmen"]);
        assert_eq!(filtered_indices(&sample(), &filters), vec![2]);
    }

    #[test]
    fn order_is_preserved() {
        let filters = FilterState::new(Selection::All, Selection::only("Mate"));
        assert_eq!(names(&apply(&sample(), &filters)), vec!["Ana", "Carmen"]);
    }

    #[test]
    fn unknown_value_yields_empty_table() {
        let filters = FilterState::new(Selection::only("9Z"), Selection::All);
        assert!(apply(&sample(), &filters).is_empty());
    }

    #[test]
    fn missing_values_never_match_a_restriction() {
        let filters = FilterState::new(Selection::only(""), Selection::All);
        assert!(apply(&sample(), &filters).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let filters = FilterState::new(Selection::only("12B"), Selection::All);
        let once = apply(&sample(), &filters);
        let twice = apply(&once, &filters);
        assert_eq!(once, twice);
    }

    #[test]
    fn options_are_sorted_distinct_and_cascade() {
        let table = sample();
        assert_eq!(class_options(&table), vec!["12A", "12B"]);
        assert_eq!(
            subject_options(&table, &Selection::All),
            vec!["Fizica", "Mate", "Romana"]
        );
        assert_eq!(
            subject_options(&table, &Selection::only("12B")),
            vec!["Mate"]
        );

        let filters = FilterState::new(Selection::only("12A"), Selection::only("Mate"));
        let options = filter_options(&table, &filters);
        assert_eq!(options.classes, vec!["12A", "12B"]);
        assert_eq!(options.subjects, vec!["Mate", "Romana"]);
    }

    #[test]
    fn numeric_classes_sort_by_value() {
        let table = ScoreTable::from_records(vec![
            record("Ana", Some("12"), Some("Mate")),
            record("Bogdan", Some("9"), Some("Mate")),
            record("Carmen", Some("10"), Some("Mate")),
            record("Dan", Some("12B"), Some("Mate")),
            record("Elena", Some("9"), Some("Mate")),
            record("Florin", Some("10A"), Some("Mate")),
        ]);
        assert_eq!(class_options(&table), vec!["9", "10", "12", "10A", "12B"]);
    }

    #[test]
    fn empty_dimension_offers_nothing() {
        let table = ScoreTable::from_records(vec![record("Ana", None, None)]);
        let options = filter_options(&table, &FilterState::default());
        assert!(options.classes.is_empty());
        assert!(options.subjects.is_empty());
        assert_eq!(apply(&table, &FilterState::default()).len(), 1);
    }

    #[test]
    fn changing_class_resets_unavailable_subject() {
        let table = sample();
        let mut filters = FilterState::new(Selection::only("12A"), Selection::only("Romana"));
        filters.set_class(&table, Selection::only("12B"));
        assert_eq!(filters.subject, Selection::All);

        let mut filters = FilterState::new(Selection::only("12A"), Selection::only("Mate"));
        filters.set_class(&table, Selection::only("12B"));
        assert_eq!(filters.subject, Selection::only("Mate"));
    }
}

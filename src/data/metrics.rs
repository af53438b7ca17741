use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::filter::Selection;
use super::model::{Column, Record, ScoreTable};

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// The three exam stages, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Stage {
    Evaluation,
    Mock,
    Final,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Evaluation, Stage::Mock, Stage::Final];

    pub fn column(self) -> Column {
        match self {
            Stage::Evaluation => Column::Evaluation,
            Stage::Mock => Column::Mock,
            Stage::Final => Column::Final,
        }
    }

    pub fn label(self) -> &'static str {
        self.column().label()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Per-record progress
// ---------------------------------------------------------------------------

/// Score differences between stages. `None` when either side is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Progress {
    pub eval_to_mock: Option<f64>,
    pub mock_to_final: Option<f64>,
    pub total: Option<f64>,
}

fn difference(later: Option<f64>, earlier: Option<f64>) -> Option<f64> {
    Some(later? - earlier?)
}

pub fn progress(record: &Record) -> Progress {
    Progress {
        eval_to_mock: difference(record.mock, record.evaluation),
        mock_to_final: difference(record.final_score, record.mock),
        total: difference(record.final_score, record.evaluation),
    }
}

// ---------------------------------------------------------------------------
// Means
// ---------------------------------------------------------------------------

/// Arithmetic mean of the present values; `None` if there are none.
pub fn mean(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Round to two decimals, halves to even (`7.125` → `7.12`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Mean and number of contributing values for one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ColumnStat {
    /// Rounded to two decimals; `None` is "undefined", never zero.
    pub mean: Option<f64>,
    pub count: usize,
}

impl ColumnStat {
    fn from_values(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let present: Vec<f64> = values.into_iter().flatten().collect();
        ColumnStat {
            mean: mean(present.iter().copied().map(Some)).map(round2),
            count: present.len(),
        }
    }
}

/// The four headline numbers of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub evaluation: ColumnStat,
    pub mock: ColumnStat,
    pub final_score: ColumnStat,
    pub progress_total: ColumnStat,
}

pub fn summarize(table: &ScoreTable) -> Summary {
    Summary {
        rows: table.len(),
        evaluation: ColumnStat::from_values(table.iter().map(|r| r.evaluation)),
        mock: ColumnStat::from_values(table.iter().map(|r| r.mock)),
        final_score: ColumnStat::from_values(table.iter().map(|r| r.final_score)),
        progress_total: ColumnStat::from_values(table.iter().map(|r| progress(r).total)),
    }
}

// ---------------------------------------------------------------------------
// Per-class averages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassAverages {
    pub class: String,
    pub evaluation: Option<f64>,
    pub mock: Option<f64>,
    pub final_score: Option<f64>,
}

impl ClassAverages {
    pub fn get(&self, stage: Stage) -> Option<f64> {
        match stage {
            Stage::Evaluation => self.evaluation,
            Stage::Mock => self.mock,
            Stage::Final => self.final_score,
        }
    }
}

/// Unrounded stage means per class, sorted by class. Records without a
/// class are left out.
pub fn class_averages(table: &ScoreTable) -> Vec<ClassAverages> {
    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in table {
        if let Some(class) = record.class.as_deref() {
            groups.entry(class).or_default().push(record);
        }
    }

    groups
        .into_iter()
        .map(|(class, records)| ClassAverages {
            class: class.to_string(),
            evaluation: mean(records.iter().map(|r| r.evaluation)),
            mock: mean(records.iter().map(|r| r.mock)),
            final_score: mean(records.iter().map(|r| r.final_score)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Per-student trajectory
// ---------------------------------------------------------------------------

/// Distinct student names in order of first appearance.
pub fn student_options(table: &ScoreTable) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .iter()
        .filter_map(|r| r.name.as_deref())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StagePoint {
    pub stage: Stage,
    pub score: Option<f64>,
}

/// One student's scores across the three stages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSeries {
    pub name: String,
    pub class: Option<String>,
    pub subject: Option<String>,
    pub points: [StagePoint; 3],
}

/// Trajectory of `name` in `subject`. With several matching rows the first
/// one is used.
pub fn student_series(table: &ScoreTable, name: &str, subject: &Selection) -> Option<StudentSeries> {
    let record = table
        .iter()
        .find(|r| r.name.as_deref() == Some(name) && subject.matches(r.subject.as_deref()))?;

    Some(StudentSeries {
        name: name.to_string(),
        class: record.class.clone(),
        subject: record.subject.clone(),
        points: Stage::ALL.map(|stage| StagePoint {
            stage,
            score: record.score(stage.column()),
        }),
    })
}

// ---------------------------------------------------------------------------
// Grouped bars: one group of three bars per record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeBars {
    pub name: Option<String>,
    pub evaluation: Option<f64>,
    pub mock: Option<f64>,
    pub final_score: Option<f64>,
}

/// Bar groups sorted by student name; unnamed records go last and ties
/// keep table order.
pub fn grade_bars(table: &ScoreTable) -> Vec<GradeBars> {
    let mut records: Vec<&Record> = table.iter().collect();
    records.sort_by(|a, b| match (&a.name, &b.name) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    records
        .into_iter()
        .map(|r| GradeBars {
            name: r.name.clone(),
            evaluation: r.evaluation,
            mock: r.mock,
            final_score: r.final_score,
        })
        .collect()
}

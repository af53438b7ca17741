use serde::Serialize;

use crate::config::DashboardConfig;
use crate::data::filter::{self, FilterOptions, FilterState, Selection};
use crate::data::loader::{self, InputFormat};
use crate::data::metrics::{self, ClassAverages, GradeBars, Progress, StudentSeries, Summary};
use crate::data::model::{Record, ScoreTable};
use crate::data::normalize::normalize;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// View payload handed to the presentation layer
// ---------------------------------------------------------------------------

/// A normalized record together with its derived progress columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRow {
    #[serde(flatten)]
    pub record: Record,
    pub progress: Progress,
}

/// Everything a dashboard renders for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// e.g. `Clasa: 12A, Proba: Toate probele`
    pub title: String,
    pub filters: FilterState,
    pub options: FilterOptions,
    pub rows: Vec<DashboardRow>,
    pub summary: Summary,
    pub class_averages: Vec<ClassAverages>,
    pub students: Vec<String>,
    pub student_series: Option<StudentSeries>,
    pub grade_bars: Vec<GradeBars>,
}

impl Dashboard {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn selection_label<'a>(selection: &'a Selection, all_label: &'a str) -> &'a str {
    selection.as_value().unwrap_or(all_label)
}

/// Filter `table` and compute every dashboard dataset.
///
/// Without an explicit `student`, the first student of the filtered table
/// is shown.
pub fn build_dashboard(
    table: &ScoreTable,
    filters: &FilterState,
    student: Option<&str>,
    config: &DashboardConfig,
) -> Dashboard {
    let filtered = filter::apply(table, filters);
    dashboard_view(table, &filtered, filters, student, config)
}

/// Compute every dashboard dataset from an already filtered sub-table.
/// Options still come from the full `table`.
pub fn dashboard_view(
    table: &ScoreTable,
    filtered: &ScoreTable,
    filters: &FilterState,
    student: Option<&str>,
    config: &DashboardConfig,
) -> Dashboard {
    let options = filter::filter_options(table, filters);

    let students = metrics::student_options(filtered);
    let student_series = student
        .or_else(|| students.first().map(String::as_str))
        .and_then(|name| metrics::student_series(filtered, name, &filters.subject));

    let title = format!(
        "Clasa: {}, Proba: {}",
        selection_label(&filters.class, &config.all_classes_label),
        selection_label(&filters.subject, &config.all_subjects_label),
    );

    Dashboard {
        title,
        filters: filters.clone(),
        options,
        rows: filtered
            .iter()
            .map(|record| DashboardRow {
                record: record.clone(),
                progress: metrics::progress(record),
            })
            .collect(),
        summary: metrics::summarize(filtered),
        class_averages: metrics::class_averages(filtered),
        students,
        student_series,
        grade_bars: metrics::grade_bars(filtered),
    }
}

/// Load, normalize, filter and summarize one upload.
pub fn run_pipeline(
    bytes: &[u8],
    format: InputFormat,
    filters: &FilterState,
    student: Option<&str>,
    config: &DashboardConfig,
) -> Result<Dashboard, LoadError> {
    let raw = loader::load_bytes(bytes, format)?;
    let table = normalize(&raw, &config.aliases);
    Ok(build_dashboard(&table, filters, student, config))
}

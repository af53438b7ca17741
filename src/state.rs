use std::path::Path;

use crate::config::DashboardConfig;
use crate::dashboard::{dashboard_view, Dashboard};
use crate::data::filter::{filtered_indices, FilterState, Selection};
use crate::data::loader::{self, InputFormat};
use crate::data::model::{RawTable, ScoreTable};
use crate::data::normalize::normalize;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The full interactive state, independent of rendering.
///
/// This is the only mutable state in the crate; each viewer owns its own.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub config: DashboardConfig,

    /// Normalized table (None until a file is loaded).
    pub table: Option<ScoreTable>,

    /// Current class / subject selection.
    pub filters: FilterState,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Student whose trajectory is shown; None means the first one.
    pub student: Option<String>,

    /// Status / error message shown to the user.
    pub status_message: Option<String>,
}

impl Session {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Ingest a freshly normalized table, reset the selection.
    pub fn set_table(&mut self, table: ScoreTable) {
        self.visible_indices = (0..table.len()).collect();
        self.filters = FilterState::default();
        self.student = None;
        self.table = Some(table);
        self.status_message = None;
    }

    pub fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let result = loader::load_file(path);
        self.ingest(result)
    }

    pub fn load_bytes(&mut self, bytes: &[u8], format: InputFormat) -> Result<(), LoadError> {
        let result = loader::load_bytes(bytes, format);
        self.ingest(result)
    }

    /// On failure the previous table stays in place.
    fn ingest(&mut self, result: Result<RawTable, LoadError>) -> Result<(), LoadError> {
        match result {
            Ok(raw) => {
                let table = normalize(&raw, &self.config.aliases);
                log::info!("Session loaded {} records", table.len());
                self.set_table(table);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Recompute `visible_indices` after a selection change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.visible_indices = filtered_indices(table, &self.filters);
        }
    }

    /// Change the class; a subject no longer offered falls back to all.
    pub fn select_class(&mut self, class: Selection) {
        match &self.table {
            Some(table) => self.filters.set_class(table, class),
            None => self.filters.class = class,
        }
        self.refilter();
    }

    pub fn select_subject(&mut self, subject: Selection) {
        self.filters.subject = subject;
        self.refilter();
    }

    pub fn select_student(&mut self, student: Option<String>) {
        self.student = student;
    }

    /// Number of records passing the current filters.
    pub fn visible_len(&self) -> usize {
        self.visible_indices.len()
    }

    /// Current view over the cached `visible_indices`, if a table is loaded.
    pub fn dashboard(&self) -> Option<Dashboard> {
        let table = self.table.as_ref()?;
        let visible = table.select(&self.visible_indices);
        Some(dashboard_view(
            table,
            &visible,
            &self.filters,
            self.student.as_deref(),
            &self.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORES: &[u8] = b"Nume,Clasa,Proba,Evaluare,Simulare,Bacalaureat
Ana,12A,Mate,7,8,9
Bogdan,12A,Romana,5,,6
Carmen,12B,Mate,8,8.5,9.5
";

    fn loaded() -> Session {
        let mut session = Session::default();
        session.load_bytes(SCORES, InputFormat::Csv).unwrap();
        session
    }

    #[test]
    fn new_session_has_no_view() {
        let session = Session::default();
        assert!(session.dashboard().is_none());
        assert_eq!(session.visible_len(), 0);
    }

    #[test]
    fn loading_shows_everything() {
        let session = loaded();
        assert_eq!(session.visible_indices, vec![0, 1, 2]);
        assert_eq!(session.dashboard().unwrap().rows.len(), 3);
    }

    #[test]
    fn selections_narrow_visible_rows() {
        let mut session = loaded();
        session.select_class(Selection::only("12A"));
        assert_eq!(session.visible_indices, vec![0, 1]);
        session.select_subject(Selection::only("Romana"));
        assert_eq!(session.visible_indices, vec![1]);

        // 12B has no Romana: subject resets
        session.select_class(Selection::only("12B"));
        assert_eq!(session.filters.subject, Selection::All);
        assert_eq!(session.visible_indices, vec![2]);
    }

    #[test]
    fn view_follows_visible_rows() {
        let mut session = loaded();
        session.select_class(Selection::only("12A"));
        let dashboard = session.dashboard().unwrap();
        let names: Vec<_> = dashboard
            .rows
            .iter()
            .filter_map(|row| row.record.name.as_deref())
            .collect();
        assert_eq!(names, vec!["Ana", "Bogdan"]);
        assert_eq!(dashboard.summary.rows, session.visible_len());
        assert_eq!(dashboard.summary.evaluation.mean, Some(6.0));
        // options still cover the whole table
        assert_eq!(dashboard.options.classes, vec!["12A", "12B"]);

        session.select_subject(Selection::only("Romana"));
        let dashboard = session.dashboard().unwrap();
        assert_eq!(dashboard.rows.len(), 1);
        assert_eq!(dashboard.students, vec!["Bogdan"]);
    }

    #[test]
    fn selected_student_drives_series() {
        let mut session = loaded();
        session.select_student(Some("Carmen".into()));
        let series = session.dashboard().unwrap().student_series.unwrap();
        assert_eq!(series.name, "Carmen");
        assert_eq!(series.points[2].score, Some(9.5));
    }

    #[test]
    fn failed_load_keeps_previous_table() {
        let mut session = loaded();
        session.select_class(Selection::only("12A"));

        let err = session.load_bytes(b"[1, 2", InputFormat::Json);
        assert!(err.is_err());
        assert!(session.status_message.is_some());
        assert_eq!(session.table.as_ref().unwrap().len(), 3);
        assert_eq!(session.visible_indices, vec![0, 1]);
    }

    #[test]
    fn new_file_resets_selection() {
        let mut session = loaded();
        session.select_class(Selection::only("12A"));
        session.select_student(Some("Ana".into()));
        session.load_bytes(SCORES, InputFormat::Csv).unwrap();
        assert_eq!(session.filters, FilterState::default());
        assert_eq!(session.student, None);
        assert_eq!(session.status_message, None);
    }
}

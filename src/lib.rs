//! Exam score progress pipeline.
//!
//! Loads a table of student scores across three stages (evaluation, mock
//! exam, final exam), cleans it into canonical records, filters it by class
//! and subject and computes the datasets a progress dashboard displays.

pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod state;

pub use config::{ColumnAliases, DashboardConfig};
pub use dashboard::{build_dashboard, dashboard_view, run_pipeline, Dashboard, DashboardRow};
pub use data::filter::{FilterOptions, FilterState, Selection};
pub use data::loader::InputFormat;
pub use data::model::{CellValue, Column, RawTable, Record, ScoreTable};
pub use error::{ConfigError, LoadError};
pub use state::Session;

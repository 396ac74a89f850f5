//! looper-report: status aggregation and HTML reports for looper projects
//!
//! Scans a project's per-sample output folders, infers run status from flag
//! files, cross-references the stats and objects summary tables with what is
//! actually on disk, and writes a cross-linked set of report pages.

pub mod artifact;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flags;
pub mod links;
pub mod project;
pub mod reporter;
pub mod runlog;
pub mod status;
pub mod tables;

pub use error::{ReportError, Result};

use serde::Serialize;

/// Run status of a sample, derived from its flag files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Status {
    Completed,
    Running,
    Failed,
    /// No flag file present
    Missing,
    /// More than one flag file present
    Multiple,
    /// A single flag file with an unrecognized name
    Unknown,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Completed,
        Status::Running,
        Status::Failed,
        Status::Missing,
        Status::Multiple,
        Status::Unknown,
    ];

    /// Whether this status needs attention (anything but completed or running)
    pub fn is_problem(self) -> bool {
        !matches!(self, Status::Completed | Status::Running)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Completed => write!(f, "Completed"),
            Status::Running => write!(f, "Running"),
            Status::Failed => write!(f, "Failed"),
            Status::Missing => write!(f, "Missing"),
            Status::Multiple => write!(f, "Multiple"),
            Status::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Semantic display class of a status (maps onto bootstrap contextual classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayClass {
    Success,
    Warning,
    Danger,
    Secondary,
}

impl DisplayClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayClass::Success => "success",
            DisplayClass::Warning => "warning",
            DisplayClass::Danger => "danger",
            DisplayClass::Secondary => "secondary",
        }
    }

    /// Class attribute for the status button on sample pages
    pub fn button_class(self) -> String {
        format!("btn btn-{}", self.as_str())
    }

    /// Class attribute for a row of the status table
    pub fn table_class(self) -> String {
        format!("table-{}", self.as_str())
    }
}

impl std::fmt::Display for DisplayClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status together with how it should be displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub status: Status,
    pub class: DisplayClass,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_class_attributes() {
        assert_eq!(DisplayClass::Success.button_class(), "btn btn-success");
        assert_eq!(DisplayClass::Secondary.table_class(), "table-secondary");
    }

    #[test]
    fn problem_statuses() {
        assert!(!Status::Completed.is_problem());
        assert!(!Status::Running.is_problem());
        assert!(Status::Failed.is_problem());
        assert!(Status::Missing.is_problem());
        assert!(Status::Multiple.is_problem());
        assert!(Status::Unknown.is_problem());
    }
}

//! Error types for report generation

use std::path::PathBuf;

/// Failures that abort a single operation.
///
/// Resolution problems (missing objects, missing log keys, ambiguous flags)
/// are never reported through this type; they are downgraded to diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("the provided sample directory ('{}') does not exist", .0.display())]
    MissingSampleDir(PathBuf),

    #[error("could not create reports directory {}: {source}", path.display())]
    ReportsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read table {}: {source}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("table {} has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

//! Flag set → status classification

use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::flags::{fetch_flag_files, resolve_flags, FlagSource};
use crate::{Classification, DisplayClass, Status};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Flags a pipeline is known to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Completed,
    Running,
    Failed,
}

impl Flag {
    pub const KNOWN: [Flag; 3] = [Flag::Completed, Flag::Running, Flag::Failed];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "completed" => Some(Flag::Completed),
            "running" => Some(Flag::Running),
            "failed" => Some(Flag::Failed),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Flag::Completed => "completed",
            Flag::Running => "running",
            Flag::Failed => "failed",
        }
    }

    pub fn classification(self) -> Classification {
        match self {
            Flag::Completed => Classification {
                status: Status::Completed,
                class: DisplayClass::Success,
            },
            Flag::Running => Classification {
                status: Status::Running,
                class: DisplayClass::Warning,
            },
            Flag::Failed => Classification {
                status: Status::Failed,
                class: DisplayClass::Danger,
            },
        }
    }
}

/// Map the flags found in a sample folder, one entry per flag file, to a
/// single status.
///
/// No flag files is `Missing` and several is `Multiple`, even when they all
/// carry the same flag. A single flag maps through [`Flag::from_name`] and
/// anything unrecognized is `Unknown`.
pub fn classify<S: AsRef<str>>(flags: &[S]) -> Classification {
    match flags {
        [] => Classification {
            status: Status::Missing,
            class: DisplayClass::Danger,
        },
        [name] => match Flag::from_name(name.as_ref()) {
            Some(flag) => flag.classification(),
            None => Classification {
                status: Status::Unknown,
                class: DisplayClass::Secondary,
            },
        },
        _ => Classification {
            status: Status::Multiple,
            class: DisplayClass::Warning,
        },
    }
}

/// Status of one sample as reported by `check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleStatus {
    pub sample_name: String,
    /// Flag name of every flag file found in the sample folder
    pub flags: Vec<String>,
    #[serde(flatten)]
    pub classification: Classification,
    /// Whether the sample folder exists at all
    pub on_disk: bool,
}

/// Per-sample statuses of a whole project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub samples: Vec<SampleStatus>,
    pub counts: BTreeMap<Status, usize>,
}

impl StatusSummary {
    pub fn has_problems(&self) -> bool {
        self.samples.iter().any(|s| s.classification.status.is_problem())
    }

    pub fn count(&self, status: Status) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }
}

/// Classify every `(sample name, sample folder)` pair.
///
/// With no `flags` every `*.flag` file in an existing sample folder counts,
/// exactly as on the report's status page. Otherwise only files for the
/// named flags are collected, in one pass, and attributed to the sample
/// whose folder directly contains them.
pub fn summarize<S: AsRef<str>>(
    samples: &[(String, PathBuf)],
    flags: &[S],
    sink: &dyn DiagnosticSink,
) -> Result<StatusSummary> {
    let mut by_dir: BTreeMap<PathBuf, Vec<(PathBuf, String)>> = BTreeMap::new();
    if !flags.is_empty() {
        let dirs: Vec<PathBuf> = samples.iter().map(|(_, dir)| dir.clone()).collect();
        for (flag, files) in fetch_flag_files(FlagSource::SampleDirs(&dirs), flags)? {
            for file in files {
                if let Some(parent) = file.parent() {
                    by_dir
                        .entry(parent.to_path_buf())
                        .or_default()
                        .push((file.clone(), flag.clone()));
                }
            }
        }
    }

    let mut counts = BTreeMap::new();
    let mut statuses = Vec::with_capacity(samples.len());
    for (name, dir) in samples {
        let on_disk = dir.is_dir();
        let found = if flags.is_empty() {
            if on_disk {
                resolve_flags(dir, sink)?
            } else {
                Vec::new()
            }
        } else {
            let mut files = by_dir.get(dir).cloned().unwrap_or_default();
            files.sort();
            files.into_iter().map(|(_, flag)| flag).collect()
        };
        let classification = classify(&found);
        *counts.entry(classification.status).or_insert(0) += 1;
        statuses.push(SampleStatus {
            sample_name: name.clone(),
            flags: found,
            classification,
            on_disk,
        });
    }

    Ok(StatusSummary {
        samples: statuses,
        counts,
    })
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn classify_is_total(names in prop::collection::vec("[a-z]{0,12}", 0..6)) {
            let c = classify(&names);
            match names.len() {
                0 => prop_assert_eq!(c.status, Status::Missing),
                1 => prop_assert!(!matches!(c.status, Status::Missing | Status::Multiple)),
                _ => prop_assert_eq!(c.status, Status::Multiple),
            }
        }
    }
}

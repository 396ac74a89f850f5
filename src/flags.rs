//! Flag file discovery
//!
//! A pipeline marks the state of a sample run by dropping a file named
//! `<label>_<flag>.flag` directly inside the sample's output folder.

use crate::diagnostics::DiagnosticSink;
use crate::error::{ReportError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const FLAG_EXTENSION: &str = "flag";

fn flag_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_([a-z]+)\.flag$").expect("static regex"))
}

/// Extract the flag name from a flag file name (`sample_completed.flag` → `completed`)
pub fn flag_name(file_name: &str) -> Option<&str> {
    flag_name_regex()
        .captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Hidden files never count as flags
fn match_options() -> glob::MatchOptions {
    glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    }
}

/// List `*<suffix>` files directly inside `dir`, sorted
fn flag_files_in(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(suffix)
    );
    let mut files: Vec<PathBuf> = glob::glob_with(&pattern, match_options())?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Scan a sample folder for flag files and return one flag name per file,
/// in file name order.
///
/// Two files carrying the same flag yield that name twice. The scan is not
/// recursive. Zero or several flag files are reported to the
/// sink as warnings but are not errors; a nonexistent folder is.
pub fn resolve_flags(sample_dir: &Path, sink: &dyn DiagnosticSink) -> Result<Vec<String>> {
    if !sample_dir.exists() {
        return Err(ReportError::MissingSampleDir(sample_dir.to_path_buf()));
    }

    let files = flag_files_in(sample_dir, &format!(".{}", FLAG_EXTENSION))?;
    if files.len() > 1 {
        sink.warn(&format!(
            "Multiple flag files ({}) found in sample dir '{}'",
            files.len(),
            sample_dir.display()
        ));
    }
    if files.is_empty() {
        sink.warn(&format!(
            "No flag files found in sample dir '{}'",
            sample_dir.display()
        ));
    }

    let mut flags = Vec::with_capacity(files.len());
    for file in &files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match flag_name(&name) {
            Some(flag) => flags.push(flag.to_string()),
            None => sink.warn(&format!(
                "Ignoring flag file with unexpected name: {}",
                file.display()
            )),
        }
    }
    Ok(flags)
}

/// Where to look for flag files
#[derive(Debug, Clone, Copy)]
pub enum FlagSource<'a> {
    /// Explicit sample output folders
    SampleDirs(&'a [PathBuf]),
    /// A results folder whose first-level subfolders are sample folders
    ResultsFolder(&'a Path),
}

/// Collect flag file paths by flag name.
///
/// Every requested flag has an entry in the result, empty when nothing matched.
pub fn fetch_flag_files<S: AsRef<str>>(
    source: FlagSource<'_>,
    flags: &[S],
) -> Result<BTreeMap<String, Vec<PathBuf>>> {
    let mut files_by_flag: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for flag in flags {
        let flag = flag.as_ref();
        let suffix = format!("{}.{}", flag, FLAG_EXTENSION);
        let found = files_by_flag.entry(flag.to_string()).or_default();
        match source {
            FlagSource::SampleDirs(dirs) => {
                for dir in dirs {
                    if dir.is_dir() {
                        found.extend(flag_files_in(dir, &suffix)?);
                    }
                }
            }
            FlagSource::ResultsFolder(root) => {
                let pattern = format!(
                    "{}/*/*{}",
                    glob::Pattern::escape(&root.to_string_lossy()),
                    glob::Pattern::escape(&suffix)
                );
                let mut matched: Vec<PathBuf> =
                    glob::glob_with(&pattern, match_options())?
                        .filter_map(|e| e.ok())
                        .collect();
                matched.sort();
                found.extend(matched);
            }
        }
    }

    Ok(files_by_flag)
}

//! Run log parsing: elapsed time and peak memory
//!
//! Pipeline logs mix two key/value conventions. Timing rows look like
//! ``> `Time`<TAB>0:05:32<TAB>_RES_`` while resource rows look like
//! `* Peak memory used: 1.2 GB`, so the same file is read twice, once per
//! delimiter.

use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const UNKNOWN_TIME: &str = "Unknown";
pub const UNKNOWN_MEMORY: &str = "NA";

const TIME_KEY: &str = "Time";
const PEAK_MEMORY_KEY: &str = "Peak memory used";

/// Values pulled out of a sample's run log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLogSummary {
    pub time: String,
    pub peak_memory: String,
    /// Keys the log exists for but does not contain
    pub missing_keys: Vec<&'static str>,
}

impl RunLogSummary {
    pub fn unknown() -> Self {
        Self {
            time: UNKNOWN_TIME.to_string(),
            peak_memory: UNKNOWN_MEMORY.to_string(),
            missing_keys: Vec::new(),
        }
    }

    /// False when the log was read but lacked the time or memory row
    pub fn is_complete(&self) -> bool {
        self.missing_keys.is_empty()
    }
}

/// A two-column key/value row; the value may be absent
#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    key: String,
    value: Option<String>,
}

fn split_rows(content: &str, delimiter: char) -> Vec<Row> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.split(delimiter);
            let key = fields.next().unwrap_or_default().to_string();
            let value = fields.next().map(|v| v.to_string());
            Row { key, value }
        })
        .collect()
}

/// Drop every row whose value occurs again later in the table.
///
/// Deduplication is by value, not by key.
fn dedup_by_value_keep_last(rows: Vec<Row>) -> Vec<Row> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Row> = rows
        .into_iter()
        .rev()
        .filter(|row| seen.insert(row.value.clone()))
        .collect();
    kept.reverse();
    kept
}

fn lookup(rows: &[Row], key: &str) -> Option<String> {
    rows.iter()
        .find(|r| r.key == key)
        .map(|r| r.value.clone().unwrap_or_default())
}

/// Elapsed time from the tab-delimited, backtick-quoted rows
pub fn parse_time(content: &str) -> Option<String> {
    let rows = dedup_by_value_keep_last(split_rows(content, '\t'))
        .into_iter()
        .map(|r| Row {
            key: r.key.replace("> `", "").replace('`', ""),
            value: r.value,
        })
        .collect::<Vec<_>>();
    lookup(&rows, TIME_KEY)
}

/// Peak memory from the colon-delimited, asterisk-bulleted rows
pub fn parse_peak_memory(content: &str) -> Option<String> {
    let rows = dedup_by_value_keep_last(split_rows(content, ':'))
        .into_iter()
        .map(|r| Row {
            key: r.key.replace('*', "").trim_start().to_string(),
            value: r.value,
        })
        .collect::<Vec<_>>();
    lookup(&rows, PEAK_MEMORY_KEY).map(|v| v.trim().to_string())
}

/// Read runtime and peak memory from the log at `log_path`.
///
/// A missing log short-circuits to `("Unknown", "NA")` without recording an
/// inconsistency; a log that exists but lacks either row records the missing
/// key in [`RunLogSummary::missing_keys`].
pub fn extract_runtime_and_memory(log_path: &Path) -> RunLogSummary {
    if !log_path.is_file() {
        return RunLogSummary::unknown();
    }
    let content = match fs::read(log_path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => {
            let mut summary = RunLogSummary::unknown();
            summary.missing_keys = vec![TIME_KEY, PEAK_MEMORY_KEY];
            return summary;
        }
    };

    let mut summary = RunLogSummary::unknown();
    match parse_time(&content) {
        Some(time) => summary.time = time,
        None => summary.missing_keys.push(TIME_KEY),
    }
    match parse_peak_memory(&content) {
        Some(mem) => summary.peak_memory = mem,
        None => summary.missing_keys.push(PEAK_MEMORY_KEY),
    }
    summary
}

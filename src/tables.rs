//! Stats and objects summary tables
//!
//! Both tables are TSV files written by the looper summarizer. They are read
//! into plain lists of records; every column is looked up by name so a table
//! missing an optional column simply yields `None` for it.

use crate::error::{ReportError, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

pub const SAMPLE_NAME_COLUMN: &str = "sample_name";

/// One row of the objects summary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedObject {
    pub key: Option<String>,
    pub sample_name: Option<String>,
    pub filename: Option<String>,
    pub anchor_image: Option<String>,
    pub annotation: Option<String>,
}

/// One row of the stats summary, in header order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StatsRecord {
    pub values: Vec<(String, String)>,
}

impl StatsRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn sample_name(&self) -> Option<&str> {
        self.get(SAMPLE_NAME_COLUMN).filter(|v| !v.is_empty())
    }
}

/// Parsed stats summary
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StatsTable {
    pub columns: Vec<String>,
    pub rows: Vec<StatsRecord>,
}

impl StatsTable {
    /// First row for `sample_name`
    pub fn row_for(&self, sample_name: &str) -> Option<&StatsRecord> {
        self.rows.iter().find(|r| r.sample_name() == Some(sample_name))
    }

    /// Sample names in row order, without duplicates
    pub fn sample_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.rows
            .iter()
            .filter_map(|r| r.sample_name())
            .filter(|name| seen.insert(name.to_string()))
            .map(|name| name.to_string())
            .collect()
    }
}

fn tsv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| ReportError::Table {
            path: path.to_path_buf(),
            source,
        })
}

fn column_index(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_string(), i))
        .collect()
}

fn cell(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// Read the stats summary. Cells missing from short rows become empty strings.
pub fn read_stats_table(path: &Path) -> Result<StatsTable> {
    let mut reader = tsv_reader(path)?;
    let table_err = |source| ReportError::Table {
        path: path.to_path_buf(),
        source,
    };
    let columns: Vec<String> = reader
        .headers()
        .map_err(table_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(table_err)?;
        let values = columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.clone(), record.get(i).unwrap_or_default().to_string()))
            .collect();
        rows.push(StatsRecord { values });
    }
    Ok(StatsTable { columns, rows })
}

/// Read the objects summary, collapsing exact duplicate rows (last one kept)
pub fn read_objects_table(path: &Path) -> Result<Vec<ReportedObject>> {
    let mut reader = tsv_reader(path)?;
    let table_err = |source| ReportError::Table {
        path: path.to_path_buf(),
        source,
    };
    let index = column_index(reader.headers().map_err(table_err)?);
    let col = |name: &str| index.get(name).copied();
    let (key, sample, filename, anchor, annotation) = (
        col("key"),
        col(SAMPLE_NAME_COLUMN),
        col("filename"),
        col("anchor_image"),
        col("annotation"),
    );

    let mut objects = Vec::new();
    for record in reader.records() {
        let record = record.map_err(table_err)?;
        objects.push(ReportedObject {
            key: cell(&record, key),
            sample_name: cell(&record, sample),
            filename: cell(&record, filename),
            anchor_image: cell(&record, anchor),
            annotation: cell(&record, annotation),
        });
    }
    Ok(dedup_keep_last(objects))
}

/// Drop rows that are repeated later on, keeping the relative order of the rest
pub fn dedup_keep_last(objects: Vec<ReportedObject>) -> Vec<ReportedObject> {
    let mut seen = std::collections::HashSet::new();
    let mut kept: Vec<ReportedObject> = objects
        .into_iter()
        .rev()
        .filter(|o| seen.insert(o.clone()))
        .collect();
    kept.reverse();
    kept
}

/// Distinct object keys, sorted
pub fn object_keys(objects: &[ReportedObject]) -> Vec<String> {
    objects
        .iter()
        .filter_map(|o| o.key.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn objects_for_key<'a>(objects: &'a [ReportedObject], key: &str) -> Vec<&'a ReportedObject> {
    objects
        .iter()
        .filter(|o| o.key.as_deref() == Some(key))
        .collect()
}

pub fn objects_for_sample<'a>(
    objects: &'a [ReportedObject],
    sample_name: &str,
) -> Vec<&'a ReportedObject> {
    objects
        .iter()
        .filter(|o| o.sample_name.as_deref() == Some(sample_name))
        .collect()
}

/// Sample names from an annotation sheet (`.tsv`/`.txt` tab separated, otherwise CSV)
pub fn read_sample_names(path: &Path) -> Result<Vec<String>> {
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some("tsv") | Some("txt") => b'\t',
        _ => b',',
    };
    let table_err = |source| ReportError::Table {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(table_err)?;
    let index = column_index(reader.headers().map_err(table_err)?)
        .get(SAMPLE_NAME_COLUMN)
        .copied()
        .ok_or_else(|| ReportError::MissingColumn {
            path: path.to_path_buf(),
            column: SAMPLE_NAME_COLUMN,
        })?;

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record.map_err(table_err)?;
        if let Some(name) = cell(&record, Some(index)) {
            names.push(name);
        }
    }
    Ok(names)
}

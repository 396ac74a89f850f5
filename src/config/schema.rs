//! Config schema and deserialization

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_RESULTS_SUBDIR: &str = "results_pipeline";

/// A project-level summary product (plot, table) advertised by a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    /// Caption shown next to the figure or link
    pub caption: String,
    /// Glob relative to the output folder; `{name}` is the project name
    pub path: String,
    /// Optional thumbnail glob, same substitution rules
    #[serde(default)]
    pub thumbnail_path: Option<String>,
}

/// Settings a subproject may replace
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubprojectOverride {
    #[serde(default)]
    pub samples: Option<Vec<String>>,

    #[serde(default)]
    pub sample_annotation: Option<String>,

    #[serde(default)]
    pub results_subdir: Option<String>,

    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

/// Root config structure for looper-report.json
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Project name, used for the summary page and table file names
    #[serde(default)]
    pub name: Option<String>,

    /// Output folder, relative to the config file (default: its folder)
    #[serde(default)]
    pub output_dir: Option<String>,

    /// Per-sample results folder, relative to the output folder
    #[serde(default)]
    pub results_subdir: Option<String>,

    /// Active subproject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subproject: Option<String>,

    /// Sample names listed inline
    #[serde(default)]
    pub samples: Vec<String>,

    /// CSV/TSV sample annotation sheet with a `sample_name` column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_annotation: Option<String>,

    /// Glob patterns over sample names to leave out of the report
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Project-level summary products shown on the index page
    #[serde(default)]
    pub summary_results: Vec<SummaryResult>,

    /// Named subprojects
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subprojects: BTreeMap<String, SubprojectOverride>,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(mut self, subproject: Option<&str>, output_dir: Option<&str>) -> Self {
        if let Some(sub) = subproject {
            self.subproject = Some(sub.to_string());
        }
        if let Some(dir) = output_dir {
            self.output_dir = Some(dir.to_string());
        }
        self
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values are overridden by this config's values
        if self.name.is_none() {
            self.name = base.name;
        }
        if self.output_dir.is_none() {
            self.output_dir = base.output_dir;
        }
        if self.results_subdir.is_none() {
            self.results_subdir = base.results_subdir;
        }
        if self.subproject.is_none() {
            self.subproject = base.subproject;
        }
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.samples.is_empty() {
            self.samples = base.samples;
        }
        if self.sample_annotation.is_none() {
            self.sample_annotation = base.sample_annotation;
        }

        // Merge exclude patterns
        let mut all_excludes = base.exclude;
        all_excludes.append(&mut self.exclude);
        self.exclude = all_excludes;

        // Base summary results come first
        let mut all_results = base.summary_results;
        all_results.append(&mut self.summary_results);
        self.summary_results = all_results;

        for (name, sub) in base.subprojects {
            self.subprojects.entry(name).or_insert(sub);
        }
    }

    /// Apply the active subproject's overrides, if any
    pub fn with_subproject_applied(mut self) -> Self {
        let Some(active) = self.subproject.clone() else {
            return self;
        };
        let Some(sub) = self.subprojects.get(&active).cloned() else {
            return self;
        };
        if let Some(samples) = sub.samples {
            self.samples = samples;
            self.sample_annotation = None;
        }
        if sub.sample_annotation.is_some() {
            self.sample_annotation = sub.sample_annotation;
        }
        if sub.results_subdir.is_some() {
            self.results_subdir = sub.results_subdir;
        }
        if let Some(exclude) = sub.exclude {
            self.exclude = exclude;
        }
        self
    }

    pub fn results_subdir_or_default(&self) -> &str {
        self.results_subdir
            .as_deref()
            .unwrap_or(DEFAULT_RESULTS_SUBDIR)
    }
}

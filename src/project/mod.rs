//! Project layout and sample list
//!
//! Everything the report needs to know about a looper project: its name,
//! the active subproject, where outputs live, and which samples exist.

use crate::config::{build_exclude_set, LoadedConfig, SummaryResult, DEFAULT_RESULTS_SUBDIR};
use crate::diagnostics::DiagnosticSink;
use crate::links::SiteMap;
use crate::tables::read_sample_names;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub subproject: Option<String>,
    /// Project output folder (absolute)
    pub output_dir: PathBuf,
    /// Folder holding one subfolder per sample (absolute)
    pub results_subdir: PathBuf,
    /// Sample names, unique, in project order
    pub samples: Vec<String>,
    pub summary_results: Vec<SummaryResult>,
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl Project {
    pub fn new(name: impl Into<String>, output_dir: impl AsRef<Path>) -> Self {
        let output_dir = absolute(output_dir.as_ref());
        Self {
            name: name.into(),
            subproject: None,
            results_subdir: output_dir.join(DEFAULT_RESULTS_SUBDIR),
            output_dir,
            samples: Vec::new(),
            summary_results: Vec::new(),
        }
    }

    pub fn with_subproject(mut self, subproject: impl Into<String>) -> Self {
        self.subproject = Some(subproject.into());
        self
    }

    /// Results folder, relative to the output folder unless absolute
    pub fn with_results_subdir(mut self, results_subdir: impl AsRef<Path>) -> Self {
        self.results_subdir = absolute(&self.output_dir.join(results_subdir));
        self
    }

    pub fn with_samples<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.samples = samples.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_summary_results(mut self, results: Vec<SummaryResult>) -> Self {
        self.summary_results = results;
        self
    }

    /// Build a project from a loaded config file.
    ///
    /// Samples come from the inline list plus the annotation sheet; when both
    /// are empty every first-level folder of the results folder is a sample.
    pub fn from_config(loaded: LoadedConfig, sink: &dyn DiagnosticSink) -> Result<Self> {
        let LoadedConfig { config, base_dir } = loaded;
        let config = config.with_subproject_applied();

        let name = config.name.clone().unwrap_or_else(|| {
            absolute(&base_dir)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string())
        });
        let output_dir = base_dir.join(config.output_dir.as_deref().unwrap_or("."));

        let mut project = Project::new(name, output_dir)
            .with_results_subdir(config.results_subdir_or_default())
            .with_summary_results(config.summary_results.clone());
        if let Some(sub) = &config.subproject {
            project = project.with_subproject(sub.clone());
        }

        let mut samples = config.samples.clone();
        if let Some(sheet) = &config.sample_annotation {
            let sheet_path = base_dir.join(sheet);
            let names = read_sample_names(&sheet_path)
                .with_context(|| format!("Failed to read sample annotation: {}", sheet_path.display()))?;
            samples.extend(names);
        }
        if samples.is_empty() {
            samples = discover_samples(&project.results_subdir);
        }

        let exclude = build_exclude_set(&config.exclude)?;
        let mut seen = HashSet::new();
        project.samples = samples
            .into_iter()
            .filter(|s| !exclude.is_match(s))
            .filter(|s| {
                let fresh = seen.insert(s.clone());
                if !fresh {
                    sink.warn(&format!("Duplicate sample name ignored: {}", s));
                }
                fresh
            })
            .collect();

        Ok(project)
    }

    /// `<name>` or `<name>_<subproject>`
    fn file_stem(&self) -> String {
        match &self.subproject {
            Some(sub) => format!("{}_{}", self.name, sub),
            None => self.name.clone(),
        }
    }

    pub fn reports_dir(&self) -> PathBuf {
        match &self.subproject {
            Some(sub) => self.output_dir.join(format!("reports_{}", sub)),
            None => self.output_dir.join("reports"),
        }
    }

    pub fn index_page(&self) -> PathBuf {
        self.output_dir.join(format!("{}_summary.html", self.file_stem()))
    }

    pub fn stats_summary_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_stats_summary.tsv", self.file_stem()))
    }

    pub fn objects_summary_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_objs_summary.tsv", self.file_stem()))
    }

    pub fn sample_dir(&self, sample_name: &str) -> PathBuf {
        self.results_subdir.join(sample_name)
    }

    pub fn site_map(&self) -> SiteMap {
        SiteMap::new(self.index_page(), self.reports_dir())
    }
}

/// Every first-level folder of `results_subdir`, sorted by name
pub fn discover_samples(results_subdir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(results_subdir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

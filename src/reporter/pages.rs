//! Report builder: assembles and writes every page of a project report

use super::{
    FigureView, IndexView, LinkView, ListingView, ObjectView, PageRenderer, PageView, SampleView,
    StatusRow, StatusView, TableCell,
};
use crate::artifact::{locate_all, Artifact};
use crate::config::SummaryResult;
use crate::diagnostics::DiagnosticSink;
use crate::error::{ReportError, Result};
use crate::flags::resolve_flags;
use crate::links::{page_file_name, relative_href, NavigationModel, SiteMap};
use crate::project::Project;
use crate::runlog::{extract_runtime_and_memory, RunLogSummary};
use crate::status::classify;
use crate::tables::{
    object_keys, objects_for_key, objects_for_sample, read_objects_table, read_stats_table,
    ReportedObject, StatsTable, SAMPLE_NAME_COLUMN,
};
use crate::Classification;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const STATS_FILE: &str = "stats.tsv";
const LOG_SUFFIX: &str = "log.md";
const PROFILE_SUFFIX: &str = "profile.tsv";
const COMMANDS_SUFFIX: &str = "commands.sh";

/// The two summary tables a report is built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportInputs {
    pub stats: StatsTable,
    pub objects: Vec<ReportedObject>,
}

/// Per-sample facts computed once per report pass and shared by every page
#[derive(Debug, Clone)]
struct SampleState {
    name: String,
    page: PathBuf,
    status: Classification,
    log_file: Option<PathBuf>,
    profile_file: Option<PathBuf>,
    commands_file: Option<PathBuf>,
    stats_file: Option<PathBuf>,
}

pub struct ReportBuilder<'a> {
    project: &'a Project,
    renderer: &'a dyn PageRenderer,
    sink: &'a dyn DiagnosticSink,
    site: SiteMap,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(
        project: &'a Project,
        renderer: &'a dyn PageRenderer,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            project,
            renderer,
            sink,
            site: project.site_map(),
        }
    }

    /// Read the stats and objects summaries; absent files give empty tables
    pub fn load_inputs(&self) -> Result<ReportInputs> {
        let stats_path = self.project.stats_summary_path();
        let stats = if stats_path.is_file() {
            read_stats_table(&stats_path)?
        } else {
            self.sink
                .warn(&format!("No stats file '{}'", stats_path.display()));
            StatsTable::default()
        };

        let objects_path = self.project.objects_summary_path();
        let objects = if objects_path.is_file() {
            read_objects_table(&objects_path)?
        } else {
            self.sink
                .debug(&format!("No objects file '{}'", objects_path.display()));
            Vec::new()
        };

        Ok(ReportInputs { stats, objects })
    }

    /// Load the summary tables, write every page and return the index path
    pub fn build(&self) -> Result<PathBuf> {
        let inputs = self.load_inputs()?;
        self.build_with(&inputs)
    }

    /// Write every page from already loaded tables and return the index path
    pub fn build_with(&self, inputs: &ReportInputs) -> Result<PathBuf> {
        let reports_dir = &self.site.reports_dir;
        fs::create_dir_all(reports_dir).map_err(|source| ReportError::ReportsDir {
            path: reports_dir.clone(),
            source,
        })?;

        let mut taken: HashSet<PathBuf> = [
            self.site.status_page(),
            self.site.objects_page(),
            self.site.samples_page(),
        ]
        .into_iter()
        .collect();
        let states = self.sample_states(&inputs.objects, &mut taken);
        let keys = self.object_page_keys(&inputs.objects, &mut taken);
        let sample_names: Vec<String> = states.iter().map(|s| s.name.clone()).collect();

        for state in &states {
            let view = self.sample_view(state, inputs, &keys, &sample_names);
            self.save_page(&state.page, &PageView::Sample(view));
        }
        let samples_listing = self.listing_view(
            "Samples",
            states.iter().map(|s| (s.name.as_str(), s.page.as_path())),
            &keys,
            &sample_names,
        );
        self.save_page(&self.site.samples_page(), &PageView::Listing(samples_listing));

        let key_pages: Vec<(String, PathBuf)> = keys
            .iter()
            .map(|k| (k.clone(), self.site.page_for(k)))
            .collect();
        for (key, page) in &key_pages {
            let view = self.object_view(key, page, inputs, &keys, &sample_names);
            self.save_page(page, &PageView::Object(view));
        }
        let objects_listing = self.listing_view(
            "Objects",
            key_pages.iter().map(|(k, p)| (k.as_str(), p.as_path())),
            &keys,
            &sample_names,
        );
        self.save_page(&self.site.objects_page(), &PageView::Listing(objects_listing));

        let status = self.status_view(&states, &keys, &sample_names);
        self.save_page(&self.site.status_page(), &PageView::Status(status));

        let index = self.index_view(&states, inputs, &keys, &sample_names);
        let index_page = self.site.index_page.clone();
        let html = self.renderer.render(&PageView::Index(index));
        write_page(&index_page, &html)?;
        self.sink
            .info(&format!("Report written to {}", index_page.display()));
        Ok(index_page)
    }

    fn navbar(&self, keys: &[String], samples: &[String], wd: &Path) -> NavigationModel {
        NavigationModel::build(&self.site, keys, samples, wd)
    }

    fn href(&self, target: &Path, wd: &Path) -> String {
        relative_href(target, wd)
    }

    /// Object keys whose page file is not already claimed, in table order
    fn object_page_keys(&self, objects: &[ReportedObject], taken: &mut HashSet<PathBuf>) -> Vec<String> {
        object_keys(objects)
            .into_iter()
            .filter(|key| {
                let page = self.site.page_for(key);
                let free = taken.insert(page);
                if !free {
                    self.sink.warn(&format!(
                        "Object page {} already written for another page, skipping {}",
                        page_file_name(key),
                        key
                    ));
                }
                free
            })
            .collect()
    }

    /// Samples present on disk, one per page filename not in `taken`
    fn sample_states(&self, objects: &[ReportedObject], taken: &mut HashSet<PathBuf>) -> Vec<SampleState> {
        let mut absent = Vec::new();
        let mut states = Vec::new();

        for name in &self.project.samples {
            let dir = self.project.sample_dir(name);
            if !dir.is_dir() {
                absent.push(name.as_str());
                continue;
            }
            let page = self.site.page_for(name);
            if !taken.insert(page.clone()) {
                self.sink.warn(&format!(
                    "Sample page {} already written for another page, skipping {}",
                    page_file_name(name),
                    name
                ));
                continue;
            }

            let flags = match resolve_flags(&dir, self.sink) {
                Ok(flags) => flags,
                Err(e) => {
                    self.sink.warn(&e.to_string());
                    Vec::new()
                }
            };

            let annotation = objects_for_sample(objects, name)
                .first()
                .and_then(|o| o.annotation.clone());
            let named = |suffix: &str| -> Option<PathBuf> {
                let path = match &annotation {
                    Some(a) => dir.join(format!("{}_{}", a, suffix)),
                    None => first_match(&dir, suffix)?,
                };
                path.is_file().then_some(path)
            };

            let stats_file = dir.join(STATS_FILE);
            states.push(SampleState {
                name: name.clone(),
                status: classify(&flags),
                log_file: named(LOG_SUFFIX),
                profile_file: named(PROFILE_SUFFIX),
                commands_file: named(COMMANDS_SUFFIX),
                stats_file: stats_file.is_file().then_some(stats_file),
                page,
            });
        }

        match absent.as_slice() {
            [] => {}
            [one] => self.sink.warn(&format!(
                "{} is not present in {}",
                one,
                self.project.results_subdir.display()
            )),
            many => self.sink.warn(&format!(
                "The following samples are not present in {}: {}",
                self.project.results_subdir.display(),
                many.join(", ")
            )),
        }
        states
    }

    fn split_artifacts(&self, artifacts: Vec<Artifact>, wd: &Path) -> (Vec<FigureView>, Vec<LinkView>) {
        let mut figures = Vec::new();
        let mut links = Vec::new();
        for artifact in artifacts {
            match artifact {
                Artifact::Figure {
                    link,
                    thumbnail,
                    label,
                } => figures.push(FigureView {
                    href: self.href(&link, wd),
                    thumbnail: self.href(&thumbnail, wd),
                    label,
                }),
                Artifact::Link { target, label } => links.push(LinkView {
                    href: self.href(&target, wd),
                    label,
                }),
                Artifact::Missing { .. } => {}
            }
        }
        (figures, links)
    }

    fn sample_view(
        &self,
        state: &SampleState,
        inputs: &ReportInputs,
        keys: &[String],
        samples: &[String],
    ) -> SampleView {
        let wd = self.site.reports_dir.as_path();
        let rows = objects_for_sample(&inputs.objects, &state.name);
        let artifacts = locate_all(
            rows,
            &self.project.results_subdir,
            &page_file_name(&state.name),
            |r| r.key.clone().unwrap_or_default(),
            self.sink,
        );
        let (figures, links) = self.split_artifacts(artifacts, wd);
        let file_href = |f: &Option<PathBuf>| f.as_ref().map(|p| self.href(p, wd));

        SampleView {
            navbar: self.navbar(keys, samples, wd),
            sample_name: state.name.clone(),
            status: state.status,
            log_file: file_href(&state.log_file),
            profile_file: file_href(&state.profile_file),
            commands_file: file_href(&state.commands_file),
            stats_file: file_href(&state.stats_file),
            stats: inputs
                .stats
                .row_for(&state.name)
                .map(|r| r.values.clone())
                .unwrap_or_default(),
            figures,
            links,
        }
    }

    fn object_view(
        &self,
        key: &str,
        page: &Path,
        inputs: &ReportInputs,
        keys: &[String],
        samples: &[String],
    ) -> ObjectView {
        let wd = self.site.reports_dir.as_path();
        let artifacts = locate_all(
            objects_for_key(&inputs.objects, key),
            &self.project.results_subdir,
            &page.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
            |r| r.sample_name.clone().unwrap_or_default(),
            self.sink,
        );
        let (figures, links) = self.split_artifacts(artifacts, wd);
        ObjectView {
            navbar: self.navbar(keys, samples, wd),
            name: key.to_string(),
            figures,
            links,
        }
    }

    fn listing_view<'p>(
        &self,
        header: &str,
        entries: impl Iterator<Item = (&'p str, &'p Path)>,
        keys: &[String],
        samples: &[String],
    ) -> ListingView {
        let wd = self.site.reports_dir.as_path();
        ListingView {
            navbar: self.navbar(keys, samples, wd),
            header: header.to_string(),
            entries: entries
                .map(|(label, page)| LinkView {
                    href: self.href(page, wd),
                    label: label.to_string(),
                })
                .collect(),
        }
    }

    fn status_view(&self, states: &[SampleState], keys: &[String], samples: &[String]) -> StatusView {
        let wd = self.site.reports_dir.as_path();
        let mut incomplete = false;
        let rows: Vec<StatusRow> = states
            .iter()
            .map(|state| {
                let run = state
                    .log_file
                    .as_deref()
                    .map(extract_runtime_and_memory)
                    .unwrap_or_else(RunLogSummary::unknown);
                if !run.is_complete() {
                    incomplete = true;
                }
                StatusRow {
                    sample_name: state.name.clone(),
                    sample_href: self.href(&state.page, wd),
                    status: state.status,
                    log: state.log_file.as_ref().map(|log| LinkView {
                        href: self.href(log, wd),
                        label: log
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                    }),
                    time: run.time,
                    peak_memory: run.peak_memory,
                }
            })
            .collect();
        if incomplete {
            self.sink.warn(
                "The stats table is incomplete, likely because one or more jobs either failed or is still running.",
            );
        }
        StatusView {
            navbar: self.navbar(keys, samples, wd),
            rows,
        }
    }

    fn index_view(
        &self,
        states: &[SampleState],
        inputs: &ReportInputs,
        keys: &[String],
        samples: &[String],
    ) -> IndexView {
        let wd = self.site.index_dir().to_path_buf();
        let sample_pages: std::collections::HashMap<&str, &Path> = states
            .iter()
            .map(|s| (s.name.as_str(), s.page.as_path()))
            .collect();

        let rows: Vec<Vec<TableCell>> = inputs
            .stats
            .rows
            .iter()
            .map(|record| {
                record
                    .values
                    .iter()
                    .map(|(column, value)| {
                        match sample_pages.get(value.as_str()) {
                            Some(page) if column == SAMPLE_NAME_COLUMN => TableCell::Link {
                                href: self.href(page, &wd),
                                label: value.clone(),
                            },
                            _ => TableCell::Text {
                                value: value.clone(),
                            },
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        let stats_path = self.project.stats_summary_path();
        let (project_figures, project_links) =
            self.project_results(&self.project.summary_results, &wd);

        IndexView {
            project_name: self.project.name.clone(),
            navbar: self.navbar(keys, samples, &wd),
            stats_file: stats_path
                .is_file()
                .then(|| self.href(&stats_path, &wd)),
            columns: inputs.stats.columns.clone(),
            rows,
            project_figures,
            project_links,
        }
    }

    /// Project summary products found under the output folder
    fn project_results(&self, results: &[SummaryResult], wd: &Path) -> (Vec<FigureView>, Vec<LinkView>) {
        let output_dir = &self.project.output_dir;
        let mut figures = Vec::new();
        let mut links = Vec::new();
        let mut not_found = Vec::new();

        for result in results {
            let path = result.path.replace("{name}", &self.project.name);
            let Some(file) = first_glob(output_dir, &path) else {
                not_found.push(result.caption.as_str());
                continue;
            };
            let label = format!("{}: Click to see full-size figure", result.caption);
            let thumbnail = result
                .thumbnail_path
                .as_ref()
                .and_then(|t| first_glob(output_dir, &t.replace("{name}", &self.project.name)));
            match thumbnail {
                Some(image) => figures.push(FigureView {
                    href: self.href(&file, wd),
                    thumbnail: self.href(&image, wd),
                    label,
                }),
                None => links.push(LinkView {
                    href: self.href(&file, wd),
                    label,
                }),
            }
        }

        if !not_found.is_empty() {
            self.sink.warn(&format!(
                "Summarizer was unable to find: {}",
                not_found.join(", ")
            ));
        }
        (figures, links)
    }

    /// Render and write one page; failures are reported and skipped
    fn save_page(&self, path: &Path, page: &PageView) {
        let html = self.renderer.render(page);
        match write_page(path, &html) {
            Ok(()) => self.sink.debug(&format!(
                "Wrote {} page {}",
                page.template_name(),
                path.display()
            )),
            Err(e) => self
                .sink
                .error(&format!("Could not write page {}: {}", path.display(), e)),
        }
    }
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    Ok(())
}

/// First file in `dir` whose name ends in `suffix`
fn first_match(dir: &Path, suffix: &str) -> Option<PathBuf> {
    first_glob(dir, &format!("*{}", glob::Pattern::escape(suffix)))
}

/// First match, in sorted order, of `pattern` relative to `dir`
fn first_glob(dir: &Path, pattern: &str) -> Option<PathBuf> {
    let full = format!("{}/{}", glob::Pattern::escape(&dir.to_string_lossy()), pattern);
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };
    let mut matches: Vec<PathBuf> = glob::glob_with(&full, options)
        .ok()?
        .filter_map(|e| e.ok())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

//! Reported object resolution
//!
//! Turns rows of the objects summary into figures (object + image
//! thumbnail), plain links, or missing entries, based on what actually exists
//! under the results folder.

use crate::diagnostics::DiagnosticSink;
use crate::tables::ReportedObject;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Thumbnail extensions rendered inline as images
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "svg", "gif"];

/// Result of a single existence probe, so later steps never re-check the disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Exists(PathBuf),
    Missing(PathBuf),
}

impl Presence {
    pub fn probe(path: PathBuf) -> Self {
        if path.is_file() {
            Presence::Exists(path)
        } else {
            Presence::Missing(path)
        }
    }
}

/// What a reported object resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Artifact {
    /// Object with an image thumbnail
    Figure {
        link: PathBuf,
        thumbnail: PathBuf,
        label: String,
    },
    /// Object shown as a plain link
    Link { target: PathBuf, label: String },
    /// Nothing usable on disk
    Missing { filename: String },
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn is_image(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn is_html(path: &Path) -> bool {
    extension_lowercase(path).as_deref() == Some("html")
}

/// Resolve one objects-table row against `results_subdir`.
///
/// Precedence, first match wins: thumbnail and object both exist with an
/// image thumbnail (figure); both exist with an HTML thumbnail (link to the
/// thumbnail); the object exists (link to it); otherwise missing.
pub fn locate(row: &ReportedObject, results_subdir: &Path, label: &str) -> Artifact {
    let (sample_name, filename) = match (&row.sample_name, &row.filename) {
        (Some(sample), Some(file)) => (sample, file),
        _ => {
            return Artifact::Missing {
                filename: row.filename.clone().unwrap_or_else(|| "unknown".to_string()),
            }
        }
    };

    let sample_dir = results_subdir.join(sample_name);
    let target = Presence::probe(sample_dir.join(filename));

    let thumbnail = if filename.to_lowercase().ends_with(".html") {
        Some(target.clone())
    } else {
        row.anchor_image
            .as_ref()
            .map(|image| Presence::probe(sample_dir.join(image)))
    };

    match (thumbnail, target) {
        (Some(Presence::Exists(thumb)), Presence::Exists(object)) if is_image(&thumb) => {
            Artifact::Figure {
                link: object,
                thumbnail: thumb,
                label: label.to_string(),
            }
        }
        (Some(Presence::Exists(thumb)), Presence::Exists(_)) if is_html(&thumb) => Artifact::Link {
            target: thumb,
            label: label.to_string(),
        },
        (_, Presence::Exists(object)) => Artifact::Link {
            target: object,
            label: label.to_string(),
        },
        (_, Presence::Missing(_)) => Artifact::Missing {
            filename: filename.clone(),
        },
    }
}

/// Resolve a batch of rows for the page `page_name`.
///
/// Missing objects never abort the batch; they are reported once, as a
/// single warning for the page plus one debug entry listing the files.
pub fn locate_all<'a, I, F>(
    rows: I,
    results_subdir: &Path,
    page_name: &str,
    label_of: F,
    sink: &dyn DiagnosticSink,
) -> Vec<Artifact>
where
    I: IntoIterator<Item = &'a ReportedObject>,
    F: Fn(&ReportedObject) -> String,
{
    let artifacts: Vec<Artifact> = rows
        .into_iter()
        .map(|row| locate(row, results_subdir, &label_of(row)))
        .collect();

    let missing: Vec<&str> = artifacts
        .iter()
        .filter_map(|a| match a {
            Artifact::Missing { filename } => Some(filename.as_str()),
            _ => None,
        })
        .collect();
    if !missing.is_empty() {
        sink.warn(&format!(
            "{} references nonexistent object files: {}",
            page_name,
            missing.join(",")
        ));
    }

    artifacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use std::fs;
    use tempfile::TempDir;

    fn row(sample: &str, filename: &str, anchor: Option<&str>) -> ReportedObject {
        ReportedObject {
            key: Some("plot".to_string()),
            sample_name: Some(sample.to_string()),
            filename: Some(filename.to_string()),
            anchor_image: anchor.map(|a| a.to_string()),
            annotation: None,
        }
    }

    fn touch(dir: &Path, rel: &str) {
        let p = dir.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "x").unwrap();
    }

    #[test]
    fn test_image_thumbnail_is_figure() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "S1/out.pdf");
        touch(dir.path(), "S1/thumb.PNG");

        let a = locate(&row("S1", "out.pdf", Some("thumb.PNG")), dir.path(), "S1");

        assert_eq!(
            a,
            Artifact::Figure {
                link: dir.path().join("S1/out.pdf"),
                thumbnail: dir.path().join("S1/thumb.PNG"),
                label: "S1".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_thumbnail_falls_back_to_link() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "S1/S1/out.txt");

        let a = locate(&row("S1", "S1/out.txt", Some("S1/thumb.png")), dir.path(), "plot");

        assert_eq!(
            a,
            Artifact::Link {
                target: dir.path().join("S1/S1/out.txt"),
                label: "plot".to_string(),
            }
        );
    }

    #[test]
    fn test_html_object_links_to_itself() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "S1/report.HTML");

        let a = locate(&row("S1", "report.HTML", Some("ignored.png")), dir.path(), "S1");

        assert_eq!(
            a,
            Artifact::Link {
                target: dir.path().join("S1/report.HTML"),
                label: "S1".to_string(),
            }
        );
    }

    #[test]
    fn test_html_thumbnail_becomes_link_target() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "S1/data.tsv");
        touch(dir.path(), "S1/preview.html");

        let a = locate(&row("S1", "data.tsv", Some("preview.html")), dir.path(), "S1");

        assert_eq!(
            a,
            Artifact::Link {
                target: dir.path().join("S1/preview.html"),
                label: "S1".to_string(),
            }
        );
    }

    #[test]
    fn test_unrecognized_thumbnail_still_links() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "S1/data.tsv");
        touch(dir.path(), "S1/thumb.bmp");

        let a = locate(&row("S1", "data.tsv", Some("thumb.bmp")), dir.path(), "S1");

        assert!(matches!(a, Artifact::Link { ref target, .. } if target.ends_with("S1/data.tsv")));
    }

    #[test]
    fn test_nothing_on_disk_is_missing() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "S1/thumb.png");

        let a = locate(&row("S1", "gone.pdf", Some("thumb.png")), dir.path(), "S1");

        assert_eq!(a, Artifact::Missing { filename: "gone.pdf".to_string() });
    }

    #[test]
    fn test_row_without_filename_is_missing() {
        let dir = TempDir::new().unwrap();
        let mut r = row("S1", "x", None);
        r.filename = None;

        assert_eq!(
            locate(&r, dir.path(), "S1"),
            Artifact::Missing { filename: "unknown".to_string() }
        );
    }

    #[test]
    fn test_batch_warns_once() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "S1/ok.txt");
        let rows = vec![
            row("S1", "ok.txt", None),
            row("S1", "a.pdf", None),
            row("S2", "b.pdf", None),
        ];
        let sink = MemorySink::new();

        let artifacts = locate_all(&rows, dir.path(), "plot.html", |r| r.sample_name.clone().unwrap_or_default(), &sink);

        assert_eq!(artifacts.len(), 3);
        assert_eq!(
            sink.warnings(),
            vec!["plot.html references nonexistent object files: a.pdf,b.pdf"]
        );
    }

    #[test]
    fn test_presence_probe() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "here");
        assert_eq!(
            Presence::probe(dir.path().join("here")),
            Presence::Exists(dir.path().join("here"))
        );
        let missing = Presence::probe(dir.path().join("there"));
        assert_eq!(missing, Presence::Missing(dir.path().join("there")));
    }
}

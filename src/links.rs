//! Page addressing, relative hrefs and the navigation bar model
//!
//! Every link in a generated page is relative to that page's own folder, so
//! the report tree can be moved as a whole without breaking anything.

use serde::Serialize;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Above this many entries a navbar menu collapses into a single link to its
/// parent listing page.
pub const NAVBAR_DROPDOWN_LIMIT: usize = 20;

pub const STATUS_PAGE: &str = "status.html";
pub const OBJECTS_PAGE: &str = "objects.html";
pub const SAMPLES_PAGE: &str = "samples.html";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
    Relative,
    Absolute(Option<OsString>),
}

/// Lexical normalisation: drops `.`, folds `..` into the preceding segment
fn normalize(path: &Path) -> (Anchor, Vec<OsString>) {
    let mut prefix = None;
    let mut rooted = false;
    let mut parts: Vec<OsString> = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => prefix = Some(p.as_os_str().to_os_string()),
            Component::RootDir => rooted = true,
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal = parts.last().map(|p| p != "..").unwrap_or(false);
                if last_is_normal {
                    parts.pop();
                } else if !rooted {
                    parts.push(OsString::from(".."));
                }
            }
            Component::Normal(name) => parts.push(name.to_os_string()),
        }
    }
    let anchor = if rooted || prefix.is_some() {
        Anchor::Absolute(prefix)
    } else {
        Anchor::Relative
    };
    (anchor, parts)
}

/// Relative path from `from_dir` to `target`, `/`-separated.
///
/// Purely lexical: nothing is read from disk. Identical paths give `"."`.
/// When the two paths have no common anchor (one absolute, one relative, or
/// different drive prefixes) the target is returned unchanged.
pub fn relative_href(target: &Path, from_dir: &Path) -> String {
    let (target_anchor, target_parts) = normalize(target);
    let (from_anchor, from_parts) = normalize(from_dir);
    if target_anchor != from_anchor {
        return target.to_string_lossy().replace('\\', "/");
    }

    let common = target_parts
        .iter()
        .zip(&from_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        segments.push("..".to_string());
    }
    for part in &target_parts[common..] {
        segments.push(part.to_string_lossy().into_owned());
    }

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// Follow `href` from `from_dir`, lexically
pub fn resolve_href(from_dir: &Path, href: &str) -> PathBuf {
    let joined = from_dir.join(href);
    let (anchor, parts) = normalize(&joined);
    let mut out = PathBuf::new();
    if let Anchor::Absolute(prefix) = anchor {
        if let Some(p) = prefix {
            out.push(p);
        }
        out.push(Component::RootDir.as_os_str());
    }
    for part in parts {
        out.push(part);
    }
    out
}

/// Page file name for a sample or object label: lowercased, with spaces and
/// path separators turned into `_` so the page stays in the reports folder
pub fn page_file_name(label: &str) -> String {
    let name: String = label
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{}.html", name.to_lowercase())
}

/// Absolute locations of every page in a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMap {
    pub index_page: PathBuf,
    pub reports_dir: PathBuf,
}

impl SiteMap {
    pub fn new(index_page: PathBuf, reports_dir: PathBuf) -> Self {
        Self {
            index_page,
            reports_dir,
        }
    }

    pub fn index_dir(&self) -> &Path {
        self.index_page.parent().unwrap_or(Path::new("."))
    }

    pub fn status_page(&self) -> PathBuf {
        self.reports_dir.join(STATUS_PAGE)
    }

    pub fn objects_page(&self) -> PathBuf {
        self.reports_dir.join(OBJECTS_PAGE)
    }

    pub fn samples_page(&self) -> PathBuf {
        self.reports_dir.join(SAMPLES_PAGE)
    }

    /// Page for a single sample or object type
    pub fn page_for(&self, label: &str) -> PathBuf {
        self.reports_dir.join(page_file_name(label))
    }
}

/// One navbar entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// A navbar menu: enumerated, collapsed to the parent page, or absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "links", rename_all = "lowercase")]
pub enum NavMenu {
    Empty,
    Dropdown(Vec<NavLink>),
    Parent(String),
}

impl NavMenu {
    /// Build a menu over `labels` (expected distinct) from the page at `wd`
    fn build(site: &SiteMap, labels: &[String], parent_page: &Path, wd: &Path) -> Self {
        if labels.is_empty() {
            NavMenu::Empty
        } else if labels.len() <= NAVBAR_DROPDOWN_LIMIT {
            NavMenu::Dropdown(
                labels
                    .iter()
                    .map(|label| NavLink {
                        label: label.clone(),
                        href: relative_href(&site.page_for(label), wd),
                    })
                    .collect(),
            )
        } else {
            NavMenu::Parent(relative_href(parent_page, wd))
        }
    }

    /// Every href this menu contributes to the navbar
    pub fn hrefs(&self) -> Vec<&str> {
        match self {
            NavMenu::Empty => Vec::new(),
            NavMenu::Dropdown(links) => links.iter().map(|l| l.href.as_str()).collect(),
            NavMenu::Parent(href) => vec![href.as_str()],
        }
    }
}

/// Navbar links for one page, all relative to that page's folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationModel {
    pub index: String,
    pub status: String,
    pub all_objects: String,
    pub all_samples: String,
    pub objects: NavMenu,
    pub samples: NavMenu,
}

impl NavigationModel {
    /// `object_keys` and `sample_names` are deduplicated before counting.
    pub fn build(site: &SiteMap, object_keys: &[String], sample_names: &[String], wd: &Path) -> Self {
        let objects_page = site.objects_page();
        let samples_page = site.samples_page();
        Self {
            index: relative_href(&site.index_page, wd),
            status: relative_href(&site.status_page(), wd),
            all_objects: relative_href(&objects_page, wd),
            all_samples: relative_href(&samples_page, wd),
            objects: NavMenu::build(site, &distinct(object_keys), &objects_page, wd),
            samples: NavMenu::build(site, &distinct(sample_names), &samples_page, wd),
        }
    }
}

/// Order-preserving dedup
fn distinct(items: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteMap {
        SiteMap::new(
            PathBuf::from("/prj/out/demo_summary.html"),
            PathBuf::from("/prj/out/reports"),
        )
    }

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("obj {}", i)).collect()
    }

    #[test]
    fn test_relative_sibling_and_parent() {
        assert_eq!(
            relative_href(Path::new("/prj/out/reports/status.html"), Path::new("/prj/out/reports")),
            "status.html"
        );
        assert_eq!(
            relative_href(Path::new("/prj/out/demo_summary.html"), Path::new("/prj/out/reports")),
            "../demo_summary.html"
        );
        assert_eq!(
            relative_href(
                Path::new("/prj/out/results_pipeline/s1/plot.png"),
                Path::new("/prj/out/reports_sub")
            ),
            "../results_pipeline/s1/plot.png"
        );
    }

    #[test]
    fn test_relative_identical_is_dot() {
        assert_eq!(relative_href(Path::new("/a/b"), Path::new("/a/b/")), ".");
    }

    #[test]
    fn test_relative_normalizes_dots() {
        assert_eq!(
            relative_href(Path::new("/a/./b/../c/x.html"), Path::new("/a/d/./e")),
            "../../c/x.html"
        );
    }

    #[test]
    fn test_relative_mixed_anchors_returns_target() {
        assert_eq!(relative_href(Path::new("rel/x.html"), Path::new("/abs")), "rel/x.html");
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name("Fragment Sizes"), "fragment_sizes.html");
        assert_eq!(page_file_name("frog_1"), "frog_1.html");
        assert_eq!(page_file_name("../escaped"), ".._escaped.html");
        assert_eq!(page_file_name("a\\b/c"), "a_b_c.html");
    }

    #[test]
    fn test_navbar_dropdown_at_limit() {
        let nav = NavigationModel::build(&site(), &labels(20), &[], Path::new("/prj/out/reports"));
        assert_eq!(nav.objects.hrefs().len(), 20);
        assert_eq!(nav.objects.hrefs()[0], "obj_0.html");
        assert_eq!(nav.samples, NavMenu::Empty);
    }

    #[test]
    fn test_navbar_collapses_above_limit() {
        let nav = NavigationModel::build(&site(), &labels(21), &labels(21), Path::new("/prj/out"));
        assert_eq!(nav.objects, NavMenu::Parent("reports/objects.html".to_string()));
        assert_eq!(nav.samples, NavMenu::Parent("reports/samples.html".to_string()));
    }

    #[test]
    fn test_navbar_counts_distinct_entries() {
        let mut repeated = labels(20);
        repeated.extend(labels(5));
        let nav = NavigationModel::build(&site(), &repeated, &[], Path::new("/prj/out/reports"));
        assert_eq!(nav.objects.hrefs().len(), 20);
    }

    #[test]
    fn test_navbar_fixed_links_from_index() {
        let nav = NavigationModel::build(&site(), &[], &[], Path::new("/prj/out"));
        assert_eq!(nav.index, "demo_summary.html");
        assert_eq!(nav.status, "reports/status.html");
        assert_eq!(nav.all_samples, "reports/samples.html");
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn segments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-c]{1,3}", 0..5)
    }

    fn under_root(parts: &[String]) -> PathBuf {
        let mut p = PathBuf::from("/root");
        for part in parts {
            p.push(part);
        }
        p
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn href_resolves_back_to_target(a in segments(), b in segments()) {
            let target = under_root(&a);
            let from = under_root(&b);
            let href = relative_href(&target, &from);
            prop_assert_eq!(resolve_href(&from, &href), target.clone());

            let back = relative_href(&from, &target);
            prop_assert_eq!(resolve_href(&resolve_href(&from, &href), &back), from);
        }
    }
}

//! Reporter module: page views and output formatting

pub mod console;
pub mod html;
pub mod json;
pub mod pages;

pub use console::ConsoleReporter;
pub use html::HtmlRenderer;
pub use json::JsonReporter;
pub use pages::{ReportBuilder, ReportInputs};

use crate::links::NavigationModel;
use crate::Classification;
use serde::Serialize;

/// A figure: thumbnail image linking to the full object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FigureView {
    pub href: String,
    pub thumbnail: String,
    pub label: String,
}

/// A labelled hyperlink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkView {
    pub href: String,
    pub label: String,
}

/// One cell of the index stats table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TableCell {
    Text { value: String },
    Link { href: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexView {
    pub project_name: String,
    pub navbar: NavigationModel,
    pub stats_file: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<TableCell>>,
    pub project_figures: Vec<FigureView>,
    pub project_links: Vec<LinkView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleView {
    pub navbar: NavigationModel,
    pub sample_name: String,
    pub status: Classification,
    pub log_file: Option<String>,
    pub profile_file: Option<String>,
    pub commands_file: Option<String>,
    pub stats_file: Option<String>,
    pub stats: Vec<(String, String)>,
    pub figures: Vec<FigureView>,
    pub links: Vec<LinkView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectView {
    pub navbar: NavigationModel,
    pub name: String,
    pub figures: Vec<FigureView>,
    pub links: Vec<LinkView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    pub sample_name: String,
    pub sample_href: String,
    pub status: Classification,
    pub log: Option<LinkView>,
    pub time: String,
    pub peak_memory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub navbar: NavigationModel,
    pub rows: Vec<StatusRow>,
}

/// Parent page listing samples or object types
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingView {
    pub navbar: NavigationModel,
    pub header: String,
    pub entries: Vec<LinkView>,
}

/// Everything needed to render one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", content = "context", rename_all = "lowercase")]
pub enum PageView {
    Index(IndexView),
    Sample(SampleView),
    Object(ObjectView),
    Status(StatusView),
    Listing(ListingView),
}

impl PageView {
    /// Template name for this page kind
    pub fn template_name(&self) -> &'static str {
        match self {
            PageView::Index(_) => "index.html",
            PageView::Sample(_) => "sample.html",
            PageView::Object(_) => "object.html",
            PageView::Status(_) => "status.html",
            PageView::Listing(_) => "navbar_list_parent.html",
        }
    }

    pub fn navbar(&self) -> &NavigationModel {
        match self {
            PageView::Index(v) => &v.navbar,
            PageView::Sample(v) => &v.navbar,
            PageView::Object(v) => &v.navbar,
            PageView::Status(v) => &v.navbar,
            PageView::Listing(v) => &v.navbar,
        }
    }
}

/// Turns a page view into markup
pub trait PageRenderer {
    fn render(&self, page: &PageView) -> String;
}

//! HTML renderer: turns page views into standalone bootstrap pages
//!
//! Pages are assembled with plain string building. Output depends only on the
//! view, so rendering the same view twice yields identical bytes.

use super::{
    FigureView, IndexView, LinkView, ListingView, ObjectView, PageRenderer, PageView, SampleView,
    StatusView, TableCell,
};
use crate::links::{NavMenu, NavigationModel};
use std::fmt::Write as _;

/// Escape text for element content and quoted attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renderer producing the report's HTML pages
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn page(&self, title: &str, navbar: &NavigationModel, body: &str) -> String {
        let mut html = String::with_capacity(8_192);
        html.push_str(Self::template_head());
        let _ = writeln!(html, "<title>Looper: {}</title>", escape_html(title));
        html.push_str("</head>\n<body>\n");
        html.push_str(&self.navbar(navbar));
        html.push_str("<div class=\"container\">\n");
        html.push_str(body);
        html.push_str("</div>\n");
        html.push_str(Self::template_footer());
        html
    }

    fn navbar(&self, nav: &NavigationModel) -> String {
        let mut html = String::new();
        html.push_str("<nav class=\"navbar sticky-top navbar-expand-lg navbar-dark bg-primary\">\n");
        html.push_str("<ul class=\"navbar-nav mr-auto\">\n");
        let _ = writeln!(
            html,
            "<li class=\"nav-item active\"><a class=\"nav-link\" href=\"{}\">Summary</a></li>",
            escape_html(&nav.index)
        );
        let _ = writeln!(
            html,
            "<li class=\"nav-item\"><a class=\"nav-link\" href=\"{}\">Status</a></li>",
            escape_html(&nav.status)
        );
        html.push_str(&Self::menu("Objects", &nav.objects, &nav.all_objects));
        html.push_str(&Self::menu("Samples", &nav.samples, &nav.all_samples));
        html.push_str("</ul>\n</nav>\n");
        html
    }

    fn menu(name: &str, menu: &NavMenu, all_href: &str) -> String {
        let mut html = String::new();
        match menu {
            NavMenu::Empty => {}
            NavMenu::Parent(href) => {
                let _ = writeln!(
                    html,
                    "<li class=\"nav-item\"><a class=\"nav-link\" href=\"{}\">{}</a></li>",
                    escape_html(href),
                    name
                );
            }
            NavMenu::Dropdown(links) => {
                let _ = writeln!(
                    html,
                    "<li class=\"nav-item dropdown\">\n<a class=\"nav-link dropdown-toggle\" href=\"#\" role=\"button\" data-toggle=\"dropdown\">{}</a>\n<div class=\"dropdown-menu\">",
                    name
                );
                for link in links {
                    let _ = writeln!(
                        html,
                        "<a class=\"dropdown-item\" href=\"{}\">{}</a>",
                        escape_html(&link.href),
                        escape_html(&link.label)
                    );
                }
                html.push_str("<div class=\"dropdown-divider\"></div>\n");
                let _ = writeln!(
                    html,
                    "<a class=\"dropdown-item dropdown-all\" href=\"{}\">All {}</a>",
                    escape_html(all_href),
                    name.to_lowercase()
                );
                html.push_str("</div>\n</li>\n");
            }
        }
        html
    }

    fn figures_and_links(figures: &[FigureView], links: &[LinkView]) -> String {
        let mut html = String::new();
        if !figures.is_empty() {
            html.push_str("<div class=\"row justify-content-start\">\n");
            for f in figures {
                let _ = writeln!(
                    html,
                    "<div class=\"col-4\"><figure class=\"figure\"><a href=\"{href}\"><img src=\"{img}\" class=\"figure-img img-fluid rounded img-thumbnail\" alt=\"\"></a><a href=\"{href}\"><figcaption class=\"figure-caption text-left\">{label}</figcaption></a></figure></div>",
                    href = escape_html(&f.href),
                    img = escape_html(&f.thumbnail),
                    label = escape_html(&f.label)
                );
            }
            html.push_str("</div>\n");
        }
        if !links.is_empty() {
            html.push_str("<ul style=\"list-style-type:circle\">\n");
            for l in links {
                let _ = writeln!(
                    html,
                    "<li><a href=\"{}\">{}</a></li>",
                    escape_html(&l.href),
                    escape_html(&l.label)
                );
            }
            html.push_str("</ul>\n");
        }
        html
    }

    fn index(&self, v: &IndexView) -> String {
        let mut body = String::new();
        let _ = writeln!(body, "<h2>{} summary</h2>", escape_html(&v.project_name));
        if let Some(stats) = &v.stats_file {
            let _ = writeln!(
                body,
                "<p><a class=\"btn btn-outline-primary\" href=\"{}\">Stats summary file</a></p>",
                escape_html(stats)
            );
        }
        if !v.columns.is_empty() {
            body.push_str("<table class=\"display compact\" id=\"data-table\">\n<thead><tr>");
            for col in &v.columns {
                let _ = write!(body, "<th>{}</th>", escape_html(col));
            }
            body.push_str("</tr></thead>\n<tbody>\n");
            for row in &v.rows {
                body.push_str("<tr>");
                for cell in row {
                    match cell {
                        TableCell::Text { value } => {
                            let _ = write!(body, "<td class=\"text\">{}</td>", escape_html(value));
                        }
                        TableCell::Link { href, label } => {
                            let _ = write!(
                                body,
                                "<td><a href=\"{}\">{}</a></td>",
                                escape_html(href),
                                escape_html(label)
                            );
                        }
                    }
                }
                body.push_str("</tr>\n");
            }
            body.push_str("</tbody>\n</table>\n");
        }
        if !v.project_figures.is_empty() || !v.project_links.is_empty() {
            body.push_str("<h5>Looper project objects</h5>\n");
            body.push_str(&Self::figures_and_links(&v.project_figures, &v.project_links));
        }
        self.page(&format!("{} summary", v.project_name), &v.navbar, &body)
    }

    fn sample(&self, v: &SampleView) -> String {
        let mut body = String::new();
        let _ = writeln!(body, "<h4>{}</h4>", escape_html(&v.sample_name));
        body.push_str("<p class=\"text-left\">\n");
        let _ = writeln!(
            body,
            "<button type=\"button\" class=\"{}\" disabled>STATUS: {}</button>",
            v.status.class.button_class(),
            v.status.status
        );
        let files = [
            (&v.log_file, "Log file"),
            (&v.profile_file, "Pipeline profile"),
            (&v.commands_file, "Pipeline commands"),
            (&v.stats_file, "Stats summary file"),
        ];
        for (href, label) in files {
            if let Some(href) = href {
                let _ = writeln!(
                    body,
                    "<a class=\"btn btn-info\" href=\"{}\" role=\"button\">{}</a>",
                    escape_html(href),
                    label
                );
            }
        }
        body.push_str("</p>\n");
        if !v.stats.is_empty() {
            body.push_str("<h5>Looper stats summary</h5>\n<table class=\"table table-sm table-hover table-bordered\">\n<tbody>\n");
            for (key, value) in &v.stats {
                let _ = writeln!(
                    body,
                    "<tr><th>{}</th><td class=\"text\">{}</td></tr>",
                    escape_html(key),
                    escape_html(value)
                );
            }
            body.push_str("</tbody>\n</table>\n");
        }
        body.push_str(&Self::figures_and_links(&v.figures, &v.links));
        self.page(&v.sample_name, &v.navbar, &body)
    }

    fn object(&self, v: &ObjectView) -> String {
        let mut body = String::new();
        let _ = writeln!(body, "<h4>{}</h4>", escape_html(&v.name));
        body.push_str(&Self::figures_and_links(&v.figures, &v.links));
        self.page(&v.name, &v.navbar, &body)
    }

    fn status(&self, v: &StatusView) -> String {
        let mut body = String::new();
        body.push_str("<h4>Sample status</h4>\n<table class=\"table table-sm\">\n");
        body.push_str("<thead><tr><th>Sample name</th><th>Status</th><th>Log file</th><th>Runtime</th><th>Peak memory use</th></tr></thead>\n<tbody>\n");
        for row in &v.rows {
            let log = match &row.log {
                Some(link) => format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(&link.href),
                    escape_html(&link.label)
                ),
                None => String::new(),
            };
            let _ = writeln!(
                body,
                "<tr class=\"{}\"><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                row.status.class.table_class(),
                escape_html(&row.sample_href),
                escape_html(&row.sample_name),
                row.status.status,
                log,
                escape_html(&row.time),
                escape_html(&row.peak_memory)
            );
        }
        body.push_str("</tbody>\n</table>\n");
        self.page("Status", &v.navbar, &body)
    }

    fn listing(&self, v: &ListingView) -> String {
        let mut body = String::new();
        let _ = writeln!(body, "<h4>{}</h4>", escape_html(&v.header));
        body.push_str("<ul style=\"list-style-type:circle\">\n");
        for entry in &v.entries {
            let _ = writeln!(
                body,
                "<li><a href=\"{}\">{}</a></li>",
                escape_html(&entry.href),
                escape_html(&entry.label)
            );
        }
        body.push_str("</ul>\n");
        self.page(&v.header, &v.navbar, &body)
    }

    // ─── HTML template pieces ────────────────────────────────────────────

    fn template_head() -> &'static str {
        r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1, shrink-to-fit=no">
<link rel="stylesheet" href="https://maxcdn.bootstrapcdn.com/bootstrap/4.1.3/css/bootstrap.min.css">
<style>
.table td.text{max-width:500px;padding:0 2px;white-space:nowrap;overflow:hidden;text-overflow:ellipsis}
</style>
"##
    }

    fn template_footer() -> &'static str {
        r##"<script src="https://code.jquery.com/jquery-3.3.1.slim.min.js"></script>
<script src="https://stackpath.bootstrapcdn.com/bootstrap/4.1.1/js/bootstrap.min.js"></script>
</body>
</html>
"##
    }
}

impl PageRenderer for HtmlRenderer {
    fn render(&self, page: &PageView) -> String {
        match page {
            PageView::Index(v) => self.index(v),
            PageView::Sample(v) => self.sample(v),
            PageView::Object(v) => self.object(v),
            PageView::Status(v) => self.status(v),
            PageView::Listing(v) => self.listing(v),
        }
    }
}

//! Console reporter with colored output

use crate::status::{SampleStatus, StatusSummary};
use crate::{DisplayClass, Status};
use colored::Colorize;
use std::fmt::Write as _;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to list samples with an unproblematic status too
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Print the status table and counts for a project
    pub fn report(&self, project_name: &str, summary: &StatusSummary) {
        print!("{}", self.format(project_name, summary));
    }

    /// Report in quiet mode (counts only)
    pub fn report_quiet(&self, project_name: &str, summary: &StatusSummary) {
        println!("{}: {}", project_name, self.counts_line(summary));
    }

    pub fn format(&self, project_name: &str, summary: &StatusSummary) -> String {
        let mut out = String::new();
        let title = format!("Sample status: {}", project_name);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.paint(&title, |s| s.bold().to_string()));

        let width = summary
            .samples
            .iter()
            .map(|s| s.sample_name.len())
            .max()
            .unwrap_or(0)
            .max("Sample".len());
        let _ = writeln!(out, "   {:<width$}  {:<9}  {}", "Sample", "Status", "Flags", width = width);

        let mut hidden = 0;
        for sample in &summary.samples {
            if !self.verbose && !sample.classification.status.is_problem() {
                hidden += 1;
                continue;
            }
            let _ = writeln!(out, "{}", self.sample_line(sample, width));
        }
        if hidden > 0 {
            let _ = writeln!(
                out,
                "   {} completed or running (use --verbose to list)",
                hidden
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "   {}", self.counts_line(summary));
        out
    }

    fn sample_line(&self, sample: &SampleStatus, width: usize) -> String {
        let status = format!("{:<9}", sample.classification.status.to_string());
        let status = self.paint(&status, |s| colorize(sample.classification.class, s));
        let mut flags = sample.flags.join(", ");
        if !sample.on_disk {
            flags = "no sample folder".to_string();
        }
        format!(
            "   {:<width$}  {}  {}",
            sample.sample_name,
            status,
            self.paint(&flags, |s| s.dimmed().to_string()),
            width = width
        )
    }

    fn counts_line(&self, summary: &StatusSummary) -> String {
        let parts: Vec<String> = Status::ALL
            .iter()
            .filter(|status| summary.count(**status) > 0)
            .map(|status| format!("{}: {}", status, summary.count(*status)))
            .collect();
        if parts.is_empty() {
            "no samples".to_string()
        } else {
            parts.join(" | ")
        }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> String) -> String {
        if self.use_colors {
            style(text)
        } else {
            text.to_string()
        }
    }
}

fn colorize(class: DisplayClass, text: &str) -> String {
    match class {
        DisplayClass::Success => text.green().to_string(),
        DisplayClass::Warning => text.yellow().to_string(),
        DisplayClass::Danger => text.red().bold().to_string(),
        DisplayClass::Secondary => text.dimmed().to_string(),
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Classification;
    use std::collections::BTreeMap;

    fn summary() -> StatusSummary {
        let sample = |name: &str, status, class, flags: &[&str], on_disk| SampleStatus {
            sample_name: name.to_string(),
            flags: flags.iter().map(|f| f.to_string()).collect(),
            classification: Classification { status, class },
            on_disk,
        };
        StatusSummary {
            samples: vec![
                sample("frog_1", Status::Completed, DisplayClass::Success, &["completed"], true),
                sample("frog_2", Status::Failed, DisplayClass::Danger, &["failed"], true),
                sample("frog_3", Status::Missing, DisplayClass::Danger, &[], false),
            ],
            counts: BTreeMap::from([
                (Status::Completed, 1),
                (Status::Failed, 1),
                (Status::Missing, 1),
            ]),
        }
    }

    #[test]
    fn test_problems_listed_others_counted() {
        let out = ConsoleReporter::new().without_colors().format("frogs", &summary());
        assert!(out.contains("Sample status: frogs"));
        assert!(!out.contains("frog_1 "));
        assert!(out.contains("frog_2"));
        assert!(out.contains("no sample folder"));
        assert!(out.contains("1 completed or running"));
        assert!(out.contains("Completed: 1 | Failed: 1 | Missing: 1"));
    }

    #[test]
    fn test_verbose_lists_everything() {
        let out = ConsoleReporter::new()
            .without_colors()
            .verbose()
            .format("frogs", &summary());
        assert!(out.contains("frog_1"));
        assert!(!out.contains("use --verbose"));
    }
}

//! JSON reporter for machine-readable output

use crate::status::{SampleStatus, StatusSummary};
use serde::Serialize;
use std::collections::BTreeMap;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Report per-sample statuses with the project name and totals
    pub fn report(&self, project_name: &str, summary: &StatusSummary) -> String {
        let output = JsonOutput {
            project: project_name,
            samples: &summary.samples,
            summary: JsonSummary {
                total: summary.samples.len(),
                problems: summary
                    .samples
                    .iter()
                    .filter(|s| s.classification.status.is_problem())
                    .count(),
                counts: summary
                    .counts
                    .iter()
                    .map(|(status, n)| (status.to_string(), *n))
                    .collect(),
            },
        };

        if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    project: &'a str,
    samples: &'a [SampleStatus],
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    problems: usize,
    counts: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Classification, DisplayClass, Status};

    fn summary() -> StatusSummary {
        StatusSummary {
            samples: vec![SampleStatus {
                sample_name: "frog_1".to_string(),
                flags: vec!["running".to_string()],
                classification: Classification {
                    status: Status::Running,
                    class: DisplayClass::Warning,
                },
                on_disk: true,
            }],
            counts: BTreeMap::from([(Status::Running, 1)]),
        }
    }

    #[test]
    fn test_json_output_shape() {
        let json = JsonReporter::new().report("frogs", &summary());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["project"], "frogs");
        assert_eq!(value["samples"][0]["sampleName"], "frog_1");
        assert_eq!(value["samples"][0]["status"], "Running");
        assert_eq!(value["samples"][0]["class"], "warning");
        assert_eq!(value["samples"][0]["onDisk"], true);
        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["summary"]["problems"], 0);
        assert_eq!(value["summary"]["counts"]["Running"], 1);
    }

    #[test]
    fn test_pretty_output_is_multiline() {
        let json = JsonReporter::new().pretty().report("frogs", &summary());
        assert!(json.contains('\n'));
    }
}

//! Assessment run reporting
//!
//! All quality scores for a run are reported together, but each one is
//! independently failable: a malformed complexity export must not blank out
//! the QA-side scores. A [`MetricOutcome`] therefore carries either a value
//! or the error that prevented one.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Outcome of one metric computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MetricOutcome {
    pub fn ok(value: f64) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            value: None,
            error: Some(error.into()),
        }
    }

    pub fn from_result<E: std::fmt::Display>(result: Result<f64, E>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::failed(e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.value.is_some()
    }
}

/// Full report for one assessment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub run_id: String,
    pub timestamp: String,
    /// The command line that produced this report.
    pub invocation: String,
    pub total_records: usize,
    pub malformed_records: usize,
    pub distinct_option_fraction: MetricOutcome,
    pub unanswerability: MetricOutcome,
    pub ensemble_agreement: MetricOutcome,
    pub complexity: MetricOutcome,
}

impl QualityReport {
    pub fn new(
        total_records: usize,
        malformed_records: usize,
        distinct_option_fraction: MetricOutcome,
        unanswerability: MetricOutcome,
        ensemble_agreement: MetricOutcome,
        complexity: MetricOutcome,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            run_id: format!("run_{}", now.format("%Y%m%d_%H%M%S")),
            timestamp: now.to_rfc3339(),
            invocation: std::env::args().collect::<Vec<_>>().join(" "),
            total_records,
            malformed_records,
            distinct_option_fraction,
            unanswerability,
            ensemble_agreement,
            complexity,
        }
    }

    /// Named access to the four metric outcomes, in report order.
    pub fn metrics(&self) -> BTreeMap<&'static str, &MetricOutcome> {
        let mut map = BTreeMap::new();
        map.insert("distinct_option_fraction", &self.distinct_option_fraction);
        map.insert("unanswerability", &self.unanswerability);
        map.insert("ensemble_agreement", &self.ensemble_agreement);
        map.insert("complexity", &self.complexity);
        map
    }

    /// Write to JSON file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

/// Generate a console report
pub fn print_console_report(report: &QualityReport) {
    println!("\n=== Item Assessment Results ===\n");
    println!("Run:               {}", report.run_id);
    println!("Records:           {}", report.total_records);
    println!("Malformed:         {}", report.malformed_records);
    println!("{:-<50}", "");

    print_metric("Distinct options", &report.distinct_option_fraction);
    print_metric("Unanswerability", &report.unanswerability);
    print_metric("Agreement", &report.ensemble_agreement);
    print_metric("Complexity", &report.complexity);

    println!("\n{:=<50}", "");
}

fn print_metric(label: &str, outcome: &MetricOutcome) {
    match (&outcome.value, &outcome.error) {
        (Some(value), _) => println!("  {:<18} {:.4}", label, value),
        (None, Some(error)) => println!("  {:<18} failed: {}", label, error),
        (None, None) => println!("  {:<18} not computed", label),
    }
}

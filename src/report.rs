//! Reporting sinks for leak findings.
//!
//! Two renderings of the same data: a human-readable text report and a
//! serde-serializable [`UnitReport`] for machine consumers.

use serde::{Deserialize, Serialize};

use crate::analysis::close_resource::Finding;

/// Findings for one compilation unit, tagged with its display name
/// (typically the source file path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub unit: String,
    pub findings: Vec<Finding>,
}

impl UnitReport {
    #[must_use]
    pub fn new(unit: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            unit: unit.into(),
            findings,
        }
    }
}

/// Render one unit's findings as a text report.
#[must_use]
pub fn format_findings_text(report: &UnitReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Resource Leak Analysis: {}\n", report.unit));
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!("  Leaks detected: {}\n", report.findings.len()));

    if !report.findings.is_empty() {
        output.push('\n');
        output.push_str("LEAKS\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        for finding in &report.findings {
            output.push_str(&format!("  {} {}\n", finding.span, finding.message()));
        }
    }

    output
}

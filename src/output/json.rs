//! JSON output formatter for machine processing
//!
//! The report is written as one pretty-printed document. Field names are
//! camelCase to match the registry's own JSON.

use crate::domain::{DependencyConstraint, OutdatedDependencyInfo, PackageAnalysis};
use crate::orchestrator::Report;
use crate::outdated::{FailedLookup, OutdatedReport};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the outdated check
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutdated<'a> {
    checked: usize,
    /// Dependencies behind latest
    outdated: BTreeMap<&'a str, &'a OutdatedDependencyInfo>,
    /// Excluded constraints (only in verbose mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    excluded: Vec<&'a DependencyConstraint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<&'a FailedLookup>,
}

impl JsonFormatter {
    fn outdated_to_json<'a>(&self, report: &'a OutdatedReport) -> JsonOutdated<'a> {
        let include_current = self.verbosity == Verbosity::Verbose;
        JsonOutdated {
            checked: report.checked,
            outdated: report
                .outdated
                .iter()
                .filter(|(_, info)| include_current || info.is_behind())
                .map(|(name, info)| (name.as_str(), info))
                .collect(),
            excluded: if include_current {
                report.excluded.iter().collect()
            } else {
                Vec::new()
            },
            failed: report.failed.iter().collect(),
        }
    }

    fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a Report,
    /// Number of dependencies behind latest
    outdated_count: usize,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        let mut value = serde_json::to_value(JsonOutput {
            report,
            outdated_count: report.outdated_count(),
        })
        .map_err(std::io::Error::other)?;

        // Replace the raw outdated report with the filtered view
        if let (Some(outdated), Some(object)) = (&report.outdated, value.as_object_mut()) {
            let filtered =
                serde_json::to_value(self.outdated_to_json(outdated)).map_err(std::io::Error::other)?;
            object.insert("outdated".to_string(), filtered);
        }

        Self::write_json(&value, writer)
    }

    fn format_analysis(
        &self,
        analysis: &PackageAnalysis,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(analysis, writer)
    }

    fn format_outdated(
        &self,
        outdated: &OutdatedReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(&self.outdated_to_json(outdated), writer)
    }
}

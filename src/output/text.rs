//! Text output formatter for human-readable display
//!
//! This module provides:
//! - The analysis block (module format, types, engines, companions)
//! - The outdated table with diff-type labels and distance behind latest
//! - Excluded constraints and failed lookups in verbose mode

use crate::domain::{ConstraintKind, DiffType, OutdatedDependencyInfo, PackageAnalysis, TypesStatus};
use crate::orchestrator::{Report, ReportSource};
use crate::outdated::OutdatedReport;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn diff_label(&self, diff: Option<DiffType>) -> String {
        let Some(diff) = diff else {
            return "current".to_string();
        };
        if !self.color {
            return diff.label().to_string();
        }
        match diff {
            DiffType::Major | DiffType::Premajor => diff.label().red().bold().to_string(),
            DiffType::Minor | DiffType::Preminor => diff.label().yellow().to_string(),
            DiffType::Patch | DiffType::Prepatch | DiffType::Prerelease => {
                diff.label().green().to_string()
            }
        }
    }

    /// Describe how far a dependency trails latest
    fn distance(info: &OutdatedDependencyInfo) -> String {
        let plural = |n: u64, word: &str| {
            if n == 1 {
                format!("{} {}", n, word)
            } else {
                format!("{} {}s", n, word)
            }
        };
        if info.majors_behind > 0 {
            format!("{} behind", plural(info.majors_behind, "major"))
        } else if info.minors_behind > 0 {
            format!("{} behind", plural(info.minors_behind, "minor"))
        } else {
            String::new()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        let title = match &report.version {
            Some(version) => format!("{}@{}", report.package, version),
            None => report.package.clone(),
        };
        let origin = match &report.source {
            ReportSource::File { path } => path.display().to_string(),
            ReportSource::Registry { url } => url.clone(),
        };
        let published = report
            .published_at
            .map(|d| format!(", published {}", d.format("%Y/%m/%d")))
            .unwrap_or_default();

        writeln!(
            writer,
            "{} {}",
            self.heading(&title),
            self.dim(&format!("({}{})", origin, published))
        )
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            self.format_header(report, writer)?;
            self.format_analysis(&report.analysis, writer)?;
        }

        if let Some(outdated) = &report.outdated {
            if self.verbosity != Verbosity::Quiet {
                writeln!(writer)?;
            }
            self.format_outdated(outdated, writer)?;
        }

        if !report.warnings.is_empty() && self.verbosity != Verbosity::Quiet {
            writeln!(writer)?;
            let label = format!("{} lookup(s) failed", report.warnings.len());
            if self.color {
                writeln!(writer, "{}", label.yellow())?;
            } else {
                writeln!(writer, "{}", label)?;
            }
            if self.verbosity == Verbosity::Verbose {
                for warning in &report.warnings {
                    writeln!(writer, "  - {}", warning)?;
                }
            }
        }

        Ok(())
    }

    fn format_analysis(
        &self,
        analysis: &PackageAnalysis,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "  Module format: {}", analysis.module_format.label())?;

        let types = match &analysis.types {
            TypesStatus::Included => "included".to_string(),
            TypesStatus::TypesPackage(info) => match &info.deprecated {
                Some(message) => format!("{} (deprecated: {})", info.package_name, message),
                None => info.package_name.clone(),
            },
            TypesStatus::None => "none".to_string(),
        };
        writeln!(writer, "  Types:         {}", types)?;

        if let Some(engines) = analysis.engines.as_ref().filter(|e| !e.is_empty()) {
            let list: Vec<String> = engines
                .iter()
                .map(|(runtime, range)| format!("{} {}", runtime, range))
                .collect();
            writeln!(writer, "  Engines:       {}", list.join(", "))?;
        }

        if analysis.binary_only {
            writeln!(writer, "  Binary only:   yes")?;
        }

        if let Some(create) = &analysis.create_package {
            let deprecated = create
                .deprecated
                .as_ref()
                .map(|m| format!(" (deprecated: {})", m))
                .unwrap_or_default();
            writeln!(writer, "  Scaffolder:    {}{}", create.package_name, deprecated)?;
        }

        Ok(())
    }

    fn format_outdated(
        &self,
        outdated: &OutdatedReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let behind: Vec<(&String, &OutdatedDependencyInfo)> = outdated
            .outdated
            .iter()
            .filter(|(_, info)| info.is_behind())
            .collect();

        if self.verbosity != Verbosity::Quiet {
            let summary = format!(
                "Outdated dependencies: {} of {} checked",
                behind.len(),
                outdated.checked
            );
            let excluded = if outdated.excluded.is_empty() {
                String::new()
            } else {
                format!(" ({} excluded)", outdated.excluded.len())
            };
            writeln!(writer, "{}{}", self.heading(&summary), self.dim(&excluded))?;
        }

        let max_name_len = behind
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(20);

        for (name, info) in &behind {
            let arrow = if self.color { "→" } else { "->" };
            writeln!(
                writer,
                "  {:width$} {} {} {} [{}] {}",
                name,
                info.resolved,
                arrow,
                info.latest,
                self.diff_label(info.diff_type),
                Self::distance(info),
                width = max_name_len
            )?;
        }

        if self.verbosity == Verbosity::Verbose {
            if !outdated.excluded.is_empty() {
                writeln!(writer, "  {}", self.dim("Excluded:"))?;
                for constraint in &outdated.excluded {
                    let reason = match constraint.kind {
                        ConstraintKind::NonSemver(reason) => reason.label(),
                        _ => "",
                    };
                    writeln!(
                        writer,
                        "  {:width$} {}",
                        constraint.name,
                        self.dim(&format!("({}: {})", reason, constraint.raw)),
                        width = max_name_len
                    )?;
                }
            }
            if !outdated.failed.is_empty() {
                writeln!(writer, "  {}", self.dim("Failed:"))?;
                for failed in &outdated.failed {
                    writeln!(
                        writer,
                        "  {:width$} {}",
                        failed.name,
                        self.dim(&format!("({})", failed.message)),
                        width = max_name_len
                    )?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyConstraint, ModuleFormat, NonSemverReason, RelatedPackageInfo};
    use crate::outdated::FailedLookup;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn report() -> Report {
        let mut outdated = BTreeMap::new();
        outdated.insert(
            "react".to_string(),
            OutdatedDependencyInfo {
                resolved: "17.0.2".to_string(),
                latest: "18.2.0".to_string(),
                majors_behind: 1,
                minors_behind: 0,
                diff_type: Some(DiffType::Major),
            },
        );
        outdated.insert(
            "zod".to_string(),
            OutdatedDependencyInfo::tracking_latest("3.22.4"),
        );

        let mut engines = BTreeMap::new();
        engines.insert("node".to_string(), ">=18".to_string());

        Report {
            package: "my-app".to_string(),
            version: Some("1.0.0".to_string()),
            source: ReportSource::File {
                path: PathBuf::from("package.json"),
            },
            published_at: None,
            analysis: PackageAnalysis {
                module_format: ModuleFormat::Dual,
                types: TypesStatus::TypesPackage(
                    RelatedPackageInfo::new("@types/my-app").with_deprecated("ships own types"),
                ),
                engines: Some(engines),
                binary_only: false,
                create_package: Some(RelatedPackageInfo::new("create-my-app")),
            },
            outdated: Some(OutdatedReport {
                outdated,
                excluded: vec![DependencyConstraint::new(
                    "local",
                    "file:../local",
                    ConstraintKind::NonSemver(NonSemverReason::File),
                )],
                failed: vec![FailedLookup {
                    name: "ghost".to_string(),
                    message: "timeout".to_string(),
                }],
                checked: 3,
            }),
            warnings: vec!["failed to fetch ghost: timeout".to_string()],
        }
    }

    fn render(verbosity: Verbosity) -> String {
        let formatter = TextFormatter::with_color(verbosity, false);
        let mut buf = Vec::new();
        formatter.format(&report(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_normal_output() {
        let output = render(Verbosity::Normal);
        assert!(output.contains("my-app@1.0.0 (package.json)"));
        assert!(output.contains("Module format: ESM + CJS"));
        assert!(output.contains("@types/my-app (deprecated: ships own types)"));
        assert!(output.contains("Engines:       node >=18"));
        assert!(output.contains("Scaffolder:    create-my-app"));
        assert!(output.contains("Outdated dependencies: 1 of 3 checked (1 excluded)"));
        assert!(output.contains("17.0.2 -> 18.2.0 [major] 1 major behind"));
        assert!(output.contains("1 lookup(s) failed"));
        // Dependencies tracking latest are not listed
        assert!(!output.contains("zod"));
        assert!(!output.contains("Excluded:"));
    }

    #[test]
    fn test_quiet_output_only_table() {
        let output = render(Verbosity::Quiet);
        assert!(!output.contains("Module format"));
        assert!(!output.contains("Outdated dependencies"));
        assert!(output.contains("react"));
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_verbose_lists_excluded_and_failed() {
        let output = render(Verbosity::Verbose);
        assert!(output.contains("Excluded:"));
        assert!(output.contains("(file: file:../local)"));
        assert!(output.contains("Failed:"));
        assert!(output.contains("(timeout)"));
        assert!(output.contains("  - failed to fetch ghost: timeout"));
    }

    #[test]
    fn test_distance() {
        let mut info = OutdatedDependencyInfo::tracking_latest("1.5.0");
        assert_eq!(TextFormatter::distance(&info), "");
        info.minors_behind = 3;
        assert_eq!(TextFormatter::distance(&info), "3 minors behind");
        info.majors_behind = 1;
        assert_eq!(TextFormatter::distance(&info), "1 major behind");
    }

    #[test]
    fn test_diff_label_plain() {
        let formatter = TextFormatter::with_color(Verbosity::Normal, false);
        assert_eq!(formatter.diff_label(Some(DiffType::Preminor)), "preminor");
        assert_eq!(formatter.diff_label(None), "current");
    }
}

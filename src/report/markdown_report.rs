//! @ai:module:intent Markdown report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter
//! @ai:module:stateless true

use crate::timing::{CaseTimings, ProfileResults};
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Generate Markdown report from results
    fn generate(&self, results: &ProfileResults, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates Markdown reports from profile results
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// @ai:intent Create a new Markdown reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Format an optional duration, using a dash when absent
    /// @ai:effects pure
    fn format_ms(value: Option<f64>) -> String {
        match value {
            Some(ms) => format!("{ms:.3}ms"),
            None => "-".to_string(),
        }
    }

    /// @ai:intent Generate header section
    /// @ai:effects pure
    fn generate_summary(results: &ProfileResults) -> String {
        let mut output = String::new();

        writeln!(output, "# Stage Timing Results").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Date:** {}", results.timestamp).unwrap();
        writeln!(output, "**Command:** `{}`", results.command).unwrap();
        writeln!(output, "**Repetitions:** {}", results.repetitions).unwrap();
        writeln!(output, "**Cases:** {}", results.cases.len()).unwrap();
        writeln!(output).unwrap();

        output
    }

    /// @ai:intent Generate the stage table for one case
    /// @ai:effects pure
    fn generate_case_section(case: &CaseTimings) -> String {
        let mut output = String::new();

        writeln!(output, "## {}", case.name()).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "`{}`", case.case.display()).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Stage | Mean | Min | Max | Samples |").unwrap();
        writeln!(output, "|-------|------|-----|-----|---------|").unwrap();

        for stage in &case.stages {
            writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                stage.stage,
                Self::format_ms(Some(stage.mean_ms)),
                Self::format_ms(stage.min_ms),
                Self::format_ms(stage.max_ms),
                stage.samples
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:intent Generate Markdown report to file
    /// @ai:effects fs:write
    fn generate(&self, results: &ProfileResults, output_path: &Path) -> Result<()> {
        let mut content = Self::generate_summary(results);

        for case in &results.cases {
            content.push_str(&Self::generate_case_section(case));
        }

        std::fs::write(output_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_results;
    use tempfile::TempDir;

    #[test]
    fn test_format_ms() {
        assert_eq!(MarkdownReporter::format_ms(Some(12.5)), "12.500ms");
        assert_eq!(MarkdownReporter::format_ms(None), "-");
    }

    #[test]
    fn test_generate_markdown_report() {
        let reporter = MarkdownReporter::new();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.md");

        reporter.generate(&sample_results(), &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("# Stage Timing Results"));
        assert!(content.contains("## SimpleExtendingClasses"));
        assert!(content.contains("| initialization | 20.000ms | 10.000ms | 30.000ms | 2 |"));
        assert!(content.contains("| annotate-ast | 0.000ms | - | - | 0 |"));
    }
}

//! @ai:module:intent Report generation for profile results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, MarkdownReporter, ChartGenerator

pub mod charts;
pub mod markdown_report;

pub use charts::{ChartGenerator, ChartGeneratorTrait};
pub use markdown_report::{MarkdownReporter, MarkdownReporterTrait};

use crate::timing::ProfileResults;
use anyhow::Result;
use std::path::Path;

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    markdown: MarkdownReporter,
    charts: ChartGenerator,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            markdown: MarkdownReporter::new(),
            charts: ChartGenerator::new(),
        }
    }

    /// @ai:intent Generate all reports
    /// @ai:effects fs:write
    pub fn generate_all(&self, results: &ProfileResults, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;

        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(output_dir.join("results.json"), json)?;
        self.generate_derived(results, output_dir)?;

        tracing::info!("Reports generated in {}", output_dir.display());
        Ok(())
    }

    /// @ai:intent Generate the Markdown report and charts from existing results
    /// @ai:effects fs:write
    pub fn generate_derived(&self, results: &ProfileResults, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;

        self.markdown
            .generate(results, &output_dir.join("results.md"))?;

        // Charts are best-effort: font lookup fails on hosts without system fonts.
        match self.charts.generate_all(results, output_dir) {
            Ok(files) => tracing::debug!("Charts written: {}", files.join(", ")),
            Err(e) => tracing::warn!("Chart generation failed: {}", e),
        }

        Ok(())
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

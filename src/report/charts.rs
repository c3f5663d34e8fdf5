//! @ai:module:intent Chart generation for stage timings
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator
//! @ai:module:stateless true

use crate::timing::{CaseTimings, ProfileResults};
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

/// @ai:intent Trait for chart generation
pub trait ChartGeneratorTrait: Send + Sync {
    /// @ai:intent Generate all charts from results
    fn generate_all(&self, results: &ProfileResults, output_dir: &Path) -> Result<Vec<String>>;
}

/// @ai:intent Generates one bar chart of mean stage durations per case
pub struct ChartGenerator;

impl ChartGenerator {
    /// @ai:intent Create a new chart generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent File name for a case chart
    /// @ai:effects pure
    fn chart_file_name(index: usize, case: &CaseTimings) -> String {
        let stem: String = case
            .name()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();

        format!("{:02}_{}.png", index + 1, stem)
    }

    /// @ai:intent Upper bound of the y axis with some headroom
    /// @ai:effects pure
    fn y_upper_bound(case: &CaseTimings) -> f64 {
        let max = case
            .stages
            .iter()
            .map(|s| s.mean_ms)
            .fold(0.0_f64, f64::max);

        if max <= 0.0 {
            1.0
        } else {
            max * 1.1
        }
    }

    /// @ai:intent Draw the mean duration of every stage for one case
    /// @ai:effects fs:write
    fn generate_case_chart(&self, case: &CaseTimings, output_path: &Path) -> Result<()> {
        let root = BitMapBackend::new(output_path, (900, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let data: Vec<_> = case
            .stages
            .iter()
            .map(|s| (s.stage.as_str(), s.mean_ms))
            .collect();

        let caption = format!("{} (mean of {} runs)", case.name(), case.repetitions);

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 25))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..data.len() as i32, 0f64..Self::y_upper_bound(case))?;

        chart
            .configure_mesh()
            .x_labels(data.len())
            .y_desc("Mean duration (ms)")
            .x_label_formatter(&|x| {
                data.get(*x as usize)
                    .map(|(name, _)| name.to_string())
                    .unwrap_or_default()
            })
            .draw()?;

        chart.draw_series(data.iter().enumerate().map(|(i, (_, mean))| {
            Rectangle::new([(i as i32, 0.0), (i as i32 + 1, *mean)], BLUE.mix(0.7).filled())
        }))?;

        root.present()?;
        Ok(())
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartGeneratorTrait for ChartGenerator {
    /// @ai:intent Generate all charts
    /// @ai:effects fs:write
    fn generate_all(&self, results: &ProfileResults, output_dir: &Path) -> Result<Vec<String>> {
        std::fs::create_dir_all(output_dir)?;

        let mut generated = Vec::new();

        for (index, case) in results.cases.iter().enumerate() {
            let file_name = Self::chart_file_name(index, case);
            self.generate_case_chart(case, &output_dir.join(&file_name))?;
            generated.push(file_name);
        }

        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_results;

    #[test]
    fn test_chart_file_name_is_sanitized_and_numbered() {
        let mut case = sample_results().cases.remove(0);
        assert_eq!(ChartGenerator::chart_file_name(0, &case), "01_SimpleExtendingClasses.png");

        case.case = "cases/odd name.v2.ts".into();
        assert_eq!(ChartGenerator::chart_file_name(9, &case), "10_odd_name_v2.png");
    }

    #[test]
    fn test_y_upper_bound() {
        let mut case = sample_results().cases.remove(0);
        assert!((ChartGenerator::y_upper_bound(&case) - 33.0).abs() < 1e-9);

        for stage in &mut case.stages {
            stage.mean_ms = 0.0;
        }
        assert_eq!(ChartGenerator::y_upper_bound(&case), 1.0);
    }
}

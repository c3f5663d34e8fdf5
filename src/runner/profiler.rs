//! @ai:module:intent Run the external tool N times per case and average stage timings
//! @ai:module:layer application
//! @ai:module:public_api StageProfiler
//! @ai:module:stateless true

use crate::config::{ProfilerConfig, UnknownStagePolicy};
use crate::error::{ProfileError, Result};
use crate::runner::tool::ToolRunnerTrait;
use crate::timing::{
    is_parseable_stage_name, CaseTimings, ProfileResults, StageAggregate, StageLineParser, StageSet,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// @ai:intent Sequentially profiles cases against a tool runner
pub struct StageProfiler<R: ToolRunnerTrait> {
    runner: Arc<R>,
    parser: StageLineParser,
    stages: StageSet,
    repetitions: u32,
    policy: UnknownStagePolicy,
}

impl<R: ToolRunnerTrait> StageProfiler<R> {
    /// @ai:intent Create a profiler with an explicit stage vocabulary and run count
    /// @ai:effects pure
    pub fn new(
        runner: Arc<R>,
        stages: StageSet,
        repetitions: u32,
        policy: UnknownStagePolicy,
    ) -> Result<Self> {
        if repetitions == 0 {
            return Err(ProfileError::InvalidRepetitions(repetitions));
        }

        if let Some(name) = stages
            .names()
            .iter()
            .find(|name| !is_parseable_stage_name(name))
        {
            return Err(ProfileError::InvalidStageName(name.clone()));
        }

        Ok(Self {
            runner,
            parser: StageLineParser::new(),
            stages,
            repetitions,
            policy,
        })
    }

    /// @ai:intent Create a profiler from loaded configuration
    /// @ai:effects pure
    pub fn from_config(runner: Arc<R>, config: &ProfilerConfig) -> Result<Self> {
        Self::new(
            runner,
            StageSet::new(config.stages.names.iter().cloned()),
            config.run.repetitions,
            config.stages.on_unknown,
        )
    }

    /// @ai:intent Run the tool `repetitions` times on one case and average each stage
    /// @ai:post every declared stage appears in the result, in declaration order
    /// @ai:effects io
    pub fn profile_case(&self, case: &Path) -> Result<CaseTimings> {
        let mut aggregate = StageAggregate::new(self.stages.clone(), self.repetitions, self.policy)?;

        for run in 1..=self.repetitions {
            let output = self.runner.run(case)?;

            tracing::debug!(
                "Run {}/{} of {} finished with {}",
                run,
                self.repetitions,
                case.display(),
                output.status_label()
            );

            if !output.succeeded() {
                tracing::error!(
                    "{} failed on {} ({})",
                    self.runner.program(),
                    case.display(),
                    output.status_label()
                );
                return Err(ProfileError::ProcessFailure {
                    program: self.runner.program().to_string(),
                    case: case.to_path_buf(),
                    run,
                    status: output.status_label(),
                });
            }

            for sample in self.parser.parse_output(&output.stdout) {
                aggregate.record(&sample, case)?;
            }
        }

        Ok(aggregate.finish(case.to_path_buf()))
    }

    /// @ai:intent Profile every case in order, stopping at the first failure
    /// @ai:effects io
    pub fn profile_all(&self, cases: &[PathBuf], command: &str) -> Result<ProfileResults> {
        let mut timings = Vec::with_capacity(cases.len());

        for (index, case) in cases.iter().enumerate() {
            tracing::info!(
                "[{}/{}] Profiling {} ({} runs)",
                index + 1,
                cases.len(),
                case.display(),
                self.repetitions
            );
            timings.push(self.profile_case(case)?);
        }

        Ok(ProfileResults {
            timestamp: chrono::Utc::now().to_rfc3339(),
            command: command.to_string(),
            repetitions: self.repetitions,
            stages: self.stages.names().to_vec(),
            cases: timings,
        })
    }
}

//! @ai:module:intent Accumulate per-stage mean durations across repeated runs
//! @ai:module:layer domain
//! @ai:module:public_api StageSet, StageAggregate, StageTiming, CaseTimings, ProfileResults
//! @ai:module:stateless false

use crate::config::UnknownStagePolicy;
use crate::error::{ProfileError, Result};
use crate::timing::parser::TimingSample;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// @ai:intent Ordered, duplicate-free set of recognized stage names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSet {
    names: Vec<String>,
}

impl StageSet {
    /// @ai:intent Build a stage set, dropping repeated names
    /// @ai:effects pure
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();

        for name in names {
            let name = name.into();

            if !unique.contains(&name) {
                unique.push(name);
            }
        }

        Self { names: unique }
    }

    pub fn contains(&self, stage: &str) -> bool {
        self.names.iter().any(|n| n == stage)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[derive(Debug, Clone, Default)]
struct StageAccumulator {
    mean_ms: f64,
    samples: u32,
    min_ms: Option<f64>,
    max_ms: Option<f64>,
}

impl StageAccumulator {
    fn add(&mut self, millis: f64, repetitions: u32) {
        self.mean_ms += millis / repetitions as f64;
        self.samples += 1;
        self.min_ms = Some(self.min_ms.map_or(millis, |m| m.min(millis)));
        self.max_ms = Some(self.max_ms.map_or(millis, |m| m.max(millis)));
    }
}

/// @ai:intent Running per-stage mean for one case
/// @ai:pre repetitions >= 1
///
/// Every declared stage starts at zero. Each sample contributes
/// `millis / repetitions`, so after exactly `repetitions` runs that each
/// report every stage once the totals are the arithmetic means.
#[derive(Debug, Clone)]
pub struct StageAggregate {
    stages: StageSet,
    repetitions: u32,
    policy: UnknownStagePolicy,
    totals: HashMap<String, StageAccumulator>,
}

impl StageAggregate {
    /// @ai:intent Create an aggregate with every declared stage at zero
    /// @ai:effects pure
    pub fn new(stages: StageSet, repetitions: u32, policy: UnknownStagePolicy) -> Result<Self> {
        if repetitions == 0 {
            return Err(ProfileError::InvalidRepetitions(repetitions));
        }

        let totals = stages
            .names()
            .iter()
            .map(|name| (name.clone(), StageAccumulator::default()))
            .collect();

        Ok(Self {
            stages,
            repetitions,
            policy,
            totals,
        })
    }

    /// @ai:intent Fold one sample into the running mean of its stage
    /// @ai:effects mutates self, log
    pub fn record(&mut self, sample: &TimingSample, case: &Path) -> Result<()> {
        match self.totals.get_mut(&sample.stage) {
            Some(acc) => {
                acc.add(sample.millis, self.repetitions);
                Ok(())
            }
            None => match self.policy {
                UnknownStagePolicy::Fail => Err(ProfileError::UnrecognizedStage {
                    stage: sample.stage.clone(),
                    case: case.to_path_buf(),
                }),
                UnknownStagePolicy::Ignore => {
                    tracing::warn!(
                        "Ignoring unrecognized stage '{}' in output for {}",
                        sample.stage,
                        case.display()
                    );
                    Ok(())
                }
            },
        }
    }

    /// @ai:intent Current mean for a stage, if declared
    /// @ai:effects pure
    pub fn mean(&self, stage: &str) -> Option<f64> {
        self.totals.get(stage).map(|acc| acc.mean_ms)
    }

    /// @ai:intent Freeze the aggregate into reportable case timings
    /// @ai:effects pure
    pub fn finish(self, case: PathBuf) -> CaseTimings {
        let stages = self
            .stages
            .names()
            .iter()
            .map(|name| {
                let acc = self.totals.get(name).cloned().unwrap_or_default();

                StageTiming {
                    stage: name.clone(),
                    mean_ms: acc.mean_ms,
                    samples: acc.samples,
                    min_ms: acc.min_ms,
                    max_ms: acc.max_ms,
                }
            })
            .collect();

        CaseTimings {
            case,
            repetitions: self.repetitions,
            stages,
        }
    }
}

/// @ai:intent Mean duration of one stage over all runs of a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: String,
    pub mean_ms: f64,
    pub samples: u32,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
}

/// @ai:intent Aggregated stage timings for one input case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseTimings {
    pub case: PathBuf,
    pub repetitions: u32,
    pub stages: Vec<StageTiming>,
}

impl CaseTimings {
    /// @ai:intent Look up the mean for a stage
    /// @ai:effects pure
    pub fn mean(&self, stage: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.mean_ms)
    }

    /// @ai:intent Short display name derived from the case file stem
    /// @ai:effects pure
    pub fn name(&self) -> String {
        self.case
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.case.display().to_string())
    }
}

impl fmt::Display for CaseTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;

        for (i, timing) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {:?}", timing.stage, timing.mean_ms)?;
        }

        write!(f, "}}")
    }
}

/// @ai:intent All case timings from one profiler invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResults {
    pub timestamp: String,
    pub command: String,
    pub repetitions: u32,
    pub stages: Vec<String>,
    pub cases: Vec<CaseTimings>,
}

impl ProfileResults {
    /// @ai:intent Load previously written results from JSON
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let results = serde_json::from_str(&content)?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(stage: &str, millis: f64) -> TimingSample {
        TimingSample {
            stage: stage.to_string(),
            millis,
        }
    }

    #[test]
    fn test_stage_set_drops_duplicates_and_keeps_order() {
        let set = StageSet::new(["b", "a", "b"]);
        assert_eq!(set.names(), &["b".to_string(), "a".to_string()]);
        assert!(set.contains("a"));
        assert!(!set.contains("c"));
    }

    #[test]
    fn test_declared_stages_start_at_zero() {
        let agg = StageAggregate::new(StageSet::new(["a", "b"]), 4, UnknownStagePolicy::Fail).unwrap();
        assert_eq!(agg.mean("a"), Some(0.0));
        assert_eq!(agg.mean("b"), Some(0.0));
        assert_eq!(agg.mean("c"), None);
    }

    #[test]
    fn test_zero_repetitions_rejected() {
        let err = StageAggregate::new(StageSet::new(["a"]), 0, UnknownStagePolicy::Fail).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidRepetitions(0)));
    }

    #[test]
    fn test_record_accumulates_mean_and_spread() {
        let case = Path::new("case.ts");
        let mut agg = StageAggregate::new(StageSet::new(["a"]), 2, UnknownStagePolicy::Fail).unwrap();

        agg.record(&sample("a", 10.0), case).unwrap();
        agg.record(&sample("a", 30.0), case).unwrap();

        let timings = agg.finish(case.to_path_buf());
        assert_eq!(
            timings.stages,
            vec![StageTiming {
                stage: "a".to_string(),
                mean_ms: 20.0,
                samples: 2,
                min_ms: Some(10.0),
                max_ms: Some(30.0),
            }]
        );
    }

    #[test]
    fn test_unknown_stage_fails_under_default_policy() {
        let case = Path::new("case.ts");
        let mut agg = StageAggregate::new(StageSet::new(["a"]), 1, UnknownStagePolicy::Fail).unwrap();

        let err = agg.record(&sample("c", 5.0), case).unwrap_err();
        match err {
            ProfileError::UnrecognizedStage { stage, case } => {
                assert_eq!(stage, "c");
                assert_eq!(case, PathBuf::from("case.ts"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_stage_ignored_when_configured() {
        let case = Path::new("case.ts");
        let mut agg = StageAggregate::new(StageSet::new(["a"]), 1, UnknownStagePolicy::Ignore).unwrap();

        agg.record(&sample("c", 5.0), case).unwrap();
        assert_eq!(agg.mean("a"), Some(0.0));
    }

    #[test]
    fn test_display_uses_declaration_order() {
        let case = Path::new("case.ts");
        let mut agg = StageAggregate::new(StageSet::new(["b", "a"]), 1, UnknownStagePolicy::Fail).unwrap();
        agg.record(&sample("a", 1.5), case).unwrap();
        agg.record(&sample("b", 2.0), case).unwrap();

        let timings = agg.finish(case.to_path_buf());
        assert_eq!(timings.to_string(), r#"{"b": 2.0, "a": 1.5}"#);
        assert_eq!(timings.name(), "case");
        assert_eq!(timings.mean("a"), Some(1.5));
    }
}

//! @ai:module:intent Configuration structs for the stage profiler
//! @ai:module:layer infrastructure
//! @ai:module:public_api ProfilerConfig, ToolConfig, RunConfig, StageConfig, PathConfig, UnknownStagePolicy
//! @ai:module:stateless true

use crate::timing::is_parseable_stage_name;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the case path in `ToolConfig::input_arg`.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// @ai:intent Main configuration for the profiler
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilerConfig {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub stages: StageConfig,
    #[serde(default)]
    pub paths: PathConfig,
}

/// @ai:intent How to launch the external compiler
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default = "default_input_arg")]
    pub input_arg: String,
    #[serde(default = "default_probe_args")]
    pub probe_args: Vec<String>,
}

/// @ai:intent Run configuration for profiling
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
    #[serde(default = "default_cases")]
    pub cases: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cases_dir: Option<PathBuf>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub dry_run: bool,
}

/// @ai:intent What to do with a stage name outside the declared set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStagePolicy {
    #[default]
    Fail,
    Ignore,
}

/// @ai:intent Stage vocabulary reported by the external tool
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default = "default_stage_names")]
    pub names: Vec<String>,
    #[serde(default)]
    pub on_unknown: UnknownStagePolicy,
}

/// @ai:intent Output locations
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            input_arg: default_input_arg(),
            probe_args: default_probe_args(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            repetitions: default_repetitions(),
            cases: default_cases(),
            cases_dir: None,
            extensions: default_extensions(),
            dry_run: false,
        }
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            names: default_stage_names(),
            on_unknown: UnknownStagePolicy::default(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
        }
    }
}

fn default_program() -> String {
    "node".to_string()
}

fn default_args() -> Vec<String> {
    vec!["dist/index.js".to_string()]
}

fn default_input_arg() -> String {
    format!("--input={INPUT_PLACEHOLDER}")
}

fn default_probe_args() -> Vec<String> {
    vec!["--version".to_string()]
}

fn default_repetitions() -> u32 {
    10
}

fn default_cases() -> Vec<PathBuf> {
    [
        "./test/testPrograms/SimpleExtendingClasses.ts",
        "./test/testPrograms/JaVerTIdGen.ts",
        "./test/testPrograms/ReportDynamic.ts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

fn default_extensions() -> Vec<String> {
    vec!["ts".to_string()]
}

fn default_stage_names() -> Vec<String> {
    [
        "initialization",
        "regular-ts-compilation",
        "gather-type-info",
        "annotate-ast",
        "program-total",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

impl ToolConfig {
    /// @ai:intent Render the input argument for a case path
    /// @ai:effects pure
    pub fn input_arg_for(&self, case: &Path) -> String {
        self.input_arg
            .replace(INPUT_PLACEHOLDER, &case.display().to_string())
    }

    /// @ai:intent Human-readable command line without the input argument
    /// @ai:effects pure
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ProfilerConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Reject configurations the profiler cannot run with
    /// @ai:effects pure
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tool.program.trim().is_empty() {
            anyhow::bail!("tool.program must not be empty");
        }

        if self.run.repetitions == 0 {
            anyhow::bail!("run.repetitions must be at least 1");
        }

        if self.stages.names.is_empty() {
            anyhow::bail!("stages.names must declare at least one stage");
        }

        let mut seen = HashSet::new();

        for name in &self.stages.names {
            if !is_parseable_stage_name(name) {
                anyhow::bail!(
                    "stage '{}' cannot be matched in tool output (names must be non-empty, \
                     contain no ':' and have no surrounding whitespace)",
                    name
                );
            }

            if !seen.insert(name.as_str()) {
                anyhow::bail!("stage '{}' is declared more than once", name);
            }
        }

        Ok(())
    }
}

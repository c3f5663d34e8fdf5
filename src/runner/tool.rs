//! @ai:module:intent Launch the external compiler and capture its output
//! @ai:module:layer infrastructure
//! @ai:module:public_api ToolRunnerTrait, ProcessRunner, MockToolRunner, RunOutput
//! @ai:module:stateless true

use crate::config::ToolConfig;
use crate::error::{ProfileError, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Mutex, MutexGuard};

/// @ai:intent Captured result of one external tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub exit_code: Option<i32>,
}

impl RunOutput {
    /// @ai:intent Build a successful run with the given stdout
    /// @ai:effects pure
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
        }
    }

    /// @ai:intent Build a run that exited with the given code
    /// @ai:effects pure
    pub fn exited(stdout: impl Into<String>, code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(code),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// @ai:intent Describe the exit status for error messages
    /// @ai:effects pure
    pub fn status_label(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit status {code}"),
            None => "termination by signal".to_string(),
        }
    }
}

/// @ai:intent Trait for running the external tool once against a case
pub trait ToolRunnerTrait: Send + Sync {
    /// @ai:intent Run the tool on an input file and capture stdout and exit status
    fn run(&self, input: &Path) -> Result<RunOutput>;

    /// @ai:intent Program name used in logs and errors
    fn program(&self) -> &str;
}

/// @ai:intent Runs the configured program as a child process
pub struct ProcessRunner {
    tool: ToolConfig,
}

impl ProcessRunner {
    /// @ai:intent Create a runner for the given tool configuration
    /// @ai:effects pure
    pub fn new(tool: ToolConfig) -> Self {
        Self { tool }
    }

    /// @ai:intent Build the command for a case without spawning it
    /// @ai:effects pure
    fn command_for(&self, input: &Path) -> Command {
        let mut command = Command::new(&self.tool.program);
        command
            .args(&self.tool.args)
            .arg(self.tool.input_arg_for(input))
            .stdin(Stdio::null());
        command
    }
}

impl ToolRunnerTrait for ProcessRunner {
    /// @ai:intent Spawn the tool and wait for it to exit
    /// @ai:effects io
    fn run(&self, input: &Path) -> Result<RunOutput> {
        let output = self
            .command_for(input)
            .output()
            .map_err(|source| ProfileError::Spawn {
                program: self.tool.program.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);

        if !stderr.is_empty() {
            tracing::debug!("{} stderr: {}", self.tool.program, stderr.trim_end());
        }

        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            exit_code: output.status.code(),
        })
    }

    fn program(&self) -> &str {
        &self.tool.program
    }
}

/// @ai:intent Replays scripted outputs instead of spawning processes
pub struct MockToolRunner {
    outputs: Mutex<VecDeque<RunOutput>>,
}

impl MockToolRunner {
    /// @ai:intent Create a mock that returns the given outputs in order
    /// @ai:effects pure
    pub fn new(outputs: impl IntoIterator<Item = RunOutput>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into_iter().collect()),
        }
    }

    /// @ai:intent Create a mock that reports the same output a fixed number of times
    /// @ai:effects pure
    pub fn repeating(output: RunOutput, times: usize) -> Self {
        Self::new(std::iter::repeat(output).take(times))
    }

    pub fn remaining(&self) -> usize {
        self.queue().len()
    }

    /// @ai:intent Lock the scripted queue, recovering it if a holder panicked
    /// @ai:effects pure
    fn queue(&self) -> MutexGuard<'_, VecDeque<RunOutput>> {
        self.outputs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ToolRunnerTrait for MockToolRunner {
    /// @ai:intent Pop the next scripted output
    /// @ai:effects mutates self
    fn run(&self, _input: &Path) -> Result<RunOutput> {
        self.queue().pop_front().ok_or(ProfileError::MockExhausted)
    }

    fn program(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_replays_in_order_then_exhausts() {
        let runner = MockToolRunner::new([RunOutput::success("a: 1ms"), RunOutput::exited("", 2)]);
        let input = Path::new("case.ts");

        assert_eq!(runner.run(input).unwrap().stdout, "a: 1ms");
        assert_eq!(runner.run(input).unwrap().exit_code, Some(2));
        assert!(matches!(runner.run(input), Err(ProfileError::MockExhausted)));
    }

    #[test]
    fn test_poisoned_queue_is_still_readable() {
        let runner = std::sync::Arc::new(MockToolRunner::new([RunOutput::success("a: 1ms")]));

        let poisoner = runner.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.outputs.lock().unwrap();
            panic!("poison the queue");
        })
        .join();

        assert_eq!(runner.remaining(), 1);
        assert_eq!(runner.run(Path::new("case.ts")).unwrap().stdout, "a: 1ms");
        assert_eq!(runner.remaining(), 0);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(RunOutput::exited("", 3).status_label(), "exit status 3");
        let killed = RunOutput {
            stdout: String::new(),
            exit_code: None,
        };
        assert!(!killed.succeeded());
        assert_eq!(killed.status_label(), "termination by signal");
    }

    #[test]
    fn test_command_includes_args_and_input() {
        let runner = ProcessRunner::new(ToolConfig::default());
        let command = runner.command_for(Path::new("cases/a.ts"));

        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(command.get_program(), "node");
        assert_eq!(args, vec!["dist/index.js", "--input=cases/a.ts"]);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let tool = ToolConfig {
            program: "nonexistent_tool_xyz".to_string(),
            ..Default::default()
        };
        let runner = ProcessRunner::new(tool);

        let err = runner.run(Path::new("case.ts")).unwrap_err();
        assert!(matches!(err, ProfileError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_captures_stdout_and_exit_code() {
        let tool = ToolConfig {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo \"a: 5ms\"; echo noise >&2; exit 1".to_string(),
            ],
            ..Default::default()
        };
        let runner = ProcessRunner::new(tool);

        let output = runner.run(Path::new("case.ts")).unwrap();
        assert_eq!(output.stdout, "a: 5ms\n");
        assert_eq!(output.exit_code, Some(1));
        assert!(!output.succeeded());
    }
}

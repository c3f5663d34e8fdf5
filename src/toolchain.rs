//! @ai:module:intent Check that the external compiler can be launched
//! @ai:module:layer infrastructure
//! @ai:module:public_api ToolchainValidator, ToolchainStatus
//! @ai:module:stateless true

use crate::config::ToolConfig;
use std::process::{Command, Stdio};

/// @ai:intent Outcome of probing the configured tool
#[derive(Debug, Clone)]
pub struct ToolchainStatus {
    pub program: String,
    pub available: bool,
    pub version: Option<String>,
    pub install_hint: &'static str,
}

/// @ai:intent Validates that the external tool is installed
pub struct ToolchainValidator;

impl ToolchainValidator {
    /// @ai:intent Get install hint for a tool
    /// @ai:effects pure
    fn get_install_hint(tool: &str) -> &'static str {
        match tool {
            "node" => "Install Node.js: https://nodejs.org/",
            "deno" => "Install Deno: https://deno.land/",
            "bun" => "Install Bun: https://bun.sh/",
            "tsc" => "Install TypeScript: npm install -g typescript",
            _ => "Check tool documentation for installation instructions",
        }
    }

    /// @ai:intent Run the probe command, returning the first line of its output on success
    /// @ai:effects io
    fn probe(program: &str, args: &[String]) -> Option<String> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Some(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    /// @ai:intent Probe the configured tool
    /// @ai:effects io
    pub fn validate(tool: &ToolConfig) -> ToolchainStatus {
        let version = Self::probe(&tool.program, &tool.probe_args);

        ToolchainStatus {
            program: tool.program.clone(),
            available: version.is_some(),
            version,
            install_hint: Self::get_install_hint(&tool.program),
        }
    }

    /// @ai:intent Log the probe outcome
    /// @ai:effects io
    pub fn log_status(status: &ToolchainStatus) {
        if status.available {
            tracing::info!(
                "Using '{}' ({})",
                status.program,
                status.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!(
                "Tool '{}' not found - cases cannot be profiled. {}",
                status.program,
                status.install_hint
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_install_hint_known_tools() {
        assert!(ToolchainValidator::get_install_hint("node").contains("nodejs.org"));
        assert!(ToolchainValidator::get_install_hint("tsc").contains("npm"));
        assert!(ToolchainValidator::get_install_hint("other").contains("documentation"));
    }

    #[test]
    fn test_validate_nonexistent_tool() {
        let tool = ToolConfig {
            program: "nonexistent_tool_xyz".to_string(),
            ..Default::default()
        };

        let status = ToolchainValidator::validate(&tool);
        assert!(!status.available);
        assert!(status.version.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_reports_first_output_line() {
        let tool = ToolConfig {
            program: "sh".to_string(),
            probe_args: vec!["-c".to_string(), "echo v1.2.3; echo extra".to_string()],
            ..Default::default()
        };

        let status = ToolchainValidator::validate(&tool);
        assert!(status.available);
        assert_eq!(status.version.as_deref(), Some("v1.2.3"));
    }
}

//! @ai:module:intent Define error types for stage profiling
//! @ai:module:layer domain
//! @ai:module:public_api ProfileError, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Errors raised while profiling a case
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("External tool '{program}' returned {status} on run {run} for {}", .case.display())]
    ProcessFailure {
        program: String,
        case: PathBuf,
        run: u32,
        status: String,
    },

    #[error("Unrecognized stage '{stage}' in output for {}", .case.display())]
    UnrecognizedStage { stage: String, case: PathBuf },

    #[error("Repetitions must be at least 1 (got {0})")]
    InvalidRepetitions(u32),

    #[error("Stage name '{0}' cannot be matched in tool output")]
    InvalidStageName(String),

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Case file not found: {}", .0.display())]
    CaseNotFound(PathBuf),

    #[error("Mock runner has no scripted output left")]
    MockExhausted,
}

pub type Result<T> = std::result::Result<T, ProfileError>;

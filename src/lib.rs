//! @ai:module:intent Stage timing profiler library
//! @ai:module:layer application
//! @ai:module:public_api config, cases, error, runner, timing, report, toolchain

pub mod cases;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod timing;
pub mod toolchain;

pub use cases::{CaseLoader, CaseLoaderTrait};
pub use config::ProfilerConfig;
pub use error::{ProfileError, Result};
pub use report::ReportGenerator;
pub use runner::{MockToolRunner, ProcessRunner, RunOutput, StageProfiler, ToolRunnerTrait};
pub use timing::{CaseTimings, ProfileResults, StageLineParser, StageSet, TimingSample};
pub use toolchain::{ToolchainStatus, ToolchainValidator};

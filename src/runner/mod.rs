//! @ai:module:intent External tool execution and stage profiling loop
//! @ai:module:layer infrastructure
//! @ai:module:public_api ToolRunnerTrait, ProcessRunner, MockToolRunner, RunOutput, StageProfiler

pub mod profiler;
pub mod tool;

pub use profiler::StageProfiler;
pub use tool::{MockToolRunner, ProcessRunner, RunOutput, ToolRunnerTrait};

//! @ai:module:intent Stage timing parsing and aggregation
//! @ai:module:layer domain
//! @ai:module:public_api StageLineParser, TimingSample, StageSet, StageAggregate, CaseTimings, StageTiming

pub mod aggregate;
pub mod parser;

pub use aggregate::{CaseTimings, ProfileResults, StageAggregate, StageSet, StageTiming};
pub use parser::{is_parseable_stage_name, StageLineParser, TimingSample};

//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "run the pipeline" or "revert a session".

pub mod pipeline_service;
pub mod revert_service;
pub mod session_recorder;

pub use pipeline_service::{FileError, FileOutcome, PipelineRun, PipelineService};
pub use revert_service::{RevertOutcome, RevertService};
pub use session_recorder::SessionRecorder;

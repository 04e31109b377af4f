pub mod change;
pub mod phase;
pub mod session;

pub use change::{Change, TransformResult, line_column};
pub use phase::{PhasePlan, PipelineOptions, PipelinePhase, default_extensions};
pub use session::{FileTransformLog, SessionSummary, TransformSession};

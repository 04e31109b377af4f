// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for tokenmod.
//!
//! Pure transformation logic: no filesystem, no clock reads outside of
//! timestamps, no global state. Everything that touches the outside world
//! goes through ports defined in the application layer.
//!
//! - **Transforms** are pure `&str -> TransformResult` functions
//! - **Sessions** are append-only ledgers that seal once
//! - **Revert plans** are derived from sealed sessions only
pub mod entities;
pub mod error;
pub mod guard;
pub mod injector;
pub mod regex_engine;
pub mod report;
pub mod review;
pub mod revert;
pub mod transform;
pub mod value_objects;

mod validation;

pub use entities::{
    Change, FileTransformLog, PhasePlan, PipelineOptions, PipelinePhase, SessionSummary,
    TransformResult, TransformSession, default_extensions, line_column,
};
pub use error::{DomainError, ErrorCategory};
pub use guard::SpanGuard;
pub use injector::{DEFAULT_TARGET_OBJECTS, InjectionTable, TokenEntry, TokenInjector};
pub use regex_engine::{ProtectedRegexEngine, RegexMapping, RegexTransform};
pub use report::render_markdown;
pub use review::ManualReviewTransform;
pub use revert::{RestoreStep, RevertPlan, RevertPlanner};
pub use transform::{Transform, TransformError, TransformMeta};
pub use validation::DomainValidator;
pub use value_objects::{ChangeKind, ComponentKind, TransformKind};

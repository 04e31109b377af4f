//! Application layer for tokenmod.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (PipelineService, SessionRecorder,
//!   RevertService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! transformation logic itself. All of that lives in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    FileError, FileOutcome, PipelineRun, PipelineService, RevertOutcome, RevertService,
    SessionRecorder,
};

pub use ports::{FileSystem, SessionStore};

pub use error::ApplicationError;

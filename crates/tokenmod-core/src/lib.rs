//! Tokenmod Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the tokenmod
//! codemod engine, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           tokenmod-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (PipelineService, SessionRecorder,     │
//! │   RevertService)                        │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │      (Driven: FileSystem, SessionStore) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    tokenmod-adapters (Infrastructure)   │
//! │  (LocalFileSystem, FileSessionStore...) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Transform, RegexTransform,             │
//! │  TokenInjector, TransformSession)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tokenmod_core::prelude::*;
//!
//! // 1. Ordered phases (usually from the adapters catalog)
//! let phases: Vec<PhasePlan> = catalog.standard_phases()?;
//!
//! // 2. Run with injected adapters
//! let service = PipelineService::new(Box::new(filesystem), phases)?;
//! let recorder = SessionRecorder::new(Arc::new(store));
//! let options = PipelineOptions::default();
//! recorder.start_session(&options)?;
//! let run = service.run("./src/components", &options, Some(&recorder))?;
//! let session = recorder.end_session()?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        FileError, PipelineRun, PipelineService, RevertService, SessionRecorder,
        ports::{FileSystem, SessionStore},
    };
    pub use crate::domain::{
        Change, ChangeKind, ComponentKind, FileTransformLog, InjectionTable, PhasePlan,
        PipelineOptions, PipelinePhase, RegexMapping, RegexTransform, RevertPlan, RevertPlanner,
        TokenInjector, Transform, TransformKind, TransformMeta, TransformResult, TransformSession,
    };
    pub use crate::error::{TokenmodError, TokenmodResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

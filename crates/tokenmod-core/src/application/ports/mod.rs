//! Application ports (traits) for external dependencies.
//!
//! Ports define what the pipeline needs from the outside world. Adapters in
//! `tokenmod-adapters` implement them.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `FileSystem`: directory listing and file I/O
//!   - `SessionStore`: persisted session ledgers and revert scripts
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{FileSystem, SessionStore};

#[cfg(test)]
pub use output::MockFileSystem;

//! Infrastructure adapters for tokenmod.
//!
//! This crate implements the ports defined in `tokenmod-core::application::ports`
//! and holds the data the standard pipeline is built from. It contains all
//! I/O operations.

pub mod builtin_tokens;
pub mod catalog;
pub mod filesystem;
pub mod session_store;
pub mod token_loader;

// Re-export commonly used adapters
pub use builtin_tokens::TokenTables;
pub use catalog::{TransformCatalog, TransformInfo};
pub use filesystem::{LocalFileSystem, MemoryFileSystem};
pub use session_store::{FileSessionStore, MemorySessionStore};
pub use token_loader::TokenTableLoader;

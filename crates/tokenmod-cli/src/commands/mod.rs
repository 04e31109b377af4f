//! Command handlers. Each translates arguments into calls on the core
//! services and renders the result; no business logic lives here.

use std::path::{Path, PathBuf};

use tokenmod_adapters::{TokenTableLoader, TokenTables};
use tokenmod_core::error::TokenmodResult;

use crate::config::AppConfig;

pub mod completions;
pub mod config;
pub mod revert;
pub mod run;
pub mod sessions;
pub mod transforms;

/// Built-in tables, or the TOML file from the flag or the configuration.
pub(crate) fn load_tables(flag: Option<&Path>, config: &AppConfig) -> TokenmodResult<TokenTables> {
    match flag.or(config.tokens.path.as_deref()) {
        Some(path) => TokenTableLoader::new(path).load(),
        None => Ok(TokenTables::builtin()?),
    }
}

pub(crate) fn log_dir(flag: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.pipeline.log_dir.clone())
}

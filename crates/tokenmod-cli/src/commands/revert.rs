//! `tokenmod revert` - undo a recorded session.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use tokenmod_adapters::{FileSessionStore, LocalFileSystem};
use tokenmod_core::{
    application::{ApplicationError, RevertService, ports::SessionStore},
    error::TokenmodResult,
};

use crate::{
    cli::RevertArgs,
    commands::log_dir,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Resolves to the newest recorded session.
const LATEST: &str = "latest";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScriptReport<'a> {
    session_id: &'a str,
    script: String,
    files: usize,
}

#[instrument(skip_all, fields(session = %args.session))]
pub fn execute(args: RevertArgs, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let store = Arc::new(FileSessionStore::new(log_dir(args.log_dir.clone(), config)));
    let session_id = resolve_session(store.as_ref(), &args.session)?;
    let service = RevertService::new(store, Box::new(LocalFileSystem::new()));

    if args.apply {
        let outcome = service.apply(&session_id)?;
        if output.is_json() {
            output.json(&outcome)?;
        } else {
            for path in &outcome.restored {
                output.print(&format!("  restored {}", path.display()))?;
            }
            for error in &outcome.errors {
                output.error(&format!("{}: {}", error.file.display(), error.error))?;
            }
            output.success(&format!(
                "Restored {} file(s) from {session_id}; backups kept as *.bak-{session_id}",
                outcome.restored.len()
            ))?;
        }
        if !outcome.success() {
            return Err(CliError::PartialFailure {
                operation: "revert",
                count: outcome.errors.len(),
            });
        }
        return Ok(());
    }

    let (plan, script) = match &args.output {
        Some(path) => (service.write_script_to(&session_id, path)?, path.clone()),
        None => service.write_script(&session_id)?,
    };

    if output.is_json() {
        output.json(&ScriptReport {
            session_id: &session_id,
            script: script.display().to_string(),
            files: plan.steps.len(),
        })?;
    } else if plan.is_empty() {
        output.info(&format!("Session {session_id} changed no files"))?;
    } else {
        output.success(&format!(
            "Revert script for {} file(s) written to {}",
            plan.steps.len(),
            script.display()
        ))?;
        output.info(&format!("Run it with: bash {}", script.display()))?;
    }
    Ok(())
}

/// Accepts a session id, a log path, or `latest`.
fn resolve_session(store: &dyn SessionStore, requested: &str) -> TokenmodResult<String> {
    if requested != LATEST {
        return Ok(requested.to_string());
    }
    store.list_sessions()?.into_iter().next().ok_or_else(|| {
        ApplicationError::SessionNotFound {
            session_id: LATEST.into(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenmod_adapters::MemorySessionStore;
    use tokenmod_core::domain::{PipelineOptions, TransformSession};

    #[test]
    fn explicit_ids_pass_through() {
        let store = MemorySessionStore::new();
        assert_eq!(resolve_session(&store, "session-1").unwrap(), "session-1");
    }

    #[test]
    fn latest_without_sessions_is_not_found() {
        let store = MemorySessionStore::new();
        assert!(resolve_session(&store, LATEST).is_err());
    }

    #[test]
    fn latest_picks_the_newest_session() {
        let store = MemorySessionStore::new();
        for id in ["session-20250101-000000-aaaaaaaa", "session-20250102-000000-bbbbbbbb"] {
            let mut session =
                TransformSession::new(id, PipelineOptions::default(), chrono::Utc::now());
            session.seal(chrono::Utc::now()).unwrap();
            store.save_session(&session).unwrap();
        }
        assert_eq!(
            resolve_session(&store, LATEST).unwrap(),
            "session-20250102-000000-bbbbbbbb"
        );
    }
}

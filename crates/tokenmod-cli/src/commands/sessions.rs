//! `tokenmod sessions` - list recorded sessions.

use serde::Serialize;
use tracing::warn;

use tokenmod_adapters::FileSessionStore;
use tokenmod_core::{application::ports::SessionStore, domain::TransformSession};

use crate::{
    cli::{ListFormat, SessionsArgs},
    commands::log_dir,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionRow {
    session_id: String,
    started: Option<String>,
    dry_run: bool,
    files_changed: usize,
    total_changes: usize,
}

impl SessionRow {
    fn from_session(session: &TransformSession) -> Self {
        Self {
            session_id: session.session_id.clone(),
            started: Some(session.start_time.format("%Y-%m-%d %H:%M:%S").to_string()),
            dry_run: session.options.dry_run,
            files_changed: session.summary.files_changed,
            total_changes: session.summary.total_changes,
        }
    }

    fn unreadable(session_id: String) -> Self {
        Self {
            session_id,
            started: None,
            dry_run: false,
            files_changed: 0,
            total_changes: 0,
        }
    }
}

pub fn execute(args: SessionsArgs, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let dir = log_dir(args.log_dir, config);
    let store = FileSessionStore::new(&dir);
    let rows: Vec<SessionRow> = store
        .list_sessions()?
        .into_iter()
        .map(|id| match store.load_session(&id) {
            Ok(session) => SessionRow::from_session(&session),
            Err(e) => {
                warn!(session = %id, error = %e, "Skipping unreadable session");
                SessionRow::unreadable(id)
            }
        })
        .collect();

    if output.is_json() || args.format == ListFormat::Json {
        return output.json(&rows);
    }

    if rows.is_empty() {
        output.info(&format!("No sessions recorded in {}", dir.display()))?;
        return Ok(());
    }

    match args.format {
        ListFormat::List => {
            for row in &rows {
                output.print(&row.session_id)?;
            }
        }
        _ => {
            output.header(&format!("Sessions in {}:", dir.display()))?;
            for row in &rows {
                let started = row.started.as_deref().unwrap_or("(unreadable)");
                output.print(&format!(
                    "  {}  {started}  {} file(s), {} change(s)",
                    row.session_id, row.files_changed, row.total_changes
                ))?;
            }
        }
    }
    Ok(())
}

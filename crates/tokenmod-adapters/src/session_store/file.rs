//! Log-directory session store.
//!
//! ```text
//! <log_dir>/
//! ├── session-20260101-120000-1a2b3c4d.json         ← full ledger
//! ├── session-20260101-120000-1a2b3c4d-summary.md   ← human summary
//! └── revert-session-20260101-120000-1a2b3c4d.sh    ← generated on demand
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use tokenmod_core::{
    application::{ApplicationError, ports::SessionStore},
    domain::{RevertPlan, TransformSession, render_markdown},
    error::{Context, TokenmodError, TokenmodResult},
};

use super::artifact_names;

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A session argument may be an id or a path to a JSON ledger.
    fn ledger_path(&self, session: &str) -> PathBuf {
        let as_path = Path::new(session);
        if as_path.extension().is_some_and(|e| e == "json") && as_path.is_file() {
            return as_path.to_path_buf();
        }
        self.dir.join(artifact_names(session).0)
    }

    fn write(&self, name: &str, content: &str) -> TokenmodResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| store_error(&self.dir, e))?;
        let path = self.dir.join(name);
        fs::write(&path, content).map_err(|e| store_error(&path, e))?;
        Ok(path)
    }
}

fn store_error(path: &Path, e: io::Error) -> TokenmodError {
    ApplicationError::StoreError {
        reason: format!("{}: {e}", path.display()),
    }
    .into()
}

impl SessionStore for FileSessionStore {
    #[instrument(skip_all, fields(session = %session.session_id))]
    fn save_session(&self, session: &TransformSession) -> TokenmodResult<PathBuf> {
        let (json_name, md_name, _) = artifact_names(&session.session_id);
        // Internal error: encoding only fails on a bug.
        let json = serde_json::to_string_pretty(session).context("failed to encode session")?;

        let json_path = self.write(&json_name, &json)?;
        self.write(&md_name, &render_markdown(session))?;
        debug!(path = %json_path.display(), "Session persisted");
        Ok(json_path)
    }

    fn load_session(&self, session_id: &str) -> TokenmodResult<TransformSession> {
        let path = self.ledger_path(session_id);
        let raw = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TokenmodError::from(ApplicationError::SessionNotFound {
                session_id: session_id.to_string(),
            }),
            _ => store_error(&path, e),
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            ApplicationError::CorruptSession {
                path: path.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn list_sessions(&self) -> TokenmodResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(store_error(&self.dir, e)),
        };

        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.strip_suffix(".json")
                    .filter(|stem| stem.starts_with("session-"))
                    .map(str::to_string)
            })
            .collect();
        // ids embed a sortable timestamp
        ids.sort_unstable_by(|a, b| b.cmp(a));
        Ok(ids)
    }

    fn save_revert_script(&self, plan: &RevertPlan) -> TokenmodResult<PathBuf> {
        let (_, _, script_name) = artifact_names(&plan.session_id);
        let path = self.write(&script_name, &plan.render_shell())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)
                .map_err(|e| store_error(&path, e))?
                .permissions();
            perms.set_mode(perms.mode() | 0o111);
            fs::set_permissions(&path, perms).map_err(|e| store_error(&path, e))?;
        }

        Ok(path)
    }
}

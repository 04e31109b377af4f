//! In-memory session store for testing.

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use tokenmod_core::{
    application::{ApplicationError, ports::SessionStore},
    domain::{RevertPlan, TransformSession, render_markdown},
    error::{TokenmodError, TokenmodResult},
};

use super::artifact_names;

/// Keeps every persisted artifact in memory. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: BTreeMap<String, TransformSession>,
    summaries: BTreeMap<String, String>,
    scripts: BTreeMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markdown summary saved for a session.
    pub fn summary(&self, session_id: &str) -> Option<String> {
        self.inner.lock().ok()?.summaries.get(session_id).cloned()
    }

    /// Revert script saved for a session.
    pub fn script(&self, session_id: &str) -> Option<String> {
        self.inner.lock().ok()?.scripts.get(session_id).cloned()
    }

    fn lock(&self) -> TokenmodResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| TokenmodError::Internal {
            message: "memory session store lock poisoned".into(),
        })
    }
}

impl SessionStore for MemorySessionStore {
    fn save_session(&self, session: &TransformSession) -> TokenmodResult<PathBuf> {
        let mut inner = self.lock()?;
        let id = session.session_id.clone();
        inner.summaries.insert(id.clone(), render_markdown(session));
        inner.sessions.insert(id.clone(), session.clone());
        Ok(PathBuf::from(artifact_names(&id).0))
    }

    fn load_session(&self, session_id: &str) -> TokenmodResult<TransformSession> {
        self.lock()?
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| {
                ApplicationError::SessionNotFound {
                    session_id: session_id.to_string(),
                }
                .into()
            })
    }

    fn list_sessions(&self) -> TokenmodResult<Vec<String>> {
        Ok(self.lock()?.sessions.keys().rev().cloned().collect())
    }

    fn save_revert_script(&self, plan: &RevertPlan) -> TokenmodResult<PathBuf> {
        let mut inner = self.lock()?;
        inner
            .scripts
            .insert(plan.session_id.clone(), plan.render_shell());
        Ok(PathBuf::from(artifact_names(&plan.session_id).2))
    }
}

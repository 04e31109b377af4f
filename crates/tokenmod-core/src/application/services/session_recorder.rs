//! Session Recorder - the append-only change ledger for one run.
//!
//! The recorder is an explicit value handed to the pipeline by reference.
//! Appends are serialized behind a mutex, so one recorder may be shared by
//! workers processing different files.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::{
    application::{ApplicationError, ports::SessionStore},
    domain::{Change, FileTransformLog, PipelineOptions, TransformMeta, TransformSession},
    error::TokenmodResult,
};

pub struct SessionRecorder {
    store: Arc<dyn SessionStore>,
    active: Mutex<Option<TransformSession>>,
}

impl SessionRecorder {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            active: Mutex::new(None),
        }
    }

    /// Open a new session. Fails if one is already open.
    pub fn start_session(&self, options: &PipelineOptions) -> TokenmodResult<String> {
        let mut active = self.lock()?;
        if let Some(open) = active.as_ref() {
            return Err(ApplicationError::SessionAlreadyActive {
                session_id: open.session_id.clone(),
            }
            .into());
        }

        let now = Utc::now();
        let session_id = TransformSession::generate_id(now);
        *active = Some(TransformSession::new(session_id.clone(), options.clone(), now));

        info!(session = %session_id, "Session started");
        Ok(session_id)
    }

    /// Append one log for one transform application.
    pub fn log_file_transform(
        &self,
        file: &Path,
        meta: &TransformMeta,
        original: &str,
        transformed: &str,
        changes: Vec<Change>,
    ) -> TokenmodResult<()> {
        let mut active = self.lock()?;
        let session = active.as_mut().ok_or(ApplicationError::SessionNotStarted)?;

        let log = FileTransformLog::new(file, meta, original, transformed, changes);
        debug!(
            file = %file.display(),
            transform = %meta.name,
            changed = log.has_changes,
            "Logged transform"
        );
        session.append(log)?;
        Ok(())
    }

    /// Seal the open session and persist it. The recorder is free for a new
    /// session afterwards.
    ///
    /// If the store rejects the session it stays open, so the caller can
    /// retry and the run remains revertible.
    #[instrument(skip_all)]
    pub fn end_session(&self) -> TokenmodResult<TransformSession> {
        let mut active = self.lock()?;
        let mut session = active
            .as_ref()
            .ok_or(ApplicationError::SessionNotStarted)?
            .clone();
        session.seal(Utc::now())?;

        let path = self.store.save_session(&session)?;
        *active = None;
        info!(
            session = %session.session_id,
            log = %path.display(),
            files_changed = session.summary.files_changed,
            "Session sealed"
        );
        Ok(session)
    }

    pub fn current_session_id(&self) -> Option<String> {
        self.active
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.session_id.clone()))
    }

    fn lock(&self) -> TokenmodResult<MutexGuard<'_, Option<TransformSession>>> {
        self.active
            .lock()
            .map_err(|_| ApplicationError::RecorderLockError.into())
    }
}

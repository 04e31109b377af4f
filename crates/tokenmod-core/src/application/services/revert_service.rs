//! Revert Service - undo a recorded session.
//!
//! Sessions are read back by plain deserialization through the session
//! store. A revert is either rendered as a shell script or applied directly
//! through the filesystem port: back up the current file, then restore the
//! pre-session content.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ports::{FileSystem, SessionStore},
        services::pipeline_service::{FileError, READ_FAILED, WRITE_FAILED},
    },
    domain::{RevertPlan, RevertPlanner},
    error::TokenmodResult,
};

/// Result of applying a revert plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertOutcome {
    pub session_id: String,
    pub restored: Vec<PathBuf>,
    pub backups: Vec<PathBuf>,
    pub errors: Vec<FileError>,
}

impl RevertOutcome {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct RevertService {
    store: Arc<dyn SessionStore>,
    filesystem: Box<dyn FileSystem>,
}

impl RevertService {
    pub fn new(store: Arc<dyn SessionStore>, filesystem: Box<dyn FileSystem>) -> Self {
        Self { store, filesystem }
    }

    /// Load a persisted session and plan its revert.
    pub fn plan(&self, session_id: &str) -> TokenmodResult<RevertPlan> {
        let session = self.store.load_session(session_id)?;
        Ok(RevertPlanner::plan(&session)?)
    }

    /// Write `revert-<id>.sh` next to the session logs.
    #[instrument(skip(self))]
    pub fn write_script(&self, session_id: &str) -> TokenmodResult<(RevertPlan, PathBuf)> {
        let plan = self.plan(session_id)?;
        let path = self.store.save_revert_script(&plan)?;
        info!(steps = plan.steps.len(), script = %path.display(), "Revert script written");
        Ok((plan, path))
    }

    /// Write the revert script to an explicit location.
    #[instrument(skip(self, output), fields(output = %output.display()))]
    pub fn write_script_to(&self, session_id: &str, output: &Path) -> TokenmodResult<RevertPlan> {
        let plan = self.plan(session_id)?;
        self.filesystem.write_file(output, &plan.render_shell())?;
        info!(steps = plan.steps.len(), "Revert script written");
        Ok(plan)
    }

    /// Restore every file in the plan. Per-file failures are collected and
    /// the remaining files are still restored.
    #[instrument(skip(self))]
    pub fn apply(&self, session_id: &str) -> TokenmodResult<RevertOutcome> {
        let plan = self.plan(session_id)?;
        let mut outcome = RevertOutcome {
            session_id: plan.session_id.clone(),
            restored: Vec::new(),
            backups: Vec::new(),
            errors: Vec::new(),
        };

        for step in &plan.steps {
            let path = &step.file_path;

            // A missing file is restored without a backup.
            if let Ok(current) = self.filesystem.read_file(path) {
                let backup = step.backup_path(&plan.session_id);
                if let Err(e) = self.filesystem.write_file(&backup, &current) {
                    warn!(file = %path.display(), error = %e, "Backup failed, file left untouched");
                    outcome.errors.push(FileError {
                        file: backup,
                        error: WRITE_FAILED.into(),
                    });
                    continue;
                }
                outcome.backups.push(backup);
            } else {
                warn!(file = %path.display(), "{READ_FAILED}, restoring without backup");
            }

            match self.filesystem.write_file(path, &step.original_content) {
                Ok(()) => outcome.restored.push(path.clone()),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Restore failed");
                    outcome.errors.push(FileError {
                        file: path.clone(),
                        error: WRITE_FAILED.into(),
                    });
                }
            }
        }

        info!(
            restored = outcome.restored.len(),
            errors = outcome.errors.len(),
            "Revert applied"
        );
        Ok(outcome)
    }
}

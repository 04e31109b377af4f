//! The session ledger.
//!
//! A [`TransformSession`] is the ordered record of every transform
//! application in one pipeline run. Two invariants make single-point revert
//! possible:
//!
//! - **chaining**: consecutive logs of the same file satisfy
//!   `next.original_content == prev.transformed_content`;
//! - **root**: the first log of a file holds the file's bytes from before the
//!   session.
//!
//! The summary is redundant storage and always equals
//! [`SessionSummary::fold`] over the logs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::{change::Change, phase::PipelineOptions},
    error::DomainError,
    transform::TransformMeta,
    value_objects::TransformKind,
};

/// One transform application on one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTransformLog {
    pub file_path: PathBuf,
    pub transform_name: String,
    #[serde(default)]
    pub transform_description: String,
    pub transform_kind: TransformKind,
    pub timestamp: DateTime<Utc>,
    pub original_content: String,
    pub transformed_content: String,
    pub changes: Vec<Change>,
    pub has_changes: bool,
}

impl FileTransformLog {
    pub fn new(
        file_path: impl Into<PathBuf>,
        meta: &TransformMeta,
        original_content: impl Into<String>,
        transformed_content: impl Into<String>,
        changes: Vec<Change>,
    ) -> Self {
        let original_content = original_content.into();
        let transformed_content = transformed_content.into();
        let has_changes = original_content != transformed_content;
        Self {
            file_path: file_path.into(),
            transform_name: meta.name.clone(),
            transform_description: meta.description.clone(),
            transform_kind: meta.kind,
            timestamp: Utc::now(),
            original_content,
            transformed_content,
            changes,
            has_changes,
        }
    }
}

/// Aggregate counters over a session's logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Distinct files with at least one log.
    pub total_files: usize,
    /// Distinct files with at least one changed log.
    pub files_changed: usize,
    /// Sum of `changes.len()` across logs.
    pub total_changes: usize,
    /// Logs with `has_changes == true`.
    pub transforms_applied: usize,
}

impl SessionSummary {
    /// Recompute the summary from scratch.
    pub fn fold(logs: &[FileTransformLog]) -> Self {
        let mut seen: Vec<&Path> = Vec::new();
        let mut changed: Vec<&Path> = Vec::new();
        let mut summary = Self::default();

        for log in logs {
            let path = log.file_path.as_path();
            if !seen.contains(&path) {
                seen.push(path);
            }
            if log.has_changes {
                summary.transforms_applied += 1;
                if !changed.contains(&path) {
                    changed.push(path);
                }
            }
            summary.total_changes += log.changes.len();
        }

        summary.total_files = seen.len();
        summary.files_changed = changed.len();
        summary
    }
}

/// One end-to-end pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformSession {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub options: PipelineOptions,
    pub file_transforms: Vec<FileTransformLog>,
    pub summary: SessionSummary,
}

impl TransformSession {
    pub fn new(
        session_id: impl Into<String>,
        options: PipelineOptions,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            start_time,
            end_time: None,
            options,
            file_transforms: Vec::new(),
            summary: SessionSummary::default(),
        }
    }

    /// Generate a sortable, collision-resistant session id.
    pub fn generate_id(now: DateTime<Utc>) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("session-{}-{}", now.format("%Y%m%d-%H%M%S"), &suffix[..8])
    }

    pub fn is_sealed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Append a log and update the counters.
    pub fn append(&mut self, log: FileTransformLog) -> Result<(), DomainError> {
        if self.is_sealed() {
            return Err(DomainError::SessionSealed {
                session_id: self.session_id.clone(),
            });
        }

        let path = log.file_path.as_path();
        let seen = self.file_transforms.iter().any(|l| l.file_path == path);
        let already_changed = self
            .file_transforms
            .iter()
            .any(|l| l.file_path == path && l.has_changes);

        if !seen {
            self.summary.total_files += 1;
        }
        if log.has_changes {
            self.summary.transforms_applied += 1;
            if !already_changed {
                self.summary.files_changed += 1;
            }
        }
        self.summary.total_changes += log.changes.len();

        self.file_transforms.push(log);
        Ok(())
    }

    /// Set `end_time`. A sealed session is never modified again.
    pub fn seal(&mut self, end_time: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_sealed() {
            return Err(DomainError::SessionSealed {
                session_id: self.session_id.clone(),
            });
        }
        self.end_time = Some(end_time);
        Ok(())
    }

    /// Logs for one file, in execution order.
    pub fn logs_for<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a FileTransformLog> {
        self.file_transforms
            .iter()
            .filter(move |l| l.file_path == path)
    }

    /// Files with at least one changed log, in order of first appearance.
    pub fn changed_files(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = Vec::new();
        for log in self.file_transforms.iter().filter(|l| l.has_changes) {
            let path = log.file_path.as_path();
            if !files.contains(&path) {
                files.push(path);
            }
        }
        files
    }

    /// Distinct transform names that changed at least one file, in order.
    pub fn transforms_applied(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for log in self.file_transforms.iter().filter(|l| l.has_changes) {
            if !names.contains(&log.transform_name.as_str()) {
                names.push(&log.transform_name);
            }
        }
        names
    }

    /// Whether every file's logs form an unbroken chain.
    pub fn is_chained(&self) -> bool {
        let mut last: Vec<(&Path, &str)> = Vec::new();
        for log in &self.file_transforms {
            let path = log.file_path.as_path();
            match last.iter_mut().find(|(p, _)| *p == path) {
                Some(entry) => {
                    if entry.1 != log.original_content {
                        return false;
                    }
                    entry.1 = &log.transformed_content;
                }
                None => last.push((path, &log.transformed_content)),
            }
        }
        true
    }

    /// Whether the stored summary agrees with the logs.
    pub fn summary_is_consistent(&self) -> bool {
        self.summary == SessionSummary::fold(&self.file_transforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str) -> TransformMeta {
        TransformMeta::new(name, "test transform", "test", TransformKind::Regex).unwrap()
    }

    fn change() -> Change {
        Change::new("a", "b", TransformKind::Regex)
    }

    #[test]
    fn append_keeps_summary_equal_to_fold() {
        let mut session = TransformSession::new("s1", PipelineOptions::default(), Utc::now());
        session
            .append(FileTransformLog::new("a.tsx", &meta("t1"), "a", "b", vec![change()]))
            .unwrap();
        session
            .append(FileTransformLog::new("a.tsx", &meta("t2"), "b", "b", vec![]))
            .unwrap();
        session
            .append(FileTransformLog::new("b.tsx", &meta("t1"), "x", "x", vec![]))
            .unwrap();
        session
            .append(FileTransformLog::new(
                "b.tsx",
                &meta("t2"),
                "x",
                "y",
                vec![change(), change()],
            ))
            .unwrap();

        assert!(session.summary_is_consistent());
        assert_eq!(
            session.summary,
            SessionSummary {
                total_files: 2,
                files_changed: 2,
                total_changes: 3,
                transforms_applied: 2,
            }
        );
    }

    #[test]
    fn sealed_session_rejects_appends() {
        let mut session = TransformSession::new("s1", PipelineOptions::default(), Utc::now());
        session.seal(Utc::now()).unwrap();
        let err = session
            .append(FileTransformLog::new("a.tsx", &meta("t"), "a", "b", vec![]))
            .unwrap_err();
        assert!(matches!(err, DomainError::SessionSealed { .. }));
        assert!(session.seal(Utc::now()).is_err());
    }

    #[test]
    fn chaining_detects_a_gap() {
        let mut session = TransformSession::new("s1", PipelineOptions::default(), Utc::now());
        session
            .append(FileTransformLog::new("a.tsx", &meta("t1"), "a", "b", vec![]))
            .unwrap();
        assert!(session.is_chained());
        session
            .append(FileTransformLog::new("a.tsx", &meta("t2"), "zzz", "c", vec![]))
            .unwrap();
        assert!(!session.is_chained());
    }

    #[test]
    fn changed_files_keep_first_appearance_order() {
        let mut session = TransformSession::new("s1", PipelineOptions::default(), Utc::now());
        for (file, from, to) in [("b.tsx", "1", "2"), ("a.tsx", "1", "1"), ("a.tsx", "1", "3")] {
            session
                .append(FileTransformLog::new(file, &meta("t"), from, to, vec![]))
                .unwrap();
        }
        assert_eq!(
            session.changed_files(),
            vec![Path::new("b.tsx"), Path::new("a.tsx")]
        );
    }

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let now = Utc::now();
        let a = TransformSession::generate_id(now);
        let b = TransformSession::generate_id(now);
        assert!(a.starts_with("session-"));
        assert_ne!(a, b);
    }
}

//! Undo planning.
//!
//! By the chaining invariant the earliest log of a file holds its bytes from
//! before the session, so one restore step per changed file undoes every
//! transform that touched it. Intermediate snapshots are never replayed.

use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::domain::{entities::session::TransformSession, error::DomainError, validation::DomainValidator};

const HEREDOC_MARKER: &str = "TOKENMOD_EOF";
const WRAP: usize = 76;

/// Restore one file to its pre-session content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreStep {
    pub file_path: PathBuf,
    pub original_content: String,
}

impl RestoreStep {
    /// Where the current file is copied before being overwritten.
    pub fn backup_path(&self, session_id: &str) -> PathBuf {
        let mut name = self.file_path.as_os_str().to_os_string();
        name.push(format!(".bak-{session_id}"));
        PathBuf::from(name)
    }

    /// Lossless encoding of the original bytes.
    pub fn encoded(&self) -> String {
        STANDARD.encode(self.original_content.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertPlan {
    pub session_id: String,
    pub steps: Vec<RestoreStep>,
}

impl RevertPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render a bash script applying every step.
    ///
    /// The output depends only on the plan, so the same session always yields
    /// the same script.
    pub fn render_shell(&self) -> String {
        let mut out = String::new();
        out.push_str("#!/usr/bin/env bash\n");
        out.push_str(&format!("# Revert tokenmod session {}\n", self.session_id));
        out.push_str(&format!("# {} file(s) to restore\n", self.steps.len()));
        out.push_str("set -euo pipefail\n");

        let total = self.steps.len();
        for (i, step) in self.steps.iter().enumerate() {
            let target = shell_quote(&step.file_path);
            let backup = shell_quote(&step.backup_path(&self.session_id));

            out.push('\n');
            out.push_str(&format!("# [{}/{}] {}\n", i + 1, total, step.file_path.display()));
            out.push_str(&format!("mkdir -p \"$(dirname {target})\"\n"));
            out.push_str(&format!("if [ -f {target} ]; then cp -p {target} {backup}; fi\n"));
            out.push_str(&format!("base64 --decode > {target} <<'{HEREDOC_MARKER}'\n"));
            let encoded = step.encoded();
            for chunk in encoded.as_bytes().chunks(WRAP) {
                // base64 output is ASCII
                out.push_str(&String::from_utf8_lossy(chunk));
                out.push('\n');
            }
            out.push_str(HEREDOC_MARKER);
            out.push('\n');
            out.push_str(&format!("echo \"restored {}\"\n", escape_double(&step.file_path)));
        }

        out
    }
}

/// Builds revert plans from sealed sessions.
pub struct RevertPlanner;

impl RevertPlanner {
    /// One step per file with at least one changed log, in order of first
    /// appearance, restoring the earliest log's original content.
    pub fn plan(session: &TransformSession) -> Result<RevertPlan, DomainError> {
        DomainValidator::validate_sealed(session)?;

        let steps = session
            .changed_files()
            .into_iter()
            .filter_map(|path| earliest_original(session, path))
            .collect();

        Ok(RevertPlan {
            session_id: session.session_id.clone(),
            steps,
        })
    }
}

fn earliest_original(session: &TransformSession, path: &Path) -> Option<RestoreStep> {
    session.logs_for(path).next().map(|log| RestoreStep {
        file_path: log.file_path.clone(),
        original_content: log.original_content.clone(),
    })
}

fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

fn escape_double(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .flat_map(|c| match c {
            '"' | '\\' | '$' | '`' => vec!['\\', c],
            _ => vec![c],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{
        entities::{phase::PipelineOptions, session::FileTransformLog},
        transform::TransformMeta,
        value_objects::TransformKind,
    };

    fn meta(name: &str) -> TransformMeta {
        TransformMeta::new(name, "d", "c", TransformKind::Regex).unwrap()
    }

    fn session() -> TransformSession {
        let mut s = TransformSession::new("session-1", PipelineOptions::default(), Utc::now());
        let logs = [
            ("a.tsx", "t1", "orig a\n  \n", "a1"),
            ("b.tsx", "t1", "b", "b"),
            ("a.tsx", "t2", "a1", "a2"),
            ("a.tsx", "t3", "a2", "a3"),
            ("c.tsx", "t1", "c", "c"),
            ("c.tsx", "t2", "c", "c2"),
        ];
        for (file, t, from, to) in logs {
            s.append(FileTransformLog::new(file, &meta(t), from, to, vec![]))
                .unwrap();
        }
        s.seal(Utc::now()).unwrap();
        s
    }

    #[test]
    fn one_step_per_changed_file_from_earliest_log() {
        let plan = RevertPlanner::plan(&session()).unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].file_path, PathBuf::from("a.tsx"));
        assert_eq!(plan.steps[0].original_content, "orig a\n  \n");
        assert_eq!(plan.steps[1].file_path, PathBuf::from("c.tsx"));
        assert_eq!(plan.steps[1].original_content, "c");
    }

    #[test]
    fn unsealed_session_is_rejected() {
        let s = TransformSession::new("open", PipelineOptions::default(), Utc::now());
        assert!(matches!(
            RevertPlanner::plan(&s),
            Err(DomainError::SessionNotSealed { .. })
        ));
    }

    #[test]
    fn script_embeds_exact_bytes() {
        let plan = RevertPlanner::plan(&session()).unwrap();
        let script = plan.render_shell();
        assert!(script.starts_with("#!/usr/bin/env bash\n"));
        assert!(script.contains("set -euo pipefail"));
        assert!(script.contains("cp -p 'a.tsx' 'a.tsx.bak-session-1'"));

        let body: String = script
            .split("<<'TOKENMOD_EOF'\n")
            .nth(1)
            .and_then(|rest| rest.split("TOKENMOD_EOF").next())
            .unwrap()
            .lines()
            .collect();
        let decoded = STANDARD.decode(body).unwrap();
        assert_eq!(decoded, b"orig a\n  \n");
    }

    #[test]
    fn paths_with_quotes_are_escaped() {
        let step = RestoreStep {
            file_path: PathBuf::from("it's.tsx"),
            original_content: String::new(),
        };
        assert_eq!(shell_quote(&step.file_path), r"'it'\''s.tsx'");
    }

    #[test]
    fn rendering_is_deterministic() {
        let plan = RevertPlanner::plan(&session()).unwrap();
        assert_eq!(plan.render_shell(), plan.render_shell());
    }
}

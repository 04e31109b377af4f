//! Human-readable session summary.

use std::fmt::Write as _;

use crate::domain::entities::session::TransformSession;

/// Render the Markdown summary persisted next to the JSON ledger.
pub fn render_markdown(session: &TransformSession) -> String {
    let mut md = String::new();
    let opts = &session.options;
    let summary = &session.summary;

    let _ = writeln!(md, "# Transform Session {}\n", session.session_id);
    let _ = writeln!(md, "- **Started:** {}", session.start_time.to_rfc3339());
    match session.end_time {
        Some(end) => {
            let _ = writeln!(md, "- **Finished:** {}", end.to_rfc3339());
        }
        None => md.push_str("- **Finished:** (in progress)\n"),
    }

    md.push_str("\n## Configuration\n\n");
    let _ = writeln!(md, "- Dry run: {}", opts.dry_run);
    let _ = writeln!(md, "- Verbose: {}", opts.verbose);
    let _ = writeln!(md, "- Filter: {}", opts.filter.as_deref().unwrap_or("(none)"));
    let _ = writeln!(md, "- Extensions: {}", opts.extensions.join(", "));
    let _ = writeln!(md, "- Skip optional phases: {}", opts.skip_optional);
    if !opts.phases.is_empty() {
        let _ = writeln!(md, "- Phases: {}", opts.phases.join(", "));
    }

    md.push_str("\n## Statistics\n\n");
    let _ = writeln!(md, "| Metric | Value |\n|---|---|");
    let _ = writeln!(md, "| Files processed | {} |", summary.total_files);
    let _ = writeln!(md, "| Files changed | {} |", summary.files_changed);
    let _ = writeln!(md, "| Total changes | {} |", summary.total_changes);
    let _ = writeln!(md, "| Transforms applied | {} |", summary.transforms_applied);

    md.push_str("\n## Transforms Applied\n\n");
    let applied = session.transforms_applied();
    if applied.is_empty() {
        md.push_str("_None_\n");
    }
    for name in applied {
        let _ = writeln!(md, "- `{name}`");
    }

    md.push_str("\n## Changed Files\n");
    let changed = session.changed_files();
    if changed.is_empty() {
        md.push_str("\n_No files changed._\n");
    }
    for path in changed {
        let _ = writeln!(md, "\n### `{}`\n", path.display());
        for log in session.logs_for(path).filter(|l| l.has_changes) {
            let description = if log.transform_description.is_empty() {
                String::new()
            } else {
                format!(": {}", log.transform_description)
            };
            let _ = writeln!(
                md,
                "- **{}**{} ({} change{})",
                log.transform_name,
                description,
                log.changes.len(),
                if log.changes.len() == 1 { "" } else { "s" }
            );
        }
    }

    md
}

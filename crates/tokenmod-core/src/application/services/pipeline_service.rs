//! Pipeline Service - the transform orchestrator.
//!
//! This service drives one run over a directory:
//! 1. List the directory (failure is run-fatal)
//! 2. Keep eligible source files, in listing order
//! 3. Thread each file's content through every selected transform
//! 4. Write back changed files unless this is a dry run
//!
//! Per-file failures are recorded and the run moves on to the next file.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{ports::FileSystem, services::session_recorder::SessionRecorder},
    domain::{
        Change, DomainError, DomainValidator as validator, PhasePlan, PipelineOptions, Transform,
    },
    error::{TokenmodError, TokenmodResult},
};

pub const READ_FAILED: &str = "Failed to read file";
pub const WRITE_FAILED: &str = "Failed to write file";
pub const LIST_FAILED: &str = "Failed to list directory";

/// A per-file (or, for listing, per-directory) failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file: PathBuf,
    pub error: String,
}

impl FileError {
    fn new(file: impl Into<PathBuf>, error: &str) -> Self {
        Self {
            file: file.into(),
            error: error.to_string(),
        }
    }
}

/// What happened to one eligible, readable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub file: PathBuf,
    pub has_changes: bool,
    pub changes: Vec<Change>,
    pub warnings: Vec<String>,
    pub written: bool,
}

/// Run-level result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub success: bool,
    pub processed_files: usize,
    pub errors: Vec<FileError>,
    pub summary: String,
    pub files: Vec<FileOutcome>,
}

impl PipelineRun {
    fn finish(processed_files: usize, errors: Vec<FileError>, files: Vec<FileOutcome>, dry_run: bool) -> Self {
        let changed = files.iter().filter(|f| f.has_changes).count();
        let mut summary = format!(
            "Processed {processed_files} file(s): {changed} changed, {} error(s)",
            errors.len()
        );
        if dry_run {
            summary.push_str(" (dry run)");
        }
        Self {
            success: errors.is_empty(),
            processed_files,
            errors,
            summary,
            files,
        }
    }

    pub fn changed_files(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.has_changes)
    }

    pub fn total_changes(&self) -> usize {
        self.files.iter().map(|f| f.changes.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|f| f.warnings.len()).sum()
    }
}

/// Main pipeline service.
pub struct PipelineService {
    filesystem: Box<dyn FileSystem>,
    phases: Vec<PhasePlan>,
}

impl PipelineService {
    /// Create a service over ordered phases. Phase configuration is
    /// validated here, before any file is read.
    pub fn new(filesystem: Box<dyn FileSystem>, phases: Vec<PhasePlan>) -> TokenmodResult<Self> {
        validator::validate_phases(&phases)?;
        Ok(Self { filesystem, phases })
    }

    pub fn phases(&self) -> &[PhasePlan] {
        &self.phases
    }

    /// Run every selected transform over the eligible files under `dir`.
    ///
    /// Returns `Err` only for configuration problems (bad filter, unknown
    /// phase, recorder misuse). I/O failures end up in [`PipelineRun::errors`].
    #[instrument(
        skip_all,
        fields(dir = %dir.as_ref().display(), dry_run = options.dry_run)
    )]
    pub fn run(
        &self,
        dir: impl AsRef<Path>,
        options: &PipelineOptions,
        recorder: Option<&SessionRecorder>,
    ) -> TokenmodResult<PipelineRun> {
        let dir = dir.as_ref();
        let filter = compile_filter(options.filter.as_deref())?;
        let transforms = self.select(options)?;

        info!(transforms = transforms.len(), "Starting pipeline run");

        // 1. List directory
        let entries = match self.filesystem.list_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Directory listing failed");
                return Ok(PipelineRun::finish(
                    0,
                    vec![FileError::new(dir, LIST_FAILED)],
                    Vec::new(),
                    options.dry_run,
                ));
            }
        };

        // 2. Eligible files
        let files: Vec<PathBuf> = entries
            .into_iter()
            .filter(|p| is_eligible(p, &options.extensions, filter.as_ref()))
            .collect();
        debug!(eligible = files.len(), "Files selected");

        let mut processed = 0;
        let mut errors = Vec::new();
        let mut outcomes = Vec::new();

        for file in files {
            // 3. Read
            let original = match self.filesystem.read_file(&file) {
                Ok(content) => content,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Read failed");
                    errors.push(FileError::new(&file, READ_FAILED));
                    continue;
                }
            };
            processed += 1;

            // 4. Thread content
            let mut outcome = self.transform_file(&file, &original, &transforms, recorder)?;

            // 5. Write
            if outcome.has_changes && !options.dry_run {
                match self.filesystem.write_file(&file, &outcome.content) {
                    Ok(()) => outcome.written = true,
                    Err(e) => {
                        warn!(file = %file.display(), error = %e, "Write failed");
                        errors.push(FileError::new(&file, WRITE_FAILED));
                    }
                }
            }

            if options.verbose && outcome.has_changes {
                info!(
                    file = %file.display(),
                    changes = outcome.changes.len(),
                    "File transformed"
                );
            }
            outcomes.push(outcome.into_public());
        }

        let run = PipelineRun::finish(processed, errors, outcomes, options.dry_run);
        info!(summary = %run.summary, success = run.success, "Pipeline run finished");
        Ok(run)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Transforms of the selected phases, flattened in configured order.
    fn select(&self, options: &PipelineOptions) -> TokenmodResult<Vec<Arc<dyn Transform>>> {
        validator::validate_selection(&self.phases, &options.phases)?;

        Ok(self
            .phases
            .iter()
            .filter(|plan| plan.phase.is_selected(&options.phases, options.skip_optional))
            .flat_map(|plan| plan.transforms.iter().cloned())
            .collect())
    }

    fn transform_file(
        &self,
        file: &Path,
        original: &str,
        transforms: &[Arc<dyn Transform>],
        recorder: Option<&SessionRecorder>,
    ) -> TokenmodResult<WorkingOutcome> {
        let mut content = original.to_string();
        let mut outcome = WorkingOutcome::new(file);

        for transform in transforms {
            let meta = transform.meta();
            match transform.execute(&content) {
                Ok(result) => {
                    if let Some(recorder) = recorder {
                        recorder.log_file_transform(
                            file,
                            meta,
                            &content,
                            &result.content,
                            result.changes.clone(),
                        )?;
                    }
                    debug!(
                        file = %file.display(),
                        transform = %meta.name,
                        changed = result.has_changes,
                        "Transform applied"
                    );
                    outcome
                        .warnings
                        .extend(result.warnings.iter().map(|w| format!("{}: {w}", meta.name)));
                    if result.has_changes {
                        outcome.has_changes = true;
                        outcome.changes.extend(result.changes);
                        content = result.content;
                    }
                }
                Err(e) if e.is_benign() => {
                    debug!(file = %file.display(), transform = %meta.name, "{e}");
                }
                Err(e) => {
                    warn!(file = %file.display(), transform = %meta.name, error = %e, "Transform failed");
                    outcome.warnings.push(format!("{}: {e}", meta.name));
                }
            }
        }

        outcome.content = content;
        Ok(outcome)
    }
}

/// Per-file state while transforms run.
struct WorkingOutcome {
    file: PathBuf,
    content: String,
    changes: Vec<Change>,
    warnings: Vec<String>,
    has_changes: bool,
    written: bool,
}

impl WorkingOutcome {
    fn new(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            content: String::new(),
            changes: Vec::new(),
            warnings: Vec::new(),
            has_changes: false,
            written: false,
        }
    }

    fn into_public(self) -> FileOutcome {
        FileOutcome {
            file: self.file,
            has_changes: self.has_changes,
            changes: self.changes,
            warnings: self.warnings,
            written: self.written,
        }
    }
}

fn compile_filter(filter: Option<&str>) -> TokenmodResult<Option<Regex>> {
    filter
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| {
                TokenmodError::from(DomainError::InvalidFilter {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })
            })
        })
        .transpose()
}

/// Extension allow-list, not a test file, caller filter.
fn is_eligible(path: &Path, extensions: &[String], filter: Option<&Regex>) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    if !extensions.iter().any(|allowed| allowed.trim_start_matches('.') == ext) {
        return false;
    }
    if is_test_file(path) {
        return false;
    }
    filter.is_none_or(|re| re.is_match(&path.to_string_lossy()))
}

fn is_test_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name.contains(".test.")
        || name.contains(".spec.")
        || path.components().any(|c| c.as_os_str() == "__tests__")
}

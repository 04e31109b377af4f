//! `tokenmod run` - drive the pipeline over a directory.
//!
//! Dispatch sequence:
//! 1. Validate the directory and build the pipeline options
//! 2. Build the standard phases from the token tables
//! 3. Open a session (unless `--dry-run` or `--no-session`)
//! 4. Run, seal the session, render the report

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use tokenmod_adapters::{
    FileSessionStore, LocalFileSystem, TransformCatalog, catalog::TEMPLATE_FORMAT,
};
use tokenmod_core::{
    application::{PipelineRun, PipelineService, SessionRecorder},
    domain::PipelineOptions,
};

use crate::{
    cli::{GlobalArgs, RunArgs},
    commands::{load_tables, log_dir},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Extension the template formatter works on.
const TEMPLATE_EXTENSION: &str = "hbs";

const REVIEW_PREFIX: &str = "manual-review:";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport<'a> {
    session_id: Option<&'a str>,
    #[serde(flatten)]
    run: &'a PipelineRun,
}

#[instrument(skip_all, fields(dir = %args.dir.display()))]
pub fn execute(
    args: RunArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    // 1. Inputs
    if !args.dir.is_dir() {
        return Err(CliError::InvalidInput {
            message: format!("'{}' is not a directory", args.dir.display()),
            source: None,
        });
    }
    // Ledger paths must survive a change of working directory.
    let dir = args.dir.canonicalize().map_err(|e| CliError::IoError {
        message: format!("cannot resolve '{}'", args.dir.display()),
        source: e,
    })?;
    let options = build_options(&args, global, config);
    debug!(?options, "Pipeline options resolved");

    // 2. Phases
    let tables = load_tables(args.tokens.as_deref(), config)?;
    let phases = TransformCatalog::new(tables).standard_phases()?;
    let service = PipelineService::new(Box::new(LocalFileSystem::new()), phases)?;

    // 3. Session
    let recorder = if args.no_session || options.dry_run {
        None
    } else {
        let store = FileSessionStore::new(log_dir(args.log_dir.clone(), config));
        Some(SessionRecorder::new(Arc::new(store)))
    };
    if let Some(recorder) = &recorder {
        recorder.start_session(&options)?;
    }

    // 4. Run
    let run = service.run(&dir, &options, recorder.as_ref())?;
    let session = recorder.as_ref().map(SessionRecorder::end_session).transpose()?;
    let session_id = session.as_ref().map(|s| s.session_id.as_str());
    info!(success = run.success, session = ?session_id, "Run complete");

    if output.is_json() {
        output.json(&RunReport {
            session_id,
            run: &run,
        })?;
    } else {
        render(&run, session_id, global, output)?;
    }

    if run.success {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            operation: "run",
            count: run.errors.len(),
        })
    }
}

fn build_options(args: &RunArgs, global: &GlobalArgs, config: &AppConfig) -> PipelineOptions {
    let mut extensions = if args.extensions.is_empty() {
        config.pipeline.extensions.clone()
    } else {
        args.extensions.clone()
    };
    if args.phases.iter().any(|p| p == TEMPLATE_FORMAT)
        && !extensions.iter().any(|e| e == TEMPLATE_EXTENSION)
    {
        extensions.push(TEMPLATE_EXTENSION.into());
    }

    PipelineOptions {
        verbose: global.verbose > 0,
        dry_run: args.dry_run,
        filter: args.filter.clone(),
        extensions,
        skip_optional: args.skip_optional || config.pipeline.skip_optional,
        phases: args.phases.clone(),
    }
}

fn render(
    run: &PipelineRun,
    session_id: Option<&str>,
    global: &GlobalArgs,
    output: &OutputManager,
) -> CliResult<()> {
    for file in run.changed_files() {
        let verb = if file.written { "updated" } else { "would change" };
        output.print(&format!(
            "  {} {verb} ({} change(s))",
            file.file.display(),
            file.changes.len()
        ))?;
        if global.verbose > 0 {
            for change in &file.changes {
                let at = match (change.line, change.column) {
                    (Some(line), Some(col)) => format!("{line}:{col} "),
                    _ => String::new(),
                };
                output.print(&format!("      {at}{} -> {}", change.from, change.to))?;
            }
        }
    }

    // Review findings are always shown; no-op notices only with -v.
    let mut hidden = 0;
    for file in &run.files {
        for warning in &file.warnings {
            if global.verbose > 0 || warning.starts_with(REVIEW_PREFIX) {
                output.warning(&format!("{}: {warning}", file.file.display()))?;
            } else {
                hidden += 1;
            }
        }
    }
    if hidden > 0 {
        output.info(&format!("{hidden} notice(s) hidden, use -v to show them"))?;
    }

    for error in &run.errors {
        output.error(&format!("{}: {}", error.file.display(), error.error))?;
    }

    if run.success {
        output.success(&run.summary)?;
    } else {
        output.warning(&run.summary)?;
    }

    if let Some(id) = session_id {
        output.info(&format!("Session {id} recorded"))?;
        output.info(&format!("Undo with: tokenmod revert {id} --apply"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cli::OutputFormat;

    fn args() -> RunArgs {
        RunArgs {
            dir: PathBuf::from("src"),
            dry_run: false,
            filter: None,
            phases: Vec::new(),
            extensions: Vec::new(),
            skip_optional: false,
            tokens: None,
            log_dir: None,
            no_session: false,
        }
    }

    fn global(verbose: u8) -> GlobalArgs {
        GlobalArgs {
            verbose,
            quiet: false,
            no_color: true,
            config: None,
            output_format: OutputFormat::Plain,
        }
    }

    #[test]
    fn options_default_to_configuration() {
        let options = build_options(&args(), &global(0), &AppConfig::default());
        assert_eq!(options.extensions, AppConfig::default().pipeline.extensions);
        assert!(!options.verbose);
        assert!(options.phases.is_empty());
    }

    #[test]
    fn template_phase_adds_its_extension_once() {
        let mut a = args();
        a.phases = vec![TEMPLATE_FORMAT.into()];
        let options = build_options(&a, &global(1), &AppConfig::default());
        assert_eq!(
            options.extensions.iter().filter(|e| *e == "hbs").count(),
            1
        );
        assert!(options.verbose);

        a.extensions = vec!["hbs".into()];
        let options = build_options(&a, &global(0), &AppConfig::default());
        assert_eq!(options.extensions, vec!["hbs".to_string()]);
    }

    #[test]
    fn skip_optional_comes_from_flag_or_config() {
        let mut config = AppConfig::default();
        config.pipeline.skip_optional = true;
        assert!(build_options(&args(), &global(0), &config).skip_optional);
    }
}

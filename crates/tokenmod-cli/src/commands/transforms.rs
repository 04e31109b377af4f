//! `tokenmod transforms` - show the standard catalog.

use tokenmod_adapters::TransformCatalog;

use crate::{
    cli::{ListFormat, TransformsArgs},
    commands::load_tables,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: TransformsArgs, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let tables = load_tables(args.tokens.as_deref(), config)?;
    let infos = TransformCatalog::new(tables).describe()?;

    if output.is_json() || args.format == ListFormat::Json {
        return output.json(&infos);
    }

    match args.format {
        ListFormat::List => {
            for info in &infos {
                output.print(&info.name)?;
            }
        }
        _ => {
            output.header("Pipeline phases (in order):")?;
            for info in &infos {
                let mut flags = Vec::new();
                if info.optional {
                    flags.push("optional");
                }
                if info.explicit {
                    flags.push("only when selected");
                }
                let flags = if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", "))
                };
                output.print(&format!(
                    "  {:<16} {:<16} {:<7} {}{flags}",
                    info.phase,
                    info.name,
                    info.kind.to_string(),
                    info.description
                ))?;
            }
        }
    }
    Ok(())
}

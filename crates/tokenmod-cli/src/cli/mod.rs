//! CLI argument definitions using the clap derive API.
//!
//! This module is the only place that knows about argument names, aliases,
//! help text and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name    = "tokenmod",
    bin_name = "tokenmod",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Design-token codemods for component libraries",
    long_about = "tokenmod rewrites raw color classes to semantic tokens, \
                  injects derived token entries into component color objects \
                  and records every edit so a run can be reverted.",
    after_help = "EXAMPLES:\n\
        \x20 tokenmod run src/components --dry-run\n\
        \x20 tokenmod run src --phase color-classes --filter Button\n\
        \x20 tokenmod revert latest --apply\n\
        \x20 tokenmod completions bash > /usr/share/bash-completion/completions/tokenmod",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the transform pipeline over a directory.
    #[command(
        about = "Run the transform pipeline",
        after_help = "EXAMPLES:\n\
            \x20 tokenmod run src/components\n\
            \x20 tokenmod run src --dry-run -v\n\
            \x20 tokenmod run templates --phase template-format"
    )]
    Run(RunArgs),

    /// Undo a recorded session.
    #[command(
        about = "Revert a recorded session",
        after_help = "EXAMPLES:\n\
            \x20 tokenmod revert latest              # write revert-<id>.sh\n\
            \x20 tokenmod revert latest --apply      # restore files now\n\
            \x20 tokenmod revert session-20250101-120000-ab12cd34 -o undo.sh"
    )]
    Revert(RevertArgs),

    /// List recorded sessions, newest first.
    #[command(visible_alias = "ls", about = "List recorded sessions")]
    Sessions(SessionsArgs),

    /// Show the standard transform catalog.
    #[command(about = "List available transforms")]
    Transforms(TransformsArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 tokenmod completions bash > ~/.local/share/bash-completion/completions/tokenmod\n\
            \x20 tokenmod completions zsh  > ~/.zfunc/_tokenmod\n\
            \x20 tokenmod completions fish > ~/.config/fish/completions/tokenmod.fish"
    )]
    Completions(CompletionsArgs),

    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 tokenmod config get pipeline.log_dir\n\
            \x20 tokenmod config list"
    )]
    Config(ConfigCommands),
}

// ── run ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(value_name = "DIR", help = "Directory to transform")]
    pub dir: PathBuf,

    #[arg(short = 'n', long = "dry-run", help = "Report changes without writing")]
    pub dry_run: bool,

    /// Only files whose path matches this regular expression are processed.
    #[arg(short = 'f', long = "filter", value_name = "REGEX")]
    pub filter: Option<String>,

    /// Restrict the run to these phases. Repeatable.
    #[arg(
        short = 'p',
        long = "phase",
        value_name = "ID",
        action = clap::ArgAction::Append
    )]
    pub phases: Vec<String>,

    /// Eligible file extensions. Repeatable; overrides the configuration.
    #[arg(short = 'e', long = "ext", value_name = "EXT", action = clap::ArgAction::Append)]
    pub extensions: Vec<String>,

    #[arg(long = "skip-optional", help = "Skip optional phases")]
    pub skip_optional: bool,

    #[arg(long = "tokens", value_name = "FILE", help = "TOML token table")]
    pub tokens: Option<PathBuf>,

    #[arg(long = "log-dir", value_name = "DIR", help = "Where session logs are written")]
    pub log_dir: Option<PathBuf>,

    #[arg(long = "no-session", help = "Do not record a session")]
    pub no_session: bool,
}

// ── revert ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RevertArgs {
    /// Session id, a path to its JSON log, or `latest`.
    #[arg(value_name = "SESSION")]
    pub session: String,

    /// Restore the files now instead of writing a script.
    #[arg(short = 'a', long = "apply", conflicts_with = "output")]
    pub apply: bool,

    /// Write the revert script here instead of the log directory.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(long = "log-dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

// ── sessions / transforms ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SessionsArgs {
    #[arg(long = "log-dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ListFormat,
}

#[derive(Debug, Args)]
pub struct TransformsArgs {
    #[arg(long = "tokens", value_name = "FILE", help = "TOML token table")]
    pub tokens: Option<PathBuf>,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ListFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `pipeline.log_dir`.
        key: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the path to the default configuration file.
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run_command() {
        let cli = Cli::parse_from([
            "tokenmod",
            "run",
            "src",
            "--dry-run",
            "--phase",
            "color-classes",
            "-p",
            "token-injection",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected Run command");
        };
        assert!(args.dry_run);
        assert_eq!(args.phases, vec!["color-classes", "token-injection"]);
        assert_eq!(args.dir, PathBuf::from("src"));
    }

    #[test]
    fn apply_conflicts_with_output() {
        let result =
            Cli::try_parse_from(["tokenmod", "revert", "latest", "--apply", "-o", "x.sh"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["tokenmod", "--quiet", "--verbose", "sessions"]);
        assert!(result.is_err());
    }

    #[test]
    fn sessions_alias() {
        let cli = Cli::parse_from(["tokenmod", "ls", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Commands::Sessions(SessionsArgs {
                format: ListFormat::Json,
                ..
            })
        ));
    }
}

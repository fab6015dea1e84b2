//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sysmod - Build and check systems-engineering models from plain sentences.
#[derive(Debug, Parser)]
#[command(name = "sysmod")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Model database (defaults to the configured store, then ~/.sysmod/model.db)
    #[arg(long, global = true, env = "SYSMOD_DB")]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SYSMOD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (names and update flags only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enter interactive REPL mode
    Repl,

    /// Run the commands in a file, one block per paragraph
    Run(RunArgs),

    /// List model objects
    List(ListArgs),

    /// Print the PlantUML diagram of an object
    Show(ShowArgs),

    /// Merge objects from a CSV file
    Import(ImportArgs),

    /// Write every object to a CSV file
    Export(ExportArgs),

    /// Delete objects that no longer take part in any relation
    Delete(DeleteArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// File with one command per line; blank lines separate blocks
    pub file: PathBuf,

    /// Accept every confirmation question
    #[arg(short = 'y', long, conflicts_with = "no")]
    pub yes: bool,

    /// Decline every confirmation question
    #[arg(short = 'n', long)]
    pub no: bool,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Only objects of this kind (e.g. "function", "functional elements")
    pub kind: Option<String>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Object name or alias
    pub name: String,

    /// Write the diagram to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// CSV file with id, kind, name, alias, type, parent, description columns
    pub file: PathBuf,
}

/// Arguments for the export command.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// Destination CSV file (replaced)
    pub file: PathBuf,
}

/// Arguments for the delete command.
#[derive(Debug, Parser)]
pub struct DeleteArgs {
    /// Names of the objects to delete
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_repl() {
        let cli = Cli::parse_from(["sysmod"]);
        assert!(cli.command.is_none());
        assert!(!cli.no_color);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["sysmod", "list", "functions", "--db", "m.db", "-f", "json"]);
        assert_eq!(cli.db, Some(PathBuf::from("m.db")));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Some(Command::List(args)) => assert_eq!(args.kind.as_deref(), Some("functions")),
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_delete_requires_names() {
        assert!(Cli::try_parse_from(["sysmod", "delete"]).is_err());
        let cli = Cli::parse_from(["sysmod", "delete", "F1", "F2", "-y"]);
        match cli.command {
            Some(Command::Delete(args)) => {
                assert_eq!(args.names, vec!["F1", "F2"]);
                assert!(args.yes);
            }
            _ => panic!("Expected Delete command"),
        }
    }

    #[test]
    fn test_run_answers_conflict() {
        assert!(Cli::try_parse_from(["sysmod", "run", "model.txt", "--yes", "--no"]).is_err());
    }
}

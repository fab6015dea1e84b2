//! Sysmod CLI - build and check systems-engineering models from plain sentences.

use anyhow::Context;
use clap::Parser;
use sysmod_cli::commands;
use sysmod_cli::repl;
use sysmod_cli::{open_session, Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    let mut session =
        open_session(&config, cli.db.as_deref()).context("failed to open the model")?;

    match cli.command {
        None | Some(Command::Repl) => {
            repl::run_repl(&mut session, &config, &formatter)?;
        }
        Some(Command::Run(args)) => {
            commands::execute_run(args, &mut session, &formatter)?;
        }
        Some(Command::List(args)) => {
            commands::execute_list(args, &session, &formatter)?;
        }
        Some(Command::Show(args)) => {
            commands::execute_show(args, &session, &formatter)?;
        }
        Some(Command::Import(args)) => {
            commands::execute_import(args, &mut session, &formatter)?;
        }
        Some(Command::Export(args)) => {
            commands::execute_export(args, &session, &formatter)?;
        }
        Some(Command::Delete(args)) => {
            commands::execute_delete(args, &mut session, &formatter)?;
        }
    }

    Ok(())
}

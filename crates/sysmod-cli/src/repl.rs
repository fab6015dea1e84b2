//! Interactive REPL (Read-Eval-Print Loop) mode.

use crate::commands::{self, answer_questions};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::ModelSession;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Run the interactive REPL.
///
/// Every line that is not a REPL command goes to the session as its own
/// block; confirmation questions are asked inline.
pub fn run_repl(session: &mut ModelSession, config: &Config, formatter: &Formatter) -> Result<()> {
    println!(
        "{}",
        formatter.info("Sysmod REPL - Type 'help' for commands, 'exit' to quit")
    );
    println!(
        "{}",
        formatter.info(&format!("Model has {} object(s)", session.model().len()))
    );
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(config.settings.history_size)?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)?;

    // Load history
    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    loop {
        match editor.readline("sysmod> ") {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    ReplCommand::Exit => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    ReplCommand::Help => {
                        print_help(formatter);
                    }
                    ReplCommand::List(kind) => {
                        let listed = kind
                            .map(|k| commands::list::parse_kind(&k))
                            .transpose()
                            .and_then(|kind| formatter.format_objects(session.model(), kind));
                        match listed {
                            Ok(output) => println!("{}", output),
                            Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                        }
                    }
                    ReplCommand::Block(block) => {
                        if let Err(e) = execute_block(session, &mut editor, &block, formatter) {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    // Save history
    editor.save_history(&history_path).ok();

    Ok(())
}

/// REPL command type.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Exit,
    Help,
    List(Option<String>),
    Block(String),
}

/// Parse a REPL command line; anything unknown is model input.
fn parse_repl_command(line: &str) -> ReplCommand {
    let mut parts = line.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).filter(|r| !r.is_empty());

    match (head.to_lowercase().as_str(), rest) {
        ("exit" | "quit" | "q", None) => ReplCommand::Exit,
        ("help" | "?", None) => ReplCommand::Help,
        ("list" | "ls", rest) => ReplCommand::List(rest.map(str::to_string)),
        _ => ReplCommand::Block(line.to_string()),
    }
}

fn execute_block(
    session: &mut ModelSession,
    editor: &mut DefaultEditor,
    block: &str,
    formatter: &Formatter,
) -> Result<()> {
    let report = session.execute(block)?;
    answer_questions(session, report, formatter, |question| {
        let answer = editor.readline(&format!("{} ", formatter.question(question)))?;
        let answer = answer.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    })?;
    Ok(())
}

/// Get the history file path.
fn get_history_path() -> Result<PathBuf> {
    let dir = Config::dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history"))
}

/// Print help message.
fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  Declaring objects:");
    println!("    F1 is a function");
    println!("    F1, F2 and F3 are functions");
    println!("    Pump extends functional element");
    println!("    requirement: The pump shall deliver 5 l/s");
    println!("    R1 describes \"The valve shall close within 2 s\"");
    println!();
    println!("  Relations (negate to remove, e.g. 'F1 does not produce a'):");
    println!("    F1 is composed of F1a and F1b");
    println!("    F1 produces a / F2 consumes a");
    println!("    E1 allocates F1");
    println!("    E1 exposes I1");
    println!("    the valve satisfies R1");
    println!("    F2 is derived from F1");
    println!("    F1 precedes a");
    println!("    T1 goes from S1 to S2");
    println!("    condition for T1 is pressure above 3 bar");
    println!("    the mass of E1 is 12 kg");
    println!("    the alias of E1 is Pump");
    println!();
    println!("  Other:");
    println!("    consider V1           Make V1 the active view");
    println!("    show <name>           Print a PlantUML diagram");
    println!("    delete <names>        Delete objects with no relations left");
    println!("    list [kind]           List objects");
    println!("    help                  Show this help");
    println!("    exit                  Exit REPL");
    println!();
}

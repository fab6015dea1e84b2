//! Run command implementation.

use crate::cli::RunArgs;
use crate::commands::{answer_questions, confirm};
use crate::error::Result;
use crate::output::Formatter;
use crate::ModelSession;
use std::fs;

/// Execute the run command.
///
/// Each paragraph of the file is executed as one block, so a confirmation
/// question only holds back the lines of its own paragraph.
pub fn execute_run(args: RunArgs, session: &mut ModelSession, formatter: &Formatter) -> Result<()> {
    let contents = fs::read_to_string(&args.file)?;
    let blocks = split_blocks(&contents);
    tracing::info!("Running {} block(s) from {}", blocks.len(), args.file.display());

    let mut flag = 0;
    for block in blocks {
        let report = session.execute(&block)?;
        flag = flag.max(answer_questions(session, report, formatter, |question| {
            if args.yes || args.no {
                println!("{}", formatter.info(question));
                return Ok(args.yes);
            }
            confirm(&formatter.question(question))
        })?);
    }

    if flag == 0 {
        println!("{}", formatter.info("Model unchanged"));
    }
    Ok(())
}

/// Split `contents` into blocks separated by blank lines.
pub fn split_blocks(contents: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

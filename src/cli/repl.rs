// src/cli/repl.rs

use crate::{
    core::{messages::fill_positional, tree::CommandTree},
    models::NameFormat,
    system::sender::CommandSender,
};
use anyhow::{Context, Result};
use colored::*;
use std::io::{BufRead, Write};

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

/// Reads command lines from `input` until EOF or `exit`, dispatching each one.
///
/// Lines are split like a POSIX shell would. The first token picks the root by name or
/// alias; a `?` suffix on the line prints completions instead of dispatching.
/// Dispatch failures are printed and the loop goes on.
pub fn run<R: BufRead, W: Write>(
    tree: &CommandTree,
    sender: &dyn CommandSender,
    input: R,
    out: &mut W,
) -> Result<()> {
    let roots = tree
        .roots()
        .map(|id| tree.full_name(id, NameFormat::NoAlias))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "{}", fill_positional(t!("cli.repl.welcome"), &[roots.as_str()]))?;

    let mut lines = input.lines();
    loop {
        write!(out, "{}", t!("cli.repl.prompt").cyan().bold())?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line.context("Failed to read from standard input")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&trimmed) {
            break;
        }

        let (line, completing) = match trimmed.strip_suffix('?') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };
        let Some(mut tokens) = shlex::split(line) else {
            writeln!(out, "{}", t!("cli.repl.unbalanced_quotes").red())?;
            continue;
        };
        if completing && line.ends_with(char::is_whitespace) {
            tokens.push(String::new());
        }

        let Some((label, rest)) = tokens.split_first() else {
            continue;
        };
        let Some(root) = tree.root(label) else {
            let message = fill_positional(t!("cli.repl.unknown_root"), &[label.as_str()]);
            writeln!(out, "{}", message.as_str().red())?;
            continue;
        };

        if completing {
            match tree.tab_complete(root, sender, label, rest) {
                Ok(Some(suggestions)) if !suggestions.is_empty() => {
                    writeln!(out, "{}", suggestions.join("  "))?;
                }
                Ok(_) => writeln!(out, "{}", t!("cli.completion.none").dimmed())?,
                Err(e) => writeln!(out, "{}: {}", "Error".red().bold(), e)?,
            }
        } else if let Err(e) = tree.dispatch(root, sender, label, rest) {
            writeln!(out, "{}: {}", "Error".red().bold(), e)?;
        }
    }
    Ok(())
}

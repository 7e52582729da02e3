// src/bin/cmdtree.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use cmdtree::{
    cli::{Cli, demo, repl},
    core::{config_loader::EngineConfig, messages::fill_positional},
    system::console::ConsoleSender,
    t,
};
use colored::*;
use std::io;

/// The main entry point of the `cmdtree` binary.
/// It sets up logging, parses arguments and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Builds the sample tree, applies the configuration and then dispatches the given
/// tokens, prints their completions, or starts the interactive prompt.
fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let config = EngineConfig::load(cli.config.as_deref())?;
    let (mut tree, _) = demo::build()?;
    config.apply(&mut tree);
    tree.validate()?;

    let mut sender = ConsoleSender::new(cli.player);
    for permission in cli.grants {
        sender.grant(permission);
    }

    let Some((label, rest)) = cli.tokens.split_first() else {
        let stdin = io::stdin();
        return repl::run(&tree, &sender, stdin.lock(), &mut io::stdout());
    };

    let root = tree
        .root(label)
        .ok_or_else(|| anyhow!(fill_positional(t!("cli.repl.unknown_root"), &[label.as_str()])))?;

    if cli.complete {
        match tree.tab_complete(root, &sender, label, rest)? {
            Some(suggestions) if !suggestions.is_empty() => {
                for suggestion in suggestions {
                    println!("{}", suggestion);
                }
            }
            _ => println!("{}", t!("cli.completion.none").dimmed()),
        }
        return Ok(());
    }

    tree.dispatch(root, &sender, label, rest)?;
    Ok(())
}

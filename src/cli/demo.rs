// src/cli/demo.rs

//! The sample tree served by the `cmdtree` binary.
//!
//! ```text
//! demo
//! ├── hello [name]               greets, defaults to "world"
//! ├── echo (alias: say) ...      repeats its tokens, completes a few words
//! ├── whoami                     player only
//! ├── math <count> <ratio> <scale> <label>
//! ├── toggle <enabled>
//! ├── greet <target>             target must be an online principal
//! ├── secret                     hidden
//! └── admin                      demo.admin
//!     ├── status                 demo.admin (inherited)
//!     └── purge                  demo.admin.purge
//! ```

use crate::{
    core::{
        arguments::{ArgValue, Argument},
        prefab::{
            BooleanArgument, DoubleArgument, FloatArgument, IntegerArgument, PrincipalArgument,
            StringArgument,
        },
        tree::{CommandTree, ConfigError},
    },
    models::{CommandNode, NodeId},
    system::sender::PrincipalDirectory,
};
use anyhow::anyhow;
use std::sync::Arc;

/// Label of the sample root.
pub const DEMO_ROOT: &str = "demo";

/// Principals the sample tree treats as online.
pub const ONLINE_PRINCIPALS: [&str; 3] = ["Alice", "Bob", "Steve"];

const ECHO_WORDS: [&str; 4] = ["hello", "world", "help", "wonder"];

/// Assembles the sample tree and returns it with the id of its root.
pub fn build() -> Result<(CommandTree, NodeId), ConfigError> {
    let mut tree = CommandTree::new();
    let root = tree.insert(CommandNode::router(DEMO_ROOT).with_description("Sample commands"));

    tree.add_child(
        root,
        CommandNode::leaf("hello", |invocation| {
            let name = invocation.args().first().map_or("world", String::as_str);
            invocation.reply(&format!("Hello, {}!", name));
            Ok(true)
        })
        .with_description("Say hello"),
    )?;

    tree.add_child(
        root,
        CommandNode::leaf("echo", |invocation| {
            invocation.reply(&invocation.args().join(" "));
            Ok(true)
        })
        .with_alias("say")
        .with_description("Repeat the given words")
        .with_completer(|_, args| {
            let typed = args.last().map_or("", String::as_str);
            Some(
                ECHO_WORDS
                    .iter()
                    .filter(|word| word.starts_with(typed))
                    .map(|word| word.to_string())
                    .collect(),
            )
        }),
    )?;

    tree.add_child(
        root,
        CommandNode::leaf("whoami", |invocation| {
            invocation.reply("You are an interactive principal.");
            Ok(true)
        })
        .with_description("Only works for players")
        .player_only(),
    )?;

    tree.add_child(
        root,
        CommandNode::parsed(
            "math",
            vec![
                Argument::new("count", IntegerArgument),
                Argument::new("ratio", DoubleArgument),
                Argument::new("scale", FloatArgument),
                Argument::new("label", StringArgument),
            ],
            |invocation, parsed| {
                let count = parsed.get(0).and_then(ArgValue::as_integer);
                let ratio = parsed.get(1).and_then(ArgValue::as_double);
                let scale = parsed.get(2).and_then(ArgValue::as_float);
                let label = parsed.get(3).and_then(ArgValue::as_str);
                let (Some(count), Some(ratio), Some(scale), Some(label)) = (count, ratio, scale, label)
                else {
                    return Err(anyhow!("parsed arguments out of order"));
                };
                let total = f64::from(count) * ratio * f64::from(scale);
                invocation.reply(&format!("{}: {} x {} x {} = {}", label, count, ratio, scale, total));
                Ok(true)
            },
        )
        .with_description("Multiply an integer, a double and a float"),
    )?;

    tree.add_child(
        root,
        CommandNode::parsed(
            "toggle",
            vec![Argument::new("enabled", BooleanArgument).with_error("'%input%' is not true or false.")],
            |invocation, parsed| {
                let enabled = parsed.by_name("enabled").and_then(ArgValue::as_bool);
                invocation.reply(if enabled == Some(true) { "Enabled." } else { "Disabled." });
                Ok(true)
            },
        )
        .with_description("Flip a switch"),
    )?;

    let online: Vec<String> = ONLINE_PRINCIPALS.iter().map(|name| name.to_string()).collect();
    let directory: Arc<dyn PrincipalDirectory> = Arc::new(online);
    tree.add_child(
        root,
        CommandNode::parsed(
            "greet",
            vec![Argument::new("target", PrincipalArgument::new(directory))],
            |invocation, parsed| {
                if let Some(target) = parsed.by_name("target") {
                    invocation.reply(&format!("You wave at {}.", target));
                }
                Ok(true)
            },
        )
        .with_description("Wave at an online principal"),
    )?;

    tree.add_child(
        root,
        CommandNode::leaf("secret", |invocation| {
            invocation.reply("You found the secret command.");
            Ok(true)
        })
        .hidden(),
    )?;

    let admin = tree.add_child(
        root,
        CommandNode::router("admin")
            .with_permission("demo.admin")
            .with_description("Administrative commands"),
    )?;
    tree.add_child(
        admin,
        CommandNode::leaf("status", |invocation| {
            invocation.reply("All systems nominal.");
            Ok(true)
        })
        .with_description("Show the status"),
    )?;
    tree.add_child(
        admin,
        CommandNode::leaf("purge", |invocation| {
            invocation.reply("Purged.");
            Ok(true)
        })
        .with_permission("+purge")
        .with_description("Purge everything"),
    )?;

    log::debug!("Built the sample tree with {} nodes", tree.len());
    Ok((tree, root))
}

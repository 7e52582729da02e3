// src/core/test_support.rs

use crate::{
    CommandNode, CommandTree, NodeId,
    core::{
        arguments::Argument,
        prefab::{DoubleArgument, FloatArgument, IntegerArgument, StringArgument},
    },
    system::sender::CommandSender,
};
use std::{collections::HashSet, sync::Mutex};

/// What test handlers send when they run.
pub(crate) const EXECUTED: &str = "DONE";

/// A sender that remembers every message and holds a mutable permission set.
#[derive(Debug, Default)]
pub(crate) struct RecordingSender {
    interactive: bool,
    permissions: Mutex<HashSet<String>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingSender {
    pub(crate) fn console() -> Self {
        Self::default()
    }

    pub(crate) fn player() -> Self {
        Self {
            interactive: true,
            ..Self::default()
        }
    }

    pub(crate) fn grant(&self, permission: &str) {
        self.permissions.lock().unwrap().insert(permission.to_string());
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub(crate) fn has_received(&self, message: &str) -> bool {
        self.messages.lock().unwrap().iter().any(|m| m == message)
    }

    /// True if a test handler ran for this sender.
    pub(crate) fn executed(&self) -> bool {
        self.has_received(EXECUTED)
    }

    /// Forgets every message and permission.
    pub(crate) fn reset(&self) {
        self.messages.lock().unwrap().clear();
        self.permissions.lock().unwrap().clear();
    }
}

impl CommandSender for RecordingSender {
    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.lock().unwrap().contains(permission)
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn send_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub(crate) fn tokens(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|token| token.to_string()).collect()
}

fn done(name: &str) -> CommandNode {
    CommandNode::leaf(name, |invocation| {
        invocation.reply(EXECUTED);
        Ok(true)
    })
}

fn nested(tree: &mut CommandTree, parent: NodeId, name: &str, leaf: CommandNode) -> NodeId {
    let outer = tree.add_child(parent, CommandNode::router(name)).unwrap();
    let inner = tree.add_child(outer, CommandNode::router("1")).unwrap();
    tree.add_child(inner, leaf).unwrap();
    outer
}

/// The `test` command used by the dispatch tests:
///
/// ```text
/// test
/// ├── playerOnly                    (player only)
/// ├── permission                    (needs "permission")
/// ├── always
/// ├── nestedAlways 1 always
/// ├── nestedPermission 1 permission
/// ├── nestedPlayerOnly 1 playerOnly
/// └── parsed <someInteger> <someDouble> <someFloat> <someString>
/// ```
pub(crate) fn fixture_tree() -> (CommandTree, NodeId) {
    let mut tree = CommandTree::new();
    let root = tree.insert(CommandNode::router("test").with_description("Test commands"));

    tree.add_child(root, done("playerOnly").player_only()).unwrap();
    tree.add_child(root, done("permission").with_permission("permission"))
        .unwrap();
    tree.add_child(root, done("always").with_description("Always runs"))
        .unwrap();

    nested(&mut tree, root, "nestedAlways", done("always"));
    nested(
        &mut tree,
        root,
        "nestedPermission",
        done("permission").with_permission("permission"),
    );
    nested(&mut tree, root, "nestedPlayerOnly", done("playerOnly").player_only());

    let arguments = vec![
        Argument::new("someInteger", IntegerArgument),
        Argument::new("someDouble", DoubleArgument),
        Argument::new("someFloat", FloatArgument),
        Argument::new("someString", StringArgument),
    ];
    tree.add_child(
        root,
        CommandNode::parsed("parsed", arguments, |invocation, parsed| {
            for (name, value) in parsed.iter() {
                invocation.reply(&format!("{}={}", name, value));
            }
            invocation.reply(EXECUTED);
            Ok(true)
        }),
    )
    .unwrap();

    (tree, root)
}

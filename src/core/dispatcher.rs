// src/core/dispatcher.rs

use crate::{
    core::{
        arguments::{complete_last, parse_all},
        help::HelpEntry,
        messages::MessageKind,
        tree::{CommandTree, ConfigError},
        visibility::Listing,
    },
    models::{Behavior, NameFormat, NodeId},
    system::sender::CommandSender,
};
use thiserror::Error;

/// Why a dispatch did not complete normally.
///
/// User mistakes are not errors: they are reported to the sender and the dispatch
/// returns `Ok(true)`.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The tree is wired wrong.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A handler returned an error.
    #[error("Command '{command}' failed: {source}")]
    Handler {
        /// Canonical full name of the failing command.
        command: String,
        /// What the handler returned.
        source: anyhow::Error,
    },
}

/// Everything a handler gets to see about the command line that reached it.
#[derive(Clone, Copy)]
pub struct Invocation<'a> {
    tree: &'a CommandTree,
    node: NodeId,
    sender: &'a dyn CommandSender,
    label: &'a str,
    args: &'a [String],
}

impl<'a> Invocation<'a> {
    /// The tree being dispatched against.
    pub fn tree(&self) -> &'a CommandTree {
        self.tree
    }

    /// The node being executed.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Whoever issued the command line.
    pub fn sender(&self) -> &'a dyn CommandSender {
        self.sender
    }

    /// The name or alias the host received the command line under.
    pub fn label(&self) -> &'a str {
        self.label
    }

    /// The tokens left after routing, trailing extras included.
    pub fn args(&self) -> &'a [String] {
        self.args
    }

    /// The canonical command line of the executing node, e.g. `"debug start"`.
    pub fn command_name(&self) -> String {
        self.tree.full_name(self.node, NameFormat::NoAlias)
    }

    /// Sends one line to the sender.
    pub fn reply(&self, message: &str) {
        self.sender.send_message(message);
    }
}

impl std::fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("node", &self.node)
            .field("label", &self.label)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl CommandTree {
    /// Routes `tokens` from `root` to a handler.
    ///
    /// # Logic:
    /// 1. The root itself must accept the sender (player-only, and its permission when
    ///    the root is a leaf).
    /// 2. Routers consume one token per level and report unknown tokens, player-only
    ///    violations and missing permissions to the sender.
    /// 3. A router reached with no tokens left shows its help page.
    /// 4. A leaf runs its handler; a parsed leaf parses its arguments first.
    ///
    /// Returns the handler's result, or `Ok(true)` when a message was sent instead.
    ///
    /// # Errors
    /// Wiring mistakes found on the way ([`ConfigError`]) and failing handlers.
    pub fn dispatch(
        &self,
        root: NodeId,
        sender: &dyn CommandSender,
        label: &str,
        tokens: &[String],
    ) -> Result<bool, DispatchError> {
        log::debug!("Dispatching '{}' with {:?}", label, tokens);
        let result = self.dispatch_root(root, sender, label, tokens);
        if let Err(DispatchError::Config(e)) = &result {
            log::error!("Command tree misconfigured while dispatching '{}': {}", label, e);
        }
        result
    }

    fn dispatch_root(
        &self,
        root: NodeId,
        sender: &dyn CommandSender,
        label: &str,
        tokens: &[String],
    ) -> Result<bool, DispatchError> {
        if !self.is_allowed_sender(root, sender)? {
            return Ok(self.report(sender, MessageKind::PlayerOnly, &[]));
        }
        let is_router = matches!(self.node(root)?.behavior, Behavior::Route);
        if !is_router && !self.check_permission(root, sender)? {
            return Ok(self.report(sender, MessageKind::NoPermission, &[]));
        }
        self.dispatch_node(root, sender, label, tokens)
    }

    fn dispatch_node(
        &self,
        id: NodeId,
        sender: &dyn CommandSender,
        label: &str,
        tokens: &[String],
    ) -> Result<bool, DispatchError> {
        let node = self.node(id)?;
        let invocation = Invocation {
            tree: self,
            node: id,
            sender,
            label,
            args: tokens,
        };

        match &node.behavior {
            Behavior::Execute { handler, .. } => {
                log::debug!("Executing '{}'", invocation.command_name());
                handler(&invocation).map_err(|source| DispatchError::Handler {
                    command: invocation.command_name(),
                    source,
                })
            }
            Behavior::Parsed { arguments, handler } => {
                let command = invocation.command_name();
                match parse_all(&command, arguments, tokens, self.catalog(), sender)? {
                    Some(parsed) => {
                        log::debug!("Executing '{}' with {} parsed arguments", command, parsed.len());
                        handler(&invocation, &parsed)
                            .map_err(|source| DispatchError::Handler { command, source })
                    }
                    None => Ok(true),
                }
            }
            Behavior::Route => self.route(id, sender, label, tokens),
        }
    }

    fn route(
        &self,
        id: NodeId,
        sender: &dyn CommandSender,
        label: &str,
        tokens: &[String],
    ) -> Result<bool, DispatchError> {
        if self.node(id)?.children.is_empty() {
            return Err(ConfigError::EmptyRouter(self.full_name(id, NameFormat::NoAlias)).into());
        }
        if !self.is_allowed_sender(id, sender)? {
            return Ok(self.report(sender, MessageKind::PlayerOnly, &[]));
        }

        let Some((head, tail)) = tokens.split_first() else {
            self.send_help(id, sender)?;
            return Ok(true);
        };

        let Some(child) = self.child(id, head)? else {
            log::debug!(
                "No sub-command '{}' under '{}'",
                head,
                self.full_name(id, NameFormat::NoAlias)
            );
            return Ok(self.report(sender, MessageKind::UnknownArgument, &[head.as_str()]));
        };

        if !self.is_allowed_sender(child, sender)? {
            return Ok(self.report(sender, MessageKind::PlayerOnly, &[]));
        }
        let child_is_router = matches!(self.node(child)?.behavior, Behavior::Route);
        if !child_is_router && !self.check_permission(child, sender)? {
            return Ok(self.report(sender, MessageKind::NoPermission, &[]));
        }

        self.dispatch_node(child, sender, label, tail)
    }

    /// Shows the help page of a router, or `NO_PERMISSION` when nothing below it is
    /// reachable at all.
    fn send_help(&self, id: NodeId, sender: &dyn CommandSender) -> Result<(), ConfigError> {
        let reachable = self.reachable_children(id, sender, "", Listing::All)?;
        if reachable.is_empty() {
            self.report(sender, MessageKind::NoPermission, &[]);
            return Ok(());
        }

        let formatter = self.help_formatter_for(id);
        let name_format = formatter.name_format();
        let mut entries = Vec::with_capacity(reachable.len());
        for child_id in reachable {
            let child = self.node(child_id)?;
            if child.is_hidden() {
                continue;
            }
            entries.push(HelpEntry {
                node: child_id,
                name: self.full_name(child_id, name_format),
                description: child.description().map(str::to_owned),
            });
        }

        log::debug!(
            "Sending help for '{}' with {} entries",
            self.full_name(id, NameFormat::NoAlias),
            entries.len()
        );
        formatter.send_help(sender, self.catalog(), &entries);
        Ok(())
    }

    fn report(&self, sender: &dyn CommandSender, kind: MessageKind, values: &[&str]) -> bool {
        log::debug!("Reporting {} to the sender", kind);
        sender.send_message(&self.catalog().render(kind, values));
        true
    }

    // --- Tab completion ---

    /// Suggestions for the last token of `tokens`. `None` means no opinion.
    ///
    /// # Errors
    /// Wiring mistakes found while walking the tree.
    pub fn tab_complete(
        &self,
        root: NodeId,
        sender: &dyn CommandSender,
        label: &str,
        tokens: &[String],
    ) -> Result<Option<Vec<String>>, ConfigError> {
        log::trace!("Completing '{}' with {:?}", label, tokens);
        if !self.is_allowed_sender(root, sender)? {
            return Ok(None);
        }
        let is_router = matches!(self.node(root)?.behavior, Behavior::Route);
        if !is_router && !self.check_permission(root, sender)? {
            return Ok(None);
        }
        self.complete_node(root, sender, tokens)
            .inspect_err(|e| log::error!("Command tree misconfigured while completing '{}': {}", label, e))
    }

    fn complete_node(
        &self,
        id: NodeId,
        sender: &dyn CommandSender,
        tokens: &[String],
    ) -> Result<Option<Vec<String>>, ConfigError> {
        let node = self.node(id)?;
        match &node.behavior {
            Behavior::Execute { completer, .. } => Ok(match completer {
                Some(completer) => completer(sender, tokens),
                None => Some(Vec::new()),
            }),
            Behavior::Parsed { arguments, .. } => Ok(complete_last(arguments, tokens)),
            Behavior::Route => {
                if node.children.is_empty() {
                    return Err(ConfigError::EmptyRouter(self.full_name(id, NameFormat::NoAlias)));
                }
                match tokens {
                    [] => Ok(None),
                    [prefix] => {
                        let mut names = Vec::new();
                        for child in self.reachable_children(id, sender, prefix, Listing::Completion)? {
                            names.push(self.node(child)?.name().to_owned());
                        }
                        Ok(Some(names))
                    }
                    [head, tail @ ..] => {
                        let Some(child) = self.child(id, head)? else {
                            return Ok(None);
                        };
                        if !self.is_reachable(child, sender)? {
                            return Ok(None);
                        }
                        self.complete_node(child, sender, tail)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CommandNode,
        core::{
            help::{HelpFormatter, SimpleHelpFormatter},
            messages::{MessageCatalog, MessageKind, fill_named},
            test_support::{RecordingSender, fixture_tree, tokens},
        },
    };
    use std::sync::Arc;

    fn message(tree: &CommandTree, kind: MessageKind, values: &[&str]) -> String {
        tree.catalog().render(kind, values)
    }

    #[test]
    fn test_unknown_argument() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();

        assert!(tree.dispatch(root, &console, "test", &tokens(&["AAABBCC"])).unwrap());
        assert!(console.has_received(&message(&tree, MessageKind::UnknownArgument, &["AAABBCC"])));
        assert!(!console.executed());
    }

    #[test]
    fn test_always_runs() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();
        tree.dispatch(root, &console, "test", &tokens(&["always"])).unwrap();
        assert!(console.executed());
    }

    #[test]
    fn test_help_depends_on_sender() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();
        let player = RecordingSender::player();
        console.grant("permission");

        tree.dispatch(root, &console, "test", &[]).unwrap();
        tree.dispatch(root, &player, "test", &[]).unwrap();

        assert!(console.messages().len() >= 5);
        assert!(!console.executed());
        assert!(console.has_received("/test always - Always runs"));
        // The player has no "permission"; the console cannot run player-only commands.
        assert!(player.has_received("/test playerOnly"));
        assert!(!player.has_received("/test permission"));
        assert!(!console.has_received("/test playerOnly"));
    }

    #[test]
    fn test_nested_help() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();
        tree.dispatch(root, &console, "test", &tokens(&["nestedAlways"])).unwrap();
        assert!(console.messages().len() >= 3);
        assert!(console.has_received("/test nestedAlways 1"));
    }

    #[test]
    fn test_attached_permission_denied() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("permission").with_permission("permission"));
        tree.add_child(
            root,
            CommandNode::leaf("attached", |invocation| {
                invocation.reply("DONE");
                Ok(true)
            })
            .with_permission("+attached"),
        )
        .unwrap();

        let player = RecordingSender::player();
        tree.dispatch(root, &player, "permission", &tokens(&["attached"])).unwrap();
        assert!(!player.executed());
        assert_eq!(player.messages(), [message(&tree, MessageKind::NoPermission, &[])]);

        player.reset();
        player.grant("permission.attached");
        tree.dispatch(root, &player, "permission", &tokens(&["attached"])).unwrap();
        assert!(player.executed());
    }

    #[test]
    fn test_player_only() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();
        let player = RecordingSender::player();

        tree.dispatch(root, &console, "test", &tokens(&["playerOnly"])).unwrap();
        assert!(!console.executed());
        assert_eq!(console.messages(), [message(&tree, MessageKind::PlayerOnly, &[])]);

        tree.dispatch(root, &player, "test", &tokens(&["playerOnly"])).unwrap();
        assert!(player.executed());
    }

    #[test]
    fn test_nested_player_only() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();
        let player = RecordingSender::player();
        let line = tokens(&["nestedPlayerOnly", "1", "playerOnly"]);

        tree.dispatch(root, &console, "test", &line).unwrap();
        assert!(!console.executed());
        assert!(console.has_received(&message(&tree, MessageKind::PlayerOnly, &[])));

        tree.dispatch(root, &player, "test", &line).unwrap();
        assert!(player.executed());
    }

    #[test]
    fn test_player_only_root_router() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("home").player_only());
        tree.add_child(
            root,
            CommandNode::leaf("a", |invocation| {
                invocation.reply("DONE");
                Ok(true)
            }),
        )
        .unwrap();
        let player_only = message(&tree, MessageKind::PlayerOnly, &[]);

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "home", &[]).unwrap();
        assert_eq!(console.messages(), [player_only.clone()]);

        console.reset();
        tree.dispatch(root, &console, "home", &tokens(&["a"])).unwrap();
        assert_eq!(console.messages(), [player_only]);

        let player = RecordingSender::player();
        tree.dispatch(root, &player, "home", &tokens(&["a"])).unwrap();
        assert!(player.executed());
    }

    #[test]
    fn test_player_only_nested_router() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("root"));
        let inner = tree.add_child(root, CommandNode::router("x").player_only()).unwrap();
        tree.add_child(inner, CommandNode::leaf("go", |_| Ok(true))).unwrap();
        tree.add_child(root, CommandNode::leaf("y", |_| Ok(true))).unwrap();

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "root", &tokens(&["x"])).unwrap();
        assert_eq!(console.messages(), [message(&tree, MessageKind::PlayerOnly, &[])]);

        assert_eq!(
            tree.tab_complete(root, &console, "root", &tokens(&[""])).unwrap(),
            Some(vec!["y".to_string()])
        );
        assert_eq!(
            tree.tab_complete(root, &console, "root", &tokens(&["x", ""])).unwrap(),
            None
        );
    }

    #[test]
    fn test_permission() {
        let (tree, root) = fixture_tree();
        let player = RecordingSender::player();
        let line = tokens(&["permission"]);

        tree.dispatch(root, &player, "test", &line).unwrap();
        assert!(!player.executed());
        assert!(player.has_received(&message(&tree, MessageKind::NoPermission, &[])));

        player.reset();
        player.grant("permission");
        tree.dispatch(root, &player, "test", &line).unwrap();
        assert!(player.executed());
    }

    #[test]
    fn test_nested_permission() {
        let (tree, root) = fixture_tree();
        let player = RecordingSender::player();
        let line = tokens(&["nestedPermission", "1", "permission"]);

        tree.dispatch(root, &player, "test", &line).unwrap();
        assert!(!player.executed());
        assert!(player.has_received(&message(&tree, MessageKind::NoPermission, &[])));

        player.reset();
        player.grant("permission");
        tree.dispatch(root, &player, "test", &line).unwrap();
        assert!(player.executed());
    }

    #[test]
    fn test_parsed_arguments_reach_the_handler() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();
        tree.dispatch(root, &console, "test", &tokens(&["parsed", "1", "1.00", "2.00", "hello"]))
            .unwrap();

        assert_eq!(
            console.messages(),
            ["someInteger=1", "someDouble=1", "someFloat=2", "someString=hello", "DONE"]
        );
    }

    #[test]
    fn test_parsed_missing_arguments() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();
        tree.dispatch(root, &console, "test", &tokens(&["parsed", "1", "1.00"])).unwrap();

        assert_eq!(
            console.messages(),
            [message(&tree, MessageKind::MissingArguments, &["someFloat, someString"])]
        );
    }

    #[test]
    fn test_parsed_stops_at_first_failure() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();
        tree.dispatch(root, &console, "test", &tokens(&["parsed", "1", "a", "2.00", "hello"]))
            .unwrap();

        let reason = "a".parse::<f64>().unwrap_err().to_string();
        let expected = fill_named(
            tree.catalog().template(MessageKind::ArgumentParseError),
            &[("name", "someDouble"), ("input", "a"), ("reason", reason.as_str())],
        );
        assert_eq!(console.messages(), [expected]);
        assert!(!console.executed());
    }

    #[test]
    fn test_parsed_completion() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();

        assert_eq!(
            tree.tab_complete(root, &console, "test", &tokens(&["parsed", "1", ""])).unwrap(),
            Some(vec!["someDouble".to_string()])
        );
        assert_eq!(
            tree.tab_complete(root, &console, "test", &tokens(&["parsed", "1", "2", "3", "4", "5"]))
                .unwrap(),
            None
        );
        assert_eq!(
            tree.tab_complete(root, &console, "test", &tokens(&["parsed"])).unwrap(),
            Some(vec!["parsed".to_string()])
        );
    }

    #[test]
    fn test_router_completion() {
        let (tree, root) = fixture_tree();
        let console = RecordingSender::console();

        assert_eq!(tree.tab_complete(root, &console, "test", &[]).unwrap(), None);
        assert_eq!(
            tree.tab_complete(root, &console, "test", &tokens(&["nested"])).unwrap(),
            Some(vec!["nestedAlways".to_string()])
        );
        assert_eq!(
            tree.tab_complete(root, &console, "test", &tokens(&["nestedAlways", ""])).unwrap(),
            Some(vec!["1".to_string()])
        );
        assert_eq!(
            tree.tab_complete(root, &console, "test", &tokens(&["permission", ""])).unwrap(),
            None
        );
        assert_eq!(
            tree.tab_complete(root, &console, "test", &tokens(&["nope", ""])).unwrap(),
            None
        );
        assert_eq!(
            tree.tab_complete(root, &console, "test", &tokens(&["always", "x"])).unwrap(),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_leaf_completer_is_consulted() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("warp"));
        tree.add_child(
            root,
            CommandNode::leaf("go", |_| Ok(true)).with_completer(|_, args| {
                let typed = args.last().map_or("", String::as_str);
                Some(
                    ["spawn", "shop", "arena"]
                        .iter()
                        .filter(|name| name.starts_with(typed))
                        .map(|name| name.to_string())
                        .collect(),
                )
            }),
        )
        .unwrap();

        let console = RecordingSender::console();
        assert_eq!(
            tree.tab_complete(root, &console, "warp", &tokens(&["go", "s"])).unwrap(),
            Some(vec!["spawn".to_string(), "shop".to_string()])
        );
    }

    #[test]
    fn test_hidden_is_executable_but_not_listed() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("root"));
        tree.add_child(root, CommandNode::leaf("shown", |_| Ok(true))).unwrap();
        tree.add_child(
            root,
            CommandNode::leaf("secret", |invocation| {
                invocation.reply("DONE");
                Ok(true)
            })
            .hidden(),
        )
        .unwrap();

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "root", &[]).unwrap();
        assert!(console.has_received("/root shown"));
        assert!(!console.messages().iter().any(|m| m.contains("secret")));

        tree.dispatch(root, &console, "root", &tokens(&["secret"])).unwrap();
        assert!(console.executed());

        assert_eq!(
            tree.tab_complete(root, &console, "root", &tokens(&["s"])).unwrap(),
            Some(vec!["shown".to_string(), "secret".to_string()])
        );
    }

    #[test]
    fn test_only_hidden_children_report_no_visible_commands() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("root"));
        tree.add_child(root, CommandNode::leaf("secret", |_| Ok(true)).hidden())
            .unwrap();

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "root", &[]).unwrap();
        assert!(console.has_received(&message(&tree, MessageKind::NoVisibleCommands, &[])));
    }

    #[test]
    fn test_aliases_dispatch_and_list_once() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("root").with_alias("r"));
        tree.add_child(
            root,
            CommandNode::leaf("aliases", |invocation| {
                invocation.reply("DONE");
                Ok(true)
            })
            .with_alias("aa")
            .with_alias("ab"),
        )
        .unwrap();

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "r", &tokens(&["ab"])).unwrap();
        assert!(console.executed());

        console.reset();
        tree.dispatch(root, &console, "r", &[]).unwrap();
        let listed: Vec<_> = console
            .messages()
            .into_iter()
            .filter(|m| m.starts_with('/'))
            .collect();
        assert_eq!(listed, ["/r aliases"]);

        assert_eq!(
            tree.tab_complete(root, &console, "r", &tokens(&["a"])).unwrap(),
            Some(vec!["aliases".to_string()])
        );
    }

    #[test]
    fn test_fully_denied_router_reports_no_permission() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("root"));
        tree.add_child(root, CommandNode::leaf("a", |_| Ok(true)).with_permission("a"))
            .unwrap();
        tree.add_child(root, CommandNode::leaf("b", |_| Ok(true)).with_permission("b"))
            .unwrap();

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "root", &[]).unwrap();
        assert_eq!(console.messages(), [message(&tree, MessageKind::NoPermission, &[])]);
    }

    #[test]
    fn test_leaf_root_checks_its_own_permission() {
        let mut tree = CommandTree::new();
        let root = tree.insert(
            CommandNode::leaf("heal", |invocation| {
                invocation.reply("DONE");
                Ok(true)
            })
            .with_permission("heal"),
        );

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "heal", &[]).unwrap();
        assert!(!console.executed());
        assert!(console.has_received(&message(&tree, MessageKind::NoPermission, &[])));
    }

    #[test]
    fn test_router_without_children_is_a_config_error() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("empty"));
        let console = RecordingSender::console();

        let err = tree.dispatch(root, &console, "empty", &[]).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Config(ConfigError::EmptyRouter(name)) if name == "empty"
        ));
        assert!(console.messages().is_empty());
    }

    #[test]
    fn test_handler_errors_carry_the_command_name() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("db"));
        tree.add_child(root, CommandNode::leaf("migrate", |_| anyhow::bail!("disk full")))
            .unwrap();

        let err = tree
            .dispatch(root, &RecordingSender::console(), "db", &tokens(&["migrate"]))
            .unwrap_err();
        match err {
            DispatchError::Handler { command, source } => {
                assert_eq!(command, "db migrate");
                assert_eq!(source.to_string(), "disk full");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extra_tokens_reach_the_handler() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("say"));
        tree.add_child(
            root,
            CommandNode::leaf("echo", |invocation| {
                invocation.reply(&invocation.args().join(" "));
                Ok(true)
            }),
        )
        .unwrap();

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "say", &tokens(&["echo", "hello", "world"])).unwrap();
        assert_eq!(console.messages(), ["hello world"]);
    }

    #[test]
    fn test_custom_catalog_and_formatter_are_used() {
        struct CountingFormatter;

        impl HelpFormatter for CountingFormatter {
            fn send_help(&self, sender: &dyn CommandSender, _: &MessageCatalog, entries: &[HelpEntry]) {
                sender.send_message(&format!("{} commands", entries.len()));
            }
        }

        let (mut tree, root) = fixture_tree();
        tree.set_catalog(MessageCatalog::default().with_template(MessageKind::UnknownArgument, "?? %s"));

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "test", &tokens(&["zzz"])).unwrap();
        assert_eq!(console.messages(), ["?? zzz"]);

        tree.set_help_formatter(Arc::new(CountingFormatter));
        console.reset();
        tree.dispatch(root, &console, "test", &tokens(&["nestedAlways"])).unwrap();
        assert_eq!(console.messages(), ["1 commands"]);

        tree.set_help_formatter(Arc::new(SimpleHelpFormatter::default().with_header("Custom")));
        console.reset();
        tree.dispatch(root, &console, "test", &[]).unwrap();
        assert!(console.messages()[0].contains("Custom"));
    }

    #[test]
    fn test_node_formatter_is_inherited_by_descendants() {
        struct CountingFormatter;

        impl HelpFormatter for CountingFormatter {
            fn send_help(&self, sender: &dyn CommandSender, _: &MessageCatalog, entries: &[HelpEntry]) {
                sender.send_message(&format!("{} commands", entries.len()));
            }
        }

        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("root"));
        let custom = tree
            .add_child(
                root,
                CommandNode::router("custom").with_help_formatter(Arc::new(CountingFormatter)),
            )
            .unwrap();
        let deeper = tree.add_child(custom, CommandNode::router("deeper")).unwrap();
        tree.add_child(deeper, CommandNode::leaf("a", |_| Ok(true))).unwrap();
        tree.add_child(deeper, CommandNode::leaf("b", |_| Ok(true))).unwrap();
        let plain = tree.add_child(root, CommandNode::router("plain")).unwrap();
        tree.add_child(plain, CommandNode::leaf("c", |_| Ok(true))).unwrap();

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "root", &tokens(&["custom", "deeper"])).unwrap();
        assert_eq!(console.messages(), ["2 commands"]);

        console.reset();
        tree.dispatch(root, &console, "root", &tokens(&["plain"])).unwrap();
        assert!(console.has_received("/root plain c"));
        assert!(!console.messages().iter().any(|m| m.ends_with("commands")));
    }

    #[test]
    fn test_invocation_exposes_tree_and_label() {
        let mut tree = CommandTree::new();
        let root = tree.insert(CommandNode::router("root").with_alias("r"));
        tree.add_child(
            root,
            CommandNode::leaf("where", |invocation| {
                let root_name = invocation
                    .tree()
                    .root(invocation.label())
                    .and_then(|id| invocation.tree().node(id).ok())
                    .map(|node| node.name().to_owned());
                invocation.reply(&format!(
                    "{} via {} as {:?}",
                    invocation.command_name(),
                    invocation.label(),
                    root_name
                ));
                Ok(true)
            }),
        )
        .unwrap();

        let console = RecordingSender::console();
        tree.dispatch(root, &console, "r", &tokens(&["where"])).unwrap();
        assert_eq!(console.messages(), ["root where via r as Some(\"root\")"]);
    }

    #[test]
    fn test_concurrent_dispatch() {
        let (tree, root) = fixture_tree();
        let tree = &tree;
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(move || {
                    let player = RecordingSender::player();
                    player.grant("permission");
                    tree.dispatch(root, &player, "test", &tokens(&["nestedPermission", "1", "permission"]))
                        .unwrap();
                    assert!(player.executed());
                });
            }
        });
    }
}

// src/models.rs

use crate::{
    core::{
        arguments::{Argument, ParsedArgs},
        dispatcher::Invocation,
        help::HelpFormatter,
    },
    system::sender::CommandSender,
};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock},
};

/// Behavior of a plain leaf. Returns whether the command was handled.
pub type LeafHandler = Box<dyn Fn(&Invocation<'_>) -> anyhow::Result<bool> + Send + Sync>;

/// Behavior of a parsed leaf, called only after every declared argument parsed.
pub type ParsedHandler =
    Box<dyn Fn(&Invocation<'_>, &ParsedArgs) -> anyhow::Result<bool> + Send + Sync>;

/// Tab completion hook of a plain leaf. `None` means "no opinion".
pub type Completer =
    Box<dyn Fn(&dyn CommandSender, &[String]) -> Option<Vec<String>> + Send + Sync>;

/// Stable index of a node inside its [`crate::core::tree::CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capability tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Only routes to children; never executes anything itself.
    Router,
    /// Executes its handler with whatever tokens remain.
    Leaf,
    /// Parses its declared arguments before executing its handler.
    ParsedLeaf,
}

/// How a node's full command line is spelled in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameFormat {
    /// Canonical names all the way down.
    NoAlias,
    /// The first alias of every node (or its name when it has none).
    AllAlias,
    /// The first alias of the root only, canonical names below it.
    #[default]
    RootAlias,
}

/// The single execution hook of a node, selected by its kind.
pub enum Behavior {
    /// Hands the next token to a child.
    Route,
    /// Runs a plain leaf.
    Execute {
        /// Called with the remaining tokens.
        handler: LeafHandler,
        /// Optional completion hook.
        completer: Option<Completer>,
    },
    /// Parses the remaining tokens, then runs the handler.
    Parsed {
        /// Declared positions, in order.
        arguments: Vec<Argument>,
        /// Called once every argument parsed.
        handler: ParsedHandler,
    },
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route => f.write_str("Route"),
            Self::Execute { completer, .. } => f
                .debug_struct("Execute")
                .field("has_completer", &completer.is_some())
                .finish(),
            Self::Parsed { arguments, .. } => f
                .debug_struct("Parsed")
                .field("arguments", arguments)
                .finish(),
        }
    }
}

/// A node of the command tree.
///
/// Nodes are built with [`CommandNode::router`], [`CommandNode::leaf`] or
/// [`CommandNode::parsed`] plus the builder setters, then handed to the tree, which
/// owns them and manages the parent/children links.
pub struct CommandNode {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    permission: Option<String>,
    player_only: bool,
    hidden: bool,
    pub(crate) behavior: Behavior,
    pub(crate) help_formatter: Option<Arc<dyn HelpFormatter>>,

    // --- Managed by the tree ---
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) child_keys: HashMap<String, NodeId>,
    pub(crate) resolved_permission: OnceLock<Option<String>>,
}

impl CommandNode {
    fn with_behavior(name: impl Into<String>, behavior: Behavior) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            permission: None,
            player_only: false,
            hidden: false,
            behavior,
            help_formatter: None,
            parent: None,
            children: Vec::new(),
            child_keys: HashMap::new(),
            resolved_permission: OnceLock::new(),
        }
    }

    /// A node that only routes to the children attached to it.
    pub fn router(name: impl Into<String>) -> Self {
        Self::with_behavior(name, Behavior::Route)
    }

    /// A leaf that receives the remaining tokens untouched.
    pub fn leaf<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self::with_behavior(
            name,
            Behavior::Execute {
                handler: Box::new(handler),
                completer: None,
            },
        )
    }

    /// A leaf whose tokens are parsed by `arguments`, in order, before `handler` runs.
    pub fn parsed<F>(name: impl Into<String>, arguments: Vec<Argument>, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>, &ParsedArgs) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self::with_behavior(
            name,
            Behavior::Parsed {
                arguments,
                handler: Box::new(handler),
            },
        )
    }

    /// One-line summary shown in help listings.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the raw permission string: absolute (`"a.b"`) or wildcard-relative (`"+b"`).
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Restricts the node to interactive principals.
    pub fn player_only(mut self) -> Self {
        self.player_only = true;
        self
    }

    /// Keeps the node out of help listings. It stays dispatchable by name.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Adds an alias before the node is attached. Repeated aliases are ignored.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.push_alias(alias.into());
        self
    }

    /// Registers a completion hook. Only plain leaves use one.
    pub fn with_completer<F>(mut self, completer: F) -> Self
    where
        F: Fn(&dyn CommandSender, &[String]) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        match &mut self.behavior {
            Behavior::Execute { completer: slot, .. } => *slot = Some(Box::new(completer)),
            _ => log::warn!(
                "Completer ignored on '{}': only plain leaves accept one.",
                self.name
            ),
        }
        self
    }

    /// Overrides the help formatter for this node and everything below it.
    pub fn with_help_formatter(mut self, formatter: Arc<dyn HelpFormatter>) -> Self {
        self.help_formatter = Some(formatter);
        self
    }

    pub(crate) fn push_alias(&mut self, alias: String) -> bool {
        if alias == self.name || self.aliases.contains(&alias) {
            return false;
        }
        self.aliases.push(alias);
        true
    }

    // --- Accessors ---

    /// The canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases in the order they were added.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The first alias, or the name when there is none.
    pub fn display_alias(&self) -> &str {
        self.aliases.first().map_or(self.name.as_str(), String::as_str)
    }

    /// The help summary, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The raw permission string as declared, wildcard marker included.
    pub fn raw_permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// True if only interactive principals may run or see this node.
    pub fn is_player_only(&self) -> bool {
        self.player_only
    }

    /// True if the node is left out of help listings.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Router, leaf or parsed leaf.
    pub fn kind(&self) -> NodeKind {
        match self.behavior {
            Behavior::Route => NodeKind::Router,
            Behavior::Execute { .. } => NodeKind::Leaf,
            Behavior::Parsed { .. } => NodeKind::ParsedLeaf,
        }
    }

    /// The router this node is attached to, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in declaration order, each exactly once.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The declared arguments of a parsed leaf; empty for every other kind.
    pub fn arguments(&self) -> &[Argument] {
        match &self.behavior {
            Behavior::Parsed { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Every key this node answers to: its name followed by its aliases.
    pub fn match_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// True if the name or any alias equals `input` exactly.
    pub fn matches(&self, input: &str) -> bool {
        self.match_keys().any(|key| key == input)
    }

    /// True if the name or any alias starts with `prefix`.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.match_keys().any(|key| key.starts_with(prefix))
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("permission", &self.permission)
            .field("player_only", &self.player_only)
            .field("hidden", &self.hidden)
            .field("behavior", &self.behavior)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

// src/core/tree.rs

use crate::{
    core::{
        help::{HelpFormatter, SimpleHelpFormatter},
        messages::MessageCatalog,
    },
    models::{Behavior, CommandNode, NameFormat, NodeId, NodeKind},
};
use std::{fmt, sync::Arc};
use thiserror::Error;

/// Wiring mistakes made by the host while building or using the tree.
///
/// These are never shown to a sender. They are returned the moment they are
/// detected: when attaching, when a permission is first resolved, or on dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A `+suffix` permission on a node with no parent.
    #[error("Cannot concatenate the permission '{permission}' of '{node}' because it has no parent.")]
    WildcardWithoutParent {
        /// Full name of the node.
        node: String,
        /// The declared permission string.
        permission: String,
    },
    /// A `+suffix` permission below a parent that resolves to no permission.
    #[error(
        "Cannot concatenate the permission '{permission}' of '{node}' because its parent '{parent}' has no permission."
    )]
    WildcardParentUnrestricted {
        /// Full name of the node.
        node: String,
        /// The declared permission string.
        permission: String,
        /// Full name of the unrestricted parent.
        parent: String,
    },
    /// A router reached with no children attached. Carries its full name.
    #[error("The router '{0}' has no sub-commands.")]
    EmptyRouter(String),
    /// Two children of one router answer to the same name or alias.
    #[error("'{parent}' already has a sub-command answering to '{key}'.")]
    DuplicateChild {
        /// Full name of the router.
        parent: String,
        /// The clashing name or alias.
        key: String,
    },
    /// The node already has a parent.
    #[error("'{child}' is already attached to '{parent}'.")]
    AlreadyAttached {
        /// Full name of the node being attached.
        child: String,
        /// Full name of its current parent.
        parent: String,
    },
    /// The parent is the node itself or one of its descendants.
    #[error("Attaching '{child}' to '{parent}' would create a cycle.")]
    Cycle {
        /// Full name of the node being attached.
        child: String,
        /// Full name of the requested parent.
        parent: String,
    },
    /// Children can only be attached to routers.
    #[error("'{0}' is not a router and cannot have sub-commands.")]
    NotARouter(String),
    /// The id belongs to no node of this tree.
    #[error("No node {0} exists in this tree.")]
    UnknownNode(NodeId),
    /// A parser returned `Ok(None)`.
    #[error("The parser of argument '{argument}' of '{node}' reported success without a value.")]
    EmptyParse {
        /// Full name of the parsed leaf.
        node: String,
        /// Name of the argument.
        argument: String,
    },
}

/// Owns every node of one or more command trees.
///
/// Ownership only flows parent → children through [`NodeId`] indices; a node's parent
/// link is an index too, never a second owner. The structure is built once (insert,
/// attach, alias) and is read-only afterwards, apart from the per-node permission memo.
pub struct CommandTree {
    nodes: Vec<CommandNode>,
    catalog: MessageCatalog,
    help_formatter: Arc<dyn HelpFormatter>,
    include_hidden_in_completion: bool,
}

impl Default for CommandTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTree")
            .field("nodes", &self.nodes)
            .field("catalog", &self.catalog)
            .field(
                "include_hidden_in_completion",
                &self.include_hidden_in_completion,
            )
            .finish_non_exhaustive()
    }
}

impl CommandTree {
    /// An empty tree with the compiled-in message templates and help formatter.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            catalog: MessageCatalog::default(),
            help_formatter: Arc::new(SimpleHelpFormatter::default()),
            include_hidden_in_completion: true,
        }
    }

    // --- Per-tree configuration ---

    /// The templates this tree renders its messages from.
    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// Replaces the message catalog.
    pub fn set_catalog(&mut self, catalog: MessageCatalog) {
        self.catalog = catalog;
    }

    /// The formatter used when no node on the path overrides it.
    pub fn set_help_formatter(&mut self, formatter: Arc<dyn HelpFormatter>) {
        self.help_formatter = formatter;
    }

    /// Whether hidden nodes are offered by tab completion. Defaults to `true`.
    pub fn set_include_hidden_in_completion(&mut self, include: bool) {
        self.include_hidden_in_completion = include;
    }

    /// See [`CommandTree::set_include_hidden_in_completion`].
    pub fn includes_hidden_in_completion(&self) -> bool {
        self.include_hidden_in_completion
    }

    // --- Assembly ---

    /// Moves a detached node into the tree.
    pub fn insert(&mut self, node: CommandNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        log::trace!("Inserted node '{}' as {}", node.name(), id);
        self.nodes.push(node);
        id
    }

    /// Inserts `node` and attaches it under `parent` in one step.
    pub fn add_child(&mut self, parent: NodeId, node: CommandNode) -> Result<NodeId, ConfigError> {
        // Check the parent first so a failed call leaves no stray node behind.
        self.ensure_router(parent)?;
        let child = self.insert(node);
        if let Err(e) = self.attach(parent, child) {
            self.nodes.pop();
            return Err(e);
        }
        Ok(child)
    }

    /// Attaches a detached node under a router.
    ///
    /// # Errors
    /// Fails if `parent` is not a router, `child` already has a parent, the link would
    /// form a cycle, or the child's name or one of its aliases is already taken among
    /// the parent's children.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), ConfigError> {
        self.ensure_router(parent)?;
        let child_node = self.node(child)?;

        if parent == child || self.ancestors(parent).any(|id| id == child) {
            return Err(ConfigError::Cycle {
                child: self.full_name(child, NameFormat::NoAlias),
                parent: self.full_name(parent, NameFormat::NoAlias),
            });
        }
        if let Some(existing) = child_node.parent {
            return Err(ConfigError::AlreadyAttached {
                child: self.full_name(child, NameFormat::NoAlias),
                parent: self.full_name(existing, NameFormat::NoAlias),
            });
        }

        let keys: Vec<String> = child_node.match_keys().map(str::to_owned).collect();
        let parent_node = self.node(parent)?;
        if let Some(taken) = keys.iter().find(|key| parent_node.child_keys.contains_key(*key)) {
            return Err(ConfigError::DuplicateChild {
                parent: self.full_name(parent, NameFormat::NoAlias),
                key: taken.clone(),
            });
        }

        // Anything memoized while the node was detached was computed without a parent.
        self.forget_resolved_permissions(child);

        let parent_node = self.node_mut(parent)?;
        parent_node.children.push(child);
        for key in keys {
            parent_node.child_keys.insert(key, child);
        }
        self.node_mut(child)?.parent = Some(parent);

        log::debug!(
            "Attached '{}' under '{}'",
            self.full_name(child, NameFormat::NoAlias),
            self.full_name(parent, NameFormat::NoAlias)
        );
        Ok(())
    }

    /// Adds an alias to a node, registering it with the parent when already attached.
    ///
    /// Adding an alias the node already has is a no-op.
    pub fn add_alias(&mut self, id: NodeId, alias: impl Into<String>) -> Result<(), ConfigError> {
        let alias = alias.into();
        let node = self.node(id)?;
        if node.matches(&alias) {
            return Ok(());
        }

        if let Some(parent) = node.parent {
            let parent_node = self.node(parent)?;
            if parent_node.child_keys.contains_key(&alias) {
                return Err(ConfigError::DuplicateChild {
                    parent: self.full_name(parent, NameFormat::NoAlias),
                    key: alias,
                });
            }
            self.node_mut(parent)?.child_keys.insert(alias.clone(), id);
        }

        self.node_mut(id)?.push_alias(alias);
        Ok(())
    }

    fn ensure_router(&self, id: NodeId) -> Result<(), ConfigError> {
        match self.node(id)?.kind() {
            NodeKind::Router => Ok(()),
            NodeKind::Leaf | NodeKind::ParsedLeaf => Err(ConfigError::NotARouter(
                self.full_name(id, NameFormat::NoAlias),
            )),
        }
    }

    fn forget_resolved_permissions(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0) {
                node.resolved_permission.take();
                stack.extend(node.children.iter().copied());
            }
        }
    }

    // --- Lookup ---

    /// The node behind `id`.
    pub fn node(&self, id: NodeId) -> Result<&CommandNode, ConfigError> {
        self.nodes.get(id.0).ok_or(ConfigError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut CommandNode, ConfigError> {
        self.nodes.get_mut(id.0).ok_or(ConfigError::UnknownNode(id))
    }

    /// Number of nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no node was inserted yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node without a parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(index, _)| NodeId(index))
    }

    /// Finds a top-level node answering to `label` by name or alias.
    pub fn root(&self, label: &str) -> Option<NodeId> {
        self.roots()
            .find(|id| self.nodes.get(id.0).is_some_and(|node| node.matches(label)))
    }

    /// The direct child of `parent` answering to `key` by name or alias.
    pub fn child(&self, parent: NodeId, key: &str) -> Result<Option<NodeId>, ConfigError> {
        Ok(self.node(parent)?.child_keys.get(key).copied())
    }

    /// Walks from the parent of `id` up to its root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.nodes.get(id.0).and_then(|node| node.parent);
        std::iter::successors(first, move |current| {
            self.nodes.get(current.0).and_then(|node| node.parent)
        })
    }

    /// The full command line leading to `id`, e.g. `"debug start"`.
    pub fn full_name(&self, id: NodeId, format: NameFormat) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut current = Some(id);
        while let Some(current_id) = current {
            let Some(node) = self.nodes.get(current_id.0) else {
                break;
            };
            let is_root = node.parent.is_none();
            let part = match format {
                NameFormat::NoAlias => node.name(),
                NameFormat::AllAlias => node.display_alias(),
                NameFormat::RootAlias if is_root => node.display_alias(),
                NameFormat::RootAlias => node.name(),
            };
            parts.push(part);
            current = node.parent;
        }
        parts.reverse();
        parts.join(" ")
    }

    /// The formatter of the nearest node on the path from `id` to its root that
    /// overrides it, or the tree default.
    pub fn help_formatter_for(&self, id: NodeId) -> Arc<dyn HelpFormatter> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|current| {
                self.nodes
                    .get(current.0)
                    .and_then(|node| node.help_formatter.clone())
            })
            .unwrap_or_else(|| Arc::clone(&self.help_formatter))
    }

    // --- Validation ---

    /// Checks the whole tree eagerly: every router has children and every declared
    /// permission resolves. Hosts call this once after the attach phase.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for index in 0..self.nodes.len() {
            let id = NodeId(index);
            let node = self.node(id)?;
            if matches!(node.behavior, Behavior::Route) && node.children.is_empty() {
                return Err(ConfigError::EmptyRouter(self.full_name(id, NameFormat::NoAlias)));
            }
            self.resolve_permission(id)?;
        }
        log::debug!("Validated {} command nodes", self.nodes.len());
        Ok(())
    }
}

// src/core/visibility.rs

use crate::{
    core::tree::{CommandTree, ConfigError},
    models::{Behavior, NameFormat, NodeId},
    system::sender::CommandSender,
};

/// Which consumer a list of children is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// Every reachable child, hidden ones included.
    All,
    /// Help pages never show hidden children.
    Help,
    /// Completion shows hidden children only when the tree allows it.
    Completion,
}

impl CommandTree {
    /// False if the node is player-only and the sender is not interactive.
    pub fn is_allowed_sender(&self, id: NodeId, sender: &dyn CommandSender) -> Result<bool, ConfigError> {
        let node = self.node(id)?;
        Ok(!node.is_player_only() || sender.is_interactive())
    }

    /// Whether the sender could run something at or below this node.
    ///
    /// A router is reachable when any of its children is; its own permission is not
    /// consulted. A leaf is reachable when its effective permission allows the sender.
    ///
    /// # Errors
    /// A router without children, or a permission that fails to resolve.
    pub fn is_reachable(&self, id: NodeId, sender: &dyn CommandSender) -> Result<bool, ConfigError> {
        if !self.is_allowed_sender(id, sender)? {
            return Ok(false);
        }

        let node = self.node(id)?;
        let reachable = match node.behavior {
            Behavior::Route => {
                if node.children.is_empty() {
                    return Err(ConfigError::EmptyRouter(self.full_name(id, NameFormat::NoAlias)));
                }
                let mut any = false;
                for &child in &node.children {
                    if self.is_reachable(child, sender)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            Behavior::Execute { .. } | Behavior::Parsed { .. } => self.check_permission(id, sender)?,
        };

        log::trace!(
            "'{}' reachable: {}",
            self.full_name(id, NameFormat::NoAlias),
            reachable
        );
        Ok(reachable)
    }

    /// The children of `id` the sender can reach whose name or an alias starts with
    /// `prefix`, in declaration order and each listed once. Empty for leaves.
    pub fn reachable_children(
        &self,
        id: NodeId,
        sender: &dyn CommandSender,
        prefix: &str,
        listing: Listing,
    ) -> Result<Vec<NodeId>, ConfigError> {
        let node = self.node(id)?;
        let keep_hidden = match listing {
            Listing::All => true,
            Listing::Help => false,
            Listing::Completion => self.includes_hidden_in_completion(),
        };

        let mut reachable = Vec::new();
        for &child_id in &node.children {
            let child = self.node(child_id)?;
            if !keep_hidden && child.is_hidden() {
                continue;
            }
            if !child.matches_prefix(prefix) {
                continue;
            }
            if self.is_reachable(child_id, sender)? {
                reachable.push(child_id);
            }
        }
        Ok(reachable)
    }
}

// src/core/permissions.rs

use crate::{
    constants::{PERMISSION_SEPARATOR, WILDCARD_PREFIX},
    core::tree::{CommandTree, ConfigError},
    models::{NameFormat, NodeId},
    system::sender::CommandSender,
};

impl CommandTree {
    /// The effective permission of a node, or `None` when it is unrestricted.
    ///
    /// # Logic:
    /// - No permission: inherit the parent's effective permission (`None` at a root).
    /// - A permission without the `+` marker is absolute and ignores the parent.
    /// - `"+suffix"` is appended to the parent's effective permission with a dot.
    ///
    /// The result is memoized per node. Two threads racing on the first call compute
    /// the same string; whichever stores it first wins.
    ///
    /// # Errors
    /// A wildcard permission on a node without a parent, or whose parent resolves to `None`.
    pub fn resolve_permission(&self, id: NodeId) -> Result<Option<&str>, ConfigError> {
        let node = self.node(id)?;
        if let Some(resolved) = node.resolved_permission.get() {
            return Ok(resolved.as_deref());
        }

        let computed = self.compute_permission(id)?;
        log::trace!(
            "Resolved permission of '{}': {:?}",
            self.full_name(id, NameFormat::NoAlias),
            computed
        );
        // Losing the race is fine: the stored value is identical.
        let _ = node.resolved_permission.set(computed);
        Ok(node.resolved_permission.get().and_then(Option::as_deref))
    }

    fn compute_permission(&self, id: NodeId) -> Result<Option<String>, ConfigError> {
        let node = self.node(id)?;

        let Some(raw) = node.raw_permission() else {
            return match node.parent() {
                Some(parent) => Ok(self.resolve_permission(parent)?.map(str::to_owned)),
                None => Ok(None),
            };
        };

        let Some(suffix) = raw.strip_prefix(WILDCARD_PREFIX) else {
            return Ok(Some(raw.to_owned()));
        };

        let parent = node
            .parent()
            .ok_or_else(|| ConfigError::WildcardWithoutParent {
                node: self.full_name(id, NameFormat::NoAlias),
                permission: raw.to_owned(),
            })?;

        let parent_permission =
            self.resolve_permission(parent)?
                .ok_or_else(|| ConfigError::WildcardParentUnrestricted {
                    node: self.full_name(id, NameFormat::NoAlias),
                    permission: raw.to_owned(),
                    parent: self.full_name(parent, NameFormat::NoAlias),
                })?;

        Ok(Some(format!(
            "{}{}{}",
            parent_permission, PERMISSION_SEPARATOR, suffix
        )))
    }

    /// True if the node is unrestricted or the sender holds its effective permission.
    pub fn check_permission(
        &self,
        id: NodeId,
        sender: &dyn CommandSender,
    ) -> Result<bool, ConfigError> {
        Ok(match self.resolve_permission(id)? {
            None => true,
            Some(permission) => sender.has_permission(permission),
        })
    }
}

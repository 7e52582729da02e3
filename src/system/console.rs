// src/system/console.rs

use crate::system::sender::CommandSender;
use std::collections::HashSet;

/// A sender backed by the process' standard output.
///
/// Whether it counts as an interactive principal is decided by whoever creates it; the
/// `cmdtree` binary flips it with `--player`.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSender {
    interactive: bool,
    permissions: HashSet<String>,
}

impl ConsoleSender {
    /// A sender with no permissions.
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            permissions: HashSet::new(),
        }
    }

    /// Grants `permission` to this sender.
    pub fn grant(&mut self, permission: impl Into<String>) {
        self.permissions.insert(permission.into());
    }

    /// Every granted permission, in no particular order.
    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }
}

impl CommandSender for ConsoleSender {
    fn has_permission(&self, permission: &str) -> bool {
        let granted = self.permissions.contains(permission);
        log::trace!("Permission check '{}': {}", permission, granted);
        granted
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn send_message(&self, message: &str) {
        println!("{}", message);
    }
}

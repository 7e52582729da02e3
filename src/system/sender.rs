// src/system/sender.rs

/// Whoever issued a command line.
///
/// Every call is a plain blocking call into the host. The engine imposes no timeout on
/// it, so a slow implementation blocks the dispatching thread for its duration.
pub trait CommandSender {
    /// True if the sender holds `permission`.
    fn has_permission(&self, permission: &str) -> bool;

    /// True for interactive principals (players); false for console-like senders.
    fn is_interactive(&self) -> bool;

    /// Delivers one rendered message line to the sender.
    fn send_message(&self, message: &str);
}

/// Lookup of the interactive principals currently known to the host.
pub trait PrincipalDirectory: Send + Sync {
    /// True if a principal with exactly this name is online.
    fn is_online(&self, name: &str) -> bool;

    /// Names of every online principal.
    fn online_names(&self) -> Vec<String>;
}

impl PrincipalDirectory for Vec<String> {
    fn is_online(&self, name: &str) -> bool {
        self.iter().any(|online| online == name)
    }

    fn online_names(&self) -> Vec<String> {
        self.clone()
    }
}

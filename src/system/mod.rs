//! # Host Interaction Layer
//!
//! The boundary between the command engine and the application hosting it. The engine
//! never talks to a terminal, a network or a player list directly: everything it needs
//! from the outside world goes through the traits defined here.
//!
//! ## Modules
//!
//! - **`sender`**: The `CommandSender` capability (permission check, interactive
//!   principal test, message sink) and the `PrincipalDirectory` used by the principal
//!   argument parser.
//! - **`console`**: A `CommandSender` that writes to standard output, used by the
//!   `cmdtree` binary.

/// Standard-output sender.
pub mod console;
/// Sender and principal lookup traits.
pub mod sender;

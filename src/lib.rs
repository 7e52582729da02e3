//! `cmdtree`: a tree of named commands with permission inheritance, reachability
//! filtering, typed argument parsing, help listings and tab completion.
//!
//! A host builds a [`CommandTree`], attaches routers and leaves to it, and hands every
//! already-split command line to [`CommandTree::dispatch`] or
//! [`CommandTree::tab_complete`].

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

/// Command-line front end of the `cmdtree` binary.
pub mod cli;
pub mod constants;
/// The engine: tree, permissions, arguments, dispatch and completion.
pub mod core;
/// Node definitions and the handler types they carry.
pub mod models;
pub mod system;

pub use crate::core::arguments::{ArgValue, Argument, ArgumentParser, ParseFailure, ParsedArgs};
pub use crate::core::dispatcher::{DispatchError, Invocation};
pub use crate::core::tree::{CommandTree, ConfigError};
pub use crate::models::{CommandNode, NameFormat, NodeId, NodeKind};
pub use crate::system::sender::CommandSender;

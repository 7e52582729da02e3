// src/core/mod.rs

/// Argument descriptors, parsed values and the parsing pipeline.
pub mod arguments;
pub mod config_loader;
/// Routing of command lines and tab completion.
pub mod dispatcher;
/// Help pages.
pub mod help;
/// Message templates and placeholder filling.
pub mod messages;
/// Effective permissions.
pub mod permissions;
pub mod prefab;
/// The node arena and its wiring rules.
pub mod tree;
/// Which nodes a sender may see and reach.
pub mod visibility;

#[cfg(test)]
pub(crate) mod test_support;

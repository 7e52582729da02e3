// src/constants.rs

//! Crate-wide constants.

/// Marks a permission string that is appended to the parent's resolved permission.
pub const WILDCARD_PREFIX: char = '+';

/// Joins a parent permission and a wildcard suffix.
pub const PERMISSION_SEPARATOR: &str = ".";

/// Joins the names of missing arguments in the `MISSING_ARGUMENTS` message.
pub const MISSING_ARGUMENTS_SEPARATOR: &str = ", ";

/// Positional placeholder used by single-value templates.
pub const POSITIONAL_PLACEHOLDER: &str = "%s";

/// Key of `%name%` in argument error templates: the argument's declared name.
pub const PLACEHOLDER_NAME: &str = "name";
/// Key of `%input%`: the token that failed to parse.
pub const PLACEHOLDER_INPUT: &str = "input";
/// Key of `%reason%`: why the parser rejected the token.
pub const PLACEHOLDER_REASON: &str = "reason";

/// Environment variable pointing at a configuration file.
pub const CONFIG_ENV_VAR: &str = "CMDTREE_CONFIG";

/// Directory (inside the system config dir) holding the default configuration.
pub const CONFIG_DIR_NAME: &str = "cmdtree";
/// File name of the default configuration.
pub const CONFIG_FILENAME: &str = "config.toml";

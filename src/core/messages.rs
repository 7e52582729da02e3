// src/core/messages.rs

use crate::constants::{
    PLACEHOLDER_INPUT, PLACEHOLDER_NAME, PLACEHOLDER_REASON, POSITIONAL_PLACEHOLDER,
};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::{collections::HashMap, fmt, str::FromStr};
use thiserror::Error;

lazy_static! {
    static ref NAMED_PLACEHOLDER_RE: Regex = Regex::new(r"%([a-z_]+)%").unwrap();
    // Only the argument keys, so a stray `%word%` cannot swallow the `%` of a real one.
    static ref ARGUMENT_PLACEHOLDER_RE: Regex = Regex::new(&format!(
        "%({}|{}|{})%",
        PLACEHOLDER_NAME, PLACEHOLDER_INPUT, PLACEHOLDER_REASON
    ))
    .unwrap();
}

/// Every message the engine can send on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `%s`: comma-separated names of the arguments that were not supplied.
    MissingArguments,
    /// `%name%`, `%input%`, `%reason%`: default template for argument parse errors.
    ArgumentParseError,
    /// `%s`: the token that matched no sub-command.
    UnknownArgument,
    /// A console-like sender reached a player-only node.
    PlayerOnly,
    /// A help page has no entries to show.
    NoVisibleCommands,
    /// The sender lacks the node's permission, or can reach nothing below a router.
    NoPermission,
}

/// A configuration key that names no [`MessageKind`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown message key '{0}'.")]
pub struct UnknownMessageKey(pub String);

impl MessageKind {
    /// Every kind, in a stable order.
    pub const ALL: [Self; 6] = [
        Self::MissingArguments,
        Self::ArgumentParseError,
        Self::UnknownArgument,
        Self::PlayerOnly,
        Self::NoVisibleCommands,
        Self::NoPermission,
    ];

    /// The key used in configuration files, e.g. `no_permission`.
    pub fn key(self) -> &'static str {
        match self {
            Self::MissingArguments => "missing_arguments",
            Self::ArgumentParseError => "argument_parse_error",
            Self::UnknownArgument => "unknown_argument",
            Self::PlayerOnly => "player_only",
            Self::NoVisibleCommands => "no_visible_commands",
            Self::NoPermission => "no_permission",
        }
    }

    /// The compiled-in template for this kind.
    pub fn default_template(self) -> &'static str {
        match self {
            Self::MissingArguments => t!("messages.missing_arguments"),
            Self::ArgumentParseError => t!("messages.argument_parse_error"),
            Self::UnknownArgument => t!("messages.unknown_argument"),
            Self::PlayerOnly => t!("messages.player_only"),
            Self::NoVisibleCommands => t!("messages.no_visible_commands"),
            Self::NoPermission => t!("messages.no_permission"),
        }
    }
}

impl FromStr for MessageKind {
    type Err = UnknownMessageKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| UnknownMessageKey(s.to_string()))
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The templates a tree renders its messages from.
///
/// Each tree owns its own catalog, so overriding a template for one tree never leaks
/// into another. Kinds without an override fall back to the compiled-in template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    overrides: HashMap<MessageKind, String>,
}

impl MessageCatalog {
    /// Builder form of [`MessageCatalog::set_template`].
    pub fn with_template(mut self, kind: MessageKind, template: impl Into<String>) -> Self {
        self.set_template(kind, template);
        self
    }

    /// Overrides the template of `kind`.
    pub fn set_template(&mut self, kind: MessageKind, template: impl Into<String>) {
        self.overrides.insert(kind, template.into());
    }

    /// The override for `kind`, or its compiled-in template.
    pub fn template(&self, kind: MessageKind) -> &str {
        self.overrides
            .get(&kind)
            .map_or_else(|| kind.default_template(), String::as_str)
    }

    /// Renders `kind`, filling each `%s` with the next value in order.
    pub fn render(&self, kind: MessageKind, values: &[&str]) -> String {
        fill_positional(self.template(kind), values)
    }

    /// Renders `kind`, filling `%key%` placeholders from `values`.
    pub fn render_named(&self, kind: MessageKind, values: &[(&str, &str)]) -> String {
        fill_named(self.template(kind), values)
    }
}

/// Replaces each `%s` in `template` with the next value. Surplus placeholders are left
/// as they are; surplus values are ignored.
pub fn fill_positional(template: &str, values: &[&str]) -> String {
    let mut pieces = template.split(POSITIONAL_PLACEHOLDER);
    let mut output = String::with_capacity(template.len());
    let mut values = values.iter();

    if let Some(first) = pieces.next() {
        output.push_str(first);
    }
    for piece in pieces {
        match values.next() {
            Some(value) => output.push_str(value),
            None => output.push_str(POSITIONAL_PLACEHOLDER),
        }
        output.push_str(piece);
    }
    output
}

/// Replaces the argument placeholders `%name%`, `%input%` and `%reason%` in a single
/// pass, so a substituted value is never scanned again. Any other `%word%` is plain
/// text, and a key missing from `values` is left untouched.
pub fn fill_named(template: &str, values: &[(&str, &str)]) -> String {
    ARGUMENT_PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let key = caps.get(1).map_or("", |m| m.as_str());
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map_or_else(
                    || caps.get(0).map_or("", |m| m.as_str()).to_string(),
                    |(_, value)| (*value).to_string(),
                )
        })
        .into_owned()
}

/// Named placeholders (without the `%` delimiters) used by a template.
pub fn named_placeholders(template: &str) -> Vec<&str> {
    NAMED_PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

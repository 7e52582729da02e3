// src/core/config_loader.rs

//! # Config Loader
//!
//! Reads per-tree overrides from a TOML file: message templates, the help header and
//! name format, and whether hidden nodes are offered by completion.
//!
//! ```toml
//! [messages]
//! no_permission = "Access denied."
//!
//! [help]
//! header = "My Commands"
//! name_format = "root_alias"
//!
//! [completion]
//! include_hidden = true
//! ```
use crate::{
    constants::{CONFIG_DIR_NAME, CONFIG_ENV_VAR, CONFIG_FILENAME},
    core::{
        help::SimpleHelpFormatter,
        messages::{MessageCatalog, MessageKind, named_placeholders},
        tree::CommandTree,
    },
    models::NameFormat,
};
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

/// The parsed configuration file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Template overrides keyed by message kind, e.g. `no_permission`.
    pub messages: HashMap<String, String>,
    /// The `[help]` section.
    pub help: HelpConfig,
    /// The `[completion]` section.
    pub completion: CompletionConfig,
}

/// Settings of the default help formatter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelpConfig {
    /// Text shown in the banner of every help page.
    pub header: Option<String>,
    /// How command lines are spelled in listings.
    pub name_format: NameFormat,
}

/// Tab completion policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompletionConfig {
    /// Offer hidden nodes as completions. Defaults to `true`.
    pub include_hidden: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            include_hidden: true,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    /// Invalid TOML, unknown sections or fields, and unknown message keys.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid configuration TOML")?;
        // Unknown keys are rejected here so `catalog()` never has to.
        for key in config.messages.keys() {
            key.parse::<MessageKind>()?;
        }
        Ok(config)
    }

    /// Reads and parses the file at `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{}'", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load config file at '{}'", path.display()))
    }

    /// Finds and loads the configuration, falling back to the defaults when no file
    /// exists at any of the usual places.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match locate(explicit)? {
            Some(path) => {
                log::info!("Loading configuration from '{}'", path.display());
                Self::from_path(&path)
            }
            None => {
                log::debug!("No configuration file found. Using defaults.");
                Ok(Self::default())
            }
        }
    }

    /// The message catalog with every override applied.
    pub fn catalog(&self) -> MessageCatalog {
        let mut catalog = MessageCatalog::default();
        for (key, template) in &self.messages {
            let Ok(kind) = key.parse::<MessageKind>() else {
                log::warn!("Ignoring unknown message key '{}'", key);
                continue;
            };
            warn_on_unknown_placeholders(kind, template);
            catalog.set_template(kind, template.clone());
        }
        catalog
    }

    /// The default help formatter with the `[help]` settings applied.
    pub fn help_formatter(&self) -> SimpleHelpFormatter {
        let formatter = SimpleHelpFormatter::default().with_name_format(self.help.name_format);
        match &self.help.header {
            Some(header) => formatter.with_header(header.clone()),
            None => formatter,
        }
    }

    /// Installs the catalog, help formatter and completion policy on `tree`.
    pub fn apply(&self, tree: &mut CommandTree) {
        tree.set_catalog(self.catalog());
        tree.set_help_formatter(Arc::new(self.help_formatter()));
        tree.set_include_hidden_in_completion(self.completion.include_hidden);
    }
}

fn warn_on_unknown_placeholders(kind: MessageKind, template: &str) {
    let known = named_placeholders(kind.default_template());
    for placeholder in named_placeholders(template) {
        if !known.contains(&placeholder) {
            log::warn!(
                "Template for '{}' uses '%{}%', which is never filled.",
                kind,
                placeholder
            );
        }
    }
}

/// Picks the configuration file to read.
///
/// # Logic:
/// 1. `explicit` (with `~` and environment variables expanded) must exist.
/// 2. Otherwise `$CMDTREE_CONFIG`, under the same rule.
/// 3. Otherwise `<config dir>/cmdtree/config.toml`, only if it exists.
pub fn locate(explicit: Option<&str>) -> Result<Option<PathBuf>> {
    if let Some(raw) = explicit {
        return expand_existing(raw).map(Some);
    }

    if let Ok(raw) = std::env::var(CONFIG_ENV_VAR) {
        if !raw.is_empty() {
            return expand_existing(&raw)
                .with_context(|| format!("Invalid path in ${}", CONFIG_ENV_VAR))
                .map(Some);
        }
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
        .filter(|path| path.is_file()))
}

fn expand_existing(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| anyhow!("Failed to expand config path '{}': {}", raw, e))?;
    let path = PathBuf::from(expanded.into_owned());
    if !path.is_file() {
        return Err(anyhow!("Config file '{}' does not exist", path.display()));
    }
    Ok(path)
}

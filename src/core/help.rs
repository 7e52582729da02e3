// src/core/help.rs

use crate::{
    core::messages::{MessageCatalog, MessageKind, fill_positional},
    models::{NameFormat, NodeId},
    system::sender::CommandSender,
};

/// One line of a help listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// The listed child.
    pub node: NodeId,
    /// The full command line, spelled with the formatter's [`NameFormat`].
    pub name: String,
    /// The child's help summary.
    pub description: Option<String>,
}

/// Presents the reachable, visible children of a router to a sender.
pub trait HelpFormatter: Send + Sync {
    /// Sends the help page. `entries` may be empty when every reachable child is hidden.
    fn send_help(&self, sender: &dyn CommandSender, catalog: &MessageCatalog, entries: &[HelpEntry]);

    /// How entry names should be spelled for this formatter.
    fn name_format(&self) -> NameFormat {
        NameFormat::RootAlias
    }
}

/// The default page: a banner with the header, a blank line, one line per entry and a
/// closing blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleHelpFormatter {
    header: String,
    name_format: NameFormat,
}

impl Default for SimpleHelpFormatter {
    fn default() -> Self {
        Self {
            header: t!("help.header").to_string(),
            name_format: NameFormat::default(),
        }
    }
}

impl SimpleHelpFormatter {
    /// Replaces the banner text.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Changes how entry names are spelled.
    pub fn with_name_format(mut self, name_format: NameFormat) -> Self {
        self.name_format = name_format;
        self
    }

    /// The banner text.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Every line `send_help` would send, in order.
    pub fn render_lines(&self, catalog: &MessageCatalog, entries: &[HelpEntry]) -> Vec<String> {
        let mut lines = Vec::with_capacity(entries.len() + 4);
        lines.push(fill_positional(t!("help.banner"), &[self.header.as_str()]));
        lines.push(" ".to_string());

        if entries.is_empty() {
            lines.push(catalog.render(MessageKind::NoVisibleCommands, &[]));
        }

        for entry in entries {
            lines.push(match &entry.description {
                Some(description) => format!("/{} - {}", entry.name, description),
                None => format!("/{}", entry.name),
            });
        }

        lines.push(" ".to_string());
        lines
    }
}

impl HelpFormatter for SimpleHelpFormatter {
    fn send_help(&self, sender: &dyn CommandSender, catalog: &MessageCatalog, entries: &[HelpEntry]) {
        for line in self.render_lines(catalog, entries) {
            sender.send_message(&line);
        }
    }

    fn name_format(&self) -> NameFormat {
        self.name_format
    }
}

// src/core/arguments.rs

use crate::{
    constants::{MISSING_ARGUMENTS_SEPARATOR, PLACEHOLDER_INPUT, PLACEHOLDER_NAME, PLACEHOLDER_REASON},
    core::{
        messages::{MessageCatalog, MessageKind, fill_named},
        tree::ConfigError,
    },
    system::sender::CommandSender,
};
use std::{
    fmt,
    num::{ParseFloatError, ParseIntError},
};
use thiserror::Error;

// --- VALUES ---

/// A successfully parsed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// A 32-bit integer.
    Integer(i32),
    /// A double-precision number.
    Double(f64),
    /// A single-precision number.
    Float(f32),
    /// The raw token.
    Text(String),
    /// `true` or `false`, any case.
    Boolean(bool),
    /// The name of an online principal.
    Principal(String),
}

impl ArgValue {
    /// The value of an `Integer`.
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The value of a `Double`.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(value) => Some(*value),
            _ => None,
        }
    }

    /// The value of a `Float`.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// The value of a `Boolean`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// The text of a `Text` or `Principal` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) | Self::Principal(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Double(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Text(value) | Self::Principal(value) => f.write_str(value),
            Self::Boolean(value) => write!(f, "{}", value),
        }
    }
}

/// Why a token could not be parsed. The reason fills `%reason%` in error templates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ParseFailure {
    reason: String,
}

impl ParseFailure {
    /// A failure with a human-readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason, as shown in `%reason%`.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<ParseIntError> for ParseFailure {
    fn from(err: ParseIntError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<ParseFloatError> for ParseFailure {
    fn from(err: ParseFloatError) -> Self {
        Self::new(err.to_string())
    }
}

// --- DESCRIPTORS ---

/// Turns one token into a value.
pub trait ArgumentParser: Send + Sync {
    /// `Ok(None)` is a broken parser, not a user error: it surfaces as a
    /// [`ConfigError::EmptyParse`].
    fn parse(&self, input: &str) -> Result<Option<ArgValue>, ParseFailure>;

    /// Suggestions for a partially typed token. `None` falls back to the argument name.
    fn suggestions(&self, _input: &str) -> Option<Vec<String>> {
        None
    }

    /// A parser-specific error template, used when the argument carries none.
    fn default_error_template(&self) -> Option<&str> {
        None
    }
}

/// One declared position of a parsed leaf: a name, a parser and an optional error
/// template with `%name%`, `%input%` and `%reason%` placeholders.
pub struct Argument {
    name: String,
    error_template: Option<String>,
    parser: Box<dyn ArgumentParser>,
}

impl Argument {
    /// Declares an argument named `name` parsed by `parser`.
    pub fn new(name: impl Into<String>, parser: impl ArgumentParser + 'static) -> Self {
        Self {
            name: name.into(),
            error_template: None,
            parser: Box::new(parser),
        }
    }

    /// Replaces the error template sent when this argument fails to parse.
    pub fn with_error(mut self, template: impl Into<String>) -> Self {
        self.error_template = Some(template.into());
        self
    }

    /// The declared name, used in messages and `by_name` lookups.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the parser on one token.
    pub fn parse(&self, input: &str) -> Result<Option<ArgValue>, ParseFailure> {
        self.parser.parse(input)
    }

    /// Completion for the token currently being typed at this position.
    pub fn complete(&self, input: &str) -> Vec<String> {
        self.parser
            .suggestions(input)
            .unwrap_or_else(|| vec![self.name.clone()])
    }

    /// The message sent when `input` failed to parse with `failure`.
    pub fn render_error(&self, catalog: &MessageCatalog, input: &str, failure: &ParseFailure) -> String {
        let template = self
            .error_template
            .as_deref()
            .or_else(|| self.parser.default_error_template())
            .unwrap_or_else(|| catalog.template(MessageKind::ArgumentParseError));

        fill_named(
            template,
            &[
                (PLACEHOLDER_NAME, self.name.as_str()),
                (PLACEHOLDER_INPUT, input),
                (PLACEHOLDER_REASON, failure.reason()),
            ],
        )
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("error_template", &self.error_template)
            .finish_non_exhaustive()
    }
}

/// The values of a fully parsed leaf, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    values: Vec<(String, ArgValue)>,
}

impl ParsedArgs {
    /// The value at a declared position.
    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.values.get(index).map(|(_, value)| value)
    }

    /// The value of the argument declared as `name`.
    pub fn by_name(&self, name: &str) -> Option<&ArgValue> {
        self.values
            .iter()
            .find(|(arg_name, _)| arg_name == name)
            .map(|(_, value)| value)
    }

    /// Number of parsed values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a leaf that declares no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names and values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

// --- PIPELINE ---

/// Parses `tokens` against `arguments` left to right.
///
/// Returns `Ok(None)` once a message has been sent to the sender (missing arguments or
/// the first parse failure); nothing after a failing position is parsed. Tokens past
/// the declared arguments are ignored here.
pub(crate) fn parse_all(
    command: &str,
    arguments: &[Argument],
    tokens: &[String],
    catalog: &MessageCatalog,
    sender: &dyn CommandSender,
) -> Result<Option<ParsedArgs>, ConfigError> {
    if tokens.len() < arguments.len() {
        let missing = arguments
            .iter()
            .skip(tokens.len())
            .map(Argument::name)
            .collect::<Vec<_>>()
            .join(MISSING_ARGUMENTS_SEPARATOR);
        log::debug!("'{}' is missing arguments: {}", command, missing);
        sender.send_message(&catalog.render(MessageKind::MissingArguments, &[missing.as_str()]));
        return Ok(None);
    }

    let mut parsed = ParsedArgs {
        values: Vec::with_capacity(arguments.len()),
    };
    for (argument, token) in arguments.iter().zip(tokens) {
        match argument.parse(token) {
            Ok(Some(value)) => parsed.values.push((argument.name.clone(), value)),
            Ok(None) => {
                return Err(ConfigError::EmptyParse {
                    node: command.to_string(),
                    argument: argument.name.clone(),
                });
            }
            Err(failure) => {
                log::debug!(
                    "Argument '{}' of '{}' rejected '{}': {}",
                    argument.name,
                    command,
                    token,
                    failure
                );
                sender.send_message(&argument.render_error(catalog, token, &failure));
                return Ok(None);
            }
        }
    }
    Ok(Some(parsed))
}

/// Suggestions for the last token. `None` when there is no token yet or the last token
/// is past the declared arguments.
pub(crate) fn complete_last(arguments: &[Argument], tokens: &[String]) -> Option<Vec<String>> {
    let current = tokens.last()?;
    let argument = arguments.get(tokens.len() - 1)?;
    Some(argument.complete(current))
}

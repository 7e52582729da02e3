// src/core/prefab.rs

//! Ready-made parsers for the common argument types.

use crate::{
    core::arguments::{ArgValue, ArgumentParser, ParseFailure},
    system::sender::PrincipalDirectory,
};
use std::{fmt, sync::Arc};

/// A 32-bit signed integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerArgument;

impl ArgumentParser for IntegerArgument {
    fn parse(&self, input: &str) -> Result<Option<ArgValue>, ParseFailure> {
        Ok(Some(ArgValue::Integer(input.parse::<i32>()?)))
    }
}

/// A 64-bit float.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleArgument;

impl ArgumentParser for DoubleArgument {
    fn parse(&self, input: &str) -> Result<Option<ArgValue>, ParseFailure> {
        Ok(Some(ArgValue::Double(input.parse::<f64>()?)))
    }
}

/// A 32-bit float.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatArgument;

impl ArgumentParser for FloatArgument {
    fn parse(&self, input: &str) -> Result<Option<ArgValue>, ParseFailure> {
        Ok(Some(ArgValue::Float(input.parse::<f32>()?)))
    }
}

/// The token itself. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringArgument;

impl ArgumentParser for StringArgument {
    fn parse(&self, input: &str) -> Result<Option<ArgValue>, ParseFailure> {
        Ok(Some(ArgValue::Text(input.to_string())))
    }
}

/// `true` or `false`, in any case.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanArgument;

const BOOLEAN_LITERALS: [&str; 2] = ["true", "false"];

impl ArgumentParser for BooleanArgument {
    fn parse(&self, input: &str) -> Result<Option<ArgValue>, ParseFailure> {
        if input.eq_ignore_ascii_case("true") {
            Ok(Some(ArgValue::Boolean(true)))
        } else if input.eq_ignore_ascii_case("false") {
            Ok(Some(ArgValue::Boolean(false)))
        } else {
            Err(ParseFailure::new(t!("arguments.boolean.invalid")))
        }
    }

    fn suggestions(&self, input: &str) -> Option<Vec<String>> {
        Some(
            BOOLEAN_LITERALS
                .iter()
                .filter(|literal| literal.starts_with(input))
                .map(|literal| literal.to_string())
                .collect(),
        )
    }
}

/// The name of a principal that is currently online.
pub struct PrincipalArgument {
    directory: Arc<dyn PrincipalDirectory>,
}

impl PrincipalArgument {
    /// Accepts names that `directory` reports online.
    pub fn new(directory: Arc<dyn PrincipalDirectory>) -> Self {
        Self { directory }
    }
}

impl fmt::Debug for PrincipalArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrincipalArgument").finish_non_exhaustive()
    }
}

impl ArgumentParser for PrincipalArgument {
    fn parse(&self, input: &str) -> Result<Option<ArgValue>, ParseFailure> {
        if self.directory.is_online(input) {
            Ok(Some(ArgValue::Principal(input.to_string())))
        } else {
            Err(ParseFailure::new(t!("arguments.principal.not_found")))
        }
    }

    fn suggestions(&self, input: &str) -> Option<Vec<String>> {
        Some(
            self.directory
                .online_names()
                .into_iter()
                .filter(|name| name.starts_with(input))
                .collect(),
        )
    }

    fn default_error_template(&self) -> Option<&str> {
        Some(t!("arguments.principal.error"))
    }
}

//! Field declarations and the metadata that exposes a field on the command
//! line.
//!
//! A field's default is either a plain [`Value`] (kept out of the CLI) or an
//! [`Argument`], which carries the flag metadata: default, extra flag
//! spellings, help text, an optional closed set of allowed values, a display
//! name for usage output, and an optional custom parse action.

use std::fmt;
use std::sync::Arc;

use crate::types::FieldType;
use crate::value::{Required, Value};

type ParseFn = dyn Fn(&str) -> Result<Value, String> + Send + Sync;

/// Custom coercion from a raw command-line token to a [`Value`].
///
/// Replaces the leaf type's built-in coercion for the field it is attached
/// to. An `Err` is reported by the parser as an invalid value.
#[derive(Clone)]
pub struct ParseAction(Arc<ParseFn>);

impl ParseAction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        ParseAction(Arc::new(f))
    }

    pub fn call(&self, raw: &str) -> Result<Value, String> {
        (self.0)(raw)
    }
}

impl fmt::Debug for ParseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParseAction(..)")
    }
}

impl PartialEq for ParseAction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// CLI metadata attached to a field as its default.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    default: Value,
    extra_flags: Vec<String>,
    help: String,
    choices: Option<Vec<Value>>,
    display_name: Option<String>,
    parse_action: Option<ParseAction>,
}

impl Argument {
    /// An argument whose value falls back to `default` when the flag is absent.
    /// Pass [`Required`] to make the flag mandatory.
    pub fn new(default: impl Into<Value>) -> Self {
        Self {
            default: default.into(),
            extra_flags: Vec::new(),
            help: String::new(),
            choices: None,
            display_name: None,
            parse_action: None,
        }
    }

    /// Shorthand for `Argument::new(Required)`.
    pub fn required() -> Self {
        Self::new(Required)
    }

    /// Add an extra flag spelling, e.g. `"-p"` or `"--listen-port"`.
    pub fn flag(mut self, flag: &str) -> Self {
        self.extra_flags.push(flag.to_string());
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Restrict the field to a closed set of values.
    pub fn choices<I, T>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.choices = Some(allowed.into_iter().map(Into::into).collect());
        self
    }

    /// Placeholder shown for the flag's value in usage output.
    pub fn display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    pub fn parse_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.parse_action = Some(ParseAction::new(f));
        self
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn extra_flags(&self) -> &[String] {
        &self.extra_flags
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn allowed(&self) -> Option<&[Value]> {
        self.choices.as_deref()
    }

    pub fn display(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn parse_action(&self) -> Option<&ParseAction> {
        self.parse_action.as_ref()
    }

    /// The flag must be supplied because the default is still [`Required`].
    pub fn is_mandatory(&self) -> bool {
        self.default.is_required()
    }
}

impl Default for Argument {
    fn default() -> Self {
        Self::required()
    }
}

/// A closed set of allowed values with its own default.
///
/// Converts into an [`Argument`] carrying the same restriction, so the two
/// spellings below declare the same field:
///
/// ```
/// use sectional::{Argument, Choice};
///
/// let a: Argument = Choice::new(["fast", "slow"]).with_default("fast").into();
/// let b = Argument::new("fast").choices(["fast", "slow"]);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub allowed: Vec<Value>,
    pub default: Value,
}

impl Choice {
    /// A choice with no default: one of the values must be supplied.
    pub fn new<I, T>(allowed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            default: Value::Required,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }
}

impl From<Choice> for Argument {
    fn from(choice: Choice) -> Self {
        Argument::new(choice.default).choices(choice.allowed)
    }
}

/// What a field holds before the command line is parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    /// A plain default, never exposed on the command line.
    Plain(Value),
    /// A CLI-exposed default.
    Argument(Argument),
}

impl FieldSpec {
    /// The value the field takes if nothing overrides it.
    pub fn default_value(&self) -> &Value {
        match self {
            FieldSpec::Plain(value) => value,
            FieldSpec::Argument(arg) => arg.default_value(),
        }
    }

    pub fn as_argument(&self) -> Option<&Argument> {
        match self {
            FieldSpec::Argument(arg) => Some(arg),
            FieldSpec::Plain(_) => None,
        }
    }
}

impl From<Value> for FieldSpec {
    fn from(value: Value) -> Self {
        FieldSpec::Plain(value)
    }
}

impl From<Required> for FieldSpec {
    fn from(_: Required) -> Self {
        FieldSpec::Plain(Value::Required)
    }
}

impl From<Argument> for FieldSpec {
    fn from(arg: Argument) -> Self {
        FieldSpec::Argument(arg)
    }
}

impl From<Choice> for FieldSpec {
    fn from(choice: Choice) -> Self {
        FieldSpec::Argument(choice.into())
    }
}

/// A named, typed field within a section.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub spec: FieldSpec,
}

impl Field {
    pub fn new(name: &str, ty: FieldType, spec: impl Into<FieldSpec>) -> Self {
        Self {
            name: name.to_string(),
            ty,
            spec: spec.into(),
        }
    }

    /// Whether the field is exposed on the command line.
    pub fn is_cli(&self) -> bool {
        self.spec.as_argument().is_some()
    }
}

use std::fmt;
use std::str::FromStr;

use crate::complete::{Completion, CompletionContext};
use crate::error::{BoxError, Error, Result, Subject};
use crate::value::{Value, ValueType};

/// How many tokens a positional argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly `n` tokens (`n >= 1`).
    Exact(usize),
    /// Zero or one token (`?`).
    Optional,
    /// Every remaining token (`*`).
    ZeroOrMore,
    /// Every remaining token, at least one (`+`).
    OneOrMore,
}

impl Cardinality {
    pub fn is_variadic(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }

    /// Number of tokens taken out of `available`, or `None` when too few remain.
    pub fn take(self, available: usize) -> Option<usize> {
        match self {
            Self::Exact(n) => (available >= n).then_some(n),
            Self::Optional => Some(available.min(1)),
            Self::ZeroOrMore => Some(available),
            Self::OneOrMore => (available >= 1).then_some(available),
        }
    }

    /// Short usage notation for an argument called `name`.
    pub fn short_usage(self, name: &str) -> String {
        match self {
            Self::Exact(n) => vec![name; n.max(1)].join(" "),
            Self::Optional => format!("[{name}]"),
            Self::ZeroOrMore => format!("[{name}...]"),
            Self::OneOrMore => format!("{name} [{name}...]"),
        }
    }

    fn expected(self) -> String {
        match self {
            Self::Exact(1) => "1 value".to_string(),
            Self::Exact(n) => format!("{n} values"),
            Self::Optional => "at most 1 value".to_string(),
            Self::ZeroOrMore => "any number of values".to_string(),
            Self::OneOrMore => "at least 1 value".to_string(),
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Optional => f.write_str("?"),
            Self::ZeroOrMore => f.write_str("*"),
            Self::OneOrMore => f.write_str("+"),
        }
    }
}

/// Parses the `nargs` notation: a positive integer, `?`, `*` or `+`.
impl FromStr for Cardinality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "?" => Ok(Self::Optional),
            "*" => Ok(Self::ZeroOrMore),
            "+" => Ok(Self::OneOrMore),
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Self::Exact(n)),
                _ => Err(Error::InvalidCardinality(s.to_string())),
            },
        }
    }
}

/// A positional argument.
pub struct Argument {
    name: String,
    ty: ValueType,
    cardinality: Cardinality,
    usage: String,
    completion: Option<Completion>,
    values: Vec<Value>,
}

impl Argument {
    pub fn new(
        name: impl Into<String>,
        ty: ValueType,
        cardinality: Cardinality,
        usage: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            cardinality,
            usage: usage.into(),
            completion: None,
            values: Vec::new(),
        }
    }

    pub fn complete<F>(mut self, f: F) -> Self
    where
        F: Fn(&CompletionContext<'_>) -> std::result::Result<String, BoxError> + 'static,
    {
        self.completion = Some(Box::new(f));
        self
    }

    pub fn set_completion<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&CompletionContext<'_>) -> std::result::Result<String, BoxError> + 'static,
    {
        self.completion = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.ty
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Values collected by the most recent successful parse.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn short_usage(&self) -> String {
        self.cardinality.short_usage(&self.name)
    }

    pub(crate) fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// Take this argument's share of `tokens` and coerce it.
    pub(crate) fn consume(&self, tokens: &[String]) -> Result<Vec<Value>> {
        let n = self
            .cardinality
            .take(tokens.len())
            .ok_or_else(|| Error::ArgumentCount {
                name: self.name.clone(),
                expected: self.cardinality.expected(),
                found: tokens.len(),
            })?;

        tokens[..n]
            .iter()
            .map(|raw| {
                self.ty.coerce(raw).map_err(|expected| Error::TypeMismatch {
                    subject: Subject::Argument(self.name.clone()),
                    value: raw.clone(),
                    expected,
                })
            })
            .collect()
    }

    /// Shape collected values for the parse result: single-token cardinalities
    /// give a scalar, the rest a sequence. A missing optional gives nothing.
    pub(crate) fn result_value(&self, items: &[Value]) -> Option<Value> {
        match self.cardinality {
            Cardinality::Exact(1) | Cardinality::Optional => items.first().cloned(),
            _ => Some(self.ty.sequence(items.to_vec())),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.values.clear();
    }

    pub(crate) fn store(&mut self, values: Vec<Value>) {
        self.values = values;
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("type", &self.ty)
            .field("cardinality", &self.cardinality)
            .field("usage", &self.usage)
            .field("completion", &self.completion.is_some())
            .field("values", &self.values)
            .finish()
    }
}

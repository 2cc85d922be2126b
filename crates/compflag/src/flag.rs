use std::fmt;

use crate::complete::{Completion, CompletionContext};
use crate::error::BoxError;
use crate::value::{FlagKind, Value};

/// A named flag: its kind (taken from the default value), usage text, the value
/// cell written by the last successful parse, and an optional completion callback.
pub struct Flag {
    name: String,
    usage: String,
    default: Value,
    value: Value,
    completion: Option<Completion>,
}

impl Flag {
    pub fn new(name: impl Into<String>, default: Value, usage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage: usage.into(),
            value: default.clone(),
            default,
            completion: None,
        }
    }

    /// Attach a completion callback for the flag's value.
    ///
    /// Bool flags take no value, so their callback is never consulted.
    pub fn complete<F>(mut self, f: F) -> Self
    where
        F: Fn(&CompletionContext<'_>) -> Result<String, BoxError> + 'static,
    {
        self.completion = Some(Box::new(f));
        self
    }

    /// Same as [`Flag::complete`], for flags that are already registered.
    pub fn set_completion<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&CompletionContext<'_>) -> Result<String, BoxError> + 'static,
    {
        self.completion = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FlagKind {
        self.default.kind()
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Value written by the most recent successful parse (the default before that).
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    pub(crate) fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    pub(crate) fn reset(&mut self) {
        self.value = self.default.clone();
    }

    pub(crate) fn store(&mut self, value: Value) {
        self.value = value;
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("usage", &self.usage)
            .field("default", &self.default)
            .field("value", &self.value)
            .field("completion", &self.completion.is_some())
            .finish()
    }
}

//! Two-phase argv parsing: flags first, then positional arguments.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result, Subject};
use crate::flagset::FlagSet;
use crate::value::Value;

/// Outcome of a successful [`FlagSet::parse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    flags: IndexMap<String, Value>,
    arguments: IndexMap<String, Value>,
    rest: Vec<String>,
}

impl ParseResult {
    /// Look up a flag, then a positional argument, by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.flags.get(name).or_else(|| self.arguments.get(name))
    }

    pub fn flag(&self, name: &str) -> Option<&Value> {
        self.flags.get(name)
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Every registered flag with its final value.
    pub fn flags(&self) -> &IndexMap<String, Value> {
        &self.flags
    }

    /// Every positional argument that received a value.
    pub fn arguments(&self) -> &IndexMap<String, Value> {
        &self.arguments
    }

    /// Tokens left after the flag phase when no positional arguments are
    /// registered. Always empty otherwise.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }
}

/// Result of running only the flag phase over some tokens.
#[derive(Debug)]
pub(crate) struct FlagScan {
    /// Every registered flag, starting from its default.
    pub(crate) values: IndexMap<String, Value>,
    /// Flags set explicitly, in order of first occurrence.
    pub(crate) visited: Vec<String>,
    /// Tokens consumed by the flag phase, including a `--` terminator.
    pub(crate) consumed: usize,
    /// Whether the phase was ended by `--`.
    pub(crate) terminated: bool,
}

impl FlagScan {
    /// Explicitly set flags rendered as strings.
    pub(crate) fn visited_values(&self) -> IndexMap<String, String> {
        self.visited
            .iter()
            .filter_map(|name| {
                self.values
                    .get(name)
                    .map(|value| (name.clone(), value.to_string()))
            })
            .collect()
    }
}

impl FlagSet {
    /// Parse `args` (without the program name).
    ///
    /// Flag and argument value cells are reset to their defaults first and
    /// only overwritten when the whole parse succeeds.
    pub fn parse<I, S>(&mut self, args: I) -> Result<ParseResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        tracing::debug!(flagset = %self.name, tokens = tokens.len(), "parsing arguments");

        for flag in self.flags.values_mut() {
            flag.reset();
        }
        for argument in &mut self.arguments {
            argument.reset();
        }

        let scan = self.scan_flags(&tokens)?;
        let mut remaining = &tokens[scan.consumed..];
        let mut result = ParseResult {
            flags: scan.values,
            ..Default::default()
        };

        if self.arguments.is_empty() {
            result.rest = remaining.to_vec();
        } else {
            let mut collected = Vec::with_capacity(self.arguments.len());
            for argument in &self.arguments {
                let values = argument.consume(remaining)?;
                remaining = &remaining[values.len()..];
                collected.push(values);
            }
            if !remaining.is_empty() {
                return Err(Error::UnknownArgument(remaining.to_vec()));
            }

            for (argument, values) in self.arguments.iter_mut().zip(collected) {
                if let Some(value) = argument.result_value(&values) {
                    result.arguments.insert(argument.name().to_string(), value);
                }
                argument.store(values);
            }
        }

        for (name, value) in &result.flags {
            if let Some(flag) = self.flags.get_mut(name) {
                flag.store(value.clone());
            }
        }

        tracing::debug!(
            flags = scan.visited.len(),
            arguments = result.arguments.len(),
            rest = result.rest.len(),
            "parsed arguments"
        );
        Ok(result)
    }

    /// Run the flag phase over `tokens` without touching any value cell.
    ///
    /// Scanning stops at the first positional token (`-` alone counts as one)
    /// or after a `--` terminator.
    pub(crate) fn scan_flags(&self, tokens: &[String]) -> Result<FlagScan> {
        let mut values: IndexMap<String, Value> = self
            .flags
            .iter()
            .map(|(name, flag)| (name.clone(), flag.default_value().clone()))
            .collect();
        let mut visited: Vec<String> = Vec::new();

        let mut i = 0usize;
        let mut terminated = false;
        while i < tokens.len() {
            let token = tokens[i].as_str();
            if token.len() < 2 || !token.starts_with('-') {
                break;
            }

            let mut name = &token[1..];
            if let Some(long) = name.strip_prefix('-') {
                if long.is_empty() {
                    // `--` ends the flag phase.
                    i += 1;
                    terminated = true;
                    break;
                }
                name = long;
            }
            if name.starts_with('-') || name.starts_with('=') {
                return Err(Error::BadFlagSyntax(token.to_string()));
            }
            i += 1;

            let (name, inline) = match name.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (name, None),
            };

            let Some(value) = values.get_mut(name) else {
                if name == "h" || name == "help" {
                    return Err(Error::HelpRequested);
                }
                return Err(Error::UnknownFlag(name.to_string()));
            };

            let raw = if value.kind().is_bool() {
                inline.unwrap_or("true")
            } else if let Some(inline) = inline {
                inline
            } else {
                let Some(next) = tokens.get(i) else {
                    return Err(Error::MissingValue(name.to_string()));
                };
                i += 1;
                next.as_str()
            };

            value.set(raw).map_err(|expected| Error::TypeMismatch {
                subject: Subject::Flag(name.to_string()),
                value: raw.to_string(),
                expected,
            })?;
            tracing::trace!(flag = name, value = raw, "set flag");

            if !visited.iter().any(|v| v == name) {
                visited.push(name.to_string());
            }
        }

        Ok(FlagScan {
            values,
            visited,
            consumed: i,
            terminated,
        })
    }
}

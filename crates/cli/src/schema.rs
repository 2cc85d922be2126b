use anyhow::{Context, Result, bail};
use compflag::{Argument, Cardinality, Flag, FlagSet, Value, ValueType, candidates};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_SCHEMA_NAME: &str = "flagset.json";

/// JSON description of a command's flags and positional arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Schema {
    /// Command name used in usage text (defaults to the schema file stem).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagSchema>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentSchema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagType {
    Bool,
    Int,
    Float,
    String,
    Ints,
    Floats,
    Strings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlagSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FlagType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage: String,
    /// Static completion candidates for the flag's value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complete: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgType {
    Int,
    Float,
    #[default]
    String,
}

/// `nargs` as either a count or one of `?`, `*`, `+`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nargs {
    Count(usize),
    Notation(String),
}

impl Default for Nargs {
    fn default() -> Self {
        Self::Count(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgumentSchema {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: ArgType,
    #[serde(default)]
    pub nargs: Nargs,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complete: Vec<String>,
}

impl Schema {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse schema JSON: {}", path.display()))
    }

    /// Register everything into a fresh `FlagSet`.
    pub fn build(&self, fallback_name: &str) -> Result<FlagSet> {
        let name = self.name.as_deref().unwrap_or(fallback_name);
        let mut fs = FlagSet::new(name);

        for def in &self.flags {
            let default = default_value(def.ty, def.default.as_ref())
                .with_context(|| format!("invalid default for flag '{}'", def.name))?;
            let mut flag = Flag::new(&def.name, default, &def.usage);
            if !def.complete.is_empty() {
                flag = flag.complete(candidates(def.complete.clone()));
            }
            fs.add_flag(flag)?;
        }

        for def in &self.arguments {
            let cardinality = match &def.nargs {
                Nargs::Count(n) => Cardinality::Exact(*n),
                Nargs::Notation(s) => s.parse::<Cardinality>()?,
            };
            let ty = match def.ty {
                ArgType::Int => ValueType::Int,
                ArgType::Float => ValueType::Float,
                ArgType::String => ValueType::String,
            };
            let mut argument = Argument::new(&def.name, ty, cardinality, &def.usage);
            if !def.complete.is_empty() {
                argument = argument.complete(candidates(def.complete.clone()));
            }
            fs.add_argument(argument)?;
        }

        tracing::debug!(
            flagset = name,
            flags = self.flags.len(),
            arguments = self.arguments.len(),
            "built flag set from schema"
        );
        Ok(fs)
    }
}

/// Convert a JSON default into a typed value, going through the same
/// coercion as argv tokens.
fn default_value(ty: FlagType, raw: Option<&serde_json::Value>) -> Result<Value> {
    let mut value = match ty {
        FlagType::Bool => Value::Bool(false),
        FlagType::Int => Value::Int(0),
        FlagType::Float => Value::Float(0.0),
        FlagType::String => Value::Str(String::new()),
        FlagType::Ints => Value::Ints(Vec::new()),
        FlagType::Floats => Value::Floats(Vec::new()),
        FlagType::Strings => Value::Strs(Vec::new()),
    };
    let Some(raw) = raw else {
        return Ok(value);
    };

    if raw.is_null() {
        return Ok(value);
    }
    if value.kind().is_sequence() {
        bail!("repeatable flags start empty and take no default");
    }

    let text = match raw {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(_) | serde_json::Value::Number(_) => raw.to_string(),
        other => bail!("unsupported default value: {other}"),
    };
    if let Err(expected) = value.set(&text) {
        bail!("expected {expected}, got {text:?}");
    }
    Ok(value)
}

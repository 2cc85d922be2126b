//! Typed values and string coercion.
//!
//! Every flag and positional argument carries one of a closed set of types.
//! Raw argv tokens are coerced here; sequence kinds accumulate one element per
//! occurrence instead of overwriting.

use std::fmt;

use serde::Serialize;

/// Element type of a positional argument (and of a sequence flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    String,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
        }
    }

    /// Coerce a single raw token. The error is the expected type name.
    pub fn coerce(self, raw: &str) -> Result<Value, &'static str> {
        match self {
            Self::Int => parse_int(raw).map(Value::Int).ok_or(self.name()),
            Self::Float => parse_float(raw).map(Value::Float).ok_or(self.name()),
            Self::String => Ok(Value::Str(raw.to_string())),
        }
    }

    /// Build an (empty or filled) sequence value of this element type.
    pub fn sequence(self, items: Vec<Value>) -> Value {
        let mut seq = match self {
            Self::Int => Value::Ints(Vec::with_capacity(items.len())),
            Self::Float => Value::Floats(Vec::with_capacity(items.len())),
            Self::String => Value::Strs(Vec::with_capacity(items.len())),
        };
        for item in items {
            seq.push(item);
        }
        seq
    }
}

/// The kind of a flag, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    Int,
    Float,
    String,
    IntSeq,
    FloatSeq,
    StringSeq,
}

impl FlagKind {
    /// Type name shown in usage text. Bool flags have none.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Bool => "",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::IntSeq => "ints",
            Self::FloatSeq => "floats",
            Self::StringSeq => "strings",
        }
    }

    pub fn is_bool(self) -> bool {
        self == Self::Bool
    }

    pub fn is_sequence(self) -> bool {
        matches!(self, Self::IntSeq | Self::FloatSeq | Self::StringSeq)
    }

    /// Zero value of the kind: false, 0, 0.0, "" or an empty sequence.
    pub fn zero(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::String => Value::Str(String::new()),
            Self::IntSeq => Value::Ints(Vec::new()),
            Self::FloatSeq => Value::Floats(Vec::new()),
            Self::StringSeq => Value::Strs(Vec::new()),
        }
    }
}

/// A coerced flag or argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Strs(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::Bool(_) => FlagKind::Bool,
            Self::Int(_) => FlagKind::Int,
            Self::Float(_) => FlagKind::Float,
            Self::Str(_) => FlagKind::String,
            Self::Ints(_) => FlagKind::IntSeq,
            Self::Floats(_) => FlagKind::FloatSeq,
            Self::Strs(_) => FlagKind::StringSeq,
        }
    }

    /// Apply one raw occurrence: scalars are replaced, sequences grow by one.
    ///
    /// On failure the value is left untouched and the expected type name is
    /// returned.
    pub fn set(&mut self, raw: &str) -> Result<(), &'static str> {
        match self {
            Self::Bool(b) => *b = parse_bool(raw).ok_or("bool")?,
            Self::Int(i) => *i = parse_int(raw).ok_or("int")?,
            Self::Float(x) => *x = parse_float(raw).ok_or("float")?,
            Self::Str(s) => *s = raw.to_string(),
            Self::Ints(v) => v.push(parse_int(raw).ok_or("int")?),
            Self::Floats(v) => v.push(parse_float(raw).ok_or("float")?),
            Self::Strs(v) => v.push(raw.to_string()),
        }
        Ok(())
    }

    /// Whether this is the zero value of its kind (used to hide defaults in usage).
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Bool(b) => !*b,
            Self::Int(i) => *i == 0,
            Self::Float(x) => *x == 0.0,
            Self::Str(s) => s.is_empty(),
            Self::Ints(v) => v.is_empty(),
            Self::Floats(v) => v.is_empty(),
            Self::Strs(v) => v.is_empty(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            Self::Ints(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Self::Floats(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_strs(&self) -> Option<&[String]> {
        match self {
            Self::Strs(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    // Appends a scalar to a matching sequence; mismatched pairs are ignored.
    fn push(&mut self, item: Value) {
        match (self, item) {
            (Self::Ints(v), Self::Int(i)) => v.push(i),
            (Self::Floats(v), Self::Float(x)) => v.push(x),
            (Self::Strs(v), Self::Str(s)) => v.push(s),
            _ => {}
        }
    }
}

fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::Ints(v) => join(f, v),
            Self::Floats(v) => join(f, v),
            Self::Strs(v) => join(f, v),
        }
    }
}

/// Parse a boolean the way conventional flag libraries do.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parse a signed integer with base prefix detection.
///
/// Accepts `0x`/`0o`/`0b` prefixes, a leading `0` for octal, and single `_`
/// separators between digits.
pub fn parse_int(raw: &str) -> Option<i64> {
    let (negative, body) = match raw.as_bytes().first()? {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = body.get(..2).map(|p| p.to_ascii_lowercase());
    let (radix, digits) = match lower.as_deref() {
        Some("0x") => (16, &body[2..]),
        Some("0o") => (8, &body[2..]),
        Some("0b") => (2, &body[2..]),
        _ if body.len() > 1 && body.starts_with('0') => (8, &body[1..]),
        _ => (10, body),
    };
    // One `_` may separate a base prefix from the digits.
    let digits = match radix {
        10 => digits,
        _ => digits.strip_prefix('_').unwrap_or(digits),
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || !digits.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }
    let digits = digits.replace('_', "");
    let magnitude = u64::from_str_radix(&digits, radix).ok()?;

    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return None;
        }
        Some((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).ok()
    }
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok()
}

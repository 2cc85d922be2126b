use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::argument::{Argument, Cardinality};
use crate::error::{Error, Result};
use crate::flag::Flag;
use crate::value::{Value, ValueType};

/// Registration and parsing context for one command or subcommand.
///
/// Flags are keyed by name and kept in registration order. Positional
/// arguments are an ordered list; that order decides both which tokens each
/// argument consumes and which argument a completion cursor falls on.
#[derive(Debug, Default)]
pub struct FlagSet {
    pub(crate) name: String,
    pub(crate) flags: IndexMap<String, Flag>,
    pub(crate) arguments: Vec<Argument>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: IndexMap::new(),
            arguments: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a flag. Its value cell starts at the flag's default.
    ///
    /// Repeatable flags must be registered with an empty default.
    pub fn add_flag(&mut self, flag: Flag) -> Result<&mut Flag> {
        let name = flag.name();
        if name.is_empty() || name.starts_with('-') || name.contains('=') {
            return Err(Error::InvalidFlagName(name.to_string()));
        }
        if flag.kind().is_sequence() && !flag.default_value().is_zero() {
            return Err(Error::SequenceDefault(name.to_string()));
        }

        match self.flags.entry(name.to_string()) {
            Entry::Occupied(e) => Err(Error::DuplicateFlag(e.key().clone())),
            Entry::Vacant(e) => {
                tracing::trace!(flag = %e.key(), kind = ?flag.kind(), "registered flag");
                Ok(e.insert(flag))
            }
        }
    }

    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> Result<&mut Flag> {
        self.add_flag(Flag::new(name, Value::Bool(default), usage))
    }

    pub fn int(&mut self, name: &str, default: i64, usage: &str) -> Result<&mut Flag> {
        self.add_flag(Flag::new(name, Value::Int(default), usage))
    }

    pub fn float(&mut self, name: &str, default: f64, usage: &str) -> Result<&mut Flag> {
        self.add_flag(Flag::new(name, Value::Float(default), usage))
    }

    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> Result<&mut Flag> {
        self.add_flag(Flag::new(name, Value::Str(default.to_string()), usage))
    }

    /// Repeatable int flag; every occurrence appends.
    pub fn ints(&mut self, name: &str, usage: &str) -> Result<&mut Flag> {
        self.add_flag(Flag::new(name, Value::Ints(Vec::new()), usage))
    }

    pub fn floats(&mut self, name: &str, usage: &str) -> Result<&mut Flag> {
        self.add_flag(Flag::new(name, Value::Floats(Vec::new()), usage))
    }

    pub fn strings(&mut self, name: &str, usage: &str) -> Result<&mut Flag> {
        self.add_flag(Flag::new(name, Value::Strs(Vec::new()), usage))
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name)
    }

    pub fn flag_mut(&mut self, name: &str) -> Option<&mut Flag> {
        self.flags.get_mut(name)
    }

    /// All flags, in registration order.
    pub fn visit_all(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values()
    }

    /// Current value cell of a flag (written by the last successful parse).
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.flags.get(name).map(Flag::value)
    }

    /// Append a positional argument.
    ///
    /// Names must be unique, and nothing may follow a variadic (`*`/`+`)
    /// argument since it would never receive a token.
    pub fn add_argument(&mut self, argument: Argument) -> Result<&mut Argument> {
        if let Cardinality::Exact(0) = argument.cardinality() {
            return Err(Error::InvalidCardinality("0".to_string()));
        }
        if self.argument(argument.name()).is_some() {
            return Err(Error::DuplicateArgument(argument.name().to_string()));
        }
        if let Some(last) = self.arguments.last() {
            if last.cardinality().is_variadic() {
                return Err(Error::ArgumentAfterVariadic {
                    name: argument.name().to_string(),
                    variadic: last.name().to_string(),
                });
            }
        }

        tracing::trace!(
            argument = argument.name(),
            nargs = %argument.cardinality(),
            "registered argument"
        );
        self.arguments.push(argument);
        let idx = self.arguments.len() - 1;
        Ok(&mut self.arguments[idx])
    }

    pub fn int_arg(
        &mut self,
        name: &str,
        cardinality: Cardinality,
        usage: &str,
    ) -> Result<&mut Argument> {
        self.add_argument(Argument::new(name, ValueType::Int, cardinality, usage))
    }

    pub fn float_arg(
        &mut self,
        name: &str,
        cardinality: Cardinality,
        usage: &str,
    ) -> Result<&mut Argument> {
        self.add_argument(Argument::new(name, ValueType::Float, cardinality, usage))
    }

    pub fn string_arg(
        &mut self,
        name: &str,
        cardinality: Cardinality,
        usage: &str,
    ) -> Result<&mut Argument> {
        self.add_argument(Argument::new(name, ValueType::String, cardinality, usage))
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name() == name)
    }
}

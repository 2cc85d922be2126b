use std::fmt;

use thiserror::Error;

/// Error returned by completion callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

/// What a coercion or completion error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Flag(String),
    Argument(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(name) => write!(f, "flag -{name}"),
            Self::Argument(name) => write!(f, "argument {name}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("invalid value {value:?} for {subject}: expected {expected}")]
    TypeMismatch {
        subject: Subject,
        value: String,
        expected: &'static str,
    },

    #[error("flag redefined: {0}")]
    DuplicateFlag(String),

    #[error("invalid flag name {0:?}")]
    InvalidFlagName(String),

    #[error("flag {0} is repeatable and starts empty; it takes no default")]
    SequenceDefault(String),

    #[error("argument redefined: {0}")]
    DuplicateArgument(String),

    #[error("nargs should be a positive integer or one of '?', '*', or '+', got {0:?}")]
    InvalidCardinality(String),

    #[error("argument {name} cannot follow variadic argument {variadic}")]
    ArgumentAfterVariadic { name: String, variadic: String },

    #[error("argument {name}: expected {expected}, got {found}")]
    ArgumentCount {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("unknown argument: {}", .0.join(" "))]
    UnknownArgument(Vec<String>),

    #[error("bad flag syntax: {0}")]
    BadFlagSyntax(String),

    #[error("flag: help requested")]
    HelpRequested,

    #[error("completion for {subject} failed: {source}")]
    Completion {
        subject: Subject,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Whether the error was raised while parsing argv (as opposed to registration
    /// or completion).
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownFlag(_)
                | Self::MissingValue(_)
                | Self::TypeMismatch { .. }
                | Self::ArgumentCount { .. }
                | Self::UnknownArgument(_)
                | Self::BadFlagSyntax(_)
                | Self::HelpRequested
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_follow_flag_conventions() {
        assert_eq!(
            Error::UnknownFlag("foo".to_string()).to_string(),
            "flag provided but not defined: -foo"
        );
        assert_eq!(
            Error::MissingValue("times".to_string()).to_string(),
            "flag needs an argument: -times"
        );
        let err = Error::TypeMismatch {
            subject: Subject::Argument("count".to_string()),
            value: "abc".to_string(),
            expected: "int",
        };
        assert_eq!(
            err.to_string(),
            "invalid value \"abc\" for argument count: expected int"
        );
        assert_eq!(
            Error::UnknownArgument(vec!["a".to_string(), "b".to_string()]).to_string(),
            "unknown argument: a b"
        );
    }

    #[test]
    fn registration_errors_are_not_parse_errors() {
        assert!(!Error::DuplicateFlag("x".to_string()).is_parse_error());
        assert!(!Error::InvalidCardinality("0".to_string()).is_parse_error());
        assert!(!Error::SequenceDefault("tag".to_string()).is_parse_error());
        assert!(Error::HelpRequested.is_parse_error());
    }
}

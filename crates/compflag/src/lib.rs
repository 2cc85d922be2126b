//! Flag and positional argument parsing with shell completion.
//!
//! A [`FlagSet`] holds the schema of one command: named flags (bool, int,
//! float, string and their repeatable variants) and an ordered list of
//! positional [`Argument`]s with a [`Cardinality`]. It can then
//!
//! - [`parse`](FlagSet::parse) an argv into a typed [`ParseResult`], and
//! - answer [`compgen`](FlagSet::compgen): the completion candidates for the
//!   word under the cursor of a partial command line.
//!
//! Nothing here prints or exits; errors are returned and the caller decides
//! whether to show [`FlagSet::usage`].
//!
//! ```
//! use compflag::{Cardinality, FlagSet, Value, candidates};
//!
//! let mut fs = FlagSet::new("greet");
//! fs.int("times", 1, "How many greetings").unwrap();
//! fs.string_arg("name", Cardinality::Exact(1), "Who to greet")
//!     .unwrap()
//!     .set_completion(candidates(["alice", "bob"]));
//!
//! let res = fs.parse(["-times", "2", "alice"]).unwrap();
//! assert_eq!(res.get("times"), Some(&Value::Int(2)));
//! assert_eq!(res.get("name"), Some(&Value::Str("alice".to_string())));
//!
//! assert_eq!(fs.compgen(1, &["greet"]).unwrap(), "-times");
//! assert_eq!(fs.compgen(3, &["greet", "-times", "2"]).unwrap(), "alice bob");
//! ```

mod argument;
mod complete;
mod error;
mod flag;
mod flagset;
mod parse;
mod usage;
mod value;

pub use argument::{Argument, Cardinality};
pub use complete::{Completion, CompletionContext, candidates};
pub use error::{BoxError, Error, Result, Subject};
pub use flag::Flag;
pub use flagset::FlagSet;
pub use parse::ParseResult;
pub use value::{FlagKind, Value, ValueType, parse_bool, parse_float, parse_int};

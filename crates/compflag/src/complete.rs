//! Shell completion candidates.
//!
//! The host hands over the words of the current command line (`words[0]` being
//! the command name) and the index of the word under the cursor. The resolver
//! works out whether a flag name, a flag value or a positional argument is being
//! completed and answers with a space-separated candidate list, asking the
//! registered callback when one is needed.

use indexmap::IndexMap;

use crate::error::{BoxError, Error, Result, Subject};
use crate::flagset::FlagSet;

/// What a completion callback gets to see.
#[derive(Debug, Clone, Copy)]
pub struct CompletionContext<'a> {
    /// The partial word under the cursor (empty when nothing is typed yet).
    pub word: &'a str,
    /// Flags explicitly set before the cursor, rendered as strings.
    pub flags: &'a IndexMap<String, String>,
    /// The raw words, including the command name.
    pub words: &'a [String],
}

/// Completion callback attached to a flag or positional argument.
pub type Completion = Box<dyn Fn(&CompletionContext<'_>) -> std::result::Result<String, BoxError>>;

/// Callback offering a fixed list of candidates, filtered by the typed prefix.
pub fn candidates<I, S>(
    items: I,
) -> impl Fn(&CompletionContext<'_>) -> std::result::Result<String, BoxError> + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let items: Vec<String> = items.into_iter().map(Into::into).collect();
    move |ctx: &CompletionContext<'_>| {
        Ok(items
            .iter()
            .filter(|c| c.starts_with(ctx.word))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" "))
    }
}

// Name of a flag still waiting for its value, i.e. `-name` or `--name` without
// `=value`. A lone `-` and the `--` terminator are not flags.
fn pending_flag(word: &str) -> Option<&str> {
    if word.contains('=') {
        return None;
    }
    let name = word.strip_prefix('-')?;
    let name = name.strip_prefix('-').unwrap_or(name);
    (!name.is_empty()).then_some(name)
}

impl FlagSet {
    /// Completion candidates for the word at `cword` in `words`.
    ///
    /// `cword == words.len()` means the cursor sits on a new, still empty word.
    /// Never changes the flag set; the flags passed to callbacks come from a
    /// scratch run of the flag phase over the words before the cursor.
    pub fn compgen<S: AsRef<str>>(&self, cword: usize, words: &[S]) -> Result<String> {
        let words: Vec<String> = words.iter().map(|w| w.as_ref().to_string()).collect();
        tracing::debug!(flagset = %self.name, cword, words = words.len(), "resolving completion");

        if cword == 1 && words.len() == 1 {
            return Ok(self.flag_names());
        }
        if cword == 0 || cword > words.len() {
            return Ok(String::new());
        }

        let current = words.get(cword).map(String::as_str).unwrap_or("");
        let previous = words[cword - 1].as_str();

        // Past a `--` terminator every word is positional.
        let scan = self.scan_flags(&words[1..cword]);
        let terminated = matches!(&scan, Ok(scan) if scan.terminated);

        if let Some(name) = pending_flag(previous).filter(|_| !terminated) {
            let Some(flag) = self.lookup(name) else {
                tracing::trace!(flag = name, "completing after unknown flag");
                return Ok(String::new());
            };
            if flag.kind().is_bool() {
                return Ok(if current.starts_with('-') {
                    self.flag_names()
                } else {
                    String::new()
                });
            }

            let before = words.get(1..cword - 1).unwrap_or(&[]);
            let flags = self
                .scan_flags(before)
                .map(|scan| scan.visited_values())
                .unwrap_or_default();
            tracing::trace!(flag = name, "completing flag value");
            return invoke(
                flag.completion(),
                Subject::Flag(name.to_string()),
                current,
                &flags,
                &words,
            );
        }

        if current.starts_with('-') && !terminated {
            return Ok(self.flag_names());
        }

        let Ok(scan) = scan else {
            return Ok(String::new());
        };
        let positionals = (cword - 1).saturating_sub(scan.consumed);
        let Some(slot) = self.argument_slot(positionals) else {
            tracing::trace!(positionals, "no argument left to complete");
            return Ok(String::new());
        };

        let argument = &self.arguments[slot];
        tracing::trace!(argument = argument.name(), slot, "completing argument");
        invoke(
            argument.completion(),
            Subject::Argument(argument.name().to_string()),
            current,
            &scan.visited_values(),
            &words,
        )
    }

    /// Index of the argument receiving the next token when `filled` positional
    /// tokens are already present.
    fn argument_slot(&self, filled: usize) -> Option<usize> {
        let mut remaining = filled;
        for (idx, argument) in self.arguments.iter().enumerate() {
            if argument.cardinality().is_variadic() {
                return Some(idx);
            }
            let n = argument.cardinality().take(usize::MAX).unwrap_or(0);
            if remaining < n {
                return Some(idx);
            }
            remaining -= n;
        }
        None
    }

    fn flag_names(&self) -> String {
        self.flags
            .keys()
            .map(|name| format!("-{name}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn invoke(
    completion: Option<&Completion>,
    subject: Subject,
    word: &str,
    flags: &IndexMap<String, String>,
    words: &[String],
) -> Result<String> {
    let Some(complete) = completion else {
        return Ok(String::new());
    };
    let ctx = CompletionContext { word, flags, words };
    complete(&ctx).map_err(|source| Error::Completion { subject, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Cardinality;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Seen {
        word: String,
        flags: Vec<(String, String)>,
        words: Vec<String>,
    }

    fn recorder(
        out: &Rc<RefCell<Vec<Seen>>>,
        reply: &'static str,
    ) -> impl Fn(&CompletionContext<'_>) -> std::result::Result<String, BoxError> + 'static {
        let out = Rc::clone(out);
        move |ctx: &CompletionContext<'_>| {
            out.borrow_mut().push(Seen {
                word: ctx.word.to_string(),
                flags: ctx
                    .flags
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                words: ctx.words.to_vec(),
            });
            Ok(reply.to_string())
        }
    }

    fn sample() -> (FlagSet, Rc<RefCell<Vec<Seen>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut fs = FlagSet::new("subcommand");
        fs.float("times", 1.0, "Number help string")
            .unwrap()
            .set_completion(recorder(&seen, "1 2 3"));
        fs.bool("verbose", false, "").unwrap();
        fs.string("name", "", "").unwrap();
        fs.string_arg("src", Cardinality::Exact(1), "")
            .unwrap()
            .set_completion(recorder(&seen, "src-candidates"));
        fs.string_arg("dst", Cardinality::ZeroOrMore, "")
            .unwrap()
            .set_completion(recorder(&seen, "dst-candidates"));
        (fs, seen)
    }

    #[test]
    fn first_word_lists_flags() {
        let (fs, _) = sample();
        assert_eq!(
            fs.compgen(1, &["subcommand"]).unwrap(),
            "-times -verbose -name"
        );
    }

    #[test]
    fn flag_value_uses_callback() {
        let (fs, seen) = sample();
        let out = fs.compgen(2, &["subcommand", "-times"]).unwrap();
        assert_eq!(out, "1 2 3");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].word, "");
        assert!(seen[0].flags.is_empty());
        assert_eq!(seen[0].words, ["subcommand", "-times"]);
    }

    #[test]
    fn flag_value_gets_partial_word_and_prior_flags() {
        let (fs, seen) = sample();
        let words = ["subcommand", "-name", "x", "-verbose", "-times", "2"];
        assert_eq!(fs.compgen(5, &words).unwrap(), "1 2 3");

        let seen = seen.borrow();
        assert_eq!(seen[0].word, "2");
        assert_eq!(
            seen[0].flags,
            [
                ("name".to_string(), "x".to_string()),
                ("verbose".to_string(), "true".to_string())
            ]
        );
    }

    #[test]
    fn value_flag_without_callback_is_empty() {
        let (fs, _) = sample();
        assert_eq!(fs.compgen(2, &["subcommand", "-name"]).unwrap(), "");
    }

    #[test]
    fn unknown_previous_flag_is_empty() {
        let (fs, _) = sample();
        assert_eq!(fs.compgen(2, &["subcommand", "-nope"]).unwrap(), "");
    }

    #[test]
    fn bool_flag_then_flag_marker_lists_flags() {
        let (fs, seen) = sample();
        assert_eq!(
            fs.compgen(2, &["subcommand", "-verbose", "-"]).unwrap(),
            "-times -verbose -name"
        );
        assert_eq!(fs.compgen(2, &["subcommand", "-verbose", "fi"]).unwrap(), "");
        assert_eq!(fs.compgen(2, &["subcommand", "-verbose"]).unwrap(), "");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn dash_word_lists_flags() {
        let (fs, _) = sample();
        assert_eq!(
            fs.compgen(2, &["subcommand", "a", "-"]).unwrap(),
            "-times -verbose -name"
        );
    }

    #[test]
    fn positional_slots_follow_cardinality() {
        let (fs, seen) = sample();
        assert_eq!(fs.compgen(1, &["subcommand", "s"]).unwrap(), "src-candidates");
        assert_eq!(
            fs.compgen(3, &["subcommand", "-times", "2"]).unwrap(),
            "src-candidates"
        );
        assert_eq!(
            fs.compgen(4, &["subcommand", "-times", "2", "a"]).unwrap(),
            "dst-candidates"
        );
        assert_eq!(
            fs.compgen(4, &["subcommand", "a", "b", "c", "d"]).unwrap(),
            "dst-candidates"
        );

        let seen = seen.borrow();
        assert_eq!(seen[0].word, "s");
        assert_eq!(seen[1].word, "");
        assert_eq!(
            seen[1].flags,
            [("times".to_string(), "2".to_string())]
        );
        assert_eq!(seen[3].word, "d");
    }

    #[test]
    fn positional_past_last_argument_is_empty() {
        let mut fs = FlagSet::new("cmd");
        fs.string_arg("only", Cardinality::Exact(1), "")
            .unwrap()
            .set_completion(candidates(["x"]));
        assert_eq!(fs.compgen(2, &["cmd", "a"]).unwrap(), "");
        assert_eq!(fs.compgen(1, &["cmd", ""]).unwrap(), "x");
    }

    #[test]
    fn positional_with_broken_prefix_is_empty() {
        let (fs, seen) = sample();
        assert_eq!(fs.compgen(3, &["subcommand", "-bogus", "a"]).unwrap(), "");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn fixed_slots_absorb_their_cardinality() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut fs = FlagSet::new("cmd");
        fs.string("mode", "", "").unwrap();
        fs.int_arg("pair", Cardinality::Exact(2), "")
            .unwrap()
            .set_completion(recorder(&seen, "A"));
        fs.string_arg("label", Cardinality::Optional, "")
            .unwrap()
            .set_completion(recorder(&seen, "B"));
        fs.string_arg("out", Cardinality::Exact(1), "")
            .unwrap()
            .set_completion(recorder(&seen, "C"));

        let line = ["cmd", "1", "2", "x", "y", "z"];
        let expected = ["A", "A", "B", "C", ""];
        for (offset, want) in expected.iter().enumerate() {
            let cword = offset + 1;
            assert_eq!(
                fs.compgen(cword, &line[..=cword]).unwrap(),
                *want,
                "cursor at {cword}"
            );
        }

        // Cursor in the middle of the line: later words do not count.
        seen.borrow_mut().clear();
        let line = ["cmd", "-mode", "fast", "1", "2", "x", "y", "z"];
        assert_eq!(fs.compgen(5, &line).unwrap(), "B");
        assert_eq!(fs.compgen(3, &line).unwrap(), "A");
        let seen = seen.borrow();
        assert_eq!(seen[0].word, "x");
        assert_eq!(seen[1].word, "1");
        assert_eq!(seen[1].flags, [("mode".to_string(), "fast".to_string())]);
        assert_eq!(seen[1].words, line);
    }

    #[test]
    fn terminator_sends_cursor_to_positionals() {
        let mut fs = FlagSet::new("cmd");
        fs.bool("force", false, "").unwrap();
        fs.string_arg("file", Cardinality::Exact(1), "")
            .unwrap()
            .set_completion(candidates(["a.txt", "b.txt", "-x.txt"]));

        assert_eq!(fs.compgen(2, &["cmd", "--"]).unwrap(), "a.txt b.txt -x.txt");
        assert_eq!(fs.compgen(2, &["cmd", "--", "-"]).unwrap(), "-x.txt");
        assert_eq!(
            fs.compgen(3, &["cmd", "-force", "--", "a"]).unwrap(),
            "a.txt"
        );
        assert_eq!(fs.compgen(3, &["cmd", "--", "-force"]).unwrap(), "");

        // Without `--`, a dash at the cursor still means a flag name.
        assert_eq!(fs.compgen(1, &["cmd", "-"]).unwrap(), "-force");
        // A lone `-` is a positional, not a flag waiting for a value.
        assert_eq!(fs.compgen(2, &["cmd", "-"]).unwrap(), "");
    }

    #[test]
    fn previous_word_strips_at_most_two_dashes() {
        let mut fs = FlagSet::new("cmd");
        fs.string("x", "", "")
            .unwrap()
            .set_completion(candidates(["one", "two"]));
        assert_eq!(fs.compgen(2, &["cmd", "-x"]).unwrap(), "one two");
        assert_eq!(fs.compgen(2, &["cmd", "--x"]).unwrap(), "one two");
        assert_eq!(fs.compgen(2, &["cmd", "---x"]).unwrap(), "");

        assert_eq!(pending_flag("---x"), Some("-x"));
        assert_eq!(pending_flag("--"), None);
        assert_eq!(pending_flag("-"), None);
        assert_eq!(pending_flag("-x=1"), None);
        assert_eq!(pending_flag("x"), None);
    }

    #[test]
    fn out_of_range_cursor_is_empty() {
        let (fs, _) = sample();
        assert_eq!(fs.compgen(0, &["subcommand"]).unwrap(), "");
        assert_eq!(fs.compgen(4, &["subcommand", "a"]).unwrap(), "");
    }

    #[test]
    fn compgen_is_idempotent() {
        let (fs, _) = sample();
        let words = ["subcommand", "-times", "2", "a", "b"];
        let first = fs.compgen(4, &words).unwrap();
        for _ in 0..3 {
            assert_eq!(fs.compgen(4, &words).unwrap(), first);
        }
        assert_eq!(fs.value("times"), Some(&crate::Value::Float(1.0)));
    }

    #[test]
    fn callback_errors_propagate() {
        let mut fs = FlagSet::new("cmd");
        fs.string("name", "", "")
            .unwrap()
            .set_completion(|_| Err("lookup failed".into()));
        match fs.compgen(2, &["cmd", "-name"]) {
            Err(Error::Completion { subject, source }) => {
                assert_eq!(subject, Subject::Flag("name".to_string()));
                assert_eq!(source.to_string(), "lookup failed");
            }
            other => panic!("expected Completion error, got: {other:?}"),
        }
    }

    #[test]
    fn candidates_filter_by_prefix() {
        let mut fs = FlagSet::new("cmd");
        fs.string("format", "plain", "")
            .unwrap()
            .set_completion(candidates(["plain", "json", "jsonl"]));
        assert_eq!(fs.compgen(2, &["cmd", "-format"]).unwrap(), "plain json jsonl");
        assert_eq!(fs.compgen(2, &["cmd", "-format", "js"]).unwrap(), "json jsonl");
    }
}

//! Usage text rendering.

use crate::flagset::FlagSet;
use crate::value::Value;

impl FlagSet {
    /// Full usage text: header line, one block per flag, one per argument.
    pub fn usage(&self) -> String {
        let mut out = format!("usage: {}\n", self.short_usage());
        out.push_str(&self.flag_defaults());
        out.push_str(&self.arg_defaults());
        out
    }

    /// `name [options] <arguments>`
    pub fn short_usage(&self) -> String {
        let mut out = self.name.clone();
        if !self.flags.is_empty() {
            out.push_str(" [options]");
        }
        for argument in &self.arguments {
            out.push(' ');
            out.push_str(&argument.short_usage());
        }
        out
    }

    pub fn flag_defaults(&self) -> String {
        let mut out = String::new();
        for flag in self.flags.values() {
            let mut left = format!("-{}", flag.name());
            let type_name = flag.kind().type_name();
            if !type_name.is_empty() {
                left.push(' ');
                left.push_str(type_name);
            }

            let mut help = flag.usage().to_string();
            let default = flag.default_value();
            if !default.is_zero() {
                match default {
                    Value::Str(s) => help.push_str(&format!(" (default {s:?})")),
                    other => help.push_str(&format!(" (default {other})")),
                }
            }
            push_entry(&mut out, &left, &help);
        }
        out
    }

    pub fn arg_defaults(&self) -> String {
        let mut out = String::new();
        for argument in &self.arguments {
            let left = format!(
                "{} {}",
                argument.short_usage(),
                argument.value_type().name()
            );
            push_entry(&mut out, &left, argument.usage());
        }
        out
    }
}

// Two-space indent; short entries keep their help on the same line.
fn push_entry(out: &mut String, left: &str, help: &str) {
    let head = format!("  {left}");
    out.push_str(&head);
    if head.len() <= 4 {
        out.push('\t');
    } else {
        out.push_str("\n    \t");
    }
    out.push_str(&help.replace('\n', "\n    \t"));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use crate::argument::Cardinality;
    use crate::flagset::FlagSet;

    #[test]
    fn usage_lists_flags_with_defaults() {
        let mut fs = FlagSet::new("subcommand");
        fs.float("times", 1.0, "Number help string").unwrap();
        assert_eq!(
            fs.usage(),
            "usage: subcommand [options]\n  -times float\n    \tNumber help string (default 1)\n"
        );
    }

    #[test]
    fn zero_defaults_are_hidden_and_strings_quoted() {
        let mut fs = FlagSet::new("cmd");
        fs.int("count", 0, "How many").unwrap();
        fs.string("name", "bob", "Who").unwrap();
        fs.bool("v", false, "Verbose").unwrap();
        fs.ints("n", "Numbers").unwrap();

        let text = fs.flag_defaults();
        assert!(text.contains("  -count int\n    \tHow many\n"), "{text}");
        assert!(text.contains("  -name string\n    \tWho (default \"bob\")\n"), "{text}");
        assert!(text.contains("  -v\tVerbose\n"), "{text}");
        assert!(text.contains("  -n ints\n    \tNumbers\n"), "{text}");
    }

    #[test]
    fn short_usage_and_argument_lines() {
        let mut fs = FlagSet::new("cp");
        fs.string_arg("src", Cardinality::OneOrMore, "Files to copy")
            .unwrap();
        assert_eq!(fs.short_usage(), "cp src [src...]");

        let mut fs = FlagSet::new("tool");
        fs.bool("force", false, "").unwrap();
        fs.int_arg("n", Cardinality::Exact(2), "Two numbers").unwrap();
        fs.string_arg("label", Cardinality::Optional, "").unwrap();
        fs.float_arg("rest", Cardinality::ZeroOrMore, "").unwrap();
        assert_eq!(
            fs.short_usage(),
            "tool [options] n n [label] [rest...]"
        );

        let text = fs.usage();
        assert!(text.starts_with("usage: tool [options] n n [label] [rest...]\n"));
        assert!(text.contains("  n n int\n    \tTwo numbers\n"), "{text}");
        assert!(text.contains("  [rest...] float\n"), "{text}");
    }

    #[test]
    fn multiline_help_is_indented() {
        let mut fs = FlagSet::new("cmd");
        fs.string("mode", "", "first\nsecond").unwrap();
        assert_eq!(
            fs.flag_defaults(),
            "  -mode string\n    \tfirst\n    \tsecond\n"
        );
    }
}

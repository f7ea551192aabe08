//! Tokeniser for a single SCPI command line.

use std::mem;

/// One command line split into its protocol fields.
///
/// Parsing is total: every input yields a value, and unrecognised shapes are
/// left for the dispatcher to reject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScpiLine {
    /// Text before the first `:`; empty when the line has no colon.
    pub subject: String,
    /// Command keyword, with any IEEE 488.2 `*` prefix removed.
    pub command: String,
    /// Whether a `?` appeared anywhere in the line.
    pub query: bool,
    /// Arguments following the command, split on `,`.
    pub args: Vec<String>,
}

impl ScpiLine {
    /// Tokenises `line` into subject, command, query flag and arguments.
    ///
    /// The first `:` separates the subject, which is trimmed like every other
    /// token. Later colons stay inside the command (`TRIG:EDGE:DIR` yields
    /// subject `TRIG`, command `EDGE:DIR`).
    /// Whitespace ends the command token, commas separate arguments, runs of
    /// delimiters collapse, and every `?` is dropped after setting the query
    /// flag.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let (subject, rest) = line.split_once(':').unwrap_or(("", line));
        let mut parsed = Self {
            subject: subject.replace('?', "").trim().to_owned(),
            query: line.contains('?'),
            ..Self::default()
        };
        let mut token = String::new();

        for ch in rest.chars() {
            if ch == '?' {
                continue;
            }
            let ends_command = ch.is_whitespace() && parsed.command.is_empty();
            if !ends_command && ch != ',' {
                token.push(ch);
                continue;
            }
            parsed.push_token(&mut token);
        }
        parsed.push_token(&mut token);

        if let Some(stripped) = parsed.command.strip_prefix('*') {
            parsed.command = stripped.to_owned();
        }
        parsed
    }

    /// Returns the single argument of a one-argument command.
    #[must_use]
    pub fn single_arg(&self) -> Option<&str> {
        match self.args.as_slice() {
            [arg] => Some(arg.as_str()),
            _ => None,
        }
    }

    fn push_token(&mut self, token: &mut String) {
        let value = mem::take(token);
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        if self.command.is_empty() {
            self.command = value.to_owned();
        } else {
            self.args.push(value.to_owned());
        }
    }
}

//! Translatable messages and structured command errors.
//!
//! A [`Message`] is a translation key plus positional arguments. Hosts with a
//! localisation table render the key themselves; everyone else gets the
//! English fallback through `Display`.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// Translation key for an unknown or incomplete command.
pub const UNKNOWN_COMMAND: &str = "command.unknown.command";
/// Translation key for an unknown or invalid argument.
pub const UNKNOWN_ARGUMENT: &str = "command.unknown.argument";
/// Translation key for the fork limit.
pub const FORK_LIMIT: &str = "command.forkLimit";
/// Translation key for a macro function called without arguments.
pub const MISSING_ARGUMENTS: &str = "commands.function.error.missing_arguments";
/// Translation key for a macro function called without one of its arguments.
pub const MISSING_ARGUMENT: &str = "commands.function.error.missing_argument";
/// Translation key for a macro line that failed to parse after substitution.
pub const INSTANTIATION_PARSE: &str = "commands.function.error.parse";
/// Translation key for an unknown function id.
pub const UNKNOWN_FUNCTION: &str = "arguments.function.unknown";

const FALLBACKS: &[(&str, &str)] = &[
    (UNKNOWN_COMMAND, "Unknown or incomplete command, see below for error"),
    (UNKNOWN_ARGUMENT, "Incorrect argument for command"),
    (FORK_LIMIT, "Maximum number of contexts (%s) reached"),
    (
        MISSING_ARGUMENTS,
        "Can't call macro function %s without arguments",
    ),
    (MISSING_ARGUMENT, "Function %s is missing argument %s"),
    (
        INSTANTIATION_PARSE,
        "While instantiating macro %s: Command '%s' caused error: %s",
    ),
    (UNKNOWN_FUNCTION, "Unknown function %s"),
];

/// A translatable message: a key and its positional arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    key: Cow<'static, str>,
    args: Vec<String>,
}

impl Message {
    /// Creates a translatable message.
    #[must_use]
    pub fn translatable(key: impl Into<Cow<'static, str>>, args: Vec<String>) -> Self {
        Self {
            key: key.into(),
            args,
        }
    }

    /// Creates a message that is shown verbatim.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::translatable("%s", vec![text.into()])
    }

    /// Returns the translation key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the positional arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Renders the English fallback for this message.
    ///
    /// Each `%s` in the template consumes the next argument; unknown keys
    /// render as the key followed by its arguments.
    #[must_use]
    pub fn render(&self) -> String {
        let template = FALLBACKS
            .iter()
            .find(|(key, _)| *key == self.key)
            .map(|(_, template)| *template)
            .or_else(|| (self.key == "%s").then_some("%s"));

        let Some(template) = template else {
            if self.args.is_empty() {
                return self.key.to_string();
            }
            return format!("{} [{}]", self.key, self.args.join(", "));
        };

        let mut out = String::with_capacity(template.len());
        let mut args = self.args.iter();
        let mut pieces = template.split("%s").peekable();
        while let Some(piece) = pieces.next() {
            out.push_str(piece);
            if pieces.peek().is_some() {
                out.push_str(args.next().map_or("", String::as_str));
            }
        }
        out
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A structured failure of one command against one source.
///
/// Command errors never escape the engine; they are handed to the source that
/// ran the command.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub struct CommandError {
    message: Message,
    input: Option<String>,
    cursor: Option<usize>,
}

/// Result of running one command or redirect.
pub type CommandResult<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Creates an error from a message.
    #[must_use]
    pub fn new(message: Message) -> Self {
        Self {
            message,
            input: None,
            cursor: None,
        }
    }

    /// Creates a plain-text error.
    #[must_use]
    pub fn invalid(text: impl Into<String>) -> Self {
        Self::new(Message::literal(text))
    }

    /// Creates an "unknown command" error pointing at `input`.
    #[must_use]
    pub fn unknown_command(input: impl Into<String>) -> Self {
        let input = input.into();
        let cursor = input.len();
        Self::new(Message::translatable(UNKNOWN_COMMAND, Vec::new())).with_input(input, cursor)
    }

    /// Creates an "incorrect argument" error at `cursor` in `input`.
    #[must_use]
    pub fn unknown_argument(input: impl Into<String>, cursor: usize) -> Self {
        Self::new(Message::translatable(UNKNOWN_ARGUMENT, Vec::new())).with_input(input, cursor)
    }

    /// Creates the error reported when one fork step produces too many sources.
    #[must_use]
    pub fn fork_limit(limit: usize) -> Self {
        Self::new(Message::translatable(FORK_LIMIT, vec![limit.to_string()]))
    }

    /// Attaches the offending input and cursor position.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>, cursor: usize) -> Self {
        self.input = Some(input.into());
        self.cursor = Some(cursor);
        self
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Returns the offending input, if known.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Returns the cursor into the offending input, if known.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Returns true if this error is the fork limit.
    #[must_use]
    pub fn is_fork_limit(&self) -> bool {
        self.message.key() == FORK_LIMIT
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let (Some(input), Some(cursor)) = (&self.input, self.cursor) {
            // Ten characters of context before the cursor.
            let end = floor_char_boundary(input, cursor);
            let start = floor_char_boundary(input, end.saturating_sub(10));
            let prefix = if start > 0 { "..." } else { "" };
            write!(f, " at position {cursor}: {prefix}{}<--[HERE]", &input[start..end])?;
        }
        Ok(())
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

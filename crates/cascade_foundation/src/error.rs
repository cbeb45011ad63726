//! Error types for the Cascade system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Per-command failures are not represented here: those are [`CommandError`]s
//! and are reported to the source that issued the command. An [`Error`] is
//! either raised while compiling or instantiating a function, or it aborts a
//! whole run.
//!
//! [`CommandError`]: crate::CommandError

use std::fmt;

use thiserror::Error;

use crate::message::Message;

/// The main error type for Cascade operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a semantic limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Creates a function instantiation error.
    #[must_use]
    pub fn instantiation(message: Message) -> Self {
        Self::new(ErrorKind::Instantiation(message))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this error aborted a run because a limit was reached.
    #[must_use]
    pub fn is_limit(&self) -> bool {
        matches!(self.kind, ErrorKind::LimitExceeded(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The last line of a function source ended with a continuation backslash.
    #[error("line continuation at end of file (line {line})")]
    LineContinuationAtEnd {
        /// Line number (1-indexed) where the dangling continuation started.
        line: usize,
    },

    /// A function line started with a forward slash.
    #[error("unknown or invalid command '{command}' on line {line} ({hint})")]
    InvalidLinePrefix {
        /// The offending logical line.
        command: String,
        /// Line number (1-indexed).
        line: usize,
        /// What the author most likely meant.
        hint: LinePrefixHint,
    },

    /// A logical function line exceeded the maximum command length.
    #[error("command too long: {length} characters, contents: {excerpt}...")]
    CommandTooLong {
        /// Length of the line in characters.
        length: usize,
        /// The truncated start of the line.
        excerpt: String,
    },

    /// A command on a function line could not be parsed.
    #[error("whilst parsing command on line {line}: {message}")]
    LineParse {
        /// Line number (1-indexed).
        line: usize,
        /// The parser's diagnostic.
        message: String,
    },

    /// A macro line could not be turned into a template.
    #[error("can't parse function line {line}: '{text}': {reason}")]
    MacroLine {
        /// Line number (1-indexed).
        line: usize,
        /// The sigil-stripped line.
        text: String,
        /// Why the template was rejected.
        reason: String,
    },

    /// A function could not be instantiated with the given arguments.
    #[error("{0}")]
    Instantiation(Message),

    /// Semantic limit exceeded (kill switch triggered).
    #[error("{0}")]
    LimitExceeded(SemanticLimit),

    /// Reading a source or configuration file failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// A configuration value was invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// What a line starting with `/` most likely was meant to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePrefixHint {
    /// The line starts with `//`; the author wanted a comment.
    Comment,
    /// The line starts with a single `/` followed by this command name.
    LeadingSlash(String),
}

impl fmt::Display for LinePrefixHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment => write!(
                f,
                "if you intended to make a comment, use '#' not '//'"
            ),
            Self::LeadingSlash(name) => write!(
                f,
                "did you mean '{name}'? Do not use a preceding forwards slash."
            ),
        }
    }
}

/// Semantic limits (kill switches) that can be exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticLimit {
    /// The run charged more cost units than its ceiling allows.
    CommandCost {
        /// The configured limit.
        limit: usize,
    },
    /// More entries were pending on the run queue than allowed.
    QueueOverflow {
        /// The configured limit.
        limit: usize,
    },
}

impl SemanticLimit {
    /// Returns the configured value of the limit that was hit.
    #[must_use]
    pub fn limit(&self) -> usize {
        match self {
            Self::CommandCost { limit } | Self::QueueOverflow { limit } => *limit,
        }
    }
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandCost { limit } => {
                write!(f, "command limit ({limit}) reached")
            }
            Self::QueueOverflow { limit } => {
                write!(f, "command queue limit ({limit}) reached")
            }
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Function id or file the error came from.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Enclosing locations, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Adds an enclosing location.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  from {frame}")?;
            }
        }
        Ok(())
    }
}

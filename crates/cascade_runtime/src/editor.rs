//! Line editor abstraction for the REPL.
//!
//! The REPL reads through [`LineEditor`] so tests can feed it scripted input;
//! [`RustylineEditor`] is the terminal implementation.

use std::borrow::Cow;

use cascade_foundation::{Error, Result};
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line was read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D.
    Eof,
}

/// Abstraction over line editing.
pub trait LineEditor {
    /// Reads a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Reads a continuation line.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Adds a line to history.
    fn add_history(&mut self, line: &str);

    /// Replaces the words offered for completion.
    fn set_keywords(&mut self, keywords: Vec<String>);
}

/// Returns true if `input` needs no continuation line.
///
/// Input continues after a trailing backslash, or while a compound argument
/// has an unclosed `{` or `[` outside quotes.
#[must_use]
pub fn is_complete(input: &str) -> bool {
    if input.trim_end().ends_with('\\') {
        return false;
    }

    let mut depth = 0i32;
    let mut quote = None;
    let mut escape_next = false;
    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escape_next = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '{' | '[') => depth += 1,
            (None, '}' | ']') => depth -= 1,
            (None, _) => {}
        }
    }
    depth <= 0 && quote.is_none()
}

/// Command names and directives offered before any functions are loaded.
#[must_use]
pub fn default_keywords() -> Vec<String> {
    [
        "say", "counter", "fail", "execute", "return", "function", "trigger", "as", "if", "unless", "silent",
        "run", ":load", ":run", ":functions", ":trace", ":profile", ":limits", ":help", ":quit",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Helper for rustyline: completion, history hints, and continuation.
#[derive(Helper, Completer, Hinter, RLValidator)]
struct CascadeHelper {
    #[rustyline(Completer)]
    completer: CascadeCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Validator)]
    validator: ContinuationValidator,
}

impl Highlighter for CascadeHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let end = line.find(char::is_whitespace).unwrap_or(line.len());
        if end == 0 {
            return Cow::Borrowed(line);
        }
        let (head, rest) = line.split_at(end);
        let color = if head.starts_with(':') { "36" } else { "1" };
        Cow::Owned(format!("\x1b[{color}m{head}\x1b[0m{rest}"))
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, default: bool) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completes command words, directives, function ids, and `:load` paths.
struct CascadeCompleter {
    file_completer: FilenameCompleter,
    keywords: Vec<String>,
}

impl Completer for CascadeCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.starts_with(":load ") {
            return self.file_completer.complete(line, pos, ctx);
        }

        let start = line[..pos].rfind(|c: char| c.is_whitespace() || c == ',').map_or(0, |i| i + 1);
        let word = &line[start..pos];
        let candidates = self
            .keywords
            .iter()
            .filter(|kw| kw.starts_with(word))
            .map(|kw| Pair {
                display: kw.clone(),
                replacement: kw.clone(),
            })
            .collect();
        Ok((start, candidates))
    }
}

#[derive(Default)]
struct ContinuationValidator;

impl Validator for ContinuationValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if is_complete(ctx.input()) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

/// Line editor backed by rustyline.
pub struct RustylineEditor {
    editor: Editor<CascadeHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(|e| Error::internal(e.to_string()))?
            .build();

        let helper = CascadeHelper {
            completer: CascadeCompleter {
                file_completer: FilenameCompleter::new(),
                keywords: default_keywords(),
            },
            hinter: HistoryHinter::new(),
            validator: ContinuationValidator,
        };

        let mut editor = Editor::with_config(config).map_err(|e| Error::internal(e.to_string()))?;
        editor.set_helper(Some(helper));
        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::internal(e.to_string())),
        }
    }

    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        self.read_line(prompt)
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.keywords = keywords;
        }
    }
}

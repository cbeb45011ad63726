//! Cursor over command text.

use cascade_foundation::CommandError;

/// Reads words and values from a command line, tracking the byte position.
pub struct Reader<'src> {
    /// Full command text.
    source: &'src str,
    /// Current byte offset in `source`.
    position: usize,
}

impl<'src> Reader<'src> {
    /// Creates a reader at the start of `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self { source, position: 0 }
    }

    /// Returns the full text.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Returns the byte offset of the cursor.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the unread text.
    #[must_use]
    pub fn rest(&self) -> &'src str {
        &self.source[self.position..]
    }

    /// Returns true if nothing is left to read.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Returns the next character without consuming it.
    #[must_use]
    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes one character.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Consumes `c` if it is next.
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.position += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Skips spaces.
    pub fn skip_whitespace(&mut self) {
        while self.peek_char() == Some(' ') {
            self.position += 1;
        }
    }

    /// Reads up to the next space, then skips the spaces after it.
    pub fn read_word(&mut self) -> &'src str {
        let start = self.position;
        let len = self.rest().find(' ').unwrap_or(self.rest().len());
        self.position += len;
        let word = &self.source[start..self.position];
        self.skip_whitespace();
        word
    }

    /// Reads a word that must be present.
    ///
    /// # Errors
    ///
    /// Returns an "unknown command" error if the input is exhausted.
    pub fn expect_word(&mut self) -> Result<&'src str, CommandError> {
        if self.is_at_end() {
            return Err(self.incomplete());
        }
        Ok(self.read_word())
    }

    /// Consumes `keyword` followed by a space or the end of input.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.rest();
        let matches = rest.strip_prefix(keyword).is_some_and(|after| after.is_empty() || after.starts_with(' '));
        if matches {
            self.position += keyword.len();
            self.skip_whitespace();
        }
        matches
    }

    /// Reads a whole word as a number.
    ///
    /// # Errors
    ///
    /// Returns an "incorrect argument" error pointing at the word.
    pub fn read_number<T: std::str::FromStr>(&mut self) -> Result<T, CommandError> {
        let start = self.position;
        let word = self.expect_word()?;
        word.parse().map_err(|_| self.invalid_at(start))
    }

    /// Consumes and returns everything left.
    pub fn read_remaining(&mut self) -> &'src str {
        let rest = self.rest();
        self.position = self.source.len();
        rest
    }

    /// An "unknown or incomplete command" error for the whole input.
    #[must_use]
    pub fn incomplete(&self) -> CommandError {
        CommandError::unknown_command(self.source)
    }

    /// An "incorrect argument" error at the cursor.
    #[must_use]
    pub fn invalid(&self) -> CommandError {
        self.invalid_at(self.position)
    }

    /// An "incorrect argument" error at `position`.
    #[must_use]
    pub fn invalid_at(&self, position: usize) -> CommandError {
        CommandError::unknown_argument(self.source, position)
    }
}

//! Macro line templates: literal segments interleaved with `$(name)` variables.

use std::fmt;

/// A parsed macro line.
///
/// `segments[i]` precedes variable `i`; a trailing segment, if any, follows
/// the last variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringTemplate {
    segments: Vec<String>,
    variables: Vec<String>,
}

/// Why a macro line could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateError {
    /// `$(` without a closing `)`.
    Unterminated,
    /// A variable name with characters outside `[A-Za-z0-9_]`, or an empty one.
    InvalidName(String),
    /// A macro line with no variables at all.
    NoVariables,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unterminated => write!(f, "Unterminated macro variable"),
            Self::InvalidName(name) => write!(f, "Invalid macro variable name '{name}'"),
            Self::NoVariables => write!(f, "No variables in macro"),
        }
    }
}

impl std::error::Error for TemplateError {}

fn is_valid_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl StringTemplate {
    /// Parses a sigil-stripped macro line.
    ///
    /// A `$` not followed by `(` is literal text.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] for unterminated or invalid variables, and
    /// for lines without any variable.
    pub fn parse(input: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut variables = Vec::new();
        let mut start = 0;
        let mut search = 0;

        while let Some(offset) = input[search..].find('$') {
            let dollar = search + offset;
            if !input[dollar + 1..].starts_with('(') {
                search = dollar + 1;
                continue;
            }
            segments.push(input[start..dollar].to_string());
            let name_start = dollar + 2;
            let close = input[name_start..]
                .find(')')
                .map(|o| name_start + o)
                .ok_or(TemplateError::Unterminated)?;
            let name = &input[name_start..close];
            if !is_valid_variable_name(name) {
                return Err(TemplateError::InvalidName(name.to_string()));
            }
            variables.push(name.to_string());
            start = close + 1;
            search = start;
        }

        if variables.is_empty() {
            return Err(TemplateError::NoVariables);
        }
        if start != input.len() {
            segments.push(input[start..].to_string());
        }
        Ok(Self {
            segments,
            variables,
        })
    }

    /// Returns the variable names, in order of appearance.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Fills the variables with `values`, one per variable in order.
    #[must_use]
    pub fn substitute(&self, values: &[&str]) -> String {
        let mut out = String::new();
        for (segment, value) in self.segments.iter().zip(values) {
            out.push_str(segment);
            out.push_str(value);
        }
        if self.segments.len() > self.variables.len() {
            if let Some(tail) = self.segments.last() {
                out.push_str(tail);
            }
        }
        out
    }
}

impl fmt::Display for StringTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (segment, variable) in self.segments.iter().zip(&self.variables) {
            write!(f, "{segment}$({variable})")?;
        }
        if self.segments.len() > self.variables.len() {
            if let Some(tail) = self.segments.last() {
                f.write_str(tail)?;
            }
        }
        Ok(())
    }
}

//! Compound argument syntax for macro function calls.
//!
//! ```text
//! {name:"Steve", count:3, ratio:0.5d, tags:[a,b], nested:{x:1b}}
//! ```
//!
//! Numbers take an optional type suffix: `b` byte, `s` short, `L` long,
//! `f` float, `d` double. Plain integers are ints and plain decimals are
//! doubles. `true` and `false` are bytes. Any other bare word is a string.

use cascade_foundation::{ArgRecord, ArgValue, CommandError, Message};
use thiserror::Error;

use crate::reader::Reader;

/// Why compound text was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnbtError {
    /// Expected a `{`.
    #[error("Expected '{{'")]
    ExpectedCompound,
    /// Expected a key.
    #[error("Expected key")]
    ExpectedKey,
    /// Expected a `:` after a key.
    #[error("Expected ':'")]
    ExpectedColon,
    /// Expected a value.
    #[error("Expected value")]
    ExpectedValue,
    /// Expected `,` or a closing bracket.
    #[error("Expected ',' or '{0}'")]
    ExpectedSeparator(char),
    /// A quoted string was not closed.
    #[error("Unterminated quoted string")]
    UnterminatedString,
}

impl SnbtError {
    fn at(self, reader: &Reader<'_>) -> CommandError {
        CommandError::new(Message::literal(self.to_string())).with_input(reader.source(), reader.position())
    }
}

/// Parses a compound at the reader's cursor.
///
/// # Errors
///
/// Returns a command error pointing at the offending character.
pub fn parse_compound(reader: &mut Reader<'_>) -> Result<ArgRecord, CommandError> {
    reader.skip_whitespace();
    if !reader.eat('{') {
        return Err(SnbtError::ExpectedCompound.at(reader));
    }
    let mut record = ArgRecord::new();
    reader.skip_whitespace();
    if reader.eat('}') {
        return Ok(record);
    }
    loop {
        reader.skip_whitespace();
        let key = match reader.peek_char() {
            Some('"' | '\'') => read_quoted(reader)?,
            _ => {
                let word = read_bare(reader);
                if word.is_empty() {
                    return Err(SnbtError::ExpectedKey.at(reader));
                }
                word.to_string()
            }
        };
        reader.skip_whitespace();
        if !reader.eat(':') {
            return Err(SnbtError::ExpectedColon.at(reader));
        }
        let value = parse_value(reader)?;
        record.insert(key, value);

        reader.skip_whitespace();
        if reader.eat('}') {
            return Ok(record);
        }
        if !reader.eat(',') {
            return Err(SnbtError::ExpectedSeparator('}').at(reader));
        }
    }
}

fn parse_value(reader: &mut Reader<'_>) -> Result<ArgValue, CommandError> {
    reader.skip_whitespace();
    match reader.peek_char() {
        Some('{') => parse_compound(reader).map(ArgValue::Compound),
        Some('[') => parse_list(reader),
        Some('"' | '\'') => read_quoted(reader).map(ArgValue::String),
        _ => {
            let word = read_bare(reader);
            if word.is_empty() {
                return Err(SnbtError::ExpectedValue.at(reader));
            }
            Ok(classify(word))
        }
    }
}

fn parse_list(reader: &mut Reader<'_>) -> Result<ArgValue, CommandError> {
    reader.eat('[');
    let mut items = Vec::new();
    reader.skip_whitespace();
    if reader.eat(']') {
        return Ok(ArgValue::List(items));
    }
    loop {
        items.push(parse_value(reader)?);
        reader.skip_whitespace();
        if reader.eat(']') {
            return Ok(ArgValue::List(items));
        }
        if !reader.eat(',') {
            return Err(SnbtError::ExpectedSeparator(']').at(reader));
        }
    }
}

fn read_quoted(reader: &mut Reader<'_>) -> Result<String, CommandError> {
    let Some(quote) = reader.advance() else {
        return Err(SnbtError::ExpectedValue.at(reader));
    };
    let mut text = String::new();
    loop {
        match reader.advance() {
            None => return Err(SnbtError::UnterminatedString.at(reader)),
            Some('\\') => match reader.advance() {
                Some(c) => text.push(c),
                None => return Err(SnbtError::UnterminatedString.at(reader)),
            },
            Some(c) if c == quote => return Ok(text),
            Some(c) => text.push(c),
        }
    }
}

fn read_bare<'src>(reader: &mut Reader<'src>) -> &'src str {
    let rest = reader.rest();
    let len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')))
        .unwrap_or(rest.len());
    for _ in rest[..len].chars() {
        reader.advance();
    }
    &rest[..len]
}

fn classify(word: &str) -> ArgValue {
    match word {
        "true" => return ArgValue::Byte(1),
        "false" => return ArgValue::Byte(0),
        _ => {}
    }

    let (body, suffix) = match word.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() && i > 0 => (&word[..i], Some(c.to_ascii_lowercase())),
        _ => (word, None),
    };
    let numeric = match suffix {
        Some(_) if !is_decimal(body) => None,
        Some('b') => body.parse().ok().map(ArgValue::Byte),
        Some('s') => body.parse().ok().map(ArgValue::Short),
        Some('l') => body.parse().ok().map(ArgValue::Long),
        Some('f') => body.parse().ok().map(ArgValue::Float),
        Some('d') => body.parse().ok().map(ArgValue::Double),
        Some(_) => None,
        None if is_integer(word) => word.parse().ok().map(ArgValue::Int),
        None if is_decimal(word) => word.parse().ok().map(ArgValue::Double),
        None => None,
    };
    numeric.unwrap_or_else(|| ArgValue::String(word.to_string()))
}

fn is_integer(word: &str) -> bool {
    let digits = word.strip_prefix(|c| c == '-' || c == '+').unwrap_or(word);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_decimal(word: &str) -> bool {
    let digits = word.strip_prefix(|c| c == '-' || c == '+').unwrap_or(word);
    digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}

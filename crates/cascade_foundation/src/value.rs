//! Structured argument values for macro functions.
//!
//! Macro functions are invoked with an [`ArgRecord`]: a named map of typed
//! values. Each parameter value is turned into text with
//! [`ArgValue::to_macro_string`] before being substituted into a template.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A typed argument value.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArgValue {
    /// 8-bit integer.
    Byte(i8),
    /// 16-bit integer.
    Short(i16),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Text.
    String(String),
    /// Ordered list of values.
    List(Vec<ArgValue>),
    /// Nested record.
    Compound(ArgRecord),
}

impl ArgValue {
    /// Returns the text substituted into a macro template for this value.
    ///
    /// Integral values use plain decimal, floating values use
    /// [`format_decimal`], strings are inserted raw, and lists and records use
    /// their `Display` form.
    #[must_use]
    pub fn to_macro_string(&self) -> String {
        match self {
            Self::Byte(n) => n.to_string(),
            Self::Short(n) => n.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Long(n) => n.to_string(),
            Self::Float(n) => format_decimal(f64::from(*n)),
            Self::Double(n) => format_decimal(*n),
            Self::String(s) => s.clone(),
            Self::List(_) | Self::Compound(_) => self.to_string(),
        }
    }

    /// Returns the value as an integer, if it is integral.
    #[must_use]
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Byte(n) => Some(i64::from(*n)),
            Self::Short(n) => Some(i64::from(*n)),
            Self::Int(n) => Some(i64::from(*n)),
            Self::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a nested record.
    #[must_use]
    pub fn as_compound(&self) -> Option<&ArgRecord> {
        match self {
            Self::Compound(record) => Some(record),
            _ => None,
        }
    }
}

/// Formats a floating value with at most 15 fractional digits.
///
/// Trailing zeros and a trailing decimal point are dropped, so `1.0` becomes
/// `"1"`. The output never depends on the host locale.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let mut text = format!("{value:.15}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    text
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Compound(a), Self::Compound(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ArgValue {}

impl Hash for ArgValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Byte(n) => n.hash(state),
            Self::Short(n) => n.hash(state),
            Self::Int(n) => n.hash(state),
            Self::Long(n) => n.hash(state),
            Self::Float(n) => n.to_bits().hash(state),
            Self::Double(n) => n.to_bits().hash(state),
            Self::String(s) => s.hash(state),
            Self::List(items) => items.hash(state),
            Self::Compound(record) => record.hash(state),
        }
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(n) => write!(f, "{n}b"),
            Self::Short(n) => write!(f, "{n}s"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Long(n) => write!(f, "{n}L"),
            Self::Float(n) => write!(f, "{}f", format_decimal(f64::from(*n))),
            Self::Double(n) => write!(f, "{}d", format_decimal(*n)),
            Self::String(s) => write_quoted(f, s),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Compound(record) => write!(f, "{record}"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in text.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

impl From<i32> for ArgValue {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

impl From<i64> for ArgValue {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

// =============================================================================
// ArgRecord
// =============================================================================

/// A persistent, key-ordered record of named argument values.
///
/// Cloning is O(1); [`ArgRecord::with`] returns a new record sharing structure
/// with the original.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArgRecord(im::OrdMap<String, ArgValue>);

impl ArgRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(im::OrdMap::new())
    }

    /// Returns a new record with `key` set to `value`.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        Self(self.0.update(key.into(), value.into()))
    }

    /// Sets `key` to `value` in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Gets a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.0.get(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ArgValue)> {
        self.0.iter()
    }
}

impl fmt::Debug for ArgRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ArgRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if is_bare_key(key) {
                write!(f, "{key}")?;
            } else {
                write_quoted(f, key)?;
            }
            write!(f, ":{value}")?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for ArgRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

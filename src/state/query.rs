//! Query and alphabet types
//!
//! A query is the prefix submitted to the autocomplete endpoint. It is
//! addressed by symbol (char) position rather than byte offset so that
//! suggestions outside ASCII never split a code point.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A prefix submitted to the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Creates a query from its exact symbol sequence
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds the query made of the first `symbols` symbols of `source`
    ///
    /// Returns `None` when `source` has fewer symbols than requested.
    pub fn prefix_of(source: &str, symbols: usize) -> Option<Self> {
        match source.char_indices().nth(symbols) {
            Some((end, _)) => Some(Self(source[..end].to_string())),
            None if source.chars().count() == symbols => Some(Self(source.to_string())),
            None => None,
        }
    }

    /// Returns a new query with `symbol` appended
    pub fn extend(&self, symbol: char) -> Self {
        let mut value = String::with_capacity(self.0.len() + symbol.len_utf8());
        value.push_str(&self.0);
        value.push(symbol);
        Self(value)
    }

    /// Number of symbols in the query
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the single symbol when this query is exactly one symbol long
    pub fn single_symbol(&self) -> Option<char> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// First symbol of the query, if any
    pub fn leading_symbol(&self) -> Option<char> {
        self.0.chars().next()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The ordered set of symbols queries are built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Creates an alphabet from a string of symbols, in sweep order
    pub fn new(symbols: &str) -> Self {
        Self {
            symbols: symbols.chars().collect(),
        }
    }

    /// Position of `symbol` in sweep order
    pub fn position(&self, symbol: char) -> Option<usize> {
        self.symbols.iter().position(|&c| c == symbol)
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.position(symbol).is_some()
    }

    /// Symbols from position `start` through the end of the alphabet
    pub fn symbols_from(&self, start: usize) -> &[char] {
        self.symbols.get(start..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new("abcdefghijklmnopqrstuvwxyz")
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::search::config::MIN_QUERY_CHARS;

/// A classified search input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Prefix search over codes
    Code {
        /// The input reduced to digits and dots
        normalized: String,
    },
    /// Substring search over names
    Text {
        /// The whole trimmed input, lowercased
        phrase: String,
        /// Lowercased whitespace-separated words, all of which must match
        words: Vec<String>,
    },
}

/// Which kind of search a query runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Code,
    Text,
}

impl Query {
    /// Classify `raw`, or `None` when it is too short to search
    pub fn parse(raw: &str) -> Option<Self> {
        if is_searchable(raw) {
            Some(classify(raw))
        } else {
            None
        }
    }

    pub fn kind(&self) -> QueryKind {
        match self {
            Query::Code { .. } => QueryKind::Code,
            Query::Text { .. } => QueryKind::Text,
        }
    }
}

/// True when the trimmed input is long enough to run a search
pub fn is_searchable(raw: &str) -> bool {
    raw.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Classify an input as a code or a text query.
///
/// A code query contains a digit and either starts with a digit or
/// contains a dot. Callers check [`is_searchable`] first.
pub fn classify(raw: &str) -> Query {
    let trimmed = raw.trim();
    let has_digit = trimmed.chars().any(|c| c.is_ascii_digit());
    let starts_with_digit = trimmed.chars().next().is_some_and(|c| c.is_ascii_digit());

    if has_digit && (starts_with_digit || trimmed.contains('.')) {
        Query::Code {
            normalized: trimmed
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect(),
        }
    } else {
        let phrase = trimmed.to_lowercase();
        let words = phrase.split_whitespace().map(str::to_string).collect();
        Query::Text { phrase, words }
    }
}

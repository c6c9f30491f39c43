use regex::RegexBuilder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::search::config::MIN_HIGHLIGHT_WORD_CHARS;
use crate::search::query::Query;

/// A run of displayed text, marked when it matched the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub matched: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: false,
        }
    }

    fn marked(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: true,
        }
    }
}

/// Split `text` into plain and matched segments for `query`.
///
/// Code queries mark the normalized prefix when the text starts with it.
/// Text queries mark every case-insensitive occurrence of each word of at
/// least two characters.
pub fn highlight(text: &str, query: &Query) -> Vec<Segment> {
    let ranges = match query {
        Query::Code { normalized } => {
            if !normalized.is_empty() && text.starts_with(normalized.as_str()) {
                vec![0..normalized.len()]
            } else {
                Vec::new()
            }
        }
        Query::Text { words, .. } => word_ranges(text, words),
    };
    segments(text, &ranges)
}

fn word_ranges(text: &str, words: &[String]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    for word in words {
        if word.chars().count() < MIN_HIGHLIGHT_WORD_CHARS {
            continue;
        }
        let Ok(pattern) = RegexBuilder::new(&regex::escape(word))
            .case_insensitive(true)
            .build()
        else {
            tracing::debug!("Skipping highlight for word '{word}'");
            continue;
        };
        ranges.extend(pattern.find_iter(text).map(|m| m.range()));
    }
    merge(ranges)
}

/// Sort ranges and merge the ones that overlap or touch
fn merge(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|range| range.start);
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

fn segments(text: &str, ranges: &[Range<usize>]) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0;
    for range in ranges {
        if range.start > cursor {
            segments.push(Segment::plain(&text[cursor..range.start]));
        }
        segments.push(Segment::marked(&text[range.clone()]));
        cursor = range.end;
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}

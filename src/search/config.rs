//! # Search Configuration Module
//!
//! Constants controlling when a search runs, how much is shown, and where
//! deep links point.

/// Queries shorter than this (in characters, after trimming) do not run
pub const MIN_QUERY_CHARS: usize = 2;

/// Default number of rows shown before "show all"
pub const DEFAULT_DISPLAY_LIMIT: usize = 50;

/// Words shorter than this are not highlighted in text queries
pub const MIN_HIGHLIGHT_WORD_CHARS: usize = 2;

/// Base URL of the legal reference search the deep links point into
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://ivo.garant.ru/#/basesearch/";

/// Prefix put before a point name when searching the decree text
pub const POINT_SEARCH_PREFIX: &str = "ПП 1875";

/// Prefix put before a code when searching the classifier
pub const CODE_SEARCH_PREFIX: &str = "окпд2";

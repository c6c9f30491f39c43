//! # Search Module
//!
//! The lookup pipeline over the classifier dataset:
//! classify -> match -> filter -> rank, followed by display formatting.
//! Every stage is a pure function of its input and the read-only dataset.
//!
//! ## Key Components
//!
//! - [`query`] - Classifies raw input as a code prefix or a text phrase
//! - [`matcher`] - Linear scan producing the matching records in dataset order
//! - [`filter`] - Appendix facet filter
//! - [`ranker`] - Stable, query-dependent ordering
//! - [`references`] - Resolves appendix point ids into display units and links
//! - [`highlight`] - Marks the matched parts of codes and names
//! - [`pipeline`] - Composes the stages and memoizes the last match
//! - [`render`] - Plain-text rendering for the command line
//! - [`tools`] - MCP tool implementations
//! - [`config`] - Search constants

pub mod config;
pub mod filter;
pub mod highlight;
pub mod matcher;
pub mod outputs;
pub mod pipeline;
pub mod query;
pub mod ranker;
pub mod references;
pub mod render;
pub mod tools;

pub use filter::{FacetSet, filter};
pub use matcher::{match_positions, match_records};
pub use pipeline::{SearchOptions, SearchRequest, SearchSession, run_search};
pub use query::{Query, QueryKind, classify};
pub use ranker::rank;
pub use references::{LinkBuilder, ReferenceUnit, resolve_references};
pub use tools::SearchTools;

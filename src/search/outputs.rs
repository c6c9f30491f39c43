//! Output types for search tools
//!
//! These types are used as the return values from search tool methods.
//! They are serialized to JSON strings for the MCP protocol, and can be
//! deserialized in tests for type-safe validation.

use serde::{Deserialize, Serialize};

use crate::catalog::{Appendix, CoverageStats, Dataset};
use crate::catalog::storage::SnapshotMetadata;
use crate::search::filter::FacetSet;
use crate::search::highlight::Segment;
use crate::search::query::QueryKind;
use crate::search::references::ReferenceUnit;

/// Why a search shows no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// Fewer than two characters after trimming; nothing was searched
    QueryTooShort,
    /// The query matched no record
    NoMatches,
    /// Records matched but every facet is switched off
    NoFacetsSelected,
    /// Records matched but none cites an active appendix
    FilteredOut,
}

/// A record with its citations resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordDetails {
    pub code: String,
    pub name: String,
    /// Search link for the code
    pub code_url: String,
    pub appendix1: Vec<ReferenceUnit>,
    pub appendix2: Vec<ReferenceUnit>,
    pub appendix3: Vec<ReferenceUnit>,
}

/// One displayed search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRow {
    #[serde(flatten)]
    pub record: RecordDetails,
    pub code_segments: Vec<Segment>,
    pub name_segments: Vec<Segment>,
}

/// Output from search_codes operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchOutput {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<QueryKind>,
    pub facets: FacetSet,
    /// Matches before the facet filter
    pub total_matches: usize,
    /// Matches left after the facet filter
    pub filtered_count: usize,
    pub results: Vec<ResultRow>,
    /// True when rows were cut at the display limit
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<EmptyReason>,
    pub description: String,
}

impl SearchOutput {
    /// Output for input too short to search
    pub fn too_short(query: &str, facets: FacetSet) -> Self {
        Self {
            query: query.to_string(),
            kind: None,
            facets,
            total_matches: 0,
            filtered_count: 0,
            results: Vec::new(),
            truncated: false,
            empty_reason: Some(EmptyReason::QueryTooShort),
            description: String::new(),
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }

    /// Check if there are any results
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }
}

/// Output from get_record operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetRecordOutput {
    pub record: RecordDetails,
}

impl GetRecordOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from dataset_stats operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetStatsOutput {
    pub coverage: CoverageStats,
    pub appendix1_points: usize,
    pub appendix2_points: usize,
    pub appendix3_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotMetadata>,
}

impl DatasetStatsOutput {
    pub fn for_dataset(dataset: &Dataset, snapshot: Option<SnapshotMetadata>) -> Self {
        Self {
            coverage: dataset.coverage(),
            appendix1_points: dataset.table(Appendix::One).len(),
            appendix2_points: dataset.table(Appendix::Two).len(),
            appendix3_points: dataset.table(Appendix::Three).len(),
            snapshot,
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Error output for search tools
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchErrorOutput {
    pub error: String,
}

impl SearchErrorOutput {
    /// Create a new error output
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize error"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_output_serialization() {
        let output = SearchOutput {
            query: "13.96".to_string(),
            kind: Some(QueryKind::Code),
            facets: FacetSet::all(),
            total_matches: 1,
            filtered_count: 1,
            results: vec![ResultRow {
                record: RecordDetails {
                    code: "13.96.17".to_string(),
                    name: "Ткани узкие".to_string(),
                    code_url: "https://example.test/".to_string(),
                    appendix1: Vec::new(),
                    appendix2: vec![ReferenceUnit::NotFound {
                        point_id: "5".to_string(),
                    }],
                    appendix3: Vec::new(),
                },
                code_segments: Vec::new(),
                name_segments: Vec::new(),
            }],
            truncated: false,
            empty_reason: None,
            description: "Query \"13.96\" · found: 1".to_string(),
        };

        assert!(output.has_results());

        let json = output.to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"][0]["code"], "13.96.17");
        assert_eq!(value["results"][0]["appendix2"][0]["status"], "not_found");
        assert_eq!(value["kind"], "code");
        assert!(value.get("empty_reason").is_none());

        let deserialized: SearchOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output, deserialized);
    }

    #[test]
    fn test_too_short_output() {
        let output = SearchOutput::too_short("a", FacetSet::all());
        assert!(!output.has_results());
        let value: serde_json::Value = serde_json::from_str(&output.to_json()).unwrap();
        assert_eq!(value["empty_reason"], "query_too_short");
    }

    #[test]
    fn test_search_error_output() {
        let output = SearchErrorOutput::new("Search failed");
        let json = output.to_json();
        let deserialized: SearchErrorOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output, deserialized);
    }
}

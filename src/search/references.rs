use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::types::split_point_ids;
use crate::catalog::{Appendix, ReferenceTable};
use crate::search::config::{CODE_SEARCH_PREFIX, DEFAULT_SEARCH_BASE_URL, POINT_SEARCH_PREFIX};

/// One cited appendix point, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReferenceUnit {
    /// The point id is not in the appendix table
    NotFound { point_id: String },
    Resolved {
        point_id: String,
        name: String,
        /// Minimum share in percent, appendix 3 only
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quota: Option<f64>,
        /// Search link for the point in the decree text
        url: String,
    },
}

impl ReferenceUnit {
    pub fn point_id(&self) -> &str {
        match self {
            ReferenceUnit::NotFound { point_id } | ReferenceUnit::Resolved { point_id, .. } => {
                point_id
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ReferenceUnit::Resolved { .. })
    }
}

impl fmt::Display for ReferenceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceUnit::NotFound { point_id } => write!(f, "p.{point_id}?"),
            ReferenceUnit::Resolved {
                point_id,
                quota: Some(quota),
                ..
            } => write!(f, "p.{point_id} {quota}%"),
            ReferenceUnit::Resolved { point_id, .. } => write!(f, "p.{point_id}"),
        }
    }
}

/// Builds deep links into the legal reference search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base_url: String,
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_BASE_URL)
    }
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Link searching the decree for a point name
    pub fn point_url(&self, point_name: &str) -> String {
        self.search_url(&format!("{POINT_SEARCH_PREFIX} {point_name}"))
    }

    /// Link searching the classifier for a code
    pub fn code_url(&self, code: &str) -> String {
        self.search_url(&format!("{CODE_SEARCH_PREFIX} {code}"))
    }

    fn search_url(&self, text: &str) -> String {
        format!("{}{}", self.base_url, urlencoding::encode(text))
    }
}

/// Resolve a citation field against its appendix table with the default links
pub fn resolve_references(
    field: &str,
    table: &ReferenceTable,
    appendix: Appendix,
) -> Vec<ReferenceUnit> {
    resolve_references_with(field, table, appendix, &LinkBuilder::default())
}

/// Resolve every point id of a citation field, in field order.
///
/// Unknown ids become [`ReferenceUnit::NotFound`] rather than being dropped.
pub fn resolve_references_with(
    field: &str,
    table: &ReferenceTable,
    appendix: Appendix,
    links: &LinkBuilder,
) -> Vec<ReferenceUnit> {
    split_point_ids(field)
        .map(|point_id| match table.get(point_id) {
            None => ReferenceUnit::NotFound {
                point_id: point_id.to_string(),
            },
            Some(point) => ReferenceUnit::Resolved {
                point_id: point_id.to_string(),
                name: point.name.clone(),
                quota: point.quota.filter(|_| appendix.has_quota()),
                url: links.point_url(&point.name),
            },
        })
        .collect()
}

use std::sync::Arc;
use tokio::sync::Mutex;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::storage::SnapshotMetadata;
use crate::catalog::{Appendix, Dataset};
use crate::search::filter::FacetSet;
use crate::search::outputs::{DatasetStatsOutput, GetRecordOutput, SearchErrorOutput};
use crate::search::pipeline::{
    SearchOptions, SearchRequest, SearchSession, record_details, run_search,
};
use crate::util::deserialize_optional_bool;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchCodesParams {
    #[schemars(
        description = "An OKPD2 code prefix (e.g. '13.96') or words from the product name (e.g. 'медицинская техника')"
    )]
    pub query: String,
    #[schemars(description = "Keep records citing appendix 1 (prohibitions). Defaults to true")]
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub appendix1: Option<bool>,
    #[schemars(description = "Keep records citing appendix 2 (restrictions). Defaults to true")]
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub appendix2: Option<bool>,
    #[schemars(
        description = "Keep records citing appendix 3 (advantages with quotas). Defaults to true"
    )]
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub appendix3: Option<bool>,
    #[schemars(description = "Return every match instead of the first 50")]
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub show_all: Option<bool>,
}

impl SearchCodesParams {
    /// Apply the explicit appendix switches on top of `defaults`
    pub fn facets(&self, defaults: FacetSet) -> FacetSet {
        let mut facets = defaults;
        for (appendix, value) in [
            (Appendix::One, self.appendix1),
            (Appendix::Two, self.appendix2),
            (Appendix::Three, self.appendix3),
        ] {
            if let Some(active) = value {
                facets.set(appendix, active);
            }
        }
        facets
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetRecordParams {
    #[schemars(description = "The exact OKPD2 code, e.g. '13.96.17.130'")]
    pub code: String,
}

/// Lookup tools over one loaded dataset
#[derive(Debug, Clone)]
pub struct SearchTools {
    dataset: Arc<Dataset>,
    session: Arc<Mutex<SearchSession>>,
    options: Arc<SearchOptions>,
    default_facets: FacetSet,
    snapshot: Option<SnapshotMetadata>,
}

impl SearchTools {
    pub fn new(
        dataset: Arc<Dataset>,
        options: SearchOptions,
        default_facets: FacetSet,
        snapshot: Option<SnapshotMetadata>,
    ) -> Self {
        Self {
            dataset,
            session: Arc::new(Mutex::new(SearchSession::new())),
            options: Arc::new(options),
            default_facets,
            snapshot,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Run a search; facet-only changes reuse the previous match
    pub async fn search_codes(&self, params: SearchCodesParams) -> String {
        let request = SearchRequest::new(params.query.clone())
            .with_facets(params.facets(self.default_facets))
            .show_all(params.show_all.unwrap_or(false));

        let output = {
            let mut session = self.session.lock().await;
            run_search(&self.dataset, &mut session, &request, &self.options)
        };

        tracing::debug!(
            "search_codes {:?}: {} of {} matches",
            output.query,
            output.filtered_count,
            output.total_matches
        );
        output.to_json()
    }

    /// Look up one record by its exact code
    pub async fn get_record(&self, params: GetRecordParams) -> String {
        let code = params.code.trim();
        if code.is_empty() {
            return SearchErrorOutput::new("Code must not be empty").to_json();
        }

        match self.dataset.find_by_code(code) {
            Some(record) => GetRecordOutput {
                record: record_details(&self.dataset, record, &self.options.links),
            }
            .to_json(),
            None => SearchErrorOutput::new(format!("Code not found: {code}")).to_json(),
        }
    }

    /// Coverage of the dataset by the three appendices
    pub async fn dataset_stats(&self) -> String {
        DatasetStatsOutput::for_dataset(&self.dataset, self.snapshot.clone()).to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SearchCodesParams {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_facets_default_to_all() {
        let params = parse(r#"{"query": "13.96"}"#);
        assert_eq!(params.facets(FacetSet::all()), FacetSet::all());
        assert_eq!(params.show_all, None);
    }

    #[test]
    fn test_explicit_switches_override_defaults() {
        let params = parse(r#"{"query": "13.96", "appendix1": false, "appendix3": "no"}"#);
        assert_eq!(
            params.facets(FacetSet::all()),
            FacetSet::from_appendices([Appendix::Two])
        );

        let params = parse(r#"{"query": "13.96", "appendix1": true}"#);
        assert_eq!(
            params.facets(FacetSet::none()),
            FacetSet::from_appendices([Appendix::One])
        );
    }
}

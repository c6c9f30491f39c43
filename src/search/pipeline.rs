//! Composition of the search stages.
//!
//! `rank(filter(match(dataset, classify(q)), facets), classify(q))`, plus
//! the display cap, highlighting and reference resolution for the rows
//! that are shown. The match for the latest query string is kept in a
//! [`SearchSession`] so a facet change only reruns filter and rank.

use crate::catalog::{Appendix, ClassificationRecord, Dataset};
use crate::search::config::DEFAULT_DISPLAY_LIMIT;
use crate::search::filter::{FacetSet, filter};
use crate::search::highlight::highlight;
use crate::search::matcher::match_positions;
use crate::search::outputs::{EmptyReason, RecordDetails, ResultRow, SearchOutput};
use crate::search::query::Query;
use crate::search::ranker::rank;
use crate::search::references::{LinkBuilder, resolve_references_with};

/// A search as submitted by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub facets: FacetSet,
    /// Lift the display limit
    pub show_all: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            facets: FacetSet::all(),
            show_all: false,
        }
    }

    pub fn with_facets(mut self, facets: FacetSet) -> Self {
        self.facets = facets;
        self
    }

    pub fn show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }
}

/// Display settings for search output
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub display_limit: usize,
    pub links: LinkBuilder,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            display_limit: DEFAULT_DISPLAY_LIMIT,
            links: LinkBuilder::default(),
        }
    }
}

/// The records a query matched, in dataset order
#[derive(Debug)]
pub struct MatchSet<'a> {
    pub query: Query,
    pub records: Vec<&'a ClassificationRecord>,
}

/// Identity of the record slice a match was computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DatasetIdentity {
    address: usize,
    len: usize,
}

impl DatasetIdentity {
    fn of(dataset: &Dataset) -> Self {
        let records = dataset.records();
        Self {
            address: records.as_ptr() as usize,
            len: records.len(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedMatch {
    key: String,
    dataset: DatasetIdentity,
    query: Query,
    positions: Vec<usize>,
}

/// Caller-owned memo of the most recent match.
///
/// The memo is reused only for the same trimmed query over the same
/// dataset; anything else rescans.
#[derive(Debug, Default)]
pub struct SearchSession {
    cached: Option<CachedMatch>,
    match_runs: usize,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `raw` against the dataset, reusing the previous match when the
    /// trimmed query and the dataset are unchanged. `None` when the query is
    /// too short.
    pub fn matches<'a>(&mut self, dataset: &'a Dataset, raw: &str) -> Option<MatchSet<'a>> {
        let key = raw.trim();
        let query = Query::parse(key)?;
        let identity = DatasetIdentity::of(dataset);

        let cached = match self.cached.take() {
            Some(cached) if cached.key == key && cached.dataset == identity => cached,
            _ => {
                self.match_runs += 1;
                tracing::debug!("Matching {:?} over {} records", query, dataset.len());
                CachedMatch {
                    key: key.to_string(),
                    dataset: identity,
                    positions: match_positions(dataset.records(), &query),
                    query,
                }
            }
        };

        let records = dataset.records();
        let matched = MatchSet {
            query: cached.query.clone(),
            records: cached.positions.iter().map(|&p| &records[p]).collect(),
        };
        self.cached = Some(cached);
        Some(matched)
    }

    /// Number of full dataset scans performed so far
    pub fn match_runs(&self) -> usize {
        self.match_runs
    }
}

/// Run the whole pipeline and build the display output
pub fn run_search(
    dataset: &Dataset,
    session: &mut SearchSession,
    request: &SearchRequest,
    options: &SearchOptions,
) -> SearchOutput {
    let trimmed = request.query.trim();
    let Some(matched) = session.matches(dataset, trimmed) else {
        return SearchOutput::too_short(trimmed, request.facets);
    };

    let filtered = filter(&matched.records, &request.facets);
    let ranked = rank(&filtered, &matched.query);

    let shown = if request.show_all {
        ranked.len()
    } else {
        ranked.len().min(options.display_limit)
    };

    let results: Vec<ResultRow> = ranked[..shown]
        .iter()
        .map(|record| ResultRow {
            record: record_details(dataset, record, &options.links),
            code_segments: highlight(&record.code, &matched.query),
            name_segments: highlight(&record.name, &matched.query),
        })
        .collect();

    let total_matches = matched.records.len();
    let empty_reason = if !results.is_empty() {
        None
    } else if total_matches == 0 {
        Some(EmptyReason::NoMatches)
    } else if request.facets.is_empty() {
        Some(EmptyReason::NoFacetsSelected)
    } else {
        Some(EmptyReason::FilteredOut)
    };

    SearchOutput {
        query: trimmed.to_string(),
        kind: Some(matched.query.kind()),
        facets: request.facets,
        total_matches,
        filtered_count: ranked.len(),
        truncated: shown < ranked.len(),
        results,
        empty_reason,
        description: describe(trimmed, &request.facets, ranked.len(), total_matches),
    }
}

/// A record with every appendix field resolved against its table
pub fn record_details(
    dataset: &Dataset,
    record: &ClassificationRecord,
    links: &LinkBuilder,
) -> RecordDetails {
    let resolve = |appendix: Appendix| {
        resolve_references_with(
            record.appendix(appendix),
            dataset.table(appendix),
            appendix,
            links,
        )
    };

    RecordDetails {
        code: record.code.clone(),
        name: record.name.clone(),
        code_url: links.code_url(&record.code),
        appendix1: resolve(Appendix::One),
        appendix2: resolve(Appendix::Two),
        appendix3: resolve(Appendix::Three),
    }
}

/// One-line summary of the query, the active facets and the counts
pub fn describe(query: &str, facets: &FacetSet, filtered: usize, total: usize) -> String {
    let mut text = format!("Query \"{query}\"");

    if facets.is_empty() {
        text.push_str(" (all filters off)");
    } else if !facets.is_all() {
        let names: Vec<&str> = facets.active().into_iter().map(Appendix::title).collect();
        text.push_str(&format!(" (filters: {})", names.join(", ")));
    }

    if total > 0 {
        if filtered == total {
            text.push_str(&format!(" · found: {total}"));
        } else {
            text.push_str(&format!(" · found: {filtered} of {total}"));
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ReferencePoint, ReferenceTable};
    use crate::search::query::QueryKind;
    use crate::search::references::ReferenceUnit;

    fn dataset() -> Dataset {
        let records = vec![
            ClassificationRecord::new("13.96.17", "Ткани узкие").with_appendix(Appendix::Two, "5"),
            ClassificationRecord::new("13.96.17.130", "Тесьма плетеная")
                .with_appendix(Appendix::Three, "7,999"),
            ClassificationRecord::new("13.96", "Ткани технические"),
            ClassificationRecord::new("01.11.11.110", "Пшеница твердая"),
        ];
        let mut appendix2 = ReferenceTable::new();
        appendix2.insert("5", ReferencePoint::new("ограничение допуска"));
        let mut appendix3 = ReferenceTable::new();
        appendix3.insert("7", ReferencePoint::new("Ткани").with_quota(30.0));
        Dataset::new(records, [ReferenceTable::new(), appendix2, appendix3]).unwrap()
    }

    fn codes(output: &SearchOutput) -> Vec<&str> {
        output
            .results
            .iter()
            .map(|row| row.record.code.as_str())
            .collect()
    }

    #[test]
    fn test_single_record_end_to_end() {
        let records = vec![
            ClassificationRecord::new("13.96.17", "Ткани узкие").with_appendix(Appendix::Two, "5"),
        ];
        let mut appendix2 = ReferenceTable::new();
        appendix2.insert("5", ReferencePoint::new("ограничение допуска"));
        let dataset =
            Dataset::new(records, [ReferenceTable::new(), appendix2, ReferenceTable::new()])
                .unwrap();

        let mut session = SearchSession::new();
        let output = run_search(
            &dataset,
            &mut session,
            &SearchRequest::new("13.96"),
            &SearchOptions::default(),
        );

        assert_eq!(output.kind, Some(QueryKind::Code));
        assert_eq!(output.total_matches, 1);
        assert_eq!(output.filtered_count, 1);
        assert_eq!(codes(&output), vec!["13.96.17"]);
        let units = &output.results[0].record.appendix2;
        assert_eq!(units.len(), 1);
        assert!(matches!(
            &units[0],
            ReferenceUnit::Resolved { point_id, .. } if point_id == "5"
        ));
        assert!(output.empty_reason.is_none());
    }

    #[test]
    fn test_code_search_ranks_exact_first() {
        let dataset = dataset();
        let mut session = SearchSession::new();
        let output = run_search(
            &dataset,
            &mut session,
            &SearchRequest::new("13.96"),
            &SearchOptions::default(),
        );
        assert_eq!(codes(&output), vec!["13.96", "13.96.17", "13.96.17.130"]);
        assert_eq!(output.description, "Query \"13.96\" · found: 3");
    }

    #[test]
    fn test_facet_change_reuses_match() {
        let dataset = dataset();
        let mut session = SearchSession::new();
        let options = SearchOptions::default();

        let all = run_search(&dataset, &mut session, &SearchRequest::new("13.96"), &options);
        assert_eq!(all.filtered_count, 3);

        let request = SearchRequest::new(" 13.96 ")
            .with_facets(FacetSet::from_appendices([Appendix::Three]));
        let only_third = run_search(&dataset, &mut session, &request, &options);
        assert_eq!(codes(&only_third), vec!["13.96.17.130"]);
        assert_eq!(only_third.total_matches, 3);
        assert_eq!(
            only_third.description,
            "Query \"13.96\" (filters: advantage) · found: 1 of 3"
        );

        assert_eq!(session.match_runs(), 1);

        run_search(&dataset, &mut session, &SearchRequest::new("ткани"), &options);
        assert_eq!(session.match_runs(), 2);
    }

    #[test]
    fn test_session_rescans_for_another_dataset() {
        let large = dataset();
        let small = Dataset::new(
            vec![ClassificationRecord::new("13.96.17", "Ткани узкие")],
            Default::default(),
        )
        .unwrap();
        let mut session = SearchSession::new();
        let options = SearchOptions::default();
        let request = SearchRequest::new("13.96");

        let output = run_search(&large, &mut session, &request, &options);
        assert_eq!(output.total_matches, 3);

        let output = run_search(&small, &mut session, &request, &options);
        assert_eq!(codes(&output), vec!["13.96.17"]);
        assert_eq!(output.total_matches, 1);
        assert_eq!(session.match_runs(), 2);

        let output = run_search(&small, &mut session, &request, &options);
        assert_eq!(output.total_matches, 1);
        assert_eq!(session.match_runs(), 2);
    }

    #[test]
    fn test_no_facets_is_distinct_from_no_matches() {
        let dataset = dataset();
        let mut session = SearchSession::new();
        let options = SearchOptions::default();

        let request = SearchRequest::new("ткани").with_facets(FacetSet::none());
        let output = run_search(&dataset, &mut session, &request, &options);
        assert!(!output.has_results());
        assert_eq!(output.total_matches, 2);
        assert_eq!(output.empty_reason, Some(EmptyReason::NoFacetsSelected));
        assert_eq!(output.description, "Query \"ткани\" (all filters off) · found: 0 of 2");

        let output = run_search(&dataset, &mut session, &SearchRequest::new("обувь"), &options);
        assert_eq!(output.empty_reason, Some(EmptyReason::NoMatches));
        assert_eq!(output.description, "Query \"обувь\"");
    }

    #[test]
    fn test_filtered_out() {
        let dataset = dataset();
        let mut session = SearchSession::new();
        let request =
            SearchRequest::new("пшеница").with_facets(FacetSet::from_appendices([Appendix::One]));
        let output = run_search(&dataset, &mut session, &request, &SearchOptions::default());
        assert_eq!(output.empty_reason, Some(EmptyReason::FilteredOut));
    }

    #[test]
    fn test_short_query_does_not_run() {
        let dataset = dataset();
        let mut session = SearchSession::new();
        let output = run_search(
            &dataset,
            &mut session,
            &SearchRequest::new(" 1 "),
            &SearchOptions::default(),
        );
        assert_eq!(output.empty_reason, Some(EmptyReason::QueryTooShort));
        assert_eq!(output.kind, None);
        assert_eq!(session.match_runs(), 0);
    }

    #[test]
    fn test_display_limit_and_show_all() {
        let dataset = dataset();
        let mut session = SearchSession::new();
        let options = SearchOptions {
            display_limit: 2,
            ..SearchOptions::default()
        };

        let output = run_search(&dataset, &mut session, &SearchRequest::new("13"), &options);
        assert_eq!(output.results.len(), 2);
        assert_eq!(output.filtered_count, 3);
        assert!(output.truncated);

        let request = SearchRequest::new("13").show_all(true);
        let output = run_search(&dataset, &mut session, &request, &options);
        assert_eq!(output.results.len(), 3);
        assert!(!output.truncated);
    }

    #[test]
    fn test_rows_carry_highlights_and_unknown_references() {
        let dataset = dataset();
        let mut session = SearchSession::new();
        let output = run_search(
            &dataset,
            &mut session,
            &SearchRequest::new("тесьма"),
            &SearchOptions::default(),
        );
        let row = &output.results[0];
        assert_eq!(row.name_segments[0].text, "Тесьма");
        assert!(row.name_segments[0].matched);

        let appendix3: Vec<String> = row.record.appendix3.iter().map(|u| u.to_string()).collect();
        assert_eq!(appendix3, vec!["p.7 30%", "p.999?"]);
    }

    #[test]
    fn test_describe_lists_active_facets() {
        let facets = FacetSet::from_appendices([Appendix::One, Appendix::Two]);
        assert_eq!(
            describe("щебень", &facets, 2, 2),
            "Query \"щебень\" (filters: prohibition, restriction) · found: 2"
        );
    }
}

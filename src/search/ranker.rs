use crate::catalog::ClassificationRecord;
use crate::search::query::Query;

/// Order results by relevance without touching the input.
///
/// Code queries: the exact code first, then shorter (more general) codes.
/// Text queries: names starting with the whole phrase first, then shorter
/// names. The sort is stable, so ties keep their dataset order.
pub fn rank<'a>(
    results: &[&'a ClassificationRecord],
    query: &Query,
) -> Vec<&'a ClassificationRecord> {
    let mut ranked = results.to_vec();
    match query {
        Query::Code { normalized } => {
            ranked.sort_by_key(|record| (record.code != *normalized, record.code.chars().count()));
        }
        Query::Text { phrase, .. } => {
            ranked.sort_by_cached_key(|record| {
                let name = record.name.to_lowercase();
                (!name.starts_with(phrase.as_str()), name.chars().count())
            });
        }
    }
    ranked
}

use crate::catalog::ClassificationRecord;
use crate::search::query::Query;

/// Dataset positions of the records matching `query`, in dataset order.
///
/// Full scan: codes by exact prefix, names by case-insensitive substring
/// with every word required. A text query without words matches nothing.
pub fn match_positions(records: &[ClassificationRecord], query: &Query) -> Vec<usize> {
    match query {
        Query::Code { normalized } => records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.code.starts_with(normalized.as_str()))
            .map(|(position, _)| position)
            .collect(),
        Query::Text { words, .. } => {
            if words.is_empty() {
                return Vec::new();
            }
            records
                .iter()
                .enumerate()
                .filter(|(_, record)| {
                    let name = record.name.to_lowercase();
                    words.iter().all(|word| name.contains(word.as_str()))
                })
                .map(|(position, _)| position)
                .collect()
        }
    }
}

/// The records matching `query`, in dataset order
pub fn match_records<'a>(
    records: &'a [ClassificationRecord],
    query: &Query,
) -> Vec<&'a ClassificationRecord> {
    match_positions(records, query)
        .into_iter()
        .map(|position| &records[position])
        .collect()
}

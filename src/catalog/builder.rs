//! Builds the dataset from the classifier and the three appendix sources.
//!
//! Each appendix point lists classifier codes. A listed code covers itself
//! and every code below it in the hierarchy, so the point id is attached to
//! every record whose code starts with a listed code.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::catalog::constants::{
    APPENDIX1_SOURCE, APPENDIX2_SOURCE, APPENDIX3_SOURCE, CLASSIFIER_SOURCE,
};
use crate::catalog::dataset::Dataset;
use crate::catalog::tsv::read_tsv;
use crate::catalog::types::{Appendix, ClassificationRecord, ReferencePoint, ReferenceTable};

/// Outcome of attaching one appendix to the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendixReport {
    pub appendix: Appendix,
    /// Points recorded in the reference table
    pub points: usize,
    /// Points that listed at least one code
    pub processed_points: usize,
    /// New (record, point) citations
    pub citations: usize,
    /// Listed codes that matched no classifier record
    pub unmatched_codes: Vec<String>,
}

/// Summary of a full build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub records: usize,
    pub duplicate_codes: Vec<String>,
    /// Incomplete source records skipped by the TSV reader
    pub source_problems: usize,
    pub appendices: Vec<AppendixReport>,
}

/// Accumulates classifier records and appendix citations
#[derive(Debug)]
pub struct DatasetBuilder {
    records: Vec<ClassificationRecord>,
    tables: [ReferenceTable; 3],
    duplicate_codes: Vec<String>,
}

impl DatasetBuilder {
    /// Start from classifier rows of `[code, name]`
    pub fn new(classifier_rows: &[Vec<String>]) -> Self {
        let records: Vec<ClassificationRecord> = classifier_rows
            .iter()
            .map(|row| ClassificationRecord::new(column(row, 0), column(row, 1)))
            .collect();

        let mut duplicate_codes = Vec::new();
        {
            let mut seen = HashSet::new();
            for record in &records {
                if !seen.insert(record.code.as_str()) {
                    tracing::warn!("Duplicate classifier code: {}", record.code);
                    duplicate_codes.push(record.code.clone());
                }
            }
        }

        tracing::info!("Created {} classifier records", records.len());

        Self {
            records,
            tables: Default::default(),
            duplicate_codes,
        }
    }

    /// Attach appendix rows of `[point, name, codes]` (plus `quota` for appendix 3)
    pub fn add_appendix(&mut self, appendix: Appendix, rows: &[Vec<String>]) -> AppendixReport {
        let mut report = AppendixReport {
            appendix,
            points: 0,
            processed_points: 0,
            citations: 0,
            unmatched_codes: Vec::new(),
        };

        for row in rows {
            let point_id = column(row, 0).replace('.', "");
            let mut point = ReferencePoint::new(column(row, 1));
            if appendix.has_quota() {
                match parse_quota(column(row, 3)) {
                    Ok(quota) => point.quota = quota,
                    Err(_) => tracing::warn!(
                        "Point {point_id} of {appendix}: unparsable quota '{}'",
                        column(row, 3)
                    ),
                }
            }
            self.tables[table_index(appendix)].insert(point_id.clone(), point);
            report.points += 1;

            let target_codes = split_codes(column(row, 2));
            if target_codes.is_empty() {
                tracing::warn!("Point {point_id} of {appendix}: no classifier codes");
                continue;
            }
            report.processed_points += 1;

            for target in target_codes {
                let (matched, added) = self.cite_prefix(appendix, target, &point_id);
                if matched == 0 {
                    tracing::warn!(
                        "Code '{target}' (point {point_id} of {appendix}) not found in the classifier"
                    );
                    report.unmatched_codes.push(target.to_string());
                }
                report.citations += added;
            }
        }

        tracing::info!(
            "{appendix}: {} points processed, {} citations added",
            report.processed_points,
            report.citations
        );
        report
    }

    /// Cite `point_id` on every record under `prefix`.
    ///
    /// Returns the number of records under the prefix and how many of them
    /// gained the citation.
    fn cite_prefix(
        &mut self,
        appendix: Appendix,
        prefix: &str,
        point_id: &str,
    ) -> (usize, usize) {
        let mut matched = 0;
        let mut added = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|record| record.code.starts_with(prefix))
        {
            matched += 1;
            if record.point_ids(appendix).any(|id| id == point_id) {
                continue;
            }
            let field = record.appendix_mut(appendix);
            if !field.is_empty() {
                field.push(',');
            }
            field.push_str(point_id);
            added += 1;
        }
        (matched, added)
    }

    pub fn duplicate_codes(&self) -> &[String] {
        &self.duplicate_codes
    }

    /// Validate and freeze the dataset
    pub fn finish(self) -> Result<Dataset> {
        Dataset::new(self.records, self.tables)
    }
}

/// Read the four source files from `source_dir` and build the dataset
pub fn build_from_sources(source_dir: &Path) -> Result<(Dataset, BuildReport)> {
    let classifier = read_tsv(&source_dir.join(CLASSIFIER_SOURCE), 2)?;
    let sources = [
        (Appendix::One, APPENDIX1_SOURCE, 3),
        (Appendix::Two, APPENDIX2_SOURCE, 3),
        (Appendix::Three, APPENDIX3_SOURCE, 4),
    ];
    let mut appendix_tables = Vec::with_capacity(sources.len());
    for (appendix, file, columns) in sources {
        appendix_tables.push((appendix, read_tsv(&source_dir.join(file), columns)?));
    }

    let mut builder = DatasetBuilder::new(&classifier.rows);
    let mut report = BuildReport {
        records: classifier.rows.len(),
        duplicate_codes: builder.duplicate_codes().to_vec(),
        source_problems: classifier.problems,
        appendices: Vec::new(),
    };

    for (appendix, table) in &appendix_tables {
        report.source_problems += table.problems;
        report
            .appendices
            .push(builder.add_appendix(*appendix, &table.rows));
    }

    Ok((builder.finish()?, report))
}

/// Split a code list on commas and whitespace
pub fn split_codes(codes: &str) -> Vec<&str> {
    codes
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|code| !code.is_empty())
        .collect()
}

/// Parse a quota cell such as `30`, `30%` or `12,5`
pub fn parse_quota(raw: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let cleaned = raw.trim().trim_end_matches('%').trim().replace(',', ".");
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned.parse().map(Some)
}

fn column(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

fn table_index(appendix: Appendix) -> usize {
    usize::from(appendix.number() - 1)
}

use anyhow::{Context, Result, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::types::{Appendix, ClassificationRecord, ReferenceTable};

/// The classifier with its appendix tables, loaded once and read-only afterwards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<ClassificationRecord>,
    appendix1: ReferenceTable,
    appendix2: ReferenceTable,
    appendix3: ReferenceTable,
}

/// How many records each appendix cites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoverageStats {
    pub total: usize,
    pub appendix1: usize,
    pub appendix2: usize,
    pub appendix3: usize,
    /// Records cited by at least one appendix
    pub any: usize,
    /// Records cited by no appendix
    pub none: usize,
}

impl CoverageStats {
    /// Share of the dataset in percent, 0 for an empty dataset
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        count as f64 * 100.0 / self.total as f64
    }

    pub fn for_appendix(&self, appendix: Appendix) -> usize {
        match appendix {
            Appendix::One => self.appendix1,
            Appendix::Two => self.appendix2,
            Appendix::Three => self.appendix3,
        }
    }
}

impl Dataset {
    /// Create a dataset, rejecting records without a code or a name
    pub fn new(records: Vec<ClassificationRecord>, tables: [ReferenceTable; 3]) -> Result<Self> {
        let [appendix1, appendix2, appendix3] = tables;
        let dataset = Self {
            records,
            appendix1,
            appendix2,
            appendix3,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Parse and validate a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Dataset =
            serde_json::from_str(json).context("Failed to parse dataset snapshot")?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check every record has a code and a name
    pub fn validate(&self) -> Result<()> {
        for (position, record) in self.records.iter().enumerate() {
            if record.code.trim().is_empty() {
                bail!("Invalid record at position {position}: missing code");
            }
            if record.name.trim().is_empty() {
                bail!(
                    "Invalid record at position {position} (code {}): missing name",
                    record.code
                );
            }
        }
        Ok(())
    }

    pub fn records(&self) -> &[ClassificationRecord] {
        &self.records
    }

    pub fn table(&self, appendix: Appendix) -> &ReferenceTable {
        match appendix {
            Appendix::One => &self.appendix1,
            Appendix::Two => &self.appendix2,
            Appendix::Three => &self.appendix3,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose code equals `code` exactly
    pub fn find_by_code(&self, code: &str) -> Option<&ClassificationRecord> {
        let code = code.trim();
        self.records.iter().find(|record| record.code == code)
    }

    pub fn coverage(&self) -> CoverageStats {
        let mut stats = CoverageStats {
            total: self.records.len(),
            appendix1: 0,
            appendix2: 0,
            appendix3: 0,
            any: 0,
            none: 0,
        };

        for record in &self.records {
            let cited = Appendix::ALL.map(|appendix| record.cites(appendix));
            stats.appendix1 += usize::from(cited[0]);
            stats.appendix2 += usize::from(cited[1]);
            stats.appendix3 += usize::from(cited[2]);
            if cited.iter().any(|&c| c) {
                stats.any += 1;
            } else {
                stats.none += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::ReferencePoint;

    fn sample() -> Dataset {
        let records = vec![
            ClassificationRecord::new("08.12.12.140", "Щебень")
                .with_appendix(Appendix::Two, "1")
                .with_appendix(Appendix::Three, "4"),
            ClassificationRecord::new("13.96.17", "Ткани узкие").with_appendix(Appendix::Three, "7"),
            ClassificationRecord::new("01.11.11.110", "Пшеница твердая"),
        ];
        let mut appendix2 = ReferenceTable::new();
        appendix2.insert("1", ReferencePoint::new("Щебень"));
        Dataset::new(records, [ReferenceTable::new(), appendix2, ReferenceTable::new()]).unwrap()
    }

    #[test]
    fn test_coverage_counts() {
        let stats = sample().coverage();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.appendix1, 0);
        assert_eq!(stats.appendix2, 1);
        assert_eq!(stats.appendix3, 2);
        assert_eq!(stats.any, 2);
        assert_eq!(stats.none, 1);
        assert!((stats.percent(stats.any) - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_empty_dataset_percent_is_zero() {
        let stats = Dataset::default().coverage();
        assert_eq!(stats.percent(0), 0.0);
    }

    #[test]
    fn test_find_by_code_is_exact() {
        let dataset = sample();
        assert_eq!(
            dataset.find_by_code("13.96.17").map(|r| r.name.as_str()),
            Some("Ткани узкие")
        );
        assert!(dataset.find_by_code("13.96").is_none());
    }

    #[test]
    fn test_invalid_record_rejected_at_load() {
        let records = vec![
            ClassificationRecord::new("01", "Продукция"),
            ClassificationRecord::new("02", "  "),
        ];
        let err = Dataset::new(records, Default::default()).unwrap_err();
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let dataset = sample();
        let json = serde_json::to_string(&dataset).unwrap();
        let restored = Dataset::from_json(&json).unwrap();
        assert_eq!(restored.records(), dataset.records());
        assert_eq!(restored.table(Appendix::Two), dataset.table(Appendix::Two));
    }

    #[test]
    fn test_snapshot_with_missing_code_fails() {
        let json = r#"{"records":[{"code":"","name":"x"}],"appendix1":{},"appendix2":{},"appendix3":{}}"#;
        assert!(Dataset::from_json(json).is_err());
    }
}

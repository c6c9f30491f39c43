use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::constants::{DATA_DIR, DATA_ROOT_DIR, DATASET_FILE, METADATA_FILE};
use crate::catalog::dataset::Dataset;
use crate::catalog::types::Appendix;

/// Manages the data directory holding the dataset snapshot
#[derive(Debug, Clone)]
pub struct DatasetStorage {
    data_dir: PathBuf,
}

/// Metadata written next to a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub built_at: chrono::DateTime<chrono::Utc>,
    pub record_count: usize,
    pub appendix1_points: usize,
    pub appendix2_points: usize,
    pub appendix3_points: usize,
}

impl SnapshotMetadata {
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self {
            built_at: chrono::Utc::now(),
            record_count: dataset.len(),
            appendix1_points: dataset.table(Appendix::One).len(),
            appendix2_points: dataset.table(Appendix::Two).len(),
            appendix3_points: dataset.table(Appendix::Three).len(),
        }
    }
}

impl DatasetStorage {
    /// Create a storage instance, defaulting to ~/.okpd-lookup/data
    pub fn new(custom_data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match custom_data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create data directory: {}", data_dir.display())
        })?;

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(DATASET_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(METADATA_FILE)
    }

    /// Check if a snapshot has been built
    pub fn has_snapshot(&self) -> bool {
        self.dataset_path().exists()
    }

    /// Write the dataset snapshot and its metadata
    pub fn save(&self, dataset: &Dataset) -> Result<SnapshotMetadata> {
        let json = serde_json::to_string(dataset).context("Failed to serialize dataset")?;
        fs::write(self.dataset_path(), json).with_context(|| {
            format!("Failed to write snapshot: {}", self.dataset_path().display())
        })?;

        let metadata = SnapshotMetadata::for_dataset(dataset);
        let json = serde_json::to_string_pretty(&metadata)?;
        fs::write(self.metadata_path(), json)?;

        tracing::info!(
            "Saved snapshot with {} records to {}",
            metadata.record_count,
            self.data_dir.display()
        );
        Ok(metadata)
    }

    /// Load and validate the dataset snapshot
    pub fn load(&self) -> Result<Dataset> {
        let path = self.dataset_path();
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "No dataset snapshot at {}; run `okpd-lookup build` first",
                path.display()
            )
        })?;
        let dataset = Dataset::from_json(&json)?;
        tracing::info!(
            "Loaded {} records ({} / {} / {} appendix points)",
            dataset.len(),
            dataset.table(Appendix::One).len(),
            dataset.table(Appendix::Two).len(),
            dataset.table(Appendix::Three).len()
        );
        Ok(dataset)
    }

    /// Load snapshot metadata, if present
    pub fn load_metadata(&self) -> Result<Option<SnapshotMetadata>> {
        let path = self.metadata_path();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        let metadata = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse metadata: {}", path.display()))?;
        Ok(Some(metadata))
    }
}

/// ~/.okpd-lookup/data
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Failed to get home directory")?
        .join(DATA_ROOT_DIR)
        .join(DATA_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{ClassificationRecord, ReferencePoint, ReferenceTable};
    use tempfile::TempDir;

    fn dataset() -> Dataset {
        let mut appendix2 = ReferenceTable::new();
        appendix2.insert("5", ReferencePoint::new("ограничение допуска"));
        Dataset::new(
            vec![
                ClassificationRecord::new("13.96.17", "Ткани узкие")
                    .with_appendix(Appendix::Two, "5"),
            ],
            [ReferenceTable::new(), appendix2, ReferenceTable::new()],
        )
        .unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = DatasetStorage::new(Some(temp_dir.path().join("data"))).unwrap();
        assert!(!storage.has_snapshot());
        assert!(storage.load_metadata().unwrap().is_none());

        let metadata = storage.save(&dataset()).unwrap();
        assert_eq!(metadata.record_count, 1);
        assert_eq!(metadata.appendix2_points, 1);
        assert!(storage.has_snapshot());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.records(), dataset().records());
        assert_eq!(storage.load_metadata().unwrap(), Some(metadata));
    }

    #[test]
    fn test_load_without_snapshot_fails() {
        let temp_dir = TempDir::new().unwrap();
        let storage = DatasetStorage::new(Some(temp_dir.path().to_path_buf())).unwrap();
        let err = storage.load().unwrap_err();
        assert!(err.to_string().contains("okpd-lookup build"));
    }

    #[test]
    fn test_load_rejects_invalid_records() {
        let temp_dir = TempDir::new().unwrap();
        let storage = DatasetStorage::new(Some(temp_dir.path().to_path_buf())).unwrap();
        fs::write(
            storage.dataset_path(),
            r#"{"records":[{"code":"01","name":""}],"appendix1":{},"appendix2":{},"appendix3":{}}"#,
        )
        .unwrap();
        assert!(storage.load().is_err());
    }
}

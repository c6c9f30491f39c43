//! # Catalog Module
//!
//! The classifier dataset: OKPD2 records annotated with the PP 1875 appendix
//! points that cite them, plus the three appendix reference tables.
//!
//! ## Key Components
//!
//! - [`types`] - Records, reference points and reference tables
//! - [`dataset`] - The immutable, validated dataset and its coverage statistics
//! - [`tsv`] - Reader for the tab-separated source files
//! - [`builder`] - Builds a dataset by propagating appendix citations onto classifier codes
//! - [`storage`] - JSON snapshot persistence in the data directory
//! - [`constants`] - File and directory names

pub mod builder;
pub mod constants;
pub mod dataset;
pub mod storage;
pub mod tsv;
pub mod types;

pub use dataset::{CoverageStats, Dataset};
pub use storage::DatasetStorage;
pub use types::{Appendix, ClassificationRecord, ReferencePoint, ReferenceTable};

//! Constants for data file and directory names

/// Directory names
pub const DATA_ROOT_DIR: &str = ".okpd-lookup";
pub const DATA_DIR: &str = "data";

/// Snapshot file names
pub const DATASET_FILE: &str = "dataset.json";
pub const METADATA_FILE: &str = "metadata.json";

/// Configuration file name, looked up in the data root
pub const CONFIG_FILE: &str = "config.toml";

/// Source files read by the dataset builder
pub const CLASSIFIER_SOURCE: &str = "source_okpd2.tsv";
pub const APPENDIX1_SOURCE: &str = "source_pp1875_app1.tsv";
pub const APPENDIX2_SOURCE: &str = "source_pp1875_app2.tsv";
pub const APPENDIX3_SOURCE: &str = "source_pp1875_app3.tsv";

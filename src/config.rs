//! Optional TOML configuration, read from `~/.okpd-lookup/config.toml`
//! unless another path is given.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::constants::{CONFIG_FILE, DATA_ROOT_DIR};
use crate::search::config::{DEFAULT_DISPLAY_LIMIT, DEFAULT_SEARCH_BASE_URL};
use crate::search::{FacetSet, LinkBuilder, SearchOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookupConfig {
    /// Directory holding the dataset snapshot
    pub data_dir: Option<PathBuf>,
    pub display_limit: usize,
    pub search_base_url: String,
    /// Facets active when a search does not set them
    pub facets: FacetSet,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            facets: FacetSet::all(),
        }
    }
}

impl LookupConfig {
    /// Load the configuration.
    ///
    /// An explicit path must exist. The default path may be absent, in
    /// which case defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_config_path() {
                Ok(path) => (path, false),
                Err(e) => {
                    tracing::debug!("No default config location: {e}");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            if explicit {
                bail!("Config file not found: {}", path.display());
            }
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.display_limit == 0 {
            bail!("display_limit must be greater than 0");
        }
        if config.search_base_url.trim().is_empty() {
            bail!("search_base_url must not be empty");
        }
        Ok(config)
    }

    /// Command-line data directory wins over the file
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        self
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            display_limit: self.display_limit,
            links: LinkBuilder::new(self.search_base_url.clone()),
        }
    }
}

/// ~/.okpd-lookup/config.toml
pub fn default_config_path() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Failed to get home directory")?
        .join(DATA_ROOT_DIR)
        .join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Appendix;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(LookupConfig::parse("").unwrap(), LookupConfig::default());
    }

    #[test]
    fn test_partial_facets() {
        let config = LookupConfig::parse(
            r#"
display_limit = 20

[facets]
appendix3 = false
"#,
        )
        .unwrap();
        assert_eq!(config.display_limit, 20);
        assert_eq!(
            config.facets,
            FacetSet::from_appendices([Appendix::One, Appendix::Two])
        );
        assert_eq!(config.search_base_url, DEFAULT_SEARCH_BASE_URL);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(LookupConfig::parse("display_limit = 0").is_err());
        assert!(LookupConfig::parse("display_limit = \"many\"").is_err());
        assert!(LookupConfig::parse("unknown_key = 1").is_err());
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "data_dir = \"/tmp/okpd\"\nsearch_base_url = \"https://example.test/q/\"\n",
        )?;

        let config = LookupConfig::load(Some(&path))?;
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/okpd")));

        let options = config.search_options();
        assert_eq!(options.links.base_url(), "https://example.test/q/");
        assert_eq!(options.display_limit, DEFAULT_DISPLAY_LIMIT);

        let overridden = LookupConfig::load(Some(&path))?.with_data_dir(Some("/data".into()));
        assert_eq!(overridden.data_dir, Some(PathBuf::from("/data")));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.toml");
        assert!(LookupConfig::load(Some(&missing)).is_err());
    }
}

use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::catalog::storage::SnapshotMetadata;
use crate::catalog::{Dataset, DatasetStorage};
use crate::config::LookupConfig;
use crate::search::tools::{GetRecordParams, SearchCodesParams, SearchTools};

#[derive(Debug, Clone)]
pub struct LookupService {
    search_tools: SearchTools,
    tool_router: ToolRouter<Self>,
}

impl LookupService {
    pub fn new(
        dataset: Dataset,
        config: &LookupConfig,
        snapshot: Option<SnapshotMetadata>,
    ) -> Self {
        Self {
            search_tools: SearchTools::new(
                Arc::new(dataset),
                config.search_options(),
                config.facets,
                snapshot,
            ),
            tool_router: Self::tool_router(),
        }
    }

    /// Load the snapshot from the configured data directory
    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        let storage = DatasetStorage::new(config.data_dir.clone())?;
        let dataset = storage.load()?;
        let snapshot = storage.load_metadata()?;
        tracing::info!(
            "Loaded {} records from {}",
            dataset.len(),
            storage.data_dir().display()
        );
        Ok(Self::new(dataset, config, snapshot))
    }

    pub fn dataset(&self) -> &Dataset {
        self.search_tools.dataset()
    }
}

#[tool_router]
impl LookupService {
    #[tool(
        description = "Search the OKPD2 classifier and see which PP 1875 appendix points cite each code. A query starting with a digit, or containing a dot and a digit, is a code prefix search (e.g. '13.96' finds 13.96, 13.96.17, ...); anything else is a case-insensitive search where every word must occur in the product name. Queries shorter than 2 characters return nothing. Use appendix1/appendix2/appendix3 to keep only records citing those appendices (prohibitions, restrictions, advantages); all are on by default. Results are capped at 50 rows unless show_all is true."
    )]
    pub async fn search_codes(&self, params: Parameters<SearchCodesParams>) -> String {
        self.search_tools.search_codes(params.0).await
    }

    #[tool(
        description = "Get one OKPD2 record by its exact code, with every cited PP 1875 point resolved to its name, appendix 3 quota and a search link. Unknown point ids are returned with status not_found."
    )]
    pub async fn get_record(&self, params: Parameters<GetRecordParams>) -> String {
        self.search_tools.get_record(params.0).await
    }

    #[tool(
        description = "Get coverage statistics: how many classifier records cite each PP 1875 appendix, any appendix, or none, the number of points per appendix, and when the dataset was built."
    )]
    pub async fn dataset_stats(&self) -> String {
        self.search_tools.dataset_stats().await
    }
}

#[tool_handler]
impl ServerHandler for LookupService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "okpd-lookup".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Lookup of OKPD2 classifier codes and the PP 1875 appendix points that cite them. Use search_codes with a code prefix or product words, narrow by appendix if needed, then get_record for the full details of one code. dataset_stats reports how much of the classifier each appendix covers.".to_string(),
            ),
            ..Default::default()
        }
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use okpd_lookup::catalog::builder::build_from_sources;
use okpd_lookup::catalog::{Appendix, DatasetStorage};
use okpd_lookup::search::outputs::{DatasetStatsOutput, GetRecordOutput};
use okpd_lookup::search::pipeline::record_details;
use okpd_lookup::search::render::{render_record, render_search, render_stats};
use okpd_lookup::search::{FacetSet, SearchRequest, SearchSession, run_search};
use okpd_lookup::{LookupConfig, LookupService};

/// OKPD2 classifier lookup with PP 1875 appendix cross-references
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ~/.okpd-lookup/config.toml)
    #[arg(long, env = "OKPD_LOOKUP_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory holding the dataset snapshot (defaults to ~/.okpd-lookup/data)
    #[arg(long, env = "OKPD_LOOKUP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the lookup tools over MCP on stdio (default)
    Serve,
    /// Build the dataset snapshot from the TSV source files
    Build {
        /// Directory containing source_okpd2.tsv and source_pp1875_app{1,2,3}.tsv
        source_dir: PathBuf,
    },
    /// Search codes or names
    Search {
        /// Code prefix or product words
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Keep only records citing these appendices (e.g. --appendix 1,3)
        #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u8).range(1..=3))]
        appendix: Vec<u8>,
        /// Switch every appendix filter off
        #[arg(long, conflicts_with = "appendix")]
        no_filters: bool,
        /// Show every match instead of the display limit
        #[arg(long)]
        all: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show one record by its exact code
    Show {
        code: String,
        #[arg(long)]
        json: bool,
    },
    /// Print appendix coverage statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout belongs to the MCP transport and --json output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = LookupConfig::load(args.config.as_deref())?.with_data_dir(args.data_dir);

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await,
        Commands::Build { source_dir } => build(&config, &source_dir),
        Commands::Search {
            query,
            appendix,
            no_filters,
            all,
            json,
        } => {
            let facets = if no_filters {
                FacetSet::none()
            } else if appendix.is_empty() {
                config.facets
            } else {
                FacetSet::from_appendices(appendix.into_iter().filter_map(Appendix::from_number))
            };
            let request = SearchRequest::new(query.join(" "))
                .with_facets(facets)
                .show_all(all);
            search(&config, &request, json)
        }
        Commands::Show { code, json } => show(&config, &code, json),
        Commands::Stats { json } => stats(&config, json),
    }
}

async fn serve(config: &LookupConfig) -> Result<()> {
    tracing::info!("Starting OKPD2 lookup MCP server on stdio...");
    if let Some(ref data_dir) = config.data_dir {
        tracing::info!("Using custom data directory: {}", data_dir.display());
    }

    let lookup_service = LookupService::from_config(config)?;

    let service = lookup_service.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}

fn build(config: &LookupConfig, source_dir: &std::path::Path) -> Result<()> {
    let (dataset, report) = build_from_sources(source_dir)?;
    let storage = DatasetStorage::new(config.data_dir.clone())?;
    let metadata = storage.save(&dataset)?;

    println!(
        "Built {} records into {}",
        metadata.record_count,
        storage.dataset_path().display()
    );
    for appendix in &report.appendices {
        println!(
            "  {}: {} points ({} with codes), {} citations, {} unmatched codes",
            appendix.appendix,
            appendix.points,
            appendix.processed_points,
            appendix.citations,
            appendix.unmatched_codes.len()
        );
    }
    if !report.duplicate_codes.is_empty() {
        println!("  duplicate codes: {}", report.duplicate_codes.join(", "));
    }
    if report.source_problems > 0 {
        println!("  skipped incomplete source rows: {}", report.source_problems);
    }
    Ok(())
}

fn search(config: &LookupConfig, request: &SearchRequest, json: bool) -> Result<()> {
    let dataset = DatasetStorage::new(config.data_dir.clone())?.load()?;
    let output = run_search(
        &dataset,
        &mut SearchSession::new(),
        request,
        &config.search_options(),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_search(&output));
    }
    Ok(())
}

fn show(config: &LookupConfig, code: &str, json: bool) -> Result<()> {
    let dataset = DatasetStorage::new(config.data_dir.clone())?.load()?;
    let record = dataset
        .find_by_code(code)
        .with_context(|| format!("Code not found: {}", code.trim()))?;
    let details = record_details(&dataset, record, &config.search_options().links);

    if json {
        let output = GetRecordOutput { record: details };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_record(&details));
    }
    Ok(())
}

fn stats(config: &LookupConfig, json: bool) -> Result<()> {
    let storage = DatasetStorage::new(config.data_dir.clone())?;
    let dataset = storage.load()?;
    let output = DatasetStatsOutput::for_dataset(&dataset, storage.load_metadata()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_stats(&output));
    }
    Ok(())
}

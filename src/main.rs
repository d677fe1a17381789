//! Binary entry point for soko.
//!
//! A demo CLI over the search engine: it loads a JSON catalog into the
//! in-memory backends and exposes each search surface as a subcommand.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr/print_stdout in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow unnecessary_wraps for consistent command function signatures
#![allow(clippy::unnecessary_wraps)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow option_if_let_else for environment variable fallback chains
#![allow(clippy::option_if_let_else)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Args, Parser, Subcommand};
use soko::config::EngineConfig;
use soko::observability::{self, LogFormat};
use soko::services::InMemoryAnalytics;
use soko::storage::{CatalogFile, InMemoryCatalog, InMemorySuggestions, MemoryCache, PopularTerms};
use soko::{
    AnalyticsDispatcher, AnalyticsSink, EventBus, ProductId, ProductRetriever, RawSearchParams,
    SearchService, ShopRetriever, SimilarityService, SuggestionService,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Soko - product search and ranking engine for marketplace catalogs.
#[derive(Parser)]
#[command(name = "soko")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the catalog JSON file.
    #[arg(long, global = true, env = "SOKO_CATALOG", default_value = "catalog.json")]
    catalog: PathBuf,

    /// Log output format: pretty or json.
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Search the product catalog.
    Search(SearchArgs),

    /// Query suggestions for a fragment.
    Suggest {
        /// The query fragment.
        fragment: String,
    },

    /// Title autocomplete for a fragment.
    Autocomplete {
        /// The title fragment.
        fragment: String,
    },

    /// Products similar to a given product.
    Similar {
        /// Source product ID.
        id: String,

        /// Maximum number of results.
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Search shops by name or description.
    Shops {
        /// The search query.
        query: Option<String>,

        /// Caller latitude.
        #[arg(long, requires = "lng")]
        lat: Option<f64>,

        /// Caller longitude.
        #[arg(long, requires = "lat")]
        lng: Option<f64>,

        /// Search radius in kilometers.
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Most popular search terms.
    Popular {
        /// Maximum number of terms.
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

/// Arguments for the search command.
#[derive(Args)]
struct SearchArgs {
    /// Free-text query.
    query: Option<String>,

    /// Filter by category ID.
    #[arg(long)]
    category: Option<String>,

    /// Filter by shop ID.
    #[arg(long)]
    shop: Option<String>,

    /// Minimum price.
    #[arg(long)]
    min_price: Option<f64>,

    /// Maximum price.
    #[arg(long)]
    max_price: Option<f64>,

    /// Filter by brand substring.
    #[arg(long)]
    brand: Option<String>,

    /// Comma-separated tag list.
    #[arg(long)]
    tags: Option<String>,

    /// Keep only in-stock products.
    #[arg(long)]
    in_stock: bool,

    /// Sort order: relevance, price_asc, price_desc, newest, popular, distance.
    #[arg(short, long)]
    sort: Option<String>,

    /// 1-based page number.
    #[arg(short, long)]
    page: Option<u32>,

    /// Results per page.
    #[arg(short, long)]
    limit: Option<usize>,

    /// Caller latitude.
    #[arg(long, requires = "lng")]
    lat: Option<f64>,

    /// Caller longitude.
    #[arg(long, requires = "lat")]
    lng: Option<f64>,

    /// Search radius in kilometers.
    #[arg(long)]
    radius: Option<f64>,

    /// Print the full JSON response.
    #[arg(long)]
    json: bool,
}

impl SearchArgs {
    /// Converts CLI arguments into the engine's parameter form.
    ///
    /// The engine normalizes from strings because its callers are HTTP
    /// layers; the CLI goes through the same path.
    fn to_params(&self) -> RawSearchParams {
        RawSearchParams {
            q: self.query.clone(),
            category: self.category.clone(),
            shop: self.shop.clone(),
            min_price: self.min_price.map(|v| v.to_string()),
            max_price: self.max_price.map(|v| v.to_string()),
            brand: self.brand.clone(),
            tags: self.tags.clone(),
            in_stock: self.in_stock.then(|| "true".to_string()),
            sort: self.sort.clone(),
            page: self.page.map(|v| v.to_string()),
            limit: self.limit.map(|v| v.to_string()),
            lat: self.lat.map(|v| v.to_string()),
            lng: self.lng.map(|v| v.to_string()),
            radius: self.radius.map(|v| v.to_string()),
        }
    }
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    // Local development overrides; a missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = observability::init_logging(LogFormat::parse(&cli.log_format), cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    match run_command(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration.
fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return EngineConfig::load_from_file(config_path).map_err(Into::into);
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var("SOKO_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return EngineConfig::load_from_file(Path::new(&config_path)).map_err(Into::into);
        }
    }

    Ok(EngineConfig::default())
}

/// Builds the engine over the catalog file and runs the selected command.
async fn run_command(cli: Cli, config: EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalog_file = CatalogFile::load(&cli.catalog)?;
    tracing::info!(
        products = catalog_file.products.len(),
        shops = catalog_file.shops.len(),
        path = %cli.catalog.display(),
        "Catalog loaded"
    );

    let catalog = Arc::new(InMemoryCatalog::new(catalog_file.products, catalog_file.shops));
    let popular = PopularTerms::new();
    let backend = InMemorySuggestions::new(
        Arc::clone(&catalog),
        catalog_file.suggestions,
        popular.clone(),
    );
    let suggestions =
        Arc::new(SuggestionService::new(Arc::new(backend)).with_config(config.suggest));

    // The dispatcher drains search events into the analytics sink for as
    // long as the process lives. The sink shares the popular-terms
    // counter with the suggestion backend, so executed searches feed the
    // popular-searches source.
    let event_bus = EventBus::default();
    let sink: Arc<dyn AnalyticsSink> = Arc::new(InMemoryAnalytics::new(popular));
    let dispatcher = AnalyticsDispatcher::new(sink);
    let dispatcher_bus = event_bus.clone();
    tokio::spawn(async move { dispatcher.run(&dispatcher_bus).await });

    let cache = Arc::new(MemoryCache::new(config.cache.capacity));
    let service = SearchService::new(Arc::clone(&catalog) as Arc<dyn ProductRetriever>)
        .with_config(config)
        .with_cache(cache)
        .with_suggestions(Arc::clone(&suggestions))
        .with_shops(Arc::clone(&catalog) as Arc<dyn ShopRetriever>)
        .with_event_bus(event_bus);

    match cli.command {
        Commands::Search(args) => cmd_search(&service, &args),
        Commands::Suggest { fragment } => cmd_suggest(&suggestions, &fragment),
        Commands::Autocomplete { fragment } => cmd_autocomplete(&service, &fragment),
        Commands::Similar { id, limit } => cmd_similar(&catalog, &id, limit),
        Commands::Shops {
            query,
            lat,
            lng,
            radius,
        } => cmd_shops(&service, query, lat, lng, radius),
        Commands::Popular { limit } => cmd_popular(&suggestions, limit),
    }
}

/// Search command.
fn cmd_search(
    service: &SearchService,
    args: &SearchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = service.search(&args.to_params())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let pagination = &response.pagination;
    println!(
        "Found {} products (page {} of {}):",
        pagination.total,
        pagination.page,
        pagination.total_pages.max(1)
    );
    println!();

    for hit in &response.products {
        let score = hit
            .relevance_score
            .map_or_else(String::new, |s| format!("[{s:.2}] "));
        let distance = hit
            .distance_km
            .map_or_else(String::new, |d| format!(", {d:.1} km"));
        println!(
            "  {}{} - {:.0} ({}{})",
            score, hit.product.title, hit.product.price, hit.product.shop.name, distance
        );
    }

    if !response.suggestions.is_empty() {
        println!();
        println!("Suggestions: {}", response.suggestions.join(", "));
    }

    Ok(())
}

/// Suggest command.
fn cmd_suggest(
    service: &SuggestionService,
    fragment: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let suggestions = service.suggest(fragment);

    if suggestions.is_empty() {
        println!("No suggestions for '{fragment}'");
        return Ok(());
    }

    println!("Suggestions for '{fragment}':");
    for suggestion in &suggestions {
        println!("  {} ({})", suggestion.term, suggestion.source.as_str());
    }

    Ok(())
}

/// Autocomplete command.
fn cmd_autocomplete(
    service: &SearchService,
    fragment: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = service.autocomplete(fragment)?;

    if entries.is_empty() {
        println!("No matches for '{fragment}'");
        return Ok(());
    }

    for entry in &entries {
        println!("  {} - {:.0}", entry.title, entry.price);
    }

    Ok(())
}

/// Similar products command.
fn cmd_similar(
    catalog: &Arc<InMemoryCatalog>,
    id: &str,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = SimilarityService::new(Arc::clone(catalog) as Arc<dyn ProductRetriever>);
    let products = service.find_similar(&ProductId::new(id), limit)?;

    if products.is_empty() {
        println!("No similar products for '{id}'");
        return Ok(());
    }

    println!("Products similar to '{id}':");
    for product in &products {
        println!(
            "  {} - {:.0} ({})",
            product.title,
            product.price,
            product.id.as_str()
        );
    }

    Ok(())
}

/// Shop search command.
fn cmd_shops(
    service: &SearchService,
    query: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    radius: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = RawSearchParams {
        q: query,
        lat: lat.map(|v| v.to_string()),
        lng: lng.map(|v| v.to_string()),
        radius: radius.map(|v| v.to_string()),
        ..RawSearchParams::default()
    };
    let response = service.search_shops(&params)?;

    println!("Found {} shops:", response.total);
    for hit in &response.shops {
        let distance = hit
            .distance
            .map_or_else(String::new, |d| format!(" ({d:.1} km)"));
        println!("  {}{}", hit.shop.name, distance);
    }

    Ok(())
}

/// Popular searches command.
fn cmd_popular(
    service: &SuggestionService,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let terms = service.popular(limit)?;

    if terms.is_empty() {
        println!("No searches recorded yet");
        return Ok(());
    }

    println!("Popular searches:");
    for entry in &terms {
        println!("  {} ({} searches)", entry.term, entry.count);
    }

    Ok(())
}

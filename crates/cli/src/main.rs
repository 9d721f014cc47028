//! Shopfront CLI - Browse the catalog and manage the cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Search the catalog
//! sf-cli search --q "running shoes" --usage Sports
//!
//! # Browse a category listing (cat, sub or use)
//! sf-cli category use Casual
//!
//! # Show a product page
//! sf-cli product 15970
//!
//! # Filter brands the way the header's brand picker does
//! sf-cli brands nik --select
//!
//! # Manage the cart
//! sf-cli cart add 15970 --quantity 2
//! sf-cli cart show
//! sf-cli cart clear
//! ```
//!
//! Configuration comes from the environment (see `StorefrontConfig`), with
//! `--api-url` and `--storage` as overrides.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_core::SearchParams;
use shopfront_storefront::api::FilterList;
use shopfront_storefront::{AppError, AppState, StorefrontConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Shopfront storefront client")]
struct Cli {
    /// Retail REST API base URL (overrides `SHOPFRONT_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Local storage file (overrides `SHOPFRONT_STORAGE_PATH`)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search products
    Search {
        /// Free-text query
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        article_type: Option<String>,
        #[arg(long)]
        usage: Option<String>,
        #[arg(long)]
        brand: Option<String>,
    },
    /// List a category
    Category {
        /// Index to filter on
        #[arg(value_enum)]
        index: CategoryRoute,
        /// Value to match
        value: String,
    },
    /// Show a product page
    Product {
        /// Product ID
        id: String,
    },
    /// List the values of a filter
    Filters {
        #[arg(value_enum)]
        list: FilterArg,
    },
    /// Narrow the brand list by typed text
    Brands {
        /// Text typed into the brand picker
        #[arg(default_value = "")]
        text: String,

        /// Commit the highlighted brand and print the resulting search link
        #[arg(long)]
        select: bool,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product ID
        id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 or less removes it)
    Update {
        /// Product ID
        id: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryRoute {
    /// Top-level category
    Cat,
    /// Sub-category
    Sub,
    /// Usage
    Use,
}

impl CategoryRoute {
    const fn segment(self) -> &'static str {
        match self {
            Self::Cat => "cat",
            Self::Sub => "sub",
            Self::Use => "use",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    Categories,
    ArticleTypes,
    UsageTypes,
    BrandNames,
}

impl From<FilterArg> for FilterList {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Categories => Self::Categories,
            FilterArg::ArticleTypes => Self::ArticleTypes,
            FilterArg::UsageTypes => Self::UsageTypes,
            FilterArg::BrandNames => Self::BrandNames,
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn load_config(cli: &Cli) -> Result<StorefrontConfig, AppError> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url)?;
    }
    if let Some(storage) = &cli.storage {
        config.storage_path.clone_from(storage);
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            config_failed(&e);
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean on stdout
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_storefront=info,shopfront_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let state = AppState::new(config);

    if let Err(e) = run(cli.command, &state).await {
        e.report();
        std::process::exit(1);
    }
}

/// Configuration errors surface before the subscriber exists.
#[allow(clippy::print_stderr)]
fn config_failed(error: &AppError) {
    eprintln!("Failed to load configuration: {error}");
}

async fn run(command: Commands, state: &AppState) -> Result<(), AppError> {
    match command {
        Commands::Search {
            q,
            category,
            article_type,
            usage,
            brand,
        } => {
            let params = SearchParams {
                q,
                category,
                article_type,
                usage,
                brand_name: brand,
            };
            commands::catalog::search(state, params).await?;
        }
        Commands::Category { index, value } => {
            commands::catalog::category(state, index.segment(), &value).await?;
        }
        Commands::Product { id } => commands::catalog::product(state, &id).await?,
        Commands::Filters { list } => commands::catalog::filters(state, list.into()).await?,
        Commands::Brands { text, select } => {
            commands::catalog::brands(state, &text, select).await?;
        }
        Commands::Cart { action } => {
            state.cart().load().await;
            match action {
                CartAction::Show => commands::cart::show(state),
                CartAction::Add { id, quantity } => {
                    commands::cart::add(state, &id, quantity).await?;
                }
                CartAction::Update { id, quantity } => {
                    commands::cart::update(state, &id, quantity).await;
                }
                CartAction::Remove { id } => commands::cart::remove(state, &id).await,
                CartAction::Clear => commands::cart::clear(state).await,
            }
        }
    }
    Ok(())
}

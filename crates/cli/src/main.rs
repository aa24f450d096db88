//! Ferremas CLI - drive the storefront cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart with totals
//! ferremas show
//!
//! # Add three units of product 42
//! ferremas add 42 -q 3
//!
//! # Set line item 7 to 5 units (0 or less removes it)
//! ferremas update 7 5
//!
//! # Write the payment gateway redirect page
//! ferremas checkout -o pay.html
//! ```
//!
//! # Environment Variables
//!
//! - `FERREMAS_BASE_URL` - Server origin (required)
//! - `FERREMAS_SESSION_COOKIE` - Session cookie of a logged-in user
//! - `SENTRY_DSN` - Error tracking (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ferremas_storefront::config::ClientConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "ferremas")]
#[command(author, version, about = "Ferremas storefront cart client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart and its totals
    Show {
        /// Print the rendered cart rows instead of a summary
        #[arg(long)]
        html: bool,
    },
    /// Add a product to the cart
    Add {
        /// Product id
        product_id: i32,

        /// Units to add (clamped to 1..=99)
        #[arg(short, long, default_value = "1")]
        quantity: String,
    },
    /// Set the quantity of a line item
    Update {
        /// Line item id
        item_id: i32,

        /// New quantity; 0 or less removes the item
        #[arg(allow_negative_numbers = true)]
        quantity: i64,

        /// Don't ask before removing
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove a line item
    Remove {
        /// Line item id
        item_id: i32,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove every line item
    Clear {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the cart badge
    Badge,
    /// Start payment and write the gateway redirect page
    Checkout {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Route tracing events to Sentry: errors and warnings as events, the rest
/// as breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ferremas_storefront=info,ferremas_cli=info".into());

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_env_filter(env_filter).init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let _sentry_guard = init_sentry(&config);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Show { html } => commands::cart::show(config, html).await,
        Commands::Add {
            product_id,
            quantity,
        } => commands::cart::add(config, product_id.into(), &quantity).await,
        Commands::Update {
            item_id,
            quantity,
            yes,
        } => commands::cart::update(config, item_id.into(), quantity, yes).await,
        Commands::Remove { item_id, yes } => {
            commands::cart::remove(config, item_id.into(), yes).await
        }
        Commands::Clear { yes } => commands::cart::clear(config, yes).await,
        Commands::Badge => commands::cart::badge(config).await,
        Commands::Checkout { output } => commands::checkout::checkout(config, output).await,
    }
}

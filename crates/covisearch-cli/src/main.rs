mod directory;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::search::{OutputFormat, SearchArgs};

#[derive(Debug, Parser)]
#[command(name = "covisearch")]
#[command(about = "Find verified COVID-19 resource leads by city")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for leads in a city
    Search {
        /// City to search in
        #[arg(long)]
        city: String,
        /// Resource category (value or display name, e.g. oxygen)
        #[arg(long)]
        resource: String,
        /// Subcategory for grouped resources (defaults to the "all" entry)
        #[arg(long)]
        subresource: Option<String>,
        /// Page of results to show, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,
        /// How each lead is rendered
        #[arg(long, value_enum, default_value = "copy")]
        format: OutputFormat,
        /// Print a WhatsApp share link after each lead
        #[arg(long)]
        share_links: bool,
    },
    /// List known cities, optionally filtered by prefix
    Cities {
        /// Case-insensitive name prefix
        prefix: Option<String>,
    },
    /// Show the cities closest to a city
    Nearby {
        /// City to measure from
        city: String,
    },
    /// List searchable resource categories
    Resources,
    /// List the upstream sites leads are gathered from
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = covisearch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Some(Commands::Search {
            city,
            resource,
            subresource,
            page,
            format,
            share_links,
        }) => {
            let args = SearchArgs {
                city,
                resource,
                subresource,
                page,
                format,
                share_links,
            };
            search::run_search(&config, &args).await?;
        }
        Some(Commands::Cities { prefix }) => {
            directory::run_cities(&config, prefix.as_deref().unwrap_or_default())?;
        }
        Some(Commands::Nearby { city }) => directory::run_nearby(&config, &city)?,
        Some(Commands::Resources) => directory::run_resources(&config)?,
        Some(Commands::Sources) => directory::run_sources(&config)?,
        None => println!("covisearch: run with --help to see available commands"),
    }

    Ok(())
}

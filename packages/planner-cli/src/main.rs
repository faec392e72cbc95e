//! `planner`: find venues and vendors for an event from the terminal.
//!
//! ```text
//! planner venue --location Mumbai --event-type wedding --budget 500000 --guests 200
//! planner vendor --service catering --location Pune --event-type birthday --budget 80000
//! planner categories dj florist "wedding cake"
//! ```

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use discovery::{
    error_sentinel, Discovery, DiscoveryConfig, DiscoveryError, Listing, Provider, Query,
    ServiceCategory,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(180);

const EXIT_FAILURE: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_EMPTY: u8 = 3;
const EXIT_TIMEOUT: u8 = 4;
const EXIT_INVALID: u8 = 64;

#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Venue and vendor discovery for event planning")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find event venues
    Venue {
        #[command(flatten)]
        event: EventArgs,

        /// Expected number of guests
        #[arg(long)]
        guests: Option<u32>,

        /// e.g. "banquet hall", "resort"
        #[arg(long)]
        venue_type: Option<String>,
    },

    /// Find service vendors (catering, decoration, photography, ...)
    Vendor {
        #[arg(long)]
        service: String,

        #[command(flatten)]
        event: EventArgs,
    },

    /// Show which category each service word maps to
    Categories {
        words: Vec<String>,
    },
}

#[derive(Args)]
struct EventArgs {
    #[arg(long)]
    location: String,

    #[arg(long)]
    event_type: String,

    /// Budget in rupees
    #[arg(long)]
    budget: u64,

    /// Print the raw JSON listing instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,discovery=debug,mistral_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Venue {
            event,
            guests,
            venue_type,
        } => {
            let mut query = Query::venue(&event.location, &event.event_type, event.budget);
            if let Some(guests) = guests {
                query = query.with_guest_count(guests);
            }
            if let Some(venue_type) = venue_type {
                query = query.with_venue_type(venue_type);
            }
            discover(&query, event.json).await
        }
        Commands::Vendor { service, event } => {
            let query = Query::new(service, &event.location, &event.event_type, event.budget);
            discover(&query, event.json).await
        }
        Commands::Categories { words } => {
            print_categories(&words);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn discover(query: &Query, json: bool) -> Result<ExitCode> {
    let discovery = match Discovery::from_env(DiscoveryConfig::default()) {
        Ok(discovery) => discovery,
        Err(e) => return Ok(report_error(&e, json)),
    };

    let outcome = tokio::time::timeout(DISCOVERY_TIMEOUT, discovery.discover(query)).await;
    let Ok(result) = outcome else {
        println!("TIMEOUT");
        return Ok(ExitCode::from(EXIT_TIMEOUT));
    };

    match result {
        Ok(listings) if json => {
            let rendered =
                serde_json::to_string_pretty(&listings).context("Failed to render listings")?;
            println!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
        Ok(listings) => {
            print_listings(&listings);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_error(&e, json)),
    }
}

fn report_error(error: &DiscoveryError, json: bool) -> ExitCode {
    if json {
        println!("{}", error_sentinel(error));
    }

    let code = match error {
        DiscoveryError::Config(reason) => {
            eprintln!("{} {}", "Missing API keys:".red().bold(), reason);
            eprintln!("{}", "Set SERPER_API_KEY and MISTRAL_API_KEY (or add them to .env)".dimmed());
            EXIT_CONFIG
        }
        DiscoveryError::EmptyResult(message) => {
            eprintln!("{}", message.yellow());
            EXIT_EMPTY
        }
        DiscoveryError::InvalidQuery { reason } => {
            eprintln!("{} {}", "Invalid query:".red().bold(), reason);
            EXIT_INVALID
        }
        other => {
            eprintln!("{} {}", "Discovery failed:".red().bold(), other);
            EXIT_FAILURE
        }
    };
    ExitCode::from(code)
}

fn print_listings(listings: &[Listing]) {
    let mut index = 0;
    for listing in listings {
        match listing {
            Listing::Header(header) => {
                println!();
                println!("{}", header.name.bright_blue().bold());
            }
            Listing::Provider(provider) => {
                index += 1;
                print_provider(index, provider);
            }
        }
    }
}

fn print_provider(index: usize, provider: &Provider) {
    let details = &provider.details;
    println!();
    println!("{} {}", format!("{index}.").dimmed(), provider.name.bright_green().bold());

    let rows = [
        ("Type", &details.service_type),
        ("Address", &details.address),
        ("Contact", &details.contact),
        ("Price", &details.price),
        ("Rating", &details.rating),
        ("Capacity", &details.capacity),
        ("Website", &details.website),
        ("Map", &details.map_url),
    ];
    for (label, value) in rows {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            println!("   {:<9}{}", format!("{label}:").cyan(), value);
        }
    }
    if let Some(description) = &details.description {
        println!("   {}", description.dimmed());
    }
    println!("   {:<9}{}", "Source:".cyan(), provider.source.dimmed());
}

fn print_categories(words: &[String]) {
    if words.is_empty() {
        println!("{}", "Pass one or more service words, e.g. `planner categories dj florist`".dimmed());
        return;
    }

    for word in words {
        let category = ServiceCategory::for_service(word);
        println!(
            "{:<20} {} {}",
            word.bold(),
            "->".dimmed(),
            category.label().bright_green()
        );
        println!("{:<20} sites: {}", "", category.preferred_sites().join(", "));
        println!("{:<20} estimate: {}", "", category.price_estimate());
    }
}

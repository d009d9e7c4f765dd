//! # Grabbit CLI Application
//!
//! This module implements the command-line interface for the grabbit scraper,
//! exposing its extraction pipeline through a set of subcommands.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands for different scraping operations:
//!   - `serve`: HTTP API for scraping and record administration
//!   - `scrape`: Single-page extraction printed as JSON
//!   - `batch`: Sequential scraping of a URL file
//!   - `list`: Stored record inspection
//!   - `clear`: Record store reset
//!
//! ## Features
//!
//! - Browser-like fetching with a configurable politeness delay
//! - Progress tracking for long-running batches
//! - JSON output suitable for piping
//! - Record persistence shared with the HTTP API

mod server;
mod telemetry;

use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use grabbit::scrape::{scrape_batch_with, scrape_product, PageFetcher, ScrapeConfig};
use grabbit::store::RecordStore;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Scrape product pages into structured records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP scraping and admin API
    Serve(ServeArgs),

    /// Scrape a single product page and print the record
    Scrape(ScrapeArgs),

    /// Scrape a file of URLs sequentially
    Batch(BatchArgs),

    /// List stored product records
    List(ListArgs),

    /// Remove all stored product records
    Clear(ClearArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind the HTTP server to (host:port)
    #[arg(short, long, env = "GRABBIT_BIND", default_value = "127.0.0.1:8080")]
    bind: String,

    /// Record store path
    #[arg(short, long, env = "GRABBIT_STORE", default_value = "data/products.json")]
    store: PathBuf,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Product page URL (scheme optional)
    #[arg(required = true)]
    url: String,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// File of newline-delimited product page URLs
    #[arg(required = true)]
    file: PathBuf,

    /// Append results to this record store instead of printing them
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Delay between requests in milliseconds
    #[arg(short, long, default_value = "500")]
    delay: u64,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Record store path
    #[arg(long, default_value = "data/products.json")]
    store: PathBuf,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct ClearArgs {
    /// Record store path
    #[arg(long, default_value = "data/products.json")]
    store: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing_subscriber();

    match cli.command {
        Commands::Serve(args) => {
            serve_command(args).await?;
        }
        Commands::Scrape(args) => {
            scrape_command(args).await?;
        }
        Commands::Batch(args) => {
            batch_command(args).await?;
        }
        Commands::List(args) => {
            list_command(args).await?;
        }
        Commands::Clear(args) => {
            clear_command(args).await?;
        }
    }

    Ok(())
}

#[instrument]
async fn serve_command(args: ServeArgs) -> anyhow::Result<()> {
    println!("Serving on http://{}", args.bind);
    server::run(&args.bind, RecordStore::with_path(args.store)).await
}

#[instrument]
async fn scrape_command(args: ScrapeArgs) -> anyhow::Result<()> {
    let fetcher = PageFetcher::default();
    let record = scrape_product(&fetcher, &args.url).await;

    let json = if args.pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    println!("{json}");
    Ok(())
}

#[instrument]
async fn batch_command(args: BatchArgs) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(&args.file).await?;
    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    if urls.is_empty() {
        anyhow::bail!("no URLs found in {}", args.file.display());
    }

    println!("Scraping {} URLs...", urls.len());

    let config = ScrapeConfig::builder().delay_ms(args.delay).build();
    let fetcher = PageFetcher::new(&config);

    let progress_bar = ProgressBar::new(urls.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut records = scrape_batch_with(&fetcher, &urls, &config, |record| {
        progress_bar.inc(1);
        progress_bar.set_message(record.title.clone());
    })
    .await;
    progress_bar.finish_with_message("Batch completed");

    let failures = records.iter().filter(|r| r.is_error()).count();

    if let Some(store_path) = args.store {
        let now = Utc::now();
        for record in &mut records {
            record.uploaded_at = Some(now);
        }
        let added = records.len();
        let store = RecordStore::with_path(store_path);
        let total = store.append(records).await?;
        println!(
            "Stored {} records ({} failed pages), {} total in {}",
            added,
            failures,
            total,
            store.path().display()
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }

    Ok(())
}

#[instrument]
async fn list_command(args: ListArgs) -> anyhow::Result<()> {
    let store = RecordStore::with_path(args.store);
    let records = store.load().await;

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        _ => {
            println!("Stored products: {}", records.len());
            for record in &records {
                if record.is_error() {
                    println!(
                        "{} - failed ({})",
                        record.url,
                        record.error.as_deref().unwrap_or("unknown")
                    );
                } else if record.price.is_empty() {
                    println!("{} - {}", record.url, record.title);
                } else {
                    println!("{} - {} ({})", record.url, record.title, record.price);
                }
            }
        }
    }

    Ok(())
}

#[instrument]
async fn clear_command(args: ClearArgs) -> anyhow::Result<()> {
    let store = RecordStore::with_path(args.store);
    store.clear().await?;
    println!("All products cleared");
    Ok(())
}

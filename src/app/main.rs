//! Quote Sync command line entry point
//!
//! Opens the local store from the data directory and runs one command
//! against it. `watch` keeps the background scheduler running until Ctrl-C.

use clap::{Parser, Subcommand, ValueEnum};
use quote_sync::app::config::Config;
use quote_sync::app::local_store::{export_file_name, CategoryFilter, LocalStore};
use quote_sync::app::remote::HttpRemote;
use quote_sync::app::storage::{FileStorage, MemoryStorage};
use quote_sync::app::sync::notifier::TracingNotifier;
use quote_sync::app::sync::review::ReviewItem;
use quote_sync::app::sync::{SyncScheduler, SyncService};
use quote_sync::shared::QuoteRecord;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "quote-sync")]
#[command(about = "Local-first quote collection with background sync", long_about = None)]
struct Cli {
    /// TOML config file (defaults to ./quote-sync.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync cycle now
    Sync {
        /// How to settle conflicts found by this cycle
        #[arg(long, value_enum, default_value_t = Resolve::Ask)]
        resolve: Resolve,
    },

    /// Sync at startup and then periodically until Ctrl-C
    Watch,

    /// List quotes, optionally for one category
    List {
        #[arg(long)]
        category: Option<String>,
    },

    /// List the known categories
    Categories,

    /// Add a quote
    Add { text: String, category: String },

    /// Remove a quote by id
    Remove { id: String },

    /// Show a random quote; the category (or "all") is remembered
    Random { category: Option<String> },

    /// Show one quote by id
    Show { id: String },

    /// Write every quote to a JSON file
    Export {
        /// Output path (defaults to a timestamped file name)
        path: Option<PathBuf>,
    },

    /// Append quotes from a JSON file
    Import { path: PathBuf },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Resolve {
    /// Prompt for each conflict
    Ask,
    /// Keep the server versions
    Remote,
    /// Restore local versions and push everything
    Local,
}

#[tokio::main]
async fn main() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config.as_deref())?;
    let durable = Arc::new(FileStorage::open(config.data_dir())?);
    tracing::debug!("Using data directory {}", durable.dir().display());
    let mut store = LocalStore::open(durable, Arc::new(MemoryStorage::new()));

    match cli.cmd {
        Commands::Sync { resolve } => {
            let remote = HttpRemote::new(config.app())?;
            let service = SyncService::new(store, remote, Arc::new(TracingNotifier));
            let report = service.sync_cycle(true).await?;
            println!(
                "fetched {}, added {}, updated {}, conflicts {}",
                report.fetched, report.added, report.updated, report.conflicts
            );
            review(&service, resolve).await?;
            service.store().lock().await.check_persisted()?;
        }
        Commands::Watch => {
            let remote = HttpRemote::new(config.app())?;
            let service = Arc::new(SyncService::new(store, remote, Arc::new(TracingNotifier)));
            let mut scheduler = SyncScheduler::new(service, config.sync_interval());
            scheduler.start();
            tokio::signal::ctrl_c().await?;
            scheduler.stop().await;
            scheduler.service().store().lock().await.check_persisted()?;
            let status = scheduler.service().status().await;
            println!(
                "{} cycles, {} unresolved conflicts",
                status.cycles_completed, status.pending_conflicts
            );
        }
        Commands::List { category } => {
            let filter = category
                .as_deref()
                .map(CategoryFilter::parse)
                .unwrap_or_default();
            for quote in store.filtered(&filter) {
                print_quote(quote);
            }
        }
        Commands::Categories => {
            for category in store.categories() {
                println!("{}", category);
            }
        }
        Commands::Add { text, category } => {
            let quote = store.add(&text, &category)?;
            store.check_persisted()?;
            println!("Quote added locally. Will sync soon. ({})", quote.id);
        }
        Commands::Remove { id } => {
            let removed = store.remove(&id)?;
            store.check_persisted()?;
            println!("Removed \"{}\"", removed.text);
        }
        Commands::Random { category } => {
            let filter = match category {
                Some(category) => {
                    let filter = CategoryFilter::parse(&category);
                    store.set_filter(&filter)?;
                    filter
                }
                None => store.selected_filter(),
            };
            match store.random_quote(&filter) {
                Some(quote) => print_quote(&quote),
                None => println!("No quotes available for this category."),
            }
        }
        Commands::Show { id } => print_quote(&store.show(&id)?),
        Commands::Export { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(export_file_name(chrono::Utc::now())));
            std::fs::write(&path, store.export_json()?)?;
            println!("Exported {} quotes to {}", store.len(), path.display());
        }
        Commands::Import { path } => {
            let document = std::fs::read_to_string(&path)?;
            let count = store.import_json(&document)?;
            store.check_persisted()?;
            println!("Imported {} quotes.", count);
        }
    }

    Ok(())
}

async fn review(
    service: &SyncService<HttpRemote>,
    resolve: Resolve,
) -> Result<(), Box<dyn std::error::Error>> {
    let items = service.review_items().await;
    if items.is_empty() {
        return Ok(());
    }

    match resolve {
        Resolve::Remote => service.keep_all_remote().await,
        Resolve::Local => {
            let report = service.keep_all_local().await;
            println!("pushed {} of {}", report.succeeded, report.total());
        }
        Resolve::Ask => {
            let stdin = std::io::stdin();
            for item in items {
                print_conflict(&item);
                print!("keep [r]emote / [l]ocal? ");
                std::io::stdout().flush()?;

                let mut answer = String::new();
                if stdin.lock().read_line(&mut answer)? == 0 {
                    service.dismiss_review().await;
                    break;
                }
                if answer.trim().eq_ignore_ascii_case("l") {
                    service.keep_local(&item.conflict.id).await?;
                } else {
                    service.keep_remote(&item.conflict.id).await?;
                }
            }
        }
    }
    Ok(())
}

fn print_quote(quote: &QuoteRecord) {
    println!("[{}] \"{}\" ({})", quote.id, quote.text, quote.category);
}

fn print_conflict(item: &ReviewItem) {
    let conflict = &item.conflict;
    println!("Conflict on {}:", conflict.id);
    println!("  local:  \"{}\" ({})", conflict.local.text, conflict.local.category);
    println!("  server: \"{}\" ({})", conflict.remote.text, conflict.remote.category);
}

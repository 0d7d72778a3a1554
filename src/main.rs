//! Huddle-Mapper main entry point
//!
//! This is the command-line interface for the Huddle-Mapper folder crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use huddle_mapper::config::{load_config_with_hash, Config};
use huddle_mapper::storage::{open_store, SqliteStore};
use huddle_mapper::tree::Folder;
use huddle_mapper::{index, snapshot, ChromeRenderer, Crawler, PageCache, Session};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Huddle-Mapper: maps the folder tree of a Huddle workspace
///
/// Logs in through a real browser, walks every folder listing depth-first,
/// and stores the resulting tree as a current snapshot plus history.
#[derive(Parser, Debug)]
#[command(name = "huddle-mapper")]
#[command(version = "1.0.0")]
#[command(about = "Maps the folder tree of a Huddle workspace", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List only the first-level folders, without descending
    Roots {
        /// Fetch listings again even if cached
        #[arg(long)]
        force_refetch: bool,
    },

    /// Crawl the whole tree and store a snapshot
    Crawl {
        /// Fetch listings again even if cached
        #[arg(long)]
        force_refetch: bool,
    },

    /// Summarize the current snapshot
    Show,

    /// List stored snapshots, oldest first
    History,

    /// Write per-folder and per-file records from the current snapshot
    Index {
        /// Replace records that already exist
        #[arg(long)]
        overwrite: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    match cli.command {
        Command::Roots { force_refetch } => {
            config.crawler.force_refetch |= force_refetch;
            handle_crawl(&config, false).await
        }
        Command::Crawl { force_refetch } => {
            config.crawler.force_refetch |= force_refetch;
            handle_crawl(&config, true).await
        }
        Command::Show => handle_show(&config),
        Command::History => handle_history(&config),
        Command::Index { overwrite } => handle_index(&config, overwrite),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("huddle_mapper=info,warn"),
            1 => EnvFilter::new("huddle_mapper=debug,info"),
            2 => EnvFilter::new("huddle_mapper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = Path::new(&config.output.database_path);
    open_store(path).with_context(|| format!("Failed to open store at {}", path.display()))
}

/// Handles `roots` and `crawl`
///
/// The browser is closed whether or not the crawl succeeds.
async fn handle_crawl(config: &Config, full: bool) -> anyhow::Result<()> {
    let store = open(config)?;
    let session = Session::new(ChromeRenderer::new(config.crawler.headless), config);
    let cache = PageCache::new(session, store, config);
    let mut crawler = Crawler::new(cache, config);

    let result = run_crawl(&mut crawler, full).await;

    if let Err(e) = crawler
        .cache_mut()
        .session_mut()
        .renderer_mut()
        .close()
        .await
    {
        tracing::debug!("Failed to close browser: {}", e);
    }

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e)
        }
    }
}

async fn run_crawl(
    crawler: &mut Crawler<ChromeRenderer, SqliteStore>,
    full: bool,
) -> anyhow::Result<()> {
    let root = crawler.crawl_root().await?;
    println!("First-level folders ({}):", root.subfolders.len());
    for folder in &root.subfolders {
        println!("  {:>10}  {}", folder.id, folder.name);
    }

    if !full {
        return Ok(());
    }

    let record = crawler.expand_all().await?;
    let root = &crawler.tree().root;
    println!();
    println!(
        "✓ Crawled {} folders and {} files",
        root.folder_count(),
        root.file_count()
    );
    println!("✓ Snapshot stored as {}", record.key);
    Ok(())
}

/// Handles `show`: prints the shape of the current snapshot
fn handle_show(config: &Config) -> anyhow::Result<()> {
    let store = open(config)?;
    let tree = snapshot::load_current(&store)?
        .context("No snapshot stored yet; run `crawl` first")?;

    println!("Folders: {}", tree.root.folder_count());
    println!("Files:   {}", tree.root.file_count());
    println!();
    for folder in &tree.root.subfolders {
        print_folder(folder, 1);
    }
    Ok(())
}

fn print_folder(folder: &Folder, depth: usize) {
    println!(
        "{}{} [{}] ({} files)",
        "  ".repeat(depth),
        folder.name,
        folder.id,
        folder.files.len()
    );
    for child in &folder.subfolders {
        print_folder(child, depth + 1);
    }
}

/// Handles `history`: lists snapshot timestamps
fn handle_history(config: &Config) -> anyhow::Result<()> {
    let store = open(config)?;
    let records = snapshot::history(&store)?;

    if records.is_empty() {
        println!("No snapshots stored");
        return Ok(());
    }

    for record in records {
        let taken = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(record.timestamp)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| record.timestamp.to_string());
        println!("{}  {}", taken, record.key);
    }
    Ok(())
}

/// Handles `index`: flattens the current snapshot into per-entity records
fn handle_index(config: &Config, overwrite: bool) -> anyhow::Result<()> {
    let mut store = open(config)?;
    let tree = snapshot::load_current(&store)?
        .context("No snapshot stored yet; run `crawl` first")?;

    let summary = index::store_records(&mut store, &tree.root, overwrite)?;
    println!(
        "✓ {} folder records written ({} skipped)",
        summary.folders_written, summary.folders_skipped
    );
    println!(
        "✓ {} file records written ({} skipped)",
        summary.files_written, summary.files_skipped
    );
    Ok(())
}

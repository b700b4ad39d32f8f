use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::core::{
    Downloader, DurableSync, FileStore, LibraryStore, SearchProvider, SearchSession, SessionState,
    VideoRecord,
};
use crate::providers::PexelsProvider;
use crate::utils::{category_query, format_duration, CATEGORIES};

#[derive(Parser)]
#[command(name = "vidshelf")]
#[command(about = "Search stock videos and keep a saved library")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./vidshelf.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search the catalog
    Search {
        /// Free-text query (default: the configured default query)
        query: Option<String>,

        /// Browse a category instead of a free-text query
        #[arg(long, conflicts_with = "query")]
        category: Option<String>,
    },
    /// List browsable categories
    Categories,
    /// Save a video from search results
    Save {
        id: u64,

        /// Query whose results contain the video
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Remove a saved video
    Remove { id: u64 },
    /// Remove every saved video
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show saved videos
    List,
    /// Print the share link of a saved video
    Link { id: u64 },
    /// Download a video's selected variant
    Download {
        id: u64,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Search this query instead of looking in the saved library
        #[arg(short, long)]
        query: Option<String>,
    },
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Command::Search { query, category } => {
                let query = match category {
                    Some(name) => category_query(name)
                        .with_context(|| format!("Unknown category '{}'", name))?
                        .to_string(),
                    None => query.clone().unwrap_or_else(|| config.default_query.clone()),
                };
                let library = open_library(&config);
                let results = search(&config, &query).await?;
                if results.is_empty() {
                    println!("No videos found. Try a different search term or browse a category.");
                }
                for record in &results {
                    print_record(record, library.contains(record.id));
                }
            }
            Command::Categories => {
                for category in CATEGORIES {
                    println!("{:<12} {}", category.name, category.query);
                }
            }
            Command::Save { id, query } => {
                let query = query.as_deref().unwrap_or(&config.default_query);
                let record = find_in_search(&config, query, *id).await?;
                let mut library = open_library(&config);
                if library.add(record)?.added {
                    println!("Video Saved Successfully!");
                } else {
                    println!("Video already exists!");
                }
            }
            Command::Remove { id } => {
                let mut library = open_library(&config);
                if library.remove(*id)?.removed {
                    println!("Video removed from saved!");
                } else {
                    println!("Video {} is not in your library", id);
                }
            }
            Command::Clear { yes } => {
                let mut library = open_library(&config);
                if !yes {
                    println!(
                        "This removes all {} saved videos. Re-run with --yes to confirm.",
                        library.len()
                    );
                    return Ok(());
                }
                library.clear()?;
                println!("All saved videos cleared!");
            }
            Command::List => {
                let library = open_library(&config);
                if library.is_empty() {
                    println!("No saved videos yet.");
                }
                for record in library.list() {
                    print_record(record, true);
                }
            }
            Command::Link { id } => {
                let library = open_library(&config);
                let record = library
                    .get(*id)
                    .with_context(|| format!("Video {} is not in your library", id))?;
                println!("{}", record.canonical_url);
            }
            Command::Download { id, output, query } => {
                let library = open_library(&config);
                let (record, from_library) = match (query, library.get(*id)) {
                    (None, Some(record)) => (record.clone(), true),
                    (query, _) => {
                        let query = query.as_deref().unwrap_or(&config.default_query);
                        (find_in_search(&config, query, *id).await?, false)
                    }
                };

                let downloader = Downloader::new(
                    &config.user_agent,
                    Duration::from_secs(config.timeout),
                    config.retries,
                )?;
                let path = downloader.download(&record, output, from_library).await?;
                println!("Downloaded to {}", path.display());
            }
        }

        Ok(())
    }
}

fn open_library(config: &Config) -> LibraryStore {
    let store = FileStore::new(&config.data_dir);
    let library = LibraryStore::hydrate(DurableSync::new(Box::new(store), config.slot.clone()));
    if let Some(e) = library.recovered_error() {
        eprintln!("Warning: saved library could not be read and was reset ({})", e);
    }
    library
}

fn provider(config: &Config) -> Result<Arc<dyn SearchProvider>> {
    let provider = PexelsProvider::new(
        &config.base_url,
        config.api_key.clone(),
        &config.user_agent,
        Duration::from_secs(config.timeout),
    )?;
    Ok(Arc::new(provider))
}

async fn search(config: &Config, query: &str) -> Result<Vec<VideoRecord>> {
    let mut session = SearchSession::start(provider(config)?, config.page_size, query);
    session.settle().await;

    match session.into_state() {
        SessionState::Loaded { results, .. } => Ok(results),
        SessionState::Failed { query, error } => {
            Err(anyhow::Error::new(error).context(format!("Search for '{}' failed", query)))
        }
        SessionState::Idle { .. } => bail!("Enter a search term."),
        state => bail!("Search for '{}' did not complete", state.query()),
    }
}

async fn find_in_search(config: &Config, query: &str, id: u64) -> Result<VideoRecord> {
    search(config, query)
        .await?
        .into_iter()
        .find(|r| r.id == id)
        .with_context(|| format!("Video {} not found in results for '{}'", id, query))
}

fn print_record(record: &VideoRecord, saved: bool) {
    println!(
        "{:>10}  {:>6}  {:<4} {} {}",
        record.id,
        format_duration(record.duration_seconds),
        record.quality_label(),
        if saved { "♥" } else { " " },
        record.uploader_name
    );
}

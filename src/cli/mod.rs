//! CLI commands for pmis-palette.
//!
//! One-shot access to the palette engine: run a search the way the palette
//! would, inspect the catalog, and manage the recent-search log.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::core::{Catalog, CategoryFilter, PaletteState};
use crate::palette::CommandPalette;
use crate::services::{HttpSearchClient, LocalStorage, RecentSearches, RemoteSearch};

#[derive(Parser)]
#[command(name = "pmis-palette")]
#[command(about = "Global search for the PMIS client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog and the remote backend
    Search {
        query: String,

        /// Only show one category ("all" for everything)
        #[arg(long, default_value = "all")]
        category: String,

        /// Skip the remote backend
        #[arg(long)]
        offline: bool,

        /// Print result groups as JSON
        #[arg(long)]
        json: bool,

        /// Select the N-th result (0-based), recording the query as recent
        #[arg(long, value_name = "N")]
        select: Option<usize>,
    },

    /// Show or clear recent searches
    Recent {
        #[arg(long)]
        clear: bool,
    },

    /// List navigation catalog entries
    Catalog,
}

/// Load the catalog named by the config, or the built-in one.
pub fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    match &config.catalog_path {
        Some(path) => Catalog::load(Path::new(path)).context("loading catalog"),
        None => Ok(Catalog::builtin()),
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    match cli.command {
        Commands::Search {
            query,
            category,
            offline,
            json,
            select,
        } => search(&config, &query, &category, offline, json, select).await,
        Commands::Recent { clear } => recent(&config, clear),
        Commands::Catalog => {
            let catalog = load_catalog(&config)?;
            for entry in catalog.entries() {
                println!("{:<20} {:<28} {}", entry.id, entry.title, entry.path);
            }
            Ok(())
        }
    }
}

async fn search(
    config: &Config,
    query: &str,
    category: &str,
    offline: bool,
    json: bool,
    select: Option<usize>,
) -> anyhow::Result<()> {
    let catalog = Arc::new(load_catalog(config)?);
    let recent = RecentSearches::load(LocalStorage::open_default(), &config.recent);

    let mut config = config.clone();
    config.remote.enabled &= !offline;

    let mut palette = CommandPalette::new(&config, catalog, recent, |path: &str| {
        println!("-> {}", path);
    });
    palette.open();
    palette.set_category_filter(CategoryFilter::parse(category));
    palette.set_query(query, Instant::now());

    if let Some(request) = palette.flush() {
        let client = HttpSearchClient::from_config(&config.remote)?;
        let result = client.search(&request.query).await;
        palette.apply_remote(request.generation, result);
    }

    if palette.state() == PaletteState::OpenEmpty {
        println!(
            "Query must be at least {} characters",
            config.search.min_query_length
        );
        return Ok(());
    }

    if let Some(index) = select {
        if palette.select(index).is_none() {
            anyhow::bail!("no result at index {}", index);
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(palette.groups())?);
        return Ok(());
    }

    if palette.state() == PaletteState::OpenNoResults {
        println!("No results for \"{}\"", query.trim());
        return Ok(());
    }

    let mut row = 0;
    for group in palette.groups() {
        println!("{}", group.category);
        for result in &group.results {
            let detail = result.candidate.detail().unwrap_or_default();
            println!(
                "  [{:>2}] {:<28} {:<32} {:>3}  {}",
                row, result.candidate.title, result.candidate.path, result.relevance_score, detail
            );
            row += 1;
        }
    }
    Ok(())
}

fn recent(config: &Config, clear: bool) -> anyhow::Result<()> {
    let mut recent = RecentSearches::load(LocalStorage::open_default(), &config.recent);
    if clear {
        recent.clear().context("clearing recent searches")?;
        println!("Recent searches cleared");
        return Ok(());
    }

    for query in recent.all() {
        println!("{}", query);
    }
    Ok(())
}

//! pmis-palette - command-palette global search for the PMIS client.
//!
//! Local fuzzy matching over a navigation catalog, merged with debounced
//! remote search results, ranked, grouped by category and navigable from
//! the keyboard. Selections are remembered in a client-local recent-search
//! log.
//!
//! # Architecture
//!
//! - [`core`] - Clock-free engine: catalog, matcher, query controller,
//!   ranker and selection state
//! - [`services`] - Local storage, recent searches and the remote backend
//! - [`palette`] - The event-driven palette tying the engine together
//! - [`runtime`] - Tokio driver owning a palette (timers, remote dispatch)
//! - [`config`] - Configuration loading and management
//! - [`cli`] - One-shot command-line access
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use pmis_palette::{Catalog, CommandPalette, Config, RecentSearches};
//!
//! let mut config = Config::default();
//! config.remote.enabled = false;
//!
//! let mut palette = CommandPalette::new(
//!     &config,
//!     Arc::new(Catalog::builtin()),
//!     RecentSearches::in_memory(&config.recent),
//!     |path: &str| println!("navigate to {path}"),
//! );
//!
//! let now = Instant::now();
//! palette.open();
//! palette.set_query("dash", now);
//! palette.tick(now + Duration::from_millis(300));
//! assert_eq!(palette.results()[0].candidate.title, "Dashboard");
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod palette;
pub mod runtime;
pub mod services;

mod error;

pub use config::Config;
pub use crate::core::{
    Catalog, CategoryFilter, PaletteKey, PaletteState, ScoredResult, SearchCandidate,
};
pub use error::{PaletteError, PaletteResult};
pub use palette::{CommandPalette, Navigator, PaletteSnapshot, RemoteRequest, Selection};
pub use runtime::{PaletteCommand, PaletteHandle};
pub use services::{HttpSearchClient, RecentSearches, RemoteSearch};

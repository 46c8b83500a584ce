//! Core search engine - clock-free, UI-agnostic palette logic.
//!
//! This module contains everything that doesn't depend on a runtime or a
//! backend:
//! - Candidate and result types
//! - Navigation catalog
//! - Fuzzy matcher
//! - Debounced query controller
//! - Result merger/ranker
//! - Keyboard selection state

pub mod candidate;
pub mod catalog;
pub mod matcher;
pub mod query;
pub mod ranker;
pub mod selection;

pub use candidate::{MatchSource, RemoteHit, ScoredResult, SearchCandidate, PAGES_CATEGORY};
pub use catalog::Catalog;
pub use matcher::Matcher;
pub use query::{Debouncer, InputOutcome, QueryController, SettledQuery};
pub use ranker::{group_by_category, merge, CategoryFilter, RankOptions, ResultGroup};
pub use selection::{PaletteKey, PaletteState, SelectionState};

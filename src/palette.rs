//! The command palette: query controller, matcher, ranker, selection and
//! recent-search log wired into one event-driven state machine.
//!
//! The host raises events (`open`, `set_query`, `tick`, `handle_key`,
//! `apply_remote`, `dismiss`...) and renders from the accessors or a
//! [`PaletteSnapshot`]. Remote searches are not performed here: `tick`
//! hands back a [`RemoteRequest`] and the host feeds the outcome to
//! `apply_remote` together with the generation it was issued for.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::config::Config;
use crate::core::{
    group_by_category, merge, Catalog, CategoryFilter, InputOutcome, Matcher, PaletteKey,
    PaletteState, QueryController, RankOptions, RemoteHit, ResultGroup, ScoredResult,
    SearchCandidate, SelectionState, SettledQuery,
};
use crate::error::PaletteResult;
use crate::services::RecentSearches;

/// Receives the destination of a selected result.
pub trait Navigator: Send {
    fn navigate(&mut self, path: &str);
}

impl<F> Navigator for F
where
    F: FnMut(&str) + Send,
{
    fn navigate(&mut self, path: &str) {
        self(path)
    }
}

/// A remote search the host should run for a settled query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    pub query: String,
    pub generation: u64,
}

/// What the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub candidate: SearchCandidate,
    /// Typed query at selection time; empty for quick-links.
    pub query: String,
}

/// Render-ready view of the palette.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteSnapshot {
    pub state: PaletteState,
    pub query: String,
    pub groups: Vec<ResultGroup>,
    pub selection: SelectionState,
    pub recent: Vec<String>,
    pub filter: Option<String>,
}

pub struct CommandPalette {
    catalog: Arc<Catalog>,
    matcher: Matcher,
    controller: QueryController,
    recent: RecentSearches,
    navigator: Box<dyn Navigator>,
    rank: RankOptions,
    remote_enabled: bool,
    remote_default_score: u32,

    state: PaletteState,
    local: Vec<ScoredResult>,
    remote: Vec<ScoredResult>,
    groups: Vec<ResultGroup>,
    /// Selectable rows in display order (groups flattened).
    rows: Vec<ScoredResult>,
    selection: SelectionState,
}

impl CommandPalette {
    pub fn new(
        config: &Config,
        catalog: Arc<Catalog>,
        recent: RecentSearches,
        navigator: impl Navigator + 'static,
    ) -> Self {
        Self {
            catalog,
            matcher: Matcher::from_config(config),
            controller: QueryController::new(
                config.search.debounce(),
                config.search.min_query_length,
            ),
            recent,
            navigator: Box::new(navigator),
            rank: RankOptions {
                pin_threshold: config.search.pin_threshold,
                max_results: config.search.max_results,
                filter: CategoryFilter::All,
            },
            remote_enabled: config.remote.enabled,
            remote_default_score: config.scoring.remote_default,
            state: PaletteState::Closed,
            local: Vec::new(),
            remote: Vec::new(),
            groups: Vec::new(),
            rows: Vec::new(),
            selection: SelectionState::new(config.search.visible_rows),
        }
    }

    pub fn open(&mut self) {
        if self.state.is_open() {
            return;
        }
        self.state = PaletteState::OpenEmpty;
        self.show_quick_links();
    }

    /// Close and forget the query. Pending debounce is cancelled; replies
    /// still in flight will fail the generation check.
    pub fn close(&mut self) {
        self.state = PaletteState::Closed;
        self.controller.reset();
        self.local.clear();
        self.remote.clear();
        self.replace_rows(Vec::new());
    }

    /// Outside click or loss of focus, raised by the host.
    pub fn dismiss(&mut self) {
        if self.state.is_open() {
            tracing::debug!("palette dismissed");
            self.close();
        }
    }

    pub fn toggle(&mut self) {
        if self.state.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Feed the raw contents of the input box.
    pub fn set_query(&mut self, text: &str, now: Instant) {
        if !self.state.is_open() {
            return;
        }
        match self.controller.input(text, now) {
            InputOutcome::Cleared => {
                self.state = PaletteState::OpenEmpty;
                self.show_quick_links();
            }
            InputOutcome::Pending => {
                // quick-links are not results for the typed query
                if self.state == PaletteState::OpenEmpty {
                    self.local.clear();
                    self.remote.clear();
                    self.replace_rows(Vec::new());
                }
                self.state = PaletteState::OpenLoading;
            }
        }
    }

    /// Advance timers. Returns the remote search to dispatch when a query
    /// settles and a remote source is enabled.
    pub fn tick(&mut self, now: Instant) -> Option<RemoteRequest> {
        if !self.state.is_open() {
            return None;
        }
        let settled = self.controller.poll(now)?;
        self.run_settled(settled)
    }

    /// Settle the pending query without waiting for the quiet period.
    pub fn flush(&mut self) -> Option<RemoteRequest> {
        if !self.state.is_open() {
            return None;
        }
        let settled = self.controller.flush()?;
        self.run_settled(settled)
    }

    fn run_settled(&mut self, settled: SettledQuery) -> Option<RemoteRequest> {
        self.local = self.score_catalog(&settled.query);
        self.remote.clear();
        self.rebuild();

        if self.remote_enabled {
            tracing::debug!(query = %settled.query, generation = settled.generation, "dispatching remote search");
            Some(RemoteRequest {
                query: settled.query,
                generation: settled.generation,
            })
        } else {
            self.finish();
            None
        }
    }

    /// Apply the outcome of a remote search. Returns `false` when the reply
    /// is stale and was discarded.
    pub fn apply_remote(&mut self, generation: u64, result: PaletteResult<Vec<RemoteHit>>) -> bool {
        if !self.state.is_open() || !self.controller.is_current(generation) {
            tracing::debug!(
                generation,
                current = self.controller.generation(),
                "discarding stale remote reply"
            );
            return false;
        }

        self.remote = match result {
            Ok(hits) => self.score_remote(hits),
            Err(e) => {
                tracing::warn!(error = %e, "remote search failed, showing local results only");
                Vec::new()
            }
        };
        self.rebuild();
        self.finish();
        true
    }

    pub fn set_category_filter(&mut self, filter: CategoryFilter) {
        self.rank.filter = filter;
        match self.state {
            PaletteState::OpenLoading => self.rebuild(),
            PaletteState::OpenResults | PaletteState::OpenNoResults => {
                self.rebuild();
                self.finish();
            }
            PaletteState::Closed | PaletteState::OpenEmpty => {}
        }
    }

    pub fn handle_key(&mut self, key: PaletteKey) -> Option<Selection> {
        if !self.state.is_open() {
            return None;
        }
        match key {
            PaletteKey::ArrowDown => self.selection.move_down(),
            PaletteKey::ArrowUp => self.selection.move_up(),
            PaletteKey::Home => self.selection.first(),
            PaletteKey::End => self.selection.last(),
            PaletteKey::Enter => return self.activate(),
            PaletteKey::Escape => self.close(),
        }
        None
    }

    /// Pick a row directly (pointer click).
    pub fn select(&mut self, index: usize) -> Option<Selection> {
        if !self.state.is_open() || index >= self.rows.len() {
            return None;
        }
        self.selection.select(index);
        self.activate()
    }

    /// Re-run a recent search as the current query.
    pub fn use_recent(&mut self, index: usize, now: Instant) -> bool {
        if !self.state.is_open() {
            return false;
        }
        let Some(query) = self.recent.list().get(index).cloned() else {
            return false;
        };
        self.set_query(&query, now);
        true
    }

    pub fn clear_recent(&mut self) -> PaletteResult<()> {
        self.recent.clear()
    }

    fn activate(&mut self) -> Option<Selection> {
        let index = self.selection.selected()?;
        let candidate = self.rows.get(index)?.candidate.clone();
        let query = self.controller.raw().trim().to_string();

        if !query.is_empty() {
            if let Err(e) = self.recent.save(&query) {
                tracing::warn!(error = %e, "failed to persist recent search");
            }
        }

        self.navigator.navigate(&candidate.path);
        self.close();
        Some(Selection { candidate, query })
    }

    fn score_catalog(&self, query: &str) -> Vec<ScoredResult> {
        self.catalog
            .entries()
            .iter()
            .filter_map(|c| {
                self.matcher
                    .score(c, query)
                    .map(|score| ScoredResult::local(c.clone(), score))
            })
            .collect()
    }

    fn score_remote(&self, hits: Vec<RemoteHit>) -> Vec<ScoredResult> {
        let query = self.controller.settled().unwrap_or_default();
        hits.into_iter()
            .map(|hit| {
                let server_score = hit.score;
                let candidate = hit.into_candidate();
                let score = server_score
                    .or_else(|| self.matcher.score(&candidate, query))
                    .unwrap_or(self.remote_default_score);
                ScoredResult::remote(candidate, score)
            })
            .collect()
    }

    fn show_quick_links(&mut self) {
        self.local.clear();
        self.remote.clear();
        let links = self
            .catalog
            .quick_links()
            .map(|c| ScoredResult::local(c.clone(), 0))
            .collect();
        self.replace_rows(links);
    }

    fn rebuild(&mut self) {
        let merged = merge(self.local.clone(), self.remote.clone(), &self.rank);
        self.replace_rows(merged);
    }

    fn replace_rows(&mut self, ordered: Vec<ScoredResult>) {
        self.groups = group_by_category(ordered);
        self.rows = self
            .groups
            .iter()
            .flat_map(|g| g.results.iter().cloned())
            .collect();
        self.selection.reset(self.rows.len());
    }

    fn finish(&mut self) {
        self.state = if self.rows.is_empty() {
            PaletteState::OpenNoResults
        } else {
            PaletteState::OpenResults
        };
    }

    pub fn state(&self) -> PaletteState {
        self.state
    }

    pub fn query(&self) -> &str {
        self.controller.raw()
    }

    pub fn generation(&self) -> u64 {
        self.controller.generation()
    }

    /// When the pending query will settle, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.state.is_open() {
            self.controller.deadline()
        } else {
            None
        }
    }

    /// Search results; empty while nothing has been typed.
    pub fn results(&self) -> &[ScoredResult] {
        match self.state {
            PaletteState::Closed | PaletteState::OpenEmpty => &[],
            _ => &self.rows,
        }
    }

    /// Selectable rows: quick-links in the empty state, results otherwise.
    pub fn rows(&self) -> &[ScoredResult] {
        &self.rows
    }

    pub fn groups(&self) -> &[ResultGroup] {
        &self.groups
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selected(&self) -> Option<&ScoredResult> {
        self.selection.selected().and_then(|i| self.rows.get(i))
    }

    pub fn recent_searches(&self) -> &[String] {
        self.recent.list()
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.rank.filter
    }

    /// Highlight positions for a row title under the current query.
    pub fn highlight(&self, text: &str) -> Vec<usize> {
        self.matcher.highlight(text, self.controller.raw())
    }

    pub fn snapshot(&self) -> PaletteSnapshot {
        PaletteSnapshot {
            state: self.state,
            query: self.query().to_string(),
            groups: self.groups.clone(),
            selection: self.selection.clone(),
            recent: self.recent.list().to_vec(),
            filter: match &self.rank.filter {
                CategoryFilter::All => None,
                CategoryFilter::Only(name) => Some(name.clone()),
            },
        }
    }
}

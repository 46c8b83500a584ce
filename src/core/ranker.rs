//! Merges local catalog matches with remote results into one ranked,
//! capped, grouped list.

use std::collections::HashSet;

use serde::Serialize;

use super::candidate::{MatchSource, ScoredResult};

/// Restricts results to one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// `"all"` (any case) or blank means no filter.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }

    pub fn accepts(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted.eq_ignore_ascii_case(category),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RankOptions {
    /// Local results at or above this score sort ahead of all remote ones.
    pub pin_threshold: u32,
    pub max_results: usize,
    pub filter: CategoryFilter,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            pin_threshold: 100,
            max_results: 20,
            filter: CategoryFilter::All,
        }
    }
}

/// A display section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultGroup {
    pub category: String,
    pub results: Vec<ScoredResult>,
}

/// Combine, filter, rank, deduplicate and cap.
///
/// Ordering: pinned local results first, then everything else by
/// descending score. Equal keys keep their input order, local before
/// remote. When two results share a destination path only the
/// better-ranked one survives.
pub fn merge(
    local: Vec<ScoredResult>,
    remote: Vec<ScoredResult>,
    options: &RankOptions,
) -> Vec<ScoredResult> {
    let mut results: Vec<ScoredResult> = local
        .into_iter()
        .chain(remote)
        .filter(|r| options.filter.accepts(r.category()))
        .collect();

    results.sort_by_key(|r| {
        let pinned =
            r.matched_via == MatchSource::Local && r.relevance_score >= options.pin_threshold;
        (!pinned, std::cmp::Reverse(r.relevance_score))
    });

    let mut seen = HashSet::new();
    results.retain(|r| seen.insert(r.path().to_string()));
    results.truncate(options.max_results);
    results
}

/// Split into sections by category, in order of first appearance.
pub fn group_by_category(results: Vec<ScoredResult>) -> Vec<ResultGroup> {
    let mut groups: Vec<ResultGroup> = Vec::new();
    for result in results {
        match groups.iter_mut().find(|g| g.category == result.category()) {
            Some(group) => group.results.push(result),
            None => groups.push(ResultGroup {
                category: result.category().to_string(),
                results: vec![result],
            }),
        }
    }
    groups
}

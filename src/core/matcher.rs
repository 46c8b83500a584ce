//! Fuzzy matcher: substring first, ordered subsequence as a fallback.
//!
//! Scoring tiers (defaults from [`ScoringConfig`]):
//!
//! | match                          | score |
//! |--------------------------------|-------|
//! | title starts with query        | 100   |
//! | title contains query           | 50    |
//! | keyword contains query         | 40    |
//! | description contains query     | 30    |
//! | subsequence of title / keyword | 20    |
//!
//! The subsequence scan walks the text once and advances a query cursor on
//! each exact character match. It only runs for queries of at least
//! `fuzzy_min_length` characters, so one or two typed letters never match
//! scattered characters.

use super::candidate::SearchCandidate;
use crate::config::{Config, ScoringConfig};

#[derive(Debug, Clone)]
pub struct Matcher {
    scoring: ScoringConfig,
    fuzzy_min_length: usize,
}

impl Matcher {
    pub fn new(scoring: ScoringConfig, fuzzy_min_length: usize) -> Self {
        Self {
            scoring,
            fuzzy_min_length,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.scoring.clone(), config.search.fuzzy_min_length)
    }

    /// Whether `query` matches `text` by substring or, for long enough
    /// queries, by ordered subsequence.
    pub fn matches(&self, text: &str, query: &str) -> bool {
        let query = normalize(query);
        if query.is_empty() {
            return false;
        }
        let text = normalize(text);
        text.contains(&query) || (self.fuzzy_allowed(&query) && is_subsequence(&text, &query))
    }

    /// Score a candidate, or `None` if nothing matches.
    pub fn score(&self, candidate: &SearchCandidate, query: &str) -> Option<u32> {
        let query = normalize(query);
        if query.is_empty() {
            return None;
        }

        let title = normalize(&candidate.title);
        let keywords: Vec<String> = candidate.keywords.iter().map(|k| normalize(k)).collect();

        let mut best = None;
        if title.starts_with(&query) {
            best = Some(self.scoring.prefix);
        } else if title.contains(&query) {
            best = Some(self.scoring.substring);
        }
        if keywords.iter().any(|k| k.contains(&query)) {
            best = best.max(Some(self.scoring.keyword));
        }
        if candidate
            .description
            .as_deref()
            .is_some_and(|d| normalize(d).contains(&query))
        {
            best = best.max(Some(self.scoring.description));
        }

        if best.is_none()
            && self.fuzzy_allowed(&query)
            && (is_subsequence(&title, &query) || keywords.iter().any(|k| is_subsequence(k, &query)))
        {
            best = Some(self.scoring.fuzzy);
        }

        best
    }

    /// Char positions in `text` to emphasize for `query`: a contiguous run
    /// for substring matches, the scanned characters for subsequence
    /// matches, empty when nothing matches.
    pub fn highlight(&self, text: &str, query: &str) -> Vec<usize> {
        let text: Vec<char> = text.chars().map(fold).collect();
        let query: Vec<char> = query.trim().chars().map(fold).collect();
        if query.is_empty() || query.len() > text.len() {
            return Vec::new();
        }

        if let Some(start) = text.windows(query.len()).position(|w| w == query.as_slice()) {
            return (start..start + query.len()).collect();
        }

        if query.len() < self.fuzzy_min_length {
            return Vec::new();
        }

        let mut positions = Vec::with_capacity(query.len());
        let mut cursor = 0;
        for (i, c) in text.iter().enumerate() {
            if cursor < query.len() && *c == query[cursor] {
                positions.push(i);
                cursor += 1;
            }
        }
        if cursor == query.len() {
            positions
        } else {
            Vec::new()
        }
    }

    fn fuzzy_allowed(&self, normalized_query: &str) -> bool {
        normalized_query.chars().count() >= self.fuzzy_min_length
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Single-char lowercase so positions stay aligned with the source text.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn is_subsequence(text: &str, query: &str) -> bool {
    let mut query = query.chars().peekable();
    for c in text.chars() {
        match query.peek() {
            Some(&q) if q == c => {
                query.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    query.peek().is_none()
}

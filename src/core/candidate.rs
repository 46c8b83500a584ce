//! Candidate and result types shared by the matcher, ranker and palette.

use serde::{Deserialize, Deserializer, Serialize};

/// Category assigned to catalog pages.
pub const PAGES_CATEGORY: &str = "Pages";

/// A single searchable item: a navigation page or a remote entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Destination handed to the navigator on selection.
    pub path: String,
    /// Remote entity type (`project`, `document`, `risk`...).
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
}

impl SearchCandidate {
    /// Create a navigation page candidate.
    pub fn page(id: &str, title: &str, path: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            category: PAGES_CATEGORY.to_string(),
            keywords: Vec::new(),
            path: path.to_string(),
            kind: None,
            subtitle: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Secondary line for a result row.
    pub fn detail(&self) -> Option<&str> {
        self.subtitle.as_deref().or(self.description.as_deref())
    }
}

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Local,
    Remote,
}

/// A candidate scored against one settled query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    pub candidate: SearchCandidate,
    pub relevance_score: u32,
    pub matched_via: MatchSource,
}

impl ScoredResult {
    pub fn local(candidate: SearchCandidate, relevance_score: u32) -> Self {
        Self {
            candidate,
            relevance_score,
            matched_via: MatchSource::Local,
        }
    }

    pub fn remote(candidate: SearchCandidate, relevance_score: u32) -> Self {
        Self {
            candidate,
            relevance_score,
            matched_via: MatchSource::Remote,
        }
    }

    pub fn category(&self) -> &str {
        &self.candidate.category
    }

    pub fn path(&self) -> &str {
        &self.candidate.path
    }
}

/// A remote search hit as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteHit {
    pub id: serde_json::Value,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(alias = "path")]
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<u32>,
}

impl RemoteHit {
    /// Convert into a candidate. Category falls back to a title-cased type.
    pub fn into_candidate(self) -> SearchCandidate {
        let id = match self.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        let category = self
            .category
            .or_else(|| self.kind.as_deref().map(category_for_kind))
            .unwrap_or_else(|| "Results".to_string());

        SearchCandidate {
            id,
            title: self.title,
            description: None,
            category,
            keywords: Vec::new(),
            path: self.url,
            kind: self.kind,
            subtitle: self.subtitle,
        }
    }
}

/// Accepts any JSON number. A score that cannot be placed on the ranking
/// scale is dropped instead of failing the whole response.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(score_from_json))
}

/// Integers are taken as-is. Fractions in `0..=1` are normalized relevance
/// and scaled to 0-100; other floats are rounded.
fn score_from_json(value: &serde_json::Value) -> Option<u32> {
    let serde_json::Value::Number(number) = value else {
        return None;
    };
    if let Some(n) = number.as_u64() {
        return Some(u32::try_from(n).unwrap_or(u32::MAX));
    }
    let f = number.as_f64()?;
    if !f.is_finite() || f < 0.0 {
        return None;
    }
    let scaled = if f <= 1.0 { f * 100.0 } else { f };
    Some(scaled.round().min(u32::MAX as f64) as u32)
}

/// `"risk"` -> `"Risks"`, `"document"` -> `"Documents"`.
fn category_for_kind(kind: &str) -> String {
    let mut chars = kind.chars();
    let Some(first) = chars.next() else {
        return "Results".to_string();
    };
    let mut label: String = first.to_uppercase().chain(chars).collect();
    if !label.ends_with('s') {
        label.push('s');
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_hit_from_json() {
        let hit: RemoteHit = serde_json::from_str(
            r#"{"id": 42, "title": "Invoice INV-001", "subtitle": "Package 3",
                "type": "invoice", "url": "/billing/invoices/42"}"#,
        )
        .unwrap();

        let candidate = hit.into_candidate();
        assert_eq!(candidate.id, "42");
        assert_eq!(candidate.category, "Invoices");
        assert_eq!(candidate.kind.as_deref(), Some("invoice"));
        assert_eq!(candidate.detail(), Some("Package 3"));
    }

    #[test]
    fn test_remote_hit_explicit_category_wins() {
        let hit: RemoteHit = serde_json::from_str(
            r#"{"id": "r-7", "title": "Flood risk", "type": "risk",
                "path": "/risks/7", "category": "Risk Register"}"#,
        )
        .unwrap();

        let candidate = hit.into_candidate();
        assert_eq!(candidate.category, "Risk Register");
        assert_eq!(candidate.path, "/risks/7");
    }

    #[test]
    fn test_remote_hit_scores() {
        let hits: Vec<RemoteHit> = serde_json::from_str(
            r#"[
                {"id": 1, "title": "A", "url": "/a", "score": 0.87},
                {"id": 2, "title": "B", "url": "/b", "score": 64},
                {"id": 3, "title": "C", "url": "/c", "score": 12.4},
                {"id": 4, "title": "D", "url": "/d", "score": "high"},
                {"id": 5, "title": "E", "url": "/e", "score": -3},
                {"id": 6, "title": "F", "url": "/f", "score": null}
            ]"#,
        )
        .unwrap();

        let scores: Vec<Option<u32>> = hits.iter().map(|h| h.score).collect();
        assert_eq!(scores, vec![Some(87), Some(64), Some(12), None, None, None]);
    }

    #[test]
    fn test_remote_hit_without_type() {
        let hit: RemoteHit =
            serde_json::from_str(r#"{"id": 1, "title": "Thing", "url": "/x"}"#).unwrap();
        assert_eq!(hit.into_candidate().category, "Results");
    }
}

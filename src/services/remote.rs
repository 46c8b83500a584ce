//! Remote search backend.
//!
//! The palette treats the backend as opaque: it may be slow, may fail and
//! may answer out of order. [`HttpSearchClient`] talks to the PMIS REST API
//! (`GET /api/search/?q=...`).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::RemoteConfig;
use crate::core::candidate::RemoteHit;
use crate::error::{PaletteError, PaletteResult};

#[async_trait]
pub trait RemoteSearch: Send + Sync {
    async fn search(&self, query: &str) -> PaletteResult<Vec<RemoteHit>>;
}

/// Accepts either a bare array or a `{ "results": [...] }` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Bare(Vec<RemoteHit>),
    Envelope { results: Vec<RemoteHit> },
}

impl SearchResponse {
    fn into_hits(self) -> Vec<RemoteHit> {
        match self {
            SearchResponse::Bare(hits) => hits,
            SearchResponse::Envelope { results } => results,
        }
    }
}

#[derive(Clone)]
pub struct HttpSearchClient {
    http: reqwest::Client,
    url: String,
}

impl HttpSearchClient {
    pub fn new(base_url: &str, endpoint: &str, timeout: Duration) -> PaletteResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Ok(Self { http, url })
    }

    pub fn from_config(config: &RemoteConfig) -> PaletteResult<Self> {
        Self::new(&config.base_url, &config.endpoint, config.timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RemoteSearch for HttpSearchClient {
    async fn search(&self, query: &str) -> PaletteResult<Vec<RemoteHit>> {
        let resp = self
            .http
            .get(&self.url)
            .query(&[("q", query)])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PaletteError::Remote(format!(
                "search request failed: {status} - {body}"
            )));
        }
        let response: SearchResponse = resp.json().await?;
        Ok(response.into_hits())
    }
}

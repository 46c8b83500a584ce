//! Error types for the palette
//!
//! Provides standardized error handling across the crate. Nothing here is
//! fatal to the host: the palette degrades to local-only results or an
//! empty state and logs the cause.

use thiserror::Error;

/// Errors that can occur in the palette
#[derive(Debug, Error)]
pub enum PaletteError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog loading errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Remote search failures (network, server, decoding)
    #[error("Remote search error: {0}")]
    Remote(String),

    /// Recent-search persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for PaletteError {
    fn from(err: reqwest::Error) -> Self {
        PaletteError::Remote(err.to_string())
    }
}

/// Result type alias for palette operations
pub type PaletteResult<T> = Result<T, PaletteError>;

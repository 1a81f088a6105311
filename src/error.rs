//! Custom error types for the scanner
//!
//! Provides structured, typed errors instead of generic Box<dyn Error>

use thiserror::Error;

/// Top-level scan errors.
///
/// Only `EmptyUniverse`, `InvalidRequest` and `Config` abort a scan, and only
/// before fetching begins. The per-ticker variants are values the pipeline
/// counts and logs while it keeps going.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Quote unavailable for {ticker}: {reason}")]
    QuoteUnavailable { ticker: String, reason: String },

    #[error("News source {source_name} unavailable for {ticker}: {reason}")]
    NewsSourceUnavailable {
        source_name: String,
        ticker: String,
        reason: String,
    },

    #[error("Enrichment failed for {ticker}: {reason}")]
    EnrichmentFailure { ticker: String, reason: String },

    #[error("Ticker universe is empty")]
    EmptyUniverse,

    #[error("Invalid scan request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl ScanError {
    /// Whether this error stops the whole scan rather than a single ticker.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::EmptyUniverse | ScanError::InvalidRequest(_) | ScanError::Config(_)
        )
    }
}

/// Errors raised by quote and news provider adapters
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Missing {field} for {ticker}")]
    MissingData { ticker: String, field: String },

    #[error("Timed out after {ms}ms")]
    Timeout { ms: u64 },
}

impl From<String> for ScanError {
    fn from(err: String) -> Self {
        ScanError::Config(err)
    }
}

impl From<&str> for ScanError {
    fn from(err: &str) -> Self {
        ScanError::Config(err.to_string())
    }
}

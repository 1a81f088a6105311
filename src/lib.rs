//! Market Scanner - concurrent equity scan pipeline
//!
//! This library resolves a ticker universe into quotes, enriches the
//! survivors with headline sentiment, and ranks them by a composite score.

pub mod api;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod models;
pub mod progress;
pub mod providers;
pub mod services;
pub mod universe;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{ProviderError, ScanError};
pub use models::{NewsItem, Quote, ScoredStock, Sector, SentimentLabel, TickerSymbol};
pub use progress::{CancelToken, ProgressObserver, ScanPhase, ScanProgress};
pub use services::{ScanRequest, ScanResult, Scanner};
pub use universe::{TickerSelection, TickerUniverse};

#[cfg(test)]
mod models_tests;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::{NewsItem, TickerSymbol};

use super::types::RawQuote;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Source of per-ticker quote snapshots.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_quote(&self, ticker: &TickerSymbol) -> ProviderResult<RawQuote>;
}

/// One news feed keyed by ticker. Items come back most-recent-first.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_news(&self, ticker: &TickerSymbol, limit: usize) -> ProviderResult<Vec<NewsItem>>;
}

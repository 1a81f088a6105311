use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::constants::{events, news::SUMMARY_MAX_CHARS};
use crate::error::{ProviderError, ScanError};
use crate::models::{truncate_chars, NewsItem, TickerSymbol};
use crate::providers::traits::NewsSource;

/// What the scanner needs from a news backend. An `Err` drops the ticker.
#[async_trait]
pub trait NewsFeed: Send + Sync {
    async fn headlines(&self, ticker: &TickerSymbol, limit: usize) -> Result<Vec<NewsItem>, ScanError>;
}

/// Merges headlines from several sources. A failing source contributes nothing.
#[derive(Clone)]
pub struct NewsAggregator {
    sources: Vec<Arc<dyn NewsSource>>,
    timeout: Duration,
}

impl NewsAggregator {
    pub fn new(sources: Vec<Arc<dyn NewsSource>>, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub async fn get_stock_news(&self, ticker: &TickerSymbol, max_articles: usize) -> Vec<NewsItem> {
        let calls = self.sources.iter().map(|source| {
            let source = source.clone();
            async move {
                let result = match tokio::time::timeout(self.timeout, source.fetch_news(ticker, max_articles)).await {
                    Ok(r) => r,
                    Err(_) => Err(ProviderError::Timeout {
                        ms: self.timeout.as_millis() as u64,
                    }),
                };
                (source.name(), result)
            }
        });

        let mut batches = Vec::with_capacity(self.sources.len());
        for (name, result) in join_all(calls).await {
            match result {
                Ok(items) => {
                    debug!("📰 [NEWS] {} returned {} items for {}", name, items.len(), ticker);
                    batches.push(items);
                }
                Err(e) => {
                    let err = ScanError::NewsSourceUnavailable {
                        source_name: name.to_string(),
                        ticker: ticker.to_string(),
                        reason: e.to_string(),
                    };
                    warn!(event = events::NEWS_SOURCE_UNAVAILABLE, "⚠️ [NEWS] {}", err);
                }
            }
        }

        merge_headlines(batches, max_articles)
    }
}

#[async_trait]
impl NewsFeed for NewsAggregator {
    async fn headlines(&self, ticker: &TickerSymbol, limit: usize) -> Result<Vec<NewsItem>, ScanError> {
        Ok(self.get_stock_news(ticker, limit).await)
    }
}

/// Concatenate batches in source order, drop untitled items and exact-title
/// duplicates, and keep the first `limit`.
pub fn merge_headlines(batches: Vec<Vec<NewsItem>>, limit: usize) -> Vec<NewsItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(limit);

    for mut item in batches.into_iter().flatten() {
        if out.len() >= limit {
            break;
        }
        if item.title.trim().is_empty() || !seen.insert(item.title.clone()) {
            continue;
        }
        item.summary = truncate_chars(&item.summary, SUMMARY_MAX_CHARS);
        out.push(item);
    }

    out
}

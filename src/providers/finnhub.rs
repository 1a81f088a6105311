use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::config::FinnhubConfig;
use crate::error::ScanError;
use crate::models::{NewsItem, TickerSymbol};

use super::{
    get_json,
    traits::{NewsSource, ProviderResult},
};

#[derive(Clone)]
pub struct FinnhubClient {
    client: Client,
    base_url: String,
    api_key: String,
    lookback_days: i64,
}

#[derive(Deserialize, Debug)]
struct CompanyNews {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    datetime: i64,
}

impl FinnhubClient {
    pub fn new(config: &FinnhubConfig, api_key: String, timeout: Duration) -> Result<Self, ScanError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScanError::Config(format!("failed to build Finnhub HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            lookback_days: config.lookback_days.max(1),
        })
    }
}

#[async_trait]
impl NewsSource for FinnhubClient {
    fn name(&self) -> &'static str {
        "finnhub"
    }

    async fn fetch_news(&self, ticker: &TickerSymbol, limit: usize) -> ProviderResult<Vec<NewsItem>> {
        let to = Utc::now().date_naive();
        let from = to - chrono::Duration::days(self.lookback_days);

        let url = format!("{}/api/v1/company-news", self.base_url);
        let query = [
            ("symbol", ticker.to_string()),
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
            ("token", self.api_key.clone()),
        ];
        let mut articles: Vec<CompanyNews> = get_json(&self.client, &url, &query).await?;

        // The endpoint does not promise an order.
        articles.sort_by(|a, b| b.datetime.cmp(&a.datetime));

        Ok(articles
            .into_iter()
            .filter(|a| !a.headline.trim().is_empty())
            .take(limit)
            .map(|a| NewsItem::new(&a.headline, &a.summary, &a.url, &a.source))
            .collect())
    }
}

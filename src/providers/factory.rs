use std::sync::Arc;

use tracing::{info, warn};

use crate::{config::AppConfig, error::ScanError};

use super::{
    finnhub::FinnhubClient,
    traits::{NewsSource, QuoteProvider},
    yahoo::YahooClient,
};

pub fn build_quote_provider(config: &AppConfig) -> Result<Arc<dyn QuoteProvider>, ScanError> {
    let timeout = config.scan.provider_timeout();

    match config.quote_provider.to_lowercase().as_str() {
        "yahoo" => Ok(Arc::new(YahooClient::new(&config.yahoo, timeout)?)),
        other => Err(ScanError::Config(format!(
            "Unknown quote_provider='{}' (expected yahoo)",
            other
        ))),
    }
}

/// News sources in configured merge order. Finnhub is skipped without an API key.
pub fn build_news_sources(config: &AppConfig) -> Result<Vec<Arc<dyn NewsSource>>, ScanError> {
    let timeout = config.scan.provider_timeout();
    let mut sources: Vec<Arc<dyn NewsSource>> = Vec::new();

    for name in &config.news.sources {
        match name.to_lowercase().as_str() {
            "yahoo" => {
                sources.push(Arc::new(YahooClient::new(&config.yahoo, timeout)?));
            }
            "finnhub" => match &config.news.finnhub.api_key {
                Some(key) => {
                    sources.push(Arc::new(FinnhubClient::new(
                        &config.news.finnhub,
                        key.clone(),
                        timeout,
                    )?));
                }
                None => {
                    warn!("⚠️ FINNHUB_API_KEY not set - finnhub news source disabled");
                }
            },
            other => {
                return Err(ScanError::Config(format!(
                    "Unknown news source '{}' (expected yahoo|finnhub)",
                    other
                )))
            }
        }
    }

    info!("📰 News sources enabled: {}", sources.iter().map(|s| s.name()).collect::<Vec<_>>().join(", "));
    Ok(sources)
}

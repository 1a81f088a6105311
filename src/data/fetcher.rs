use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::constants::events;
use crate::error::{ProviderError, ScanError};
use crate::models::{Quote, Sector, TickerSymbol};
use crate::progress::CancelToken;
use crate::providers::traits::QuoteProvider;
use crate::providers::types::RawQuote;

/// One ticker to resolve, with the universe's sector as fallback
#[derive(Clone, Debug)]
pub struct QuoteRequest {
    pub ticker: TickerSymbol,
    pub sector_hint: Option<Sector>,
}

#[derive(Debug, Default)]
pub struct FetchReport {
    /// Unordered
    pub quotes: Vec<Quote>,
    pub unavailable: Vec<ScanError>,
}

/// Resolves quotes with at most `max_concurrent` requests in flight.
#[derive(Clone)]
pub struct MarketDataFetcher {
    provider: Arc<dyn QuoteProvider>,
    max_concurrent: usize,
    timeout: Duration,
}

impl MarketDataFetcher {
    pub fn new(provider: Arc<dyn QuoteProvider>, max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            provider,
            max_concurrent: max_concurrent.max(1),
            timeout,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Unresolved tickers are left out of `quotes` and listed in `unavailable`.
    /// After cancellation no new request starts; in-flight ones finish.
    pub async fn fetch_quotes(&self, requests: Vec<QuoteRequest>, cancel: &CancelToken) -> FetchReport {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let resolved: Arc<DashMap<TickerSymbol, Quote>> = Arc::new(DashMap::new());
        let mut join_set: JoinSet<Option<ScanError>> = JoinSet::new();

        info!(
            "📡 [FETCH] Resolving {} quotes via {} (max concurrent: {})",
            requests.len(),
            self.provider.name(),
            self.max_concurrent
        );

        for request in requests {
            let permit = tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => break,
                },
            };

            let provider = self.provider.clone();
            let resolved = resolved.clone();
            let timeout = self.timeout;

            join_set.spawn(async move {
                let result = Self::fetch_one(provider, &request, timeout).await;
                drop(permit);
                match result {
                    Ok(quote) => {
                        resolved.insert(quote.ticker.clone(), quote);
                        None
                    }
                    Err(e) => Some(e),
                }
            });
        }

        let mut unavailable = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(None) => {}
                Ok(Some(err)) => {
                    debug!(event = events::QUOTE_UNAVAILABLE, "[FETCH] {}", err);
                    unavailable.push(err);
                }
                Err(join_err) => {
                    warn!("⚠️ [FETCH] quote task failed: {}", join_err);
                    unavailable.push(ScanError::QuoteUnavailable {
                        ticker: "unknown".to_string(),
                        reason: join_err.to_string(),
                    });
                }
            }
        }

        let quotes: Vec<Quote> = resolved.iter().map(|entry| entry.value().clone()).collect();
        info!(
            "📡 [FETCH] Resolved {} quotes ({} unavailable)",
            quotes.len(),
            unavailable.len()
        );

        FetchReport { quotes, unavailable }
    }

    async fn fetch_one(
        provider: Arc<dyn QuoteProvider>,
        request: &QuoteRequest,
        timeout: Duration,
    ) -> Result<Quote, ScanError> {
        let unavailable = |reason: String| ScanError::QuoteUnavailable {
            ticker: request.ticker.to_string(),
            reason,
        };

        let raw = match tokio::time::timeout(timeout, provider.fetch_quote(&request.ticker)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(unavailable(e.to_string())),
            Err(_) => {
                let e = ProviderError::Timeout {
                    ms: timeout.as_millis() as u64,
                };
                return Err(unavailable(e.to_string()));
            }
        };

        normalize_quote(&request.ticker, raw, request.sector_hint)
            .ok_or_else(|| unavailable("no resolvable price".to_string()))
    }
}

/// current price -> regular market price -> previous close; first positive value wins.
pub fn resolve_price(raw: &RawQuote) -> Option<f64> {
    [raw.current_price, raw.regular_market_price, raw.previous_close]
        .into_iter()
        .flatten()
        .find(|p| p.is_finite() && *p > 0.0)
}

/// Build a `Quote` from a provider snapshot. `None` when no price resolves.
pub fn normalize_quote(
    ticker: &TickerSymbol,
    raw: RawQuote,
    sector_hint: Option<Sector>,
) -> Option<Quote> {
    let price = resolve_price(&raw)?;

    let (change_pct, volume) = match raw.history.as_slice() {
        [.., prior, last] if prior.close > 0.0 => {
            ((last.close - prior.close) / prior.close * 100.0, last.volume)
        }
        _ => (0.0, raw.volume.unwrap_or(0)),
    };

    let relative_volume = if raw.history.len() >= 2 {
        let total: u64 = raw.history.iter().map(|b| b.volume).sum();
        let avg = total as f64 / raw.history.len() as f64;
        (avg > 0.0).then(|| volume as f64 / avg)
    } else {
        None
    };

    let sector = raw
        .sector
        .as_deref()
        .map(Sector::parse)
        .filter(|s| *s != Sector::Unknown)
        .or(sector_hint)
        .unwrap_or(Sector::Unknown);

    let company = raw
        .company
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| ticker.to_string());

    Some(Quote {
        ticker: ticker.clone(),
        company,
        price,
        change_pct,
        volume,
        market_cap: raw.market_cap.filter(|m| m.is_finite() && *m >= 0.0).unwrap_or(0.0),
        sector,
        pe_ratio: raw.pe_ratio.filter(|pe| pe.is_finite() && *pe >= 0.0),
        beta: raw.beta.filter(|b| b.is_finite()),
        relative_volume,
    })
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::YahooConfig;
use crate::error::{ProviderError, ScanError};
use crate::models::{NewsItem, TickerSymbol};

use super::{
    get_json,
    traits::{NewsSource, ProviderResult, QuoteProvider},
    types::{DailyBar, RawQuote},
};

const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";

/// Yahoo Finance public endpoints: chart API for prices and history,
/// quoteSummary for fundamentals, search API for headlines.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
    cookie_url: String,
    fundamentals: bool,
    /// quoteSummary needs a crumb bound to the session cookie
    crumb: Arc<Mutex<Option<String>>>,
}

impl YahooClient {
    pub fn new(config: &YahooConfig, timeout: Duration) -> Result<Self, ScanError> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .user_agent("Mozilla/5.0 (compatible; market_scanner)")
            .build()
            .map_err(|e| ScanError::Config(format!("failed to build Yahoo HTTP client: {}", e)))?;

        let mut yahoo = Self::with_client(client, config.base_url.clone());
        yahoo.cookie_url = config.cookie_url.clone();
        yahoo.fundamentals = config.fundamentals;
        Ok(yahoo)
    }

    /// Chart and search only; fundamentals stay off unless built via `new`.
    pub fn with_client(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie_url: String::new(),
            fundamentals: false,
            crumb: Arc::new(Mutex::new(None)),
        }
    }

    /// Cached crumb, or a fresh one after visiting the cookie page.
    async fn crumb(&self) -> ProviderResult<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the Set-Cookie matters; the page itself usually answers 404.
        let _ = self
            .client
            .get(&self.cookie_url)
            .header(header::REFERER, "https://finance.yahoo.com/")
            .send()
            .await?;

        let resp = self
            .client
            .get(format!("{}/v1/test/getcrumb", self.base_url))
            .header(header::REFERER, "https://finance.yahoo.com/")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        let crumb = body.trim();
        if !status.is_success() || crumb.is_empty() || crumb.len() > 100 || crumb.contains(char::is_whitespace) {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: format!("no crumb: {}", crumb.chars().take(100).collect::<String>()),
            });
        }

        *cached = Some(crumb.to_string());
        Ok(crumb.to_string())
    }

    async fn fetch_summary(&self, ticker: &TickerSymbol) -> ProviderResult<Value> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, ticker);

        // One retry with a fresh crumb when the session has gone stale.
        for attempt in 0..2 {
            let query = [("modules", SUMMARY_MODULES.to_string()), ("crumb", self.crumb().await?)];
            match get_json::<Value>(&self.client, &url, &query).await {
                Err(ProviderError::Http { status: 401 | 429, .. }) if attempt == 0 => {
                    *self.crumb.lock().await = None;
                }
                other => return other,
            }
        }

        Err(ProviderError::MissingData {
            ticker: ticker.to_string(),
            field: "quoteSummary".to_string(),
        })
    }
}

#[async_trait]
impl QuoteProvider for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_quote(&self, ticker: &TickerSymbol) -> ProviderResult<RawQuote> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let query = [("range", "5d".to_string()), ("interval", "1d".to_string())];
        let chart: Value = get_json(&self.client, &url, &query).await?;
        let mut raw = parse_chart(ticker, &chart)?;

        if self.fundamentals {
            // Fundamentals are best-effort; the chart alone prices the ticker.
            let merged = self
                .fetch_summary(ticker)
                .await
                .and_then(|summary| merge_quote_summary(ticker, &mut raw, &summary));
            if let Err(e) = merged {
                debug!("[FETCH] {} fundamentals unavailable: {}", ticker, e);
            }
        }

        Ok(raw)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Deserialize)]
struct SearchNews {
    title: Option<String>,
    publisher: Option<String>,
    link: Option<String>,
    summary: Option<String>,
}

#[async_trait]
impl NewsSource for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_news(&self, ticker: &TickerSymbol, limit: usize) -> ProviderResult<Vec<NewsItem>> {
        let url = format!("{}/v1/finance/search", self.base_url);
        let query = [
            ("q", ticker.to_string()),
            ("quotesCount", "0".to_string()),
            ("newsCount", limit.to_string()),
        ];
        let resp: SearchResponse = get_json(&self.client, &url, &query).await?;

        Ok(resp
            .news
            .into_iter()
            .filter_map(|n| {
                let title = n.title?;
                Some(NewsItem::new(
                    &title,
                    n.summary.as_deref().unwrap_or_default(),
                    n.link.as_deref().unwrap_or_default(),
                    n.publisher.as_deref().unwrap_or("Yahoo Finance"),
                ))
            })
            .collect())
    }
}

/// Map a `/v8/finance/chart` document onto a `RawQuote`. The chart carries
/// price, previous close, volume, name and daily history; fundamentals come
/// from `merge_quote_summary`.
pub fn parse_chart(ticker: &TickerSymbol, raw: &Value) -> ProviderResult<RawQuote> {
    let result = raw
        .pointer("/chart/result/0")
        .filter(|v| !v.is_null())
        .ok_or_else(|| ProviderError::MissingData {
            ticker: ticker.to_string(),
            field: "chart.result".to_string(),
        })?;

    let meta = result.get("meta").cloned().unwrap_or(Value::Null);
    let num = |key: &str| meta.get(key).and_then(|x| x.as_f64());

    let closes = result
        .pointer("/indicators/quote/0/close")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    let volumes = result
        .pointer("/indicators/quote/0/volume")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    // Sessions with a null close (halted, not yet printed) are skipped.
    let history = closes
        .iter()
        .enumerate()
        .filter_map(|(i, close)| {
            let close = close.as_f64()?;
            let volume = volumes.get(i).and_then(|v| v.as_u64()).unwrap_or(0);
            Some(DailyBar { close, volume })
        })
        .collect();

    let company = meta
        .get("longName")
        .or_else(|| meta.get("shortName"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok(RawQuote {
        regular_market_price: num("regularMarketPrice"),
        previous_close: num("previousClose").or_else(|| num("chartPreviousClose")),
        volume: meta.get("regularMarketVolume").and_then(|v| v.as_u64()),
        company,
        history,
        ..Default::default()
    })
}

#[derive(Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
    financial_data: Option<FinancialDataModule>,
    asset_profile: Option<AssetProfileModule>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PriceModule {
    regular_market_price: Option<RawNumber>,
    regular_market_previous_close: Option<RawNumber>,
    regular_market_volume: Option<RawNumber>,
    market_cap: Option<RawNumber>,
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNumber>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawNumber>,
    beta: Option<RawNumber>,
    #[serde(rename = "marketCap")]
    market_cap: Option<RawNumber>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct KeyStatisticsModule {
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawNumber>,
    beta: Option<RawNumber>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct FinancialDataModule {
    current_price: Option<RawNumber>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct AssetProfileModule {
    sector: Option<String>,
}

/// quoteSummary wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`; empty objects mean absent.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawNumber {
    raw: Option<f64>,
}

fn raw_value(value: &Option<RawNumber>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw).filter(|v| v.is_finite())
}

/// Fill the gaps of a chart snapshot from a `/v10/finance/quoteSummary`
/// document. Values already present in `raw` win.
pub fn merge_quote_summary(ticker: &TickerSymbol, raw: &mut RawQuote, summary: &Value) -> ProviderResult<()> {
    let resp: QuoteSummaryResponse = serde_json::from_value(summary.clone())?;

    if let Some(err) = resp.quote_summary.error.filter(|e| !e.is_null()) {
        return Err(ProviderError::MissingData {
            ticker: ticker.to_string(),
            field: format!("quoteSummary ({})", err),
        });
    }

    let Some(result) = resp.quote_summary.result.and_then(|r| r.into_iter().next()) else {
        return Err(ProviderError::MissingData {
            ticker: ticker.to_string(),
            field: "quoteSummary.result".to_string(),
        });
    };

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();
    let profile = result.asset_profile.unwrap_or_default();

    raw.current_price = raw.current_price.or(raw_value(&financial.current_price));
    raw.regular_market_price = raw.regular_market_price.or(raw_value(&price.regular_market_price));
    raw.previous_close = raw.previous_close.or(raw_value(&price.regular_market_previous_close));
    raw.volume = raw
        .volume
        .or(raw_value(&price.regular_market_volume).filter(|v| *v >= 0.0).map(|v| v as u64));

    if raw.company.is_none() {
        raw.company = price.long_name.or(price.short_name);
    }
    if raw.sector.is_none() {
        raw.sector = profile.sector.filter(|s| !s.trim().is_empty());
    }

    raw.market_cap = raw
        .market_cap
        .or(raw_value(&price.market_cap))
        .or(raw_value(&detail.market_cap));
    raw.pe_ratio = raw
        .pe_ratio
        .or(raw_value(&detail.trailing_pe))
        .or(raw_value(&detail.forward_pe))
        .or(raw_value(&stats.forward_pe));
    raw.beta = raw.beta.or(raw_value(&detail.beta)).or(raw_value(&stats.beta));

    Ok(())
}

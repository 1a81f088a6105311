//! Unit tests for quote normalisation and the bounded quote fetcher.

#[cfg(test)]
mod fetcher_tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::data::fetcher::*;
    use crate::error::{ProviderError, ScanError};
    use crate::models::{Sector, TickerSymbol};
    use crate::progress::CancelToken;
    use crate::providers::traits::{ProviderResult, QuoteProvider};
    use crate::providers::types::{DailyBar, RawQuote};

    struct MockQuotes {
        quotes: HashMap<String, RawQuote>,
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl MockQuotes {
        fn new(quotes: HashMap<String, RawQuote>, delay: Duration) -> Self {
            Self {
                quotes,
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuoteProvider for MockQuotes {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn fetch_quote(&self, ticker: &TickerSymbol) -> ProviderResult<RawQuote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.quotes
                .get(ticker.as_str())
                .cloned()
                .ok_or_else(|| ProviderError::Http {
                    status: 404,
                    body: "not found".to_string(),
                })
        }
    }

    fn ticker(s: &str) -> TickerSymbol {
        TickerSymbol::new(s).unwrap()
    }

    fn priced(price: f64) -> RawQuote {
        RawQuote {
            regular_market_price: Some(price),
            ..Default::default()
        }
    }

    fn requests(symbols: &[&str]) -> Vec<QuoteRequest> {
        symbols
            .iter()
            .map(|s| QuoteRequest {
                ticker: ticker(s),
                sector_hint: None,
            })
            .collect()
    }

    // ============= Price resolution Tests =============

    #[test]
    fn test_resolve_price_prefers_current_price() {
        let raw = RawQuote {
            current_price: Some(101.0),
            regular_market_price: Some(100.0),
            previous_close: Some(99.0),
            ..Default::default()
        };
        assert_eq!(resolve_price(&raw), Some(101.0));
    }

    #[test]
    fn test_resolve_price_skips_zero_values() {
        let raw = RawQuote {
            current_price: Some(0.0),
            regular_market_price: None,
            previous_close: Some(42.5),
            ..Default::default()
        };
        assert_eq!(resolve_price(&raw), Some(42.5));
    }

    #[test]
    fn test_resolve_price_none_when_nothing_positive() {
        let raw = RawQuote {
            current_price: Some(0.0),
            regular_market_price: Some(-3.0),
            previous_close: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(resolve_price(&raw), None);
        assert!(normalize_quote(&ticker("ZERO"), raw, None).is_none());
    }

    // ============= Normalisation Tests =============

    #[test]
    fn test_change_and_volume_from_history() {
        let raw = RawQuote {
            regular_market_price: Some(110.0),
            volume: Some(1),
            history: vec![
                DailyBar { close: 90.0, volume: 1_000 },
                DailyBar { close: 100.0, volume: 2_000 },
                DailyBar { close: 110.0, volume: 3_000 },
            ],
            ..Default::default()
        };

        let quote = normalize_quote(&ticker("ABC"), raw, None).unwrap();
        assert!((quote.change_pct - 10.0).abs() < 1e-9);
        assert_eq!(quote.volume, 3_000);
        // 3000 / mean(1000, 2000, 3000)
        assert!((quote.relative_volume.unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_short_history_defaults_change_and_uses_reported_volume() {
        let raw = RawQuote {
            regular_market_price: Some(50.0),
            volume: Some(777),
            history: vec![DailyBar { close: 50.0, volume: 5 }],
            ..Default::default()
        };

        let quote = normalize_quote(&ticker("ABC"), raw, None).unwrap();
        assert_eq!(quote.change_pct, 0.0);
        assert_eq!(quote.volume, 777);
        assert!(quote.relative_volume.is_none());
    }

    #[test]
    fn test_missing_volume_defaults_to_zero() {
        let quote = normalize_quote(&ticker("ABC"), priced(10.0), None).unwrap();
        assert_eq!(quote.volume, 0);
        assert_eq!(quote.company, "ABC");
        assert_eq!(quote.market_cap, 0.0);
    }

    #[test]
    fn test_sector_precedence() {
        let mut raw = priced(10.0);
        raw.sector = Some("Energy".to_string());
        let q = normalize_quote(&ticker("X"), raw, Some(Sector::Technology)).unwrap();
        assert_eq!(q.sector, Sector::Energy);

        let q = normalize_quote(&ticker("X"), priced(10.0), Some(Sector::Technology)).unwrap();
        assert_eq!(q.sector, Sector::Technology);

        let q = normalize_quote(&ticker("X"), priced(10.0), None).unwrap();
        assert_eq!(q.sector, Sector::Unknown);
    }

    #[test]
    fn test_negative_pe_is_dropped() {
        let mut raw = priced(10.0);
        raw.pe_ratio = Some(-4.0);
        raw.beta = Some(1.2);
        let q = normalize_quote(&ticker("X"), raw, None).unwrap();
        assert_eq!(q.pe_ratio, None);
        assert_eq!(q.beta, Some(1.2));
    }

    // ============= Fetcher Tests =============

    #[tokio::test]
    async fn test_fetch_drops_unresolved_tickers() {
        let mut quotes = HashMap::new();
        quotes.insert("AAA".to_string(), priced(10.0));
        quotes.insert("BBB".to_string(), priced(0.0));
        quotes.insert("CCC".to_string(), priced(30.0));

        let provider = Arc::new(MockQuotes::new(quotes, Duration::from_millis(1)));
        let fetcher = MarketDataFetcher::new(provider, 4, Duration::from_secs(1));

        let report = fetcher
            .fetch_quotes(requests(&["AAA", "BBB", "CCC", "DDD"]), &CancelToken::new())
            .await;

        let mut got: Vec<String> = report.quotes.iter().map(|q| q.ticker.to_string()).collect();
        got.sort();
        assert_eq!(got, vec!["AAA", "CCC"]);
        assert!(report.quotes.iter().all(|q| q.price > 0.0));
        assert_eq!(report.unavailable.len(), 2);
        assert!(report
            .unavailable
            .iter()
            .all(|e| matches!(e, ScanError::QuoteUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_fetch_respects_concurrency_limit() {
        let quotes: HashMap<String, RawQuote> = (0..12)
            .map(|i| (format!("T{}", i), priced(1.0 + i as f64)))
            .collect();
        let provider = Arc::new(MockQuotes::new(quotes, Duration::from_millis(20)));
        let fetcher = MarketDataFetcher::new(provider.clone(), 3, Duration::from_secs(1));

        let symbols: Vec<String> = (0..12).map(|i| format!("T{}", i)).collect();
        let reqs = symbols
            .iter()
            .map(|s| QuoteRequest {
                ticker: ticker(s),
                sector_hint: None,
            })
            .collect();

        let report = fetcher.fetch_quotes(reqs, &CancelToken::new()).await;

        assert_eq!(report.quotes.len(), 12);
        assert!(provider.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_fetch_timeout_drops_ticker() {
        let mut quotes = HashMap::new();
        quotes.insert("SLOW".to_string(), priced(10.0));
        let provider = Arc::new(MockQuotes::new(quotes, Duration::from_millis(200)));
        let fetcher = MarketDataFetcher::new(provider, 2, Duration::from_millis(10));

        let report = fetcher.fetch_quotes(requests(&["SLOW"]), &CancelToken::new()).await;

        assert!(report.quotes.is_empty());
        assert_eq!(report.unavailable.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_after_cancel_starts_nothing() {
        let mut quotes = HashMap::new();
        quotes.insert("AAA".to_string(), priced(10.0));
        let provider = Arc::new(MockQuotes::new(quotes, Duration::from_millis(1)));
        let fetcher = MarketDataFetcher::new(provider.clone(), 2, Duration::from_secs(1));

        let cancel = CancelToken::new();
        cancel.cancel();
        let report = fetcher.fetch_quotes(requests(&["AAA"]), &cancel).await;

        assert!(report.quotes.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let provider = Arc::new(MockQuotes::new(HashMap::new(), Duration::from_millis(1)));
        let fetcher = MarketDataFetcher::new(provider, 0, Duration::from_secs(1));
        assert_eq!(fetcher.max_concurrent(), 1);
    }
}

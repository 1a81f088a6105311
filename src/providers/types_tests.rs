//! Unit tests for provider payload parsing.

#[cfg(test)]
mod types_tests {
    use crate::data::fetcher::normalize_quote;
    use crate::models::{Sector, TickerSymbol};
    use crate::providers::types::*;
    use crate::providers::yahoo::{merge_quote_summary, parse_chart};
    use serde_json::{json, Value};

    fn aapl() -> TickerSymbol {
        TickerSymbol::new("AAPL").unwrap()
    }

    // ============= Yahoo chart Tests =============

    #[test]
    fn test_parse_chart_full_payload() {
        let raw = json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "AAPL",
                        "longName": "Apple Inc.",
                        "shortName": "Apple",
                        "regularMarketPrice": 190.5,
                        "chartPreviousClose": 185.0,
                        "regularMarketVolume": 51000000
                    },
                    "timestamp": [1, 2, 3],
                    "indicators": {
                        "quote": [{
                            "close": [184.0, 185.0, 190.5],
                            "volume": [40000000, 45000000, 51000000]
                        }]
                    }
                }],
                "error": null
            }
        });

        let quote = parse_chart(&aapl(), &raw).unwrap();
        assert_eq!(quote.company.as_deref(), Some("Apple Inc."));
        assert_eq!(quote.regular_market_price, Some(190.5));
        assert_eq!(quote.previous_close, Some(185.0));
        assert_eq!(quote.current_price, None);
        assert_eq!(quote.volume, Some(51_000_000));
        assert_eq!(quote.history.len(), 3);
        assert_eq!(
            quote.history[2],
            DailyBar {
                close: 190.5,
                volume: 51_000_000
            }
        );
    }

    #[test]
    fn test_parse_chart_skips_null_closes() {
        let raw = json!({
            "chart": {
                "result": [{
                    "meta": { "regularMarketPrice": 10.0 },
                    "indicators": {
                        "quote": [{
                            "close": [9.0, null, 10.0],
                            "volume": [100, null, 300]
                        }]
                    }
                }]
            }
        });

        let quote = parse_chart(&aapl(), &raw).unwrap();
        assert_eq!(quote.history.len(), 2);
        assert_eq!(quote.history[1].volume, 300);
    }

    #[test]
    fn test_parse_chart_falls_back_to_short_name() {
        let raw = json!({
            "chart": { "result": [{ "meta": { "shortName": "Apple" } }] }
        });

        let quote = parse_chart(&aapl(), &raw).unwrap();
        assert_eq!(quote.company.as_deref(), Some("Apple"));
        assert!(quote.history.is_empty());
    }

    #[test]
    fn test_parse_chart_missing_result_is_error() {
        let raw = json!({
            "chart": { "result": null, "error": { "code": "Not Found" } }
        });

        assert!(parse_chart(&aapl(), &raw).is_err());
    }

    // ============= Yahoo quoteSummary Tests =============

    fn chart_only() -> RawQuote {
        let chart = json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "AAPL",
                        "longName": "Apple Inc.",
                        "regularMarketPrice": 190.5,
                        "chartPreviousClose": 185.0,
                        "regularMarketVolume": 51000000
                    }
                }]
            }
        });
        parse_chart(&aapl(), &chart).unwrap()
    }

    fn summary() -> Value {
        json!({
            "quoteSummary": {
                "result": [{
                    "price": {
                        "regularMarketPrice": { "raw": 190.4, "fmt": "190.40" },
                        "marketCap": { "raw": 2.95e12, "fmt": "2.95T" },
                        "longName": "Apple Inc. (summary)"
                    },
                    "summaryDetail": {
                        "trailingPE": { "raw": 29.6, "fmt": "29.60" },
                        "forwardPE": { "raw": 27.1, "fmt": "27.10" },
                        "beta": { "raw": 1.24, "fmt": "1.24" }
                    },
                    "financialData": {
                        "currentPrice": { "raw": 190.6, "fmt": "190.60" }
                    },
                    "assetProfile": { "sector": "Technology" }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn test_chart_alone_has_no_fundamentals() {
        let raw = chart_only();
        assert_eq!(raw.regular_market_price, Some(190.5));
        assert!(raw.market_cap.is_none());
        assert!(raw.sector.is_none());
        assert!(raw.pe_ratio.is_none());
        assert!(raw.beta.is_none());
        assert!(raw.current_price.is_none());
    }

    #[test]
    fn test_summary_fills_fundamentals() {
        let mut raw = chart_only();
        merge_quote_summary(&aapl(), &mut raw, &summary()).unwrap();

        assert_eq!(raw.market_cap, Some(2.95e12));
        assert_eq!(raw.sector.as_deref(), Some("Technology"));
        assert_eq!(raw.pe_ratio, Some(29.6));
        assert_eq!(raw.beta, Some(1.24));
        assert_eq!(raw.current_price, Some(190.6));
        // Chart values are kept
        assert_eq!(raw.regular_market_price, Some(190.5));
        assert_eq!(raw.company.as_deref(), Some("Apple Inc."));
        assert_eq!(raw.volume, Some(51_000_000));
    }

    #[test]
    fn test_summary_sector_reaches_quote_without_hint() {
        let mut raw = chart_only();
        merge_quote_summary(&aapl(), &mut raw, &summary()).unwrap();

        let quote = normalize_quote(&aapl(), raw, None).unwrap();
        assert_eq!(quote.sector, Sector::Technology);
        assert_eq!(quote.market_cap, 2.95e12);
        assert_eq!(quote.price, 190.6);
    }

    #[test]
    fn test_summary_pe_falls_back_to_forward() {
        let doc = json!({
            "quoteSummary": {
                "result": [{
                    "summaryDetail": { "trailingPE": {}, "forwardPE": { "raw": 14.2 } },
                    "defaultKeyStatistics": { "beta": { "raw": 0.8 } }
                }]
            }
        });
        let mut raw = RawQuote::default();
        merge_quote_summary(&aapl(), &mut raw, &doc).unwrap();

        assert_eq!(raw.pe_ratio, Some(14.2));
        assert_eq!(raw.beta, Some(0.8));
        assert!(raw.market_cap.is_none());
        assert!(raw.sector.is_none());
    }

    #[test]
    fn test_summary_error_document_is_error() {
        let doc = json!({
            "quoteSummary": {
                "result": null,
                "error": { "code": "Not Found", "description": "No fundamentals data found" }
            }
        });
        let mut raw = chart_only();
        assert!(merge_quote_summary(&aapl(), &mut raw, &doc).is_err());
        assert!(raw.market_cap.is_none());
    }

    // ============= RawQuote Tests =============

    #[test]
    fn test_raw_quote_default_is_empty() {
        let raw = RawQuote::default();
        assert!(raw.current_price.is_none());
        assert!(raw.regular_market_price.is_none());
        assert!(raw.previous_close.is_none());
        assert!(raw.history.is_empty());
    }
}

//! Unit tests for domain models.

#[cfg(test)]
mod models_tests {
    use crate::models::*;

    #[test]
    fn test_ticker_symbol_normalizes() {
        let t = TickerSymbol::new(" brk-b ").unwrap();
        assert_eq!(t.as_str(), "BRK-B");
        assert_eq!(t.to_string(), "BRK-B");

        assert!(TickerSymbol::new("").is_err());
        assert!(TickerSymbol::new("A B").is_err());
    }

    #[test]
    fn test_ticker_symbol_serde() {
        let t: TickerSymbol = serde_json::from_str(r#""nvda""#).unwrap();
        assert_eq!(t.as_str(), "NVDA");
        assert_eq!(serde_json::to_string(&t).unwrap(), r#""NVDA""#);
        assert!(serde_json::from_str::<TickerSymbol>(r#""""#).is_err());
    }

    #[test]
    fn test_sector_parse() {
        assert_eq!(Sector::parse("Technology"), Sector::Technology);
        assert_eq!(Sector::parse("Financial Services"), Sector::FinancialServices);
        assert_eq!(Sector::parse("consumer-cyclical"), Sector::ConsumerCyclical);
        assert_eq!(Sector::parse("Consumer Staples"), Sector::ConsumerDefensive);
        assert_eq!(Sector::parse("Crypto"), Sector::Unknown);
        assert_eq!(Sector::RealEstate.to_string(), "Real Estate");
    }

    #[test]
    fn test_news_item_truncates_summary() {
        let summary = "é".repeat(200);
        let item = NewsItem::new("  Title  ", &summary, "link", "src");

        assert_eq!(item.title, "Title");
        assert_eq!(item.summary.chars().count(), 150);
    }

    #[test]
    fn test_label_and_recommendation_strings() {
        assert_eq!(SentimentLabel::Bullish.to_string(), "BULLISH");
        assert_eq!(serde_json::to_string(&SentimentLabel::Bearish).unwrap(), r#""BEARISH""#);
        assert_eq!(Recommendation::StrongBuy.to_string(), "strong buy");
        assert_eq!(serde_json::to_string(&Recommendation::StrongBuy).unwrap(), r#""strong buy""#);
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), r#""medium""#);
    }

    #[test]
    fn test_scored_stock_display_fields() {
        let quote = Quote {
            ticker: TickerSymbol::new("AAPL").unwrap(),
            company: "Apple Inc.".to_string(),
            price: 190.0,
            change_pct: 1.0,
            volume: 10,
            market_cap: 3.0e12,
            sector: Sector::Technology,
            pe_ratio: None,
            beta: None,
            relative_volume: None,
        };
        let sentiment = SentimentResult {
            keywords: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            ..SentimentResult::neutral()
        };
        let long_title = "x".repeat(80);
        let news = vec![NewsItem::new(&long_title, "", "", "src")];
        let breakdown = ScoreBreakdown {
            total: 55,
            risk_level: RiskLevel::Medium,
            recommendation: Recommendation::Hold,
        };

        let stock = ScoredStock::new(quote, &sentiment, &news, breakdown);

        assert_eq!(stock.market_cap_b, 3000.0);
        assert_eq!(stock.catalysts, "None");
        assert_eq!(stock.keywords, "a, b, c");
        assert_eq!(stock.latest_news, format!("{}...", "x".repeat(50)));
        assert_eq!(stock.news_count, 1);
        assert_eq!(stock.score, 55);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}

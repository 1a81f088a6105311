//! Unit tests for composite scoring, risk and recommendation rules.

#[cfg(test)]
mod scoring_tests {
    use crate::models::{
        Quote, Recommendation, RiskLevel, Sector, SentimentLabel, SentimentResult, TickerSymbol,
    };
    use crate::services::scoring::*;

    fn quote(change_pct: f64, volume: u64) -> Quote {
        Quote {
            ticker: TickerSymbol::new("TEST").unwrap(),
            company: "Test Corp".to_string(),
            price: 100.0,
            change_pct,
            volume,
            market_cap: 1e9,
            sector: Sector::Technology,
            pe_ratio: None,
            beta: None,
            relative_volume: None,
        }
    }

    fn sentiment(label: SentimentLabel) -> SentimentResult {
        SentimentResult {
            label,
            ..SentimentResult::neutral()
        }
    }

    #[test]
    fn test_strong_move_bullish_high_volume() {
        let breakdown = ScoringEngine::new().score(&quote(6.0, 2_000_000), &sentiment(SentimentLabel::Bullish));
        assert_eq!(breakdown.total, 90);
        assert_eq!(breakdown.recommendation, Recommendation::StrongBuy);
        assert_eq!(breakdown.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_flat_bearish_low_volume() {
        let breakdown = ScoringEngine::new().score(&quote(0.0, 500), &sentiment(SentimentLabel::Bearish));
        assert_eq!(breakdown.total, 40);
        assert_eq!(breakdown.recommendation, Recommendation::Hold);
        assert_eq!(breakdown.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_momentum_tiers() {
        let n = SentimentLabel::Neutral;
        assert_eq!(composite_score(5.01, 0, n), 70);
        assert_eq!(composite_score(5.0, 0, n), 60);
        assert_eq!(composite_score(2.01, 0, n), 60);
        assert_eq!(composite_score(2.0, 0, n), 55);
        assert_eq!(composite_score(0.01, 0, n), 55);
        assert_eq!(composite_score(0.0, 0, n), 50);
        assert_eq!(composite_score(-8.0, 0, n), 50);
    }

    #[test]
    fn test_volume_threshold_is_strict() {
        let n = SentimentLabel::Neutral;
        assert_eq!(composite_score(0.0, 1_000_000, n), 50);
        assert_eq!(composite_score(0.0, 1_000_001, n), 55);
    }

    #[test]
    fn test_score_stays_in_range() {
        let changes = [-50.0, -5.0, 0.0, 1.0, 3.0, 10.0, 500.0, f64::NAN];
        let volumes = [0, 1_000_000, 5_000_000, u64::MAX];
        let labels = [SentimentLabel::Bullish, SentimentLabel::Bearish, SentimentLabel::Neutral];

        for &c in &changes {
            for &v in &volumes {
                for &l in &labels {
                    let s = composite_score(c, v, l);
                    assert!(s <= 100, "change {} volume {} label {:?} gave {}", c, v, l, s);
                    assert!(s >= 40);
                }
            }
        }
    }

    #[test]
    fn test_strong_buy_requires_bullish() {
        assert_eq!(recommend(75, SentimentLabel::Bullish), Recommendation::StrongBuy);
        assert_eq!(recommend(75, SentimentLabel::Neutral), Recommendation::Buy);
        assert_eq!(recommend(60, SentimentLabel::Bullish), Recommendation::Buy);
        assert_eq!(recommend(59, SentimentLabel::Bullish), Recommendation::Hold);
        assert_eq!(recommend(40, SentimentLabel::Bearish), Recommendation::Hold);
        assert_eq!(recommend(39, SentimentLabel::Bearish), Recommendation::Avoid);
    }

    #[test]
    fn test_risk_is_monotonic_in_score() {
        let rank = |r: RiskLevel| match r {
            RiskLevel::High => 0,
            RiskLevel::Medium => 1,
            RiskLevel::Low => 2,
        };

        let mut prev = rank(risk_level(0));
        for score in 1..=100u8 {
            let current = rank(risk_level(score));
            assert!(current >= prev, "risk got worse at {}", score);
            prev = current;
        }

        assert_eq!(risk_level(70), RiskLevel::Low);
        assert_eq!(risk_level(69), RiskLevel::Medium);
        assert_eq!(risk_level(50), RiskLevel::Medium);
        assert_eq!(risk_level(49), RiskLevel::High);
    }
}

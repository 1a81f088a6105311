use crate::constants::scoring::*;
use crate::models::{Quote, Recommendation, RiskLevel, ScoreBreakdown, SentimentLabel, SentimentResult};

/// Combines a quote and its sentiment into a composite score. Stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, quote: &Quote, sentiment: &SentimentResult) -> ScoreBreakdown {
        let total = composite_score(quote.change_pct, quote.volume, sentiment.label);
        ScoreBreakdown {
            total,
            risk_level: risk_level(total),
            recommendation: recommend(total, sentiment.label),
        }
    }
}

/// Baseline 50, momentum tier, sentiment, volume; clamped to [0, 100].
pub fn composite_score(change_pct: f64, volume: u64, label: SentimentLabel) -> u8 {
    let mut score = BASELINE;

    if change_pct > STRONG_MOVE_PCT {
        score += STRONG_MOVE_POINTS;
    } else if change_pct > MODERATE_MOVE_PCT {
        score += MODERATE_MOVE_POINTS;
    } else if change_pct > 0.0 {
        score += POSITIVE_MOVE_POINTS;
    }

    score += match label {
        SentimentLabel::Bullish => BULLISH_POINTS,
        SentimentLabel::Bearish => BEARISH_POINTS,
        SentimentLabel::Neutral => 0,
    };

    if volume > HIGH_VOLUME {
        score += HIGH_VOLUME_POINTS;
    }

    score.clamp(0, 100) as u8
}

pub fn recommend(score: u8, label: SentimentLabel) -> Recommendation {
    if score >= STRONG_BUY_MIN && label == SentimentLabel::Bullish {
        Recommendation::StrongBuy
    } else if score >= BUY_MIN {
        Recommendation::Buy
    } else if score >= HOLD_MIN {
        Recommendation::Hold
    } else {
        Recommendation::Avoid
    }
}

pub fn risk_level(score: u8) -> RiskLevel {
    if score >= LOW_RISK_MIN {
        RiskLevel::Low
    } else if score >= MEDIUM_RISK_MIN {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ScoredStock, SentimentLabel};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    pub requested: usize,
    pub quotes_resolved: usize,
    pub quotes_unavailable: usize,
    /// Dropped by sector / price / volume before enrichment
    pub prefiltered_out: usize,
    pub enrichment_total: usize,
    pub enriched: usize,
    pub enrichment_failed: usize,
    pub below_min_score: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    Matches(usize),
    /// Valid, completed scan where nothing passed the filters
    NoMatches,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total: usize,
    pub avg_score: f64,
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
}

/// Ranked output of one scan, owned by the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Descending by score; ties keep universe order
    pub stocks: Vec<ScoredStock>,
    pub stats: ScanStats,
    pub cancelled: bool,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn outcome(&self) -> ScanOutcome {
        if self.cancelled {
            ScanOutcome::Cancelled
        } else if self.stocks.is_empty() {
            ScanOutcome::NoMatches
        } else {
            ScanOutcome::Matches(self.stocks.len())
        }
    }

    pub fn summary(&self) -> ScanSummary {
        let count = |label: SentimentLabel| self.stocks.iter().filter(|s| s.sentiment == label).count();
        let avg_score = if self.stocks.is_empty() {
            0.0
        } else {
            self.stocks.iter().map(|s| s.score as f64).sum::<f64>() / self.stocks.len() as f64
        };

        ScanSummary {
            total: self.stocks.len(),
            avg_score,
            bullish: count(SentimentLabel::Bullish),
            bearish: count(SentimentLabel::Bearish),
            neutral: count(SentimentLabel::Neutral),
        }
    }
}

//! Application-wide constants and magic numbers
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make the scoring heuristics easier to tune.

use std::time::Duration;

/// Scan pipeline defaults
pub mod scan {
    use super::*;

    /// Number of universe entries in a "fast" scan
    pub const FAST_SCAN_COUNT: usize = 30;

    /// Max concurrent quote requests
    pub const DEFAULT_QUOTE_CONCURRENCY: usize = 10;

    /// Max concurrent per-ticker enrichments (1 = one ticker at a time)
    pub const DEFAULT_ENRICH_CONCURRENCY: usize = 1;

    /// Max tickers that go through news enrichment per scan
    pub const DEFAULT_MAX_ENRICHED: usize = 20;

    /// Default minimum composite score for a scan request
    pub const DEFAULT_MIN_SCORE: u8 = 50;

    /// Per-call timeout for quote and news providers
    pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(8);

    /// Upper bound for one ticker's news + sentiment + scoring step
    pub const ENRICH_TIMEOUT: Duration = Duration::from_secs(20);
}

/// News aggregation constants
pub mod news {
    /// Headlines kept per ticker
    pub const DEFAULT_MAX_ARTICLES: usize = 3;

    /// Summary length cap (chars)
    pub const SUMMARY_MAX_CHARS: usize = 150;

    /// Headline excerpt length shown on a scored record (chars)
    pub const HEADLINE_EXCERPT_CHARS: usize = 50;
}

/// Sentiment classification constants
pub mod sentiment {
    /// score > this is bullish, score < -this is bearish
    pub const LABEL_THRESHOLD: i32 = 1;

    pub const BASE_CONFIDENCE: u8 = 50;
    pub const CONFIDENCE_PER_POINT: u32 = 15;
    pub const MAX_CONFIDENCE: u8 = 90;
}

/// Composite scoring rules
pub mod scoring {
    pub const BASELINE: i32 = 50;

    pub const STRONG_MOVE_PCT: f64 = 5.0;
    pub const STRONG_MOVE_POINTS: i32 = 20;
    pub const MODERATE_MOVE_PCT: f64 = 2.0;
    pub const MODERATE_MOVE_POINTS: i32 = 10;
    pub const POSITIVE_MOVE_POINTS: i32 = 5;

    pub const BULLISH_POINTS: i32 = 15;
    pub const BEARISH_POINTS: i32 = -10;

    pub const HIGH_VOLUME: u64 = 1_000_000;
    pub const HIGH_VOLUME_POINTS: i32 = 5;

    pub const STRONG_BUY_MIN: u8 = 70;
    pub const BUY_MIN: u8 = 60;
    pub const HOLD_MIN: u8 = 40;

    pub const LOW_RISK_MIN: u8 = 70;
    pub const MEDIUM_RISK_MIN: u8 = 50;
}

/// Logging event names for structured logging
pub mod events {
    pub const QUOTE_UNAVAILABLE: &str = "quote_unavailable";
    pub const NEWS_SOURCE_UNAVAILABLE: &str = "news_source_unavailable";
    pub const ENRICHMENT_FAILED: &str = "enrichment_failed";
    pub const SCAN_CANCELLED: &str = "scan_cancelled";
    pub const SCAN_COMPLETED: &str = "scan_completed";
}

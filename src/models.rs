use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::news::{HEADLINE_EXCERPT_CHARS, SUMMARY_MAX_CHARS};
use crate::error::ScanError;

/// Upper-cased exchange ticker, e.g. "AAPL" or "BRK-B".
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TickerSymbol(String);

impl TickerSymbol {
    pub fn new(raw: &str) -> Result<Self, ScanError> {
        let symbol = raw.trim().to_ascii_uppercase();
        if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
            return Err(ScanError::InvalidRequest(format!("invalid ticker '{}'", raw)));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TickerSymbol {
    type Error = ScanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TickerSymbol::new(&value)
    }
}

impl From<TickerSymbol> for String {
    fn from(value: TickerSymbol) -> Self {
        value.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Technology,
    Healthcare,
    Energy,
    FinancialServices,
    CommunicationServices,
    ConsumerCyclical,
    ConsumerDefensive,
    Industrials,
    BasicMaterials,
    RealEstate,
    Utilities,
    Unknown,
}

impl Sector {
    /// Lenient parse of provider sector names. Unrecognised names map to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "technology" | "tech" | "informationtechnology" => Sector::Technology,
            "healthcare" | "health" => Sector::Healthcare,
            "energy" => Sector::Energy,
            "financialservices" | "financials" | "financial" => Sector::FinancialServices,
            "communicationservices" | "communication" => Sector::CommunicationServices,
            "consumercyclical" | "consumerdiscretionary" => Sector::ConsumerCyclical,
            "consumerdefensive" | "consumerstaples" => Sector::ConsumerDefensive,
            "industrials" => Sector::Industrials,
            "basicmaterials" | "materials" => Sector::BasicMaterials,
            "realestate" => Sector::RealEstate,
            "utilities" => Sector::Utilities,
            _ => Sector::Unknown,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Sector::Technology => "Technology",
            Sector::Healthcare => "Healthcare",
            Sector::Energy => "Energy",
            Sector::FinancialServices => "Financial Services",
            Sector::CommunicationServices => "Communication Services",
            Sector::ConsumerCyclical => "Consumer Cyclical",
            Sector::ConsumerDefensive => "Consumer Defensive",
            Sector::Industrials => "Industrials",
            Sector::BasicMaterials => "Basic Materials",
            Sector::RealEstate => "Real Estate",
            Sector::Utilities => "Utilities",
            Sector::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Normalized per-ticker snapshot. Price is always > 0.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: TickerSymbol,
    pub company: String,
    pub price: f64,
    pub change_pct: f64,
    pub volume: u64,
    pub market_cap: f64,
    pub sector: Sector,
    pub pe_ratio: Option<f64>,
    pub beta: Option<f64>,
    /// Latest volume relative to the mean of the fetched history
    pub relative_volume: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    /// At most 150 chars
    pub summary: String,
    pub link: String,
    pub source: String,
}

impl NewsItem {
    pub fn new(title: &str, summary: &str, link: &str, source: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            summary: truncate_chars(summary.trim(), SUMMARY_MAX_CHARS),
            link: link.to_string(),
            source: source.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Bullish => write!(f, "BULLISH"),
            SentimentLabel::Bearish => write!(f, "BEARISH"),
            SentimentLabel::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: i32,
    /// 0 without news, otherwise within [50, 90]
    pub confidence: u8,
    pub catalysts: Vec<String>,
    pub keywords: Vec<String>,
}

impl SentimentResult {
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0,
            confidence: 0,
            catalysts: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "strong buy")]
    StrongBuy,
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "hold")]
    Hold,
    #[serde(rename = "avoid")]
    Avoid,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::StrongBuy => write!(f, "strong buy"),
            Recommendation::Buy => write!(f, "buy"),
            Recommendation::Hold => write!(f, "hold"),
            Recommendation::Avoid => write!(f, "avoid"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Clamped to [0, 100]
    pub total: u8,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
}

/// Terminal record handed to the presentation layer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredStock {
    pub ticker: TickerSymbol,
    pub company: String,
    pub price: f64,
    pub change_pct: f64,
    pub volume: u64,
    pub market_cap_b: f64,
    pub relative_volume: Option<f64>,
    pub sector: Sector,
    pub news_count: usize,
    pub sentiment: SentimentLabel,
    pub sentiment_score: i32,
    pub confidence: u8,
    /// Comma-joined catalyst names, "None" when there are none
    pub catalysts: String,
    /// First three matched keywords, comma-joined
    pub keywords: String,
    pub latest_news: String,
    pub score: u8,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
}

impl ScoredStock {
    pub fn new(
        quote: Quote,
        sentiment: &SentimentResult,
        news: &[NewsItem],
        breakdown: ScoreBreakdown,
    ) -> Self {
        let catalysts = if sentiment.catalysts.is_empty() {
            "None".to_string()
        } else {
            sentiment.catalysts.join(", ")
        };

        let keywords = sentiment
            .keywords
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");

        let latest_news = match news.first() {
            Some(item) => format!("{}...", truncate_chars(&item.title, HEADLINE_EXCERPT_CHARS)),
            None => "No news".to_string(),
        };

        Self {
            ticker: quote.ticker,
            company: quote.company,
            price: quote.price,
            change_pct: quote.change_pct,
            volume: quote.volume,
            market_cap_b: quote.market_cap / 1e9,
            relative_volume: quote.relative_volume,
            sector: quote.sector,
            news_count: news.len(),
            sentiment: sentiment.label,
            sentiment_score: sentiment.score,
            confidence: sentiment.confidence,
            catalysts,
            keywords,
            latest_news,
            score: breakdown.total,
            risk_level: breakdown.risk_level,
            recommendation: breakdown.recommendation,
        }
    }
}

/// Truncate to at most `max` chars without splitting a UTF-8 sequence.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

use serde::{Deserialize, Serialize};

/// One daily session from the provider's history
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub close: f64,
    pub volume: u64,
}

/// Provider snapshot before normalisation. Every field is best-effort.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawQuote {
    pub current_price: Option<f64>,
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    /// Volume as reported directly, used when history is too short
    pub volume: Option<u64>,
    pub company: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub beta: Option<f64>,
    /// Oldest first
    pub history: Vec<DailyBar>,
}

//! The fixed, ordered set of symbols a scan can draw from.

use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::models::{Sector, TickerSymbol};

/// Focus list, most liquid names first. Sector is a hint used when the
/// quote provider reports none.
const FOCUS_TICKERS: &[(&str, Sector)] = &[
    ("AAPL", Sector::Technology),
    ("MSFT", Sector::Technology),
    ("NVDA", Sector::Technology),
    ("GOOGL", Sector::CommunicationServices),
    ("AMZN", Sector::ConsumerCyclical),
    ("META", Sector::CommunicationServices),
    ("TSLA", Sector::ConsumerCyclical),
    ("AVGO", Sector::Technology),
    ("JPM", Sector::FinancialServices),
    ("V", Sector::FinancialServices),
    ("LLY", Sector::Healthcare),
    ("UNH", Sector::Healthcare),
    ("XOM", Sector::Energy),
    ("WMT", Sector::ConsumerDefensive),
    ("MA", Sector::FinancialServices),
    ("JNJ", Sector::Healthcare),
    ("PG", Sector::ConsumerDefensive),
    ("HD", Sector::ConsumerCyclical),
    ("COST", Sector::ConsumerDefensive),
    ("ORCL", Sector::Technology),
    ("NFLX", Sector::CommunicationServices),
    ("AMD", Sector::Technology),
    ("CRM", Sector::Technology),
    ("BAC", Sector::FinancialServices),
    ("ABBV", Sector::Healthcare),
    ("CVX", Sector::Energy),
    ("KO", Sector::ConsumerDefensive),
    ("MRK", Sector::Healthcare),
    ("PEP", Sector::ConsumerDefensive),
    ("ADBE", Sector::Technology),
    ("INTC", Sector::Technology),
    ("CSCO", Sector::Technology),
    ("QCOM", Sector::Technology),
    ("TXN", Sector::Technology),
    ("IBM", Sector::Technology),
    ("NOW", Sector::Technology),
    ("INTU", Sector::Technology),
    ("AMAT", Sector::Technology),
    ("MU", Sector::Technology),
    ("PLTR", Sector::Technology),
    ("SHOP", Sector::Technology),
    ("SNOW", Sector::Technology),
    ("DIS", Sector::CommunicationServices),
    ("T", Sector::CommunicationServices),
    ("VZ", Sector::CommunicationServices),
    ("TMUS", Sector::CommunicationServices),
    ("CMCSA", Sector::CommunicationServices),
    ("MCD", Sector::ConsumerCyclical),
    ("NKE", Sector::ConsumerCyclical),
    ("SBUX", Sector::ConsumerCyclical),
    ("LOW", Sector::ConsumerCyclical),
    ("BKNG", Sector::ConsumerCyclical),
    ("F", Sector::ConsumerCyclical),
    ("GM", Sector::ConsumerCyclical),
    ("WFC", Sector::FinancialServices),
    ("GS", Sector::FinancialServices),
    ("MS", Sector::FinancialServices),
    ("C", Sector::FinancialServices),
    ("AXP", Sector::FinancialServices),
    ("BLK", Sector::FinancialServices),
    ("SCHW", Sector::FinancialServices),
    ("PYPL", Sector::FinancialServices),
    ("COIN", Sector::FinancialServices),
    ("PFE", Sector::Healthcare),
    ("TMO", Sector::Healthcare),
    ("ABT", Sector::Healthcare),
    ("AMGN", Sector::Healthcare),
    ("GILD", Sector::Healthcare),
    ("MRNA", Sector::Healthcare),
    ("BMY", Sector::Healthcare),
    ("COP", Sector::Energy),
    ("SLB", Sector::Energy),
    ("OXY", Sector::Energy),
    ("EOG", Sector::Energy),
    ("BA", Sector::Industrials),
    ("CAT", Sector::Industrials),
    ("GE", Sector::Industrials),
    ("HON", Sector::Industrials),
    ("UPS", Sector::Industrials),
    ("LMT", Sector::Industrials),
    ("RTX", Sector::Industrials),
    ("DE", Sector::Industrials),
    ("LIN", Sector::BasicMaterials),
    ("FCX", Sector::BasicMaterials),
    ("NEE", Sector::Utilities),
    ("DUK", Sector::Utilities),
    ("AMT", Sector::RealEstate),
    ("PLD", Sector::RealEstate),
];

/// Which part of the universe a scan covers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerSelection {
    /// First `fast_count` entries
    #[default]
    Fast,
    Full,
    Explicit(Vec<String>),
}

/// Config representation of one universe entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UniverseEntry {
    pub symbol: String,
    #[serde(default = "unknown_sector")]
    pub sector: Sector,
}

fn unknown_sector() -> Sector {
    Sector::Unknown
}

#[derive(Clone, Debug)]
pub struct TickerUniverse {
    entries: Vec<(TickerSymbol, Sector)>,
}

impl Default for TickerUniverse {
    fn default() -> Self {
        let entries = FOCUS_TICKERS
            .iter()
            .filter_map(|(symbol, sector)| TickerSymbol::new(symbol).ok().map(|t| (t, *sector)))
            .collect();
        Self { entries }
    }
}

impl TickerUniverse {
    /// Build from config entries; duplicates keep their first position.
    pub fn from_entries(entries: &[UniverseEntry]) -> Result<Self, ScanError> {
        let mut out: Vec<(TickerSymbol, Sector)> = Vec::with_capacity(entries.len());
        for entry in entries {
            let ticker = TickerSymbol::new(&entry.symbol)
                .map_err(|_| ScanError::Config(format!("invalid universe symbol '{}'", entry.symbol)))?;
            if !out.iter().any(|(t, _)| *t == ticker) {
                out.push((ticker, entry.sector));
            }
        }
        if out.is_empty() {
            return Err(ScanError::EmptyUniverse);
        }
        Ok(Self { entries: out })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &TickerSymbol> {
        self.entries.iter().map(|(t, _)| t)
    }

    pub fn sector_hint(&self, ticker: &TickerSymbol) -> Option<Sector> {
        self.entries
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, s)| *s)
    }

    /// Resolve a selection to an ordered, duplicate-free ticker list.
    pub fn select(
        &self,
        selection: &TickerSelection,
        fast_count: usize,
    ) -> Result<Vec<TickerSymbol>, ScanError> {
        if self.entries.is_empty() {
            return Err(ScanError::EmptyUniverse);
        }

        match selection {
            TickerSelection::Fast => Ok(self.tickers().take(fast_count).cloned().collect()),
            TickerSelection::Full => Ok(self.tickers().cloned().collect()),
            TickerSelection::Explicit(symbols) => {
                let mut out: Vec<TickerSymbol> = Vec::with_capacity(symbols.len());
                for raw in symbols {
                    let ticker = TickerSymbol::new(raw)?;
                    if !out.contains(&ticker) {
                        out.push(ticker);
                    }
                }
                if out.is_empty() {
                    return Err(ScanError::InvalidRequest(
                        "explicit ticker selection is empty".to_string(),
                    ));
                }
                Ok(out)
            }
        }
    }
}

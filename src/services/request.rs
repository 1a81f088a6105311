use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::scan::DEFAULT_MIN_SCORE;
use crate::error::ScanError;
use crate::models::{Quote, Sector};
use crate::universe::TickerSelection;

/// Sector filter, written as a list of names: `["all"]` or e.g.
/// `["Technology", "Financial Services"]`. An empty list means all.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SectorFilter {
    #[default]
    All,
    Only(BTreeSet<Sector>),
}

impl SectorFilter {
    pub fn only(sectors: &[Sector]) -> Self {
        SectorFilter::Only(sectors.iter().copied().collect())
    }

    pub fn matches(&self, sector: Sector) -> bool {
        match self {
            SectorFilter::All => true,
            SectorFilter::Only(set) => set.contains(&sector),
        }
    }
}

impl TryFrom<Vec<String>> for SectorFilter {
    type Error = ScanError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        if names.is_empty() || names.iter().any(|n| n.trim().eq_ignore_ascii_case("all")) {
            return Ok(SectorFilter::All);
        }

        let mut set = BTreeSet::new();
        for name in &names {
            let sector = Sector::parse(name);
            if sector == Sector::Unknown && !name.trim().eq_ignore_ascii_case("unknown") {
                return Err(ScanError::InvalidRequest(format!("unknown sector '{}'", name)));
            }
            set.insert(sector);
        }
        Ok(SectorFilter::Only(set))
    }
}

impl From<SectorFilter> for Vec<String> {
    fn from(filter: SectorFilter) -> Self {
        match filter {
            SectorFilter::All => vec!["all".to_string()],
            SectorFilter::Only(set) => set.iter().map(|s| s.display_name().to_string()).collect(),
        }
    }
}

impl Serialize for SectorFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Vec::<String>::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SectorFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        SectorFilter::try_from(names).map_err(serde::de::Error::custom)
    }
}

/// Read-only parameters for one scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanRequest {
    pub selection: TickerSelection,
    pub sectors: SectorFilter,
    pub min_score: u8,
    pub min_price: Option<f64>,
    pub min_volume: Option<u64>,
    /// Overrides `scan.max_enriched` from config
    pub max_enriched: Option<usize>,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            selection: TickerSelection::Fast,
            sectors: SectorFilter::All,
            min_score: DEFAULT_MIN_SCORE,
            min_price: None,
            min_volume: None,
            max_enriched: None,
        }
    }
}

impl ScanRequest {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.min_score > 100 {
            return Err(ScanError::InvalidRequest(format!(
                "min_score {} is outside 0-100",
                self.min_score
            )));
        }
        if let Some(p) = self.min_price {
            if !p.is_finite() || p < 0.0 {
                return Err(ScanError::InvalidRequest(format!("invalid min_price {}", p)));
            }
        }
        if self.max_enriched == Some(0) {
            return Err(ScanError::InvalidRequest("max_enriched must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Sector, price and volume thresholds, applied before enrichment.
    pub fn accepts_quote(&self, quote: &Quote) -> bool {
        self.sectors.matches(quote.sector)
            && self.min_price.map_or(true, |min| quote.price >= min)
            && self.min_volume.map_or(true, |min| quote.volume >= min)
    }
}

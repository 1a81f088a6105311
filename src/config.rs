use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants::{news, scan};
use crate::error::ScanError;
use crate::services::sentiment::Lexicon;
use crate::universe::UniverseEntry;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub fast_count: usize,
    pub quote_concurrency: usize,
    pub enrich_concurrency: usize,
    pub max_enriched: usize,
    pub provider_timeout_ms: u64,
    pub enrich_timeout_ms: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            fast_count: scan::FAST_SCAN_COUNT,
            quote_concurrency: scan::DEFAULT_QUOTE_CONCURRENCY,
            enrich_concurrency: scan::DEFAULT_ENRICH_CONCURRENCY,
            max_enriched: scan::DEFAULT_MAX_ENRICHED,
            provider_timeout_ms: scan::PROVIDER_TIMEOUT.as_millis() as u64,
            enrich_timeout_ms: scan::ENRICH_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ScanSettings {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn enrich_timeout(&self) -> Duration {
        Duration::from_millis(self.enrich_timeout_ms)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub base_url: String,
    /// Page visited once to obtain the session cookie behind the crumb
    pub cookie_url: String,
    /// Merge quoteSummary fundamentals (market cap, P/E, beta, sector) into quotes
    pub fundamentals: bool,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            cookie_url: "https://fc.yahoo.com".to_string(),
            fundamentals: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FinnhubConfig {
    /// Usually supplied through FINNHUB_API_KEY
    pub api_key: Option<String>,
    pub base_url: String,
    pub lookback_days: i64,
}

impl Default for FinnhubConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://finnhub.io".to_string(),
            lookback_days: 7,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub max_articles: usize,
    /// Source names in merge order: "yahoo", "finnhub"
    pub sources: Vec<String>,
    pub finnhub: FinnhubConfig,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            max_articles: news::DEFAULT_MAX_ARTICLES,
            sources: vec!["yahoo".to_string(), "finnhub".to_string()],
            finnhub: FinnhubConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub quote_provider: String, // "yahoo"
    pub yahoo: YahooConfig,
    pub news: NewsConfig,
    pub scan: ScanSettings,
    pub lexicon: Lexicon,
    /// Replaces the built-in ticker universe when present
    pub universe: Option<Vec<UniverseEntry>>,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quote_provider: "yahoo".to_string(),
            yahoo: YahooConfig::default(),
            news: NewsConfig::default(),
            scan: ScanSettings::default(),
            lexicon: Lexicon::default(),
            universe: None,
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load `SCANNER_CONFIG` (or ./config.yaml) and apply env overrides.
    /// A missing file means built-in defaults.
    pub fn load() -> Result<Self, ScanError> {
        let config_path =
            std::env::var("SCANNER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            let content = fs::read_to_string(&config_path)
                .map_err(|e| ScanError::Config(format!("failed to read {}: {}", config_path, e)))?;
            Self::from_yaml_str(&content)?
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var("FINNHUB_API_KEY") {
            if !key.trim().is_empty() {
                config.news.finnhub.api_key = Some(key);
            }
        }
        if let Ok(addr) = std::env::var("BIND_ADDR") {
            config.server.bind_addr = addr;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ScanError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content)
            .map_err(|e| ScanError::Config(format!("failed to parse config: {}", e)))
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.scan.quote_concurrency == 0 {
            return Err("scan.quote_concurrency must be at least 1".into());
        }
        if self.scan.enrich_concurrency == 0 {
            return Err("scan.enrich_concurrency must be at least 1".into());
        }
        if self.scan.fast_count == 0 {
            return Err("scan.fast_count must be at least 1".into());
        }
        if self.news.max_articles == 0 {
            return Err("news.max_articles must be at least 1".into());
        }
        if self.scan.provider_timeout_ms == 0 {
            return Err("scan.provider_timeout_ms must be at least 1".into());
        }
        if self.scan.enrich_timeout_ms == 0 {
            return Err("scan.enrich_timeout_ms must be at least 1".into());
        }
        Ok(())
    }
}

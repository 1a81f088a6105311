use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{AppConfig, ScanSettings};
use crate::constants::events;
use crate::data::{MarketDataFetcher, NewsAggregator, NewsFeed, QuoteRequest};
use crate::error::ScanError;
use crate::models::{Quote, ScoredStock, TickerSymbol};
use crate::progress::{CancelToken, NoopProgress, ProgressObserver, ScanPhase, ScanProgress};
use crate::providers::factory::{build_news_sources, build_quote_provider};
use crate::providers::traits::QuoteProvider;
use crate::universe::TickerUniverse;

use super::request::ScanRequest;
use super::result::{ScanResult, ScanStats};
use super::scoring::ScoringEngine;
use super::sentiment::SentimentAnalyzer;

pub(crate) type EnrichOutcome = (usize, TickerSymbol, Result<ScoredStock, ScanError>);

/// Enrichment bookkeeping for one scan: result slots in input order and the
/// progress counters. Every joined task, finished or lost, advances
/// `processed` by one and reports it.
pub(crate) struct EnrichTally {
    slots: Vec<Option<ScoredStock>>,
    tickers: Vec<TickerSymbol>,
    tasks: HashMap<task::Id, usize>,
    processed: usize,
    failed: usize,
}

impl EnrichTally {
    pub(crate) fn new(quotes: &[Quote]) -> Self {
        Self {
            slots: vec![None; quotes.len()],
            tickers: quotes.iter().map(|q| q.ticker.clone()).collect(),
            tasks: HashMap::new(),
            processed: 0,
            failed: 0,
        }
    }

    pub(crate) fn track(&mut self, id: task::Id, idx: usize) {
        self.tasks.insert(id, idx);
    }

    pub(crate) fn record(
        &mut self,
        scan_id: Uuid,
        joined: Result<(task::Id, EnrichOutcome), JoinError>,
        observer: &dyn ProgressObserver,
    ) {
        self.processed += 1;

        let ticker = match joined {
            Ok((id, (idx, ticker, result))) => {
                self.tasks.remove(&id);
                match result {
                    Ok(stock) => self.slots[idx] = Some(stock),
                    Err(e) => {
                        self.failed += 1;
                        warn!(event = events::ENRICHMENT_FAILED, "⚠️ [SCAN {}] {}", scan_id, e);
                    }
                }
                ticker
            }
            Err(join_err) => {
                self.failed += 1;
                error!("❌ [SCAN {}] enrichment task lost: {}", scan_id, join_err);
                let Some(ticker) = self
                    .tasks
                    .remove(&join_err.id())
                    .and_then(|idx| self.tickers.get(idx).cloned())
                else {
                    return;
                };
                ticker
            }
        };

        observer.on_progress(&ScanProgress {
            processed: self.processed,
            total: self.slots.len(),
            failed: self.failed,
            ticker,
        });
    }

    pub(crate) fn finish(self) -> (Vec<ScoredStock>, usize) {
        (self.slots.into_iter().flatten().collect(), self.failed)
    }
}

/// Drives one scan end to end. Holds no per-scan state, so one instance can
/// serve any number of sequential or concurrent scans.
pub struct Scanner {
    universe: TickerUniverse,
    fetcher: MarketDataFetcher,
    news: Arc<dyn NewsFeed>,
    analyzer: Arc<SentimentAnalyzer>,
    scoring: ScoringEngine,
    settings: ScanSettings,
    max_articles: usize,
}

impl Scanner {
    pub fn new(
        universe: TickerUniverse,
        quotes: Arc<dyn QuoteProvider>,
        news: Arc<dyn NewsFeed>,
        analyzer: SentimentAnalyzer,
        settings: ScanSettings,
        max_articles: usize,
    ) -> Self {
        let fetcher = MarketDataFetcher::new(quotes, settings.quote_concurrency, settings.provider_timeout());
        Self {
            universe,
            fetcher,
            news,
            analyzer: Arc::new(analyzer),
            scoring: ScoringEngine::new(),
            settings,
            max_articles: max_articles.max(1),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ScanError> {
        config.validate()?;

        let universe = match &config.universe {
            Some(entries) => TickerUniverse::from_entries(entries)?,
            None => TickerUniverse::default(),
        };

        let quotes = build_quote_provider(config)?;
        let news = NewsAggregator::new(build_news_sources(config)?, config.scan.provider_timeout());

        Ok(Self::new(
            universe,
            quotes,
            Arc::new(news),
            SentimentAnalyzer::new(config.lexicon.clone()),
            config.scan.clone(),
            config.news.max_articles,
        ))
    }

    pub fn universe(&self) -> &TickerUniverse {
        &self.universe
    }

    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanResult, ScanError> {
        self.scan_with(request, &NoopProgress, &CancelToken::new()).await
    }

    /// Run a scan, reporting to `observer`. Only request / universe problems
    /// are errors; per-ticker failures are counted in `stats`.
    pub async fn scan_with(
        &self,
        request: &ScanRequest,
        observer: &dyn ProgressObserver,
        cancel: &CancelToken,
    ) -> Result<ScanResult, ScanError> {
        request.validate()?;
        let tickers = self.universe.select(&request.selection, self.settings.fast_count)?;

        let scan_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut stats = ScanStats {
            requested: tickers.len(),
            ..Default::default()
        };
        info!("🔍 [SCAN {}] Starting scan of {} tickers", scan_id, tickers.len());

        // FETCHING
        observer.on_phase(ScanPhase::Fetching);
        let requests = tickers
            .iter()
            .map(|t| QuoteRequest {
                ticker: t.clone(),
                sector_hint: self.universe.sector_hint(t),
            })
            .collect();
        let report = self.fetcher.fetch_quotes(requests, cancel).await;
        stats.quotes_resolved = report.quotes.len();
        stats.quotes_unavailable = report.unavailable.len();

        // Fetch order is arbitrary; go back to selection order.
        let position: HashMap<&TickerSymbol, usize> =
            tickers.iter().enumerate().map(|(i, t)| (t, i)).collect();
        let mut quotes = report.quotes;
        quotes.sort_by_key(|q| position.get(&q.ticker).copied().unwrap_or(usize::MAX));

        let before = quotes.len();
        quotes.retain(|q| request.accepts_quote(q));
        stats.prefiltered_out = before - quotes.len();

        let cap = request.max_enriched.unwrap_or(self.settings.max_enriched).max(1);
        quotes.truncate(cap);

        // ENRICHING
        let (scored, failed) = if cancel.is_cancelled() {
            (Vec::new(), 0)
        } else {
            observer.on_phase(ScanPhase::Enriching);
            stats.enrichment_total = quotes.len();
            self.enrich_all(scan_id, quotes, observer, cancel).await
        };
        stats.enriched = scored.len();
        stats.enrichment_failed = failed;

        // FILTERING
        observer.on_phase(ScanPhase::Filtering);
        let before = scored.len();
        let mut stocks: Vec<ScoredStock> = scored
            .into_iter()
            .filter(|s| s.score >= request.min_score)
            .collect();
        stats.below_min_score = before - stocks.len();

        // SORTING (stable: equal scores keep selection order)
        observer.on_phase(ScanPhase::Sorting);
        stocks.sort_by(|a, b| b.score.cmp(&a.score));

        let cancelled = cancel.is_cancelled();
        if cancelled {
            warn!(
                event = events::SCAN_CANCELLED,
                "🛑 [SCAN {}] Cancelled - returning {} completed records",
                scan_id,
                stocks.len()
            );
        }

        observer.on_phase(ScanPhase::Done);
        info!(
            event = events::SCAN_COMPLETED,
            "✅ [SCAN {}] Done: {} matches (resolved {}/{}, enriched {}, failed {})",
            scan_id,
            stocks.len(),
            stats.quotes_resolved,
            stats.requested,
            stats.enriched,
            stats.enrichment_failed
        );

        Ok(ScanResult {
            scan_id,
            started_at,
            finished_at: Utc::now(),
            stocks,
            stats,
            cancelled,
        })
    }

    /// Returns scored stocks in input order plus the failure count.
    async fn enrich_all(
        &self,
        scan_id: Uuid,
        quotes: Vec<Quote>,
        observer: &dyn ProgressObserver,
        cancel: &CancelToken,
    ) -> (Vec<ScoredStock>, usize) {
        let concurrency = self.settings.enrich_concurrency.max(1);
        let timeout = self.settings.enrich_timeout();

        let mut tally = EnrichTally::new(&quotes);
        let mut pending = quotes.into_iter().enumerate();
        let mut join_set: JoinSet<EnrichOutcome> = JoinSet::new();

        loop {
            while join_set.len() < concurrency && !cancel.is_cancelled() {
                let Some((idx, quote)) = pending.next() else {
                    break;
                };
                let handle = join_set.spawn(Self::enrich_guarded(
                    idx,
                    quote,
                    self.news.clone(),
                    self.analyzer.clone(),
                    self.scoring,
                    self.max_articles,
                    timeout,
                ));
                tally.track(handle.id(), idx);
            }

            let Some(joined) = join_set.join_next_with_id().await else {
                break;
            };
            tally.record(scan_id, joined, observer);
        }

        tally.finish()
    }

    /// One ticker's news -> sentiment -> score, isolated in its own task and
    /// bounded by `timeout`.
    async fn enrich_guarded(
        idx: usize,
        quote: Quote,
        news: Arc<dyn NewsFeed>,
        analyzer: Arc<SentimentAnalyzer>,
        scoring: ScoringEngine,
        max_articles: usize,
        timeout: Duration,
    ) -> EnrichOutcome {
        let ticker = quote.ticker.clone();
        let failure = |reason: String| ScanError::EnrichmentFailure {
            ticker: ticker.to_string(),
            reason,
        };

        let mut handle = tokio::spawn(Self::enrich_one(quote, news, analyzer, scoring, max_articles));
        let result = match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(failure(format!("task failed: {}", join_err))),
            Err(_) => {
                handle.abort();
                Err(failure(format!("timed out after {}ms", timeout.as_millis())))
            }
        };

        (idx, ticker, result)
    }

    async fn enrich_one(
        quote: Quote,
        news: Arc<dyn NewsFeed>,
        analyzer: Arc<SentimentAnalyzer>,
        scoring: ScoringEngine,
        max_articles: usize,
    ) -> Result<ScoredStock, ScanError> {
        let headlines = news
            .headlines(&quote.ticker, max_articles)
            .await
            .map_err(|e| match e {
                ScanError::EnrichmentFailure { .. } => e,
                other => ScanError::EnrichmentFailure {
                    ticker: quote.ticker.to_string(),
                    reason: other.to_string(),
                },
            })?;

        let sentiment = analyzer.analyze(&headlines);
        let breakdown = scoring.score(&quote, &sentiment);

        Ok(ScoredStock::new(quote, &sentiment, &headlines, breakdown))
    }
}

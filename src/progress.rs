//! Scan progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Notify};
use tracing::info;

use crate::models::TickerSymbol;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Idle,
    Fetching,
    Enriching,
    Filtering,
    Sorting,
    Done,
}

/// Emitted once per ticker during the enrichment phase
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub processed: usize,
    pub total: usize,
    pub failed: usize,
    pub ticker: TickerSymbol,
}

pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: &ScanProgress);

    fn on_phase(&self, _phase: ScanPhase) {}
}

pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_progress(&self, _progress: &ScanProgress) {}
}

/// Writes progress to the tracing log
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, p: &ScanProgress) {
        info!(
            "📊 [SCAN] {}/{} analysed ({} failed) - {}",
            p.processed, p.total, p.failed, p.ticker
        );
    }

    fn on_phase(&self, phase: ScanPhase) {
        info!("📊 [SCAN] phase -> {:?}", phase);
    }
}

impl ProgressObserver for mpsc::UnboundedSender<ScanProgress> {
    fn on_progress(&self, progress: &ScanProgress) {
        // Receiver may already be gone; progress is best-effort.
        let _ = self.send(progress.clone());
    }
}

#[derive(Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shared cancellation flag. Cloning hands out another handle to the same flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

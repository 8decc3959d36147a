use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};

use super::checker::HttpChecker;
use crate::models::Website;
use crate::storage::Store;

/// Drives the check cycle: every tick, snapshot the registered websites and
/// fan out one probe task per site.
pub struct MonitorScheduler {
    store: Arc<dyn Store>,
    checker: Arc<HttpChecker>,
    interval: Duration,
    overlap_ticks: bool,
}

impl MonitorScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        checker: Arc<HttpChecker>,
        interval: Duration,
        overlap_ticks: bool,
    ) -> Self {
        Self { store, checker, interval, overlap_ticks }
    }

    /// Run until the process exits.
    ///
    /// With `overlap_ticks` a cycle slower than the interval keeps running
    /// while the next one starts; without it the loop waits for the cycle's
    /// probes before sleeping again. The timer keeps its own cadence either
    /// way; ticks are never skipped or coalesced.
    pub async fn run(self: Arc<Self>) {
        let mut timer = interval(self.interval);

        loop {
            timer.tick().await;

            if self.overlap_ticks {
                let scheduler = Arc::clone(&self);
                tokio::spawn(async move { scheduler.run_tick().await });
            } else {
                self.run_tick().await;
            }
        }
    }

    /// One check cycle. Websites registered after the snapshot is taken wait
    /// for the next tick. Returns once every probe of this cycle has written
    /// its result (or failed trying).
    pub async fn run_tick(&self) {
        let websites = match self.store.websites().await {
            Ok(websites) => websites,
            Err(error) => {
                error!(%error, "failed to list websites, skipping cycle");
                return;
            }
        };

        info!(count = websites.len(), "starting check cycle");

        let mut handles = Vec::with_capacity(websites.len());
        for website in websites {
            let store = Arc::clone(&self.store);
            let checker = Arc::clone(&self.checker);
            handles.push(tokio::spawn(check_website(store, checker, website)));
        }

        // A panicked probe task only loses its own result.
        for handle in handles {
            let _ = handle.await;
        }
    }
}

/// Probe one website and record the outcome.
///
/// Store failures are logged and absorbed so that one bad write cannot take
/// down the cycle or the loop.
pub async fn check_website(store: Arc<dyn Store>, checker: Arc<HttpChecker>, website: Website) {
    let result = checker.probe(&website.url).await.for_website(website.id);

    if let Err(error) = store.record_check(result).await {
        error!(url = %website.url, %error, "failed to record check");
    }
}

//! Background ingestion: every period, fetch the latest videos upstream and
//! insert all of them into the store.
//!
//! Cycles are independent. Nothing is carried between ticks, results are not
//! deduplicated, and a failed cycle is logged and dropped without retry. A
//! tick never waits for the previous cycle, so a slow write can overlap the
//! next one.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::models::NewVideo;
use crate::storage::{StoreError, VideoStore};
use crate::youtube::{VideoSource, YouTubeError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] YouTubeError),

    #[error("storage write failed: {0}")]
    Store(#[from] StoreError),

    #[error("ingestion already running")]
    AlreadyRunning,

    #[error("ingestion task failed to join: {0}")]
    Join(#[from] JoinError),
}

/// Run one fetch-and-persist cycle, returning how many records were written
pub async fn run_cycle(
    source: &dyn VideoSource,
    store: &dyn VideoStore,
) -> Result<u64, IngestError> {
    let items = source.fetch_latest().await?;
    let videos: Vec<NewVideo> = items.into_iter().map(NewVideo::from).collect();
    let inserted = store.insert_many(&videos).await?;
    Ok(inserted)
}

pub async fn ingest_loop(
    source: Arc<dyn VideoSource>,
    store: Arc<dyn VideoStore>,
    period: Duration,
    cancel_token: CancellationToken,
) {
    // First cycle runs one full period after start
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut cycles = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let source = source.clone();
                let store = store.clone();
                cycles.spawn(async move {
                    match run_cycle(source.as_ref(), store.as_ref()).await {
                        Ok(inserted) => info!(inserted, "[ingest] Saved videos"),
                        Err(e) => error!(error = %e, "[ingest] Error fetching and saving videos"),
                    }
                });
            }
            Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                if let Err(e) = joined {
                    error!(error = %e, "[ingest] Cycle task panicked");
                }
            }
            _ = cancel_token.cancelled() => {
                info!("[ingest] Loop shutting down");
                break;
            }
        }
    }

    // Let in-flight cycles finish their writes
    while let Some(joined) = cycles.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "[ingest] Cycle task panicked");
        }
    }
}

/// Owns the background ingestion task for the life of the process
#[derive(Default)]
pub struct IngestController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl IngestController {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(
        &mut self,
        source: Arc<dyn VideoSource>,
        store: Arc<dyn VideoStore>,
        period: Duration,
    ) -> Result<(), IngestError> {
        if self.handle.is_some() {
            return Err(IngestError::AlreadyRunning);
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(ingest_loop(source, store, period, cancel_token.clone()));

        info!(period_secs = period.as_secs(), "[ingest] Background ingestion started");
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Cancel the loop and wait for it, including any in-flight cycle
    pub async fn stop(&mut self) -> Result<(), IngestError> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle.await?;
        }
        Ok(())
    }
}

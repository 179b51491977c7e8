// service/poller.rs
// Drives the engine from an ObservationSource, one serialized cycle per tick.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::errors::ServiceError;
use super::source::ObservationSource;
use crate::engine::{PredictionEngine, PredictionOutcome, Submission};

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Issued(PredictionOutcome),
    Duplicate,
    /// Another cycle was in flight; this poll was dropped.
    Busy,
    /// The source returned no observations; the engine was not invoked.
    Empty,
}

pub struct Poller<S: ObservationSource> {
    source: S,
    engine: Arc<Mutex<PredictionEngine>>,
    interval: Duration,
}

impl<S: ObservationSource> Poller<S> {
    pub fn new(source: S, engine: Arc<Mutex<PredictionEngine>>, interval: Duration) -> Self {
        Self {
            source,
            engine,
            interval,
        }
    }

    pub fn engine(&self) -> Arc<Mutex<PredictionEngine>> {
        Arc::clone(&self.engine)
    }

    /// One fetch + engine cycle. A fetch failure leaves the engine untouched.
    pub async fn poll_once(&self) -> Result<PollOutcome, ServiceError> {
        let Ok(mut engine) = self.engine.try_lock() else {
            debug!("poll dropped, previous cycle still running");
            return Ok(PollOutcome::Busy);
        };

        let observations = self.source.fetch().await?;
        if observations.is_empty() {
            warn!("source returned no observations, skipping cycle");
            return Ok(PollOutcome::Empty);
        }

        match engine.submit(&observations)? {
            Submission::Issued(outcome) => Ok(PollOutcome::Issued(outcome)),
            Submission::Duplicate => Ok(PollOutcome::Duplicate),
        }
    }

    /// Polls on a fixed interval until `shutdown_rx` fires.
    pub async fn start(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<(), ServiceError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = self.interval.as_secs(), "poller started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(PollOutcome::Issued(outcome)) => debug!(id = outcome.record_id, "cycle complete"),
                        Ok(other) => debug!(?other, "cycle produced no prediction"),
                        Err(e) => warn!("poll failed, engine state unchanged: {}", e),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("poller shutting down");
                    return Ok(());
                }
            }
        }
    }
}

use std::{sync::Arc, time::Duration};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::workflow::gameplay::timeout::ForceExpiredMovesUseCase;

/// Background task that keeps matches moving when a player stops responding.
pub struct TurnClockRunner<F: ForceExpiredMovesUseCase + Send + Sync + 'static> {
    force_expired_moves_use_case: Arc<F>,
    interval: Duration,
}

impl<F: ForceExpiredMovesUseCase + Send + Sync + 'static> TurnClockRunner<F> {
    pub fn new(force_expired_moves_use_case: Arc<F>, interval: Duration) -> Self {
        Self {
            force_expired_moves_use_case,
            interval,
        }
    }

    pub async fn run(&self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("Turn clock started, scanning every {:?}", self.interval);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let outcome = self.force_expired_moves_use_case.sweep().await;
                    if outcome.failures > 0 {
                        log::warn!(
                            "Turn clock sweep: {} forced, {} failed",
                            outcome.forced_moves,
                            outcome.failures
                        );
                    } else if outcome.forced_moves > 0 {
                        log::debug!("Turn clock sweep: {} forced", outcome.forced_moves);
                    }
                }
            }
        }
        log::info!("Turn clock stopped");
    }
}

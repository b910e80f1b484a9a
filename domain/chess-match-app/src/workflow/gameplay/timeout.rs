use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;

use crate::{
    domain::session_registry::{SessionHandle, SessionRegistry},
    ports::rules::RulesEngine,
    workflow::gameplay::finalize_game::FinalizeGameWorkflow,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub forced_moves: usize,
    pub failures: usize,
}

#[async_trait::async_trait]
pub trait ForceExpiredMovesUseCase {
    /// Plays a random legal move in every active session whose turn deadline
    /// has run out. A failing session is logged and skipped.
    async fn sweep(&self) -> SweepOutcome;
}

pub struct ForceExpiredMovesUseCaseImpl<S: SessionRegistry, RE: RulesEngine, F: FinalizeGameWorkflow>
{
    session_registry: Arc<S>,
    rules: Arc<RE>,
    finalize_game_workflow: Arc<F>,
}

enum ForceResult {
    Forced,
    Skipped,
    Failed,
}

impl<S: SessionRegistry, RE: RulesEngine, F: FinalizeGameWorkflow>
    ForceExpiredMovesUseCaseImpl<S, RE, F>
{
    pub fn new(session_registry: Arc<S>, rules: Arc<RE>, finalize_game_workflow: Arc<F>) -> Self {
        Self {
            session_registry,
            rules,
            finalize_game_workflow,
        }
    }
}

impl<
    S: SessionRegistry + Send + Sync + 'static,
    RE: RulesEngine + Send + Sync + 'static,
    F: FinalizeGameWorkflow + Send + Sync + 'static,
> ForceExpiredMovesUseCaseImpl<S, RE, F>
{
    async fn force_if_expired(&self, handle: SessionHandle) -> ForceResult {
        let mut session = handle.lock().await;
        // deadline is checked against the time the lock was acquired, not the scan time
        let now = Instant::now();
        if !session.is_active() || !session.time_remaining(now).is_zero() {
            return ForceResult::Skipped;
        }

        let session_id = session.id();
        let mut next = session.clone();
        let forced = {
            let mut rng = rand::rng();
            next.force_expired_move(self.rules.as_ref(), &mut rng, now, Utc::now())
        };

        let record = match forced {
            Ok(Some(record)) => record,
            Ok(None) => {
                log::warn!("No legal move to force in expired game {}", session_id);
                return ForceResult::Failed;
            }
            Err(e) => {
                log::error!("Failed to force move in game {}: {}", session_id, e);
                return ForceResult::Failed;
            }
        };

        if let Err(e) = self.finalize_game_workflow.commit(&mut session, next).await {
            log::error!("Failed to store forced move in game {}: {}", session_id, e);
            return ForceResult::Failed;
        }
        log::info!(
            "Forced move {} ({}) for {} in game {}",
            record.notation,
            record.color,
            record.player_id,
            session_id
        );
        ForceResult::Forced
    }
}

#[async_trait::async_trait]
impl<
    S: SessionRegistry + Send + Sync + 'static,
    RE: RulesEngine + Send + Sync + 'static,
    F: FinalizeGameWorkflow + Send + Sync + 'static,
> ForceExpiredMovesUseCase for ForceExpiredMovesUseCaseImpl<S, RE, F>
{
    async fn sweep(&self) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();
        for handle in self.session_registry.handles() {
            match self.force_if_expired(handle).await {
                ForceResult::Forced => outcome.forced_moves += 1,
                ForceResult::Failed => outcome.failures += 1,
                ForceResult::Skipped => {}
            }
        }
        outcome
    }
}

use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{
        MatchError, PlayerId,
        queue::{JoinOutcome, QueueService},
    },
    workflow::{
        gameplay::create::CreateGameUseCase,
        matchmaking::{JoinQueueResult, create_paired_game},
    },
};

#[async_trait::async_trait]
pub trait JoinQueueUseCase {
    /// Joining again while waiting or being paired reports `AlreadyQueued`
    /// and leaves the queue untouched.
    async fn join_queue(&self, player_id: PlayerId) -> Result<JoinQueueResult, MatchError>;
}

pub struct JoinQueueUseCaseImpl<Q: QueueService, C: CreateGameUseCase> {
    queue_service: Arc<Q>,
    create_game_use_case: Arc<C>,
}

impl<Q: QueueService, C: CreateGameUseCase> JoinQueueUseCaseImpl<Q, C> {
    pub fn new(queue_service: Arc<Q>, create_game_use_case: Arc<C>) -> Self {
        Self {
            queue_service,
            create_game_use_case,
        }
    }
}

#[async_trait::async_trait]
impl<Q: QueueService + Send + Sync + 'static, C: CreateGameUseCase + Send + Sync + 'static>
    JoinQueueUseCase for JoinQueueUseCaseImpl<Q, C>
{
    async fn join_queue(&self, player_id: PlayerId) -> Result<JoinQueueResult, MatchError> {
        match self.queue_service.join(player_id, Utc::now()) {
            JoinOutcome::AlreadyQueued => Ok(JoinQueueResult::AlreadyQueued {
                position: self.queue_service.position(player_id),
            }),
            JoinOutcome::Waiting => {
                let position = self.queue_service.position(player_id).unwrap_or(1);
                log::debug!("Player {} is waiting in the queue", player_id);
                Ok(JoinQueueResult::Queued { position })
            }
            JoinOutcome::Paired(opponent) => {
                let session = create_paired_game(
                    self.queue_service.as_ref(),
                    self.create_game_use_case.as_ref(),
                    opponent,
                    player_id,
                )
                .await?;
                Ok(JoinQueueResult::Matched { opponent, session })
            }
        }
    }
}

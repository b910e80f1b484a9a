use std::sync::Arc;

use crate::{
    domain::{
        MatchError, PlayerId,
        queue::{PollOutcome, QueueService},
    },
    workflow::{
        gameplay::{create::CreateGameUseCase, list::ListGamesUseCase},
        matchmaking::{PollQueueResult, create_paired_game},
    },
};

#[async_trait::async_trait]
pub trait PollQueueUseCase {
    async fn poll_queue(&self, player_id: PlayerId) -> Result<PollQueueResult, MatchError>;
}

pub struct PollQueueUseCaseImpl<Q: QueueService, C: CreateGameUseCase, L: ListGamesUseCase> {
    queue_service: Arc<Q>,
    create_game_use_case: Arc<C>,
    list_games_use_case: Arc<L>,
}

impl<Q: QueueService, C: CreateGameUseCase, L: ListGamesUseCase> PollQueueUseCaseImpl<Q, C, L> {
    pub fn new(
        queue_service: Arc<Q>,
        create_game_use_case: Arc<C>,
        list_games_use_case: Arc<L>,
    ) -> Self {
        Self {
            queue_service,
            create_game_use_case,
            list_games_use_case,
        }
    }
}

#[async_trait::async_trait]
impl<
    Q: QueueService + Send + Sync + 'static,
    C: CreateGameUseCase + Send + Sync + 'static,
    L: ListGamesUseCase + Send + Sync + 'static,
> PollQueueUseCase for PollQueueUseCaseImpl<Q, C, L>
{
    async fn poll_queue(&self, player_id: PlayerId) -> Result<PollQueueResult, MatchError> {
        let outcome = self.queue_service.poll(player_id);
        if let PollOutcome::Create(opponent) = outcome {
            let session = create_paired_game(
                self.queue_service.as_ref(),
                self.create_game_use_case.as_ref(),
                opponent,
                player_id,
            )
            .await?;
            return Ok(PollQueueResult::Matched(session));
        }

        // an ongoing game is reported ahead of any queue state
        let active = self.list_games_use_case.list_active_games(player_id).await;
        if let Some(session) = active.into_iter().next() {
            return Ok(PollQueueResult::Matched(session));
        }
        Ok(match outcome {
            PollOutcome::Waiting => PollQueueResult::Waiting,
            PollOutcome::AwaitCreation(_) => PollQueueResult::Matching,
            _ => PollQueueResult::NotQueued,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::session_registry::SessionRegistry,
        workflow::matchmaking::{
            JoinQueueResult,
            join::{JoinQueueUseCase, JoinQueueUseCaseImpl},
            test_support::fixture,
        },
    };

    use super::*;

    #[tokio::test]
    async fn test_poll_after_join() {
        let f = fixture();
        let join = JoinQueueUseCaseImpl::new(f.queue.clone(), f.create.clone());
        let poll = PollQueueUseCaseImpl::new(f.queue.clone(), f.create.clone(), f.list.clone());
        let (a, b) = (PlayerId::new(), PlayerId::new());

        assert!(matches!(
            poll.poll_queue(a).await,
            Ok(PollQueueResult::NotQueued)
        ));
        join.join_queue(a).await.unwrap();
        assert!(matches!(poll.poll_queue(a).await, Ok(PollQueueResult::Waiting)));

        let Ok(JoinQueueResult::Matched { session, .. }) = join.join_queue(b).await else {
            panic!("expected a match");
        };

        for player in [a, b, a] {
            let Ok(PollQueueResult::Matched(found)) = poll.poll_queue(player).await else {
                panic!("poll should report the created session");
            };
            assert_eq!(found.id, session.id);
        }
        assert_eq!(f.registry.handles().len(), 1);
    }

    #[tokio::test]
    async fn test_pending_pairing_reports_matching() {
        let f = fixture();
        let poll = PollQueueUseCaseImpl::new(f.queue.clone(), f.create.clone(), f.list.clone());
        let (a, b) = (PlayerId::new(), PlayerId::new());

        f.queue.join(a, chrono::Utc::now());
        // reserve the pairing without creating the session yet
        f.queue.join(b, chrono::Utc::now());
        assert!(matches!(poll.poll_queue(a).await, Ok(PollQueueResult::Matching)));

        f.queue.complete_pairing(a);
        assert!(matches!(poll.poll_queue(a).await, Ok(PollQueueResult::NotQueued)));
    }

    #[tokio::test]
    async fn test_poll_reports_active_game_after_requeue() {
        let f = fixture();
        let join = JoinQueueUseCaseImpl::new(f.queue.clone(), f.create.clone());
        let poll = PollQueueUseCaseImpl::new(f.queue.clone(), f.create.clone(), f.list.clone());
        let (a, b) = (PlayerId::new(), PlayerId::new());

        join.join_queue(a).await.unwrap();
        let Ok(JoinQueueResult::Matched { session, .. }) = join.join_queue(b).await else {
            panic!("expected a match");
        };

        assert!(matches!(
            join.join_queue(a).await,
            Ok(JoinQueueResult::Queued { position: 1 })
        ));
        let Ok(PollQueueResult::Matched(found)) = poll.poll_queue(a).await else {
            panic!("poll should report the ongoing game");
        };
        assert_eq!(found.id, session.id);
        assert_eq!(f.queue.position(a), Some(1));
    }
}

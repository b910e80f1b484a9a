use crate::{
    domain::{MatchError, PlayerId, queue::QueueService},
    workflow::gameplay::{SessionView, create::CreateGameUseCase},
};

pub mod join;
pub mod leave;
pub mod poll;
pub mod status;

#[derive(Clone, Debug)]
pub enum JoinQueueResult {
    Queued { position: usize },
    /// The player was already waiting; `None` while a pairing is being created.
    AlreadyQueued { position: Option<usize> },
    Matched { opponent: PlayerId, session: SessionView },
}

#[derive(Clone, Debug)]
pub enum PollQueueResult {
    Waiting,
    /// Paired, but the session is created by the opponent's call.
    Matching,
    Matched(SessionView),
    NotQueued,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueStatus {
    Queued { position: usize },
    NotQueued,
}

/// Creates the session for a pairing reserved in the queue. The reservation
/// is released on success and rolled back on failure.
async fn create_paired_game<Q: QueueService, C: CreateGameUseCase>(
    queue_service: &Q,
    create_game_use_case: &C,
    waiting_player: PlayerId,
    creating_player: PlayerId,
) -> Result<SessionView, MatchError> {
    match create_game_use_case
        .create_game(waiting_player, creating_player)
        .await
    {
        Ok(view) => {
            queue_service.complete_pairing(waiting_player);
            log::info!(
                "Matched {} with {} in game {}",
                creating_player,
                waiting_player,
                view.id
            );
            Ok(view)
        }
        Err(e) => {
            queue_service.cancel_pairing(waiting_player);
            log::warn!(
                "Could not create game for {} and {}, pairing cancelled: {}",
                creating_player,
                waiting_player,
                e
            );
            Err(e)
        }
    }
}

use std::sync::Arc;

use crate::domain::{
    MatchError,
    game_history::GameRepository,
    rating::{GameRatingInfo, RatingService},
    session::MatchSession,
    session_registry::SessionRegistry,
};

#[async_trait::async_trait]
pub trait FinalizeGameWorkflow {
    /// Stores `next` and only then makes it the current state of the session
    /// behind `current`. A terminal `next` is archived in one unit with both
    /// players' rating updates and leaves the registry; if storing fails the
    /// session is left exactly as it was.
    async fn commit(
        &self,
        current: &mut MatchSession,
        next: MatchSession,
    ) -> Result<Option<GameRatingInfo>, MatchError>;
}

pub struct FinalizeGameWorkflowImpl<S: SessionRegistry, G: GameRepository, R: RatingService> {
    session_registry: Arc<S>,
    game_repository: Arc<G>,
    rating_service: Arc<R>,
}

impl<S: SessionRegistry, G: GameRepository, R: RatingService + Send + Sync + 'static>
    FinalizeGameWorkflowImpl<S, G, R>
{
    pub fn new(session_registry: Arc<S>, game_repository: Arc<G>, rating_service: Arc<R>) -> Self {
        Self {
            session_registry,
            game_repository,
            rating_service,
        }
    }

    async fn finalize_game(&self, ended: MatchSession) -> Result<GameRatingInfo, MatchError> {
        let session_id = ended.id();
        let Some(result) = ended.result() else {
            return Err(MatchError::internal(
                "refusing to finalize active game",
                session_id,
            ));
        };

        let rating_service = self.rating_service.clone();
        let info = self
            .game_repository
            .finish_game(ended, move |white, black| {
                rating_service.calculate_ratings(result, white, black)
            })
            .await
            .map_err(|e| MatchError::internal(&format!("failed to finish game {}", session_id), e))?;

        log::info!(
            "Game {} finished ({:?}), rating changes white {:+} black {:+}",
            session_id,
            result,
            info.rating_change_white,
            info.rating_change_black
        );
        Ok(info)
    }
}

#[async_trait::async_trait]
impl<
    S: SessionRegistry + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    R: RatingService + Send + Sync + 'static,
> FinalizeGameWorkflow for FinalizeGameWorkflowImpl<S, G, R>
{
    async fn commit(
        &self,
        current: &mut MatchSession,
        next: MatchSession,
    ) -> Result<Option<GameRatingInfo>, MatchError> {
        if !next.status().is_terminal() {
            self.game_repository
                .save_ongoing_game(&next)
                .await
                .map_err(|e| {
                    MatchError::internal(&format!("failed to save game {}", next.id()), e)
                })?;
            *current = next;
            return Ok(None);
        }

        let info = self.finalize_game(next.clone()).await?;
        let session_id = next.id();
        *current = next;
        self.session_registry.retire(session_id);
        Ok(Some(info))
    }
}

use std::sync::Arc;

use tokio::time::Instant;

use crate::{
    domain::{
        MatchError, RepoRetrieveError, SessionId,
        game_history::GameRepository,
        session::{MatchSession, MoveRecord},
        session_registry::SessionRegistry,
    },
    workflow::gameplay::SessionView,
};

#[async_trait::async_trait]
pub trait GetGameUseCase {
    async fn get_game(&self, session_id: SessionId) -> Result<SessionView, MatchError>;
    async fn get_moves(&self, session_id: SessionId) -> Result<Vec<MoveRecord>, MatchError>;
}

pub struct GetGameUseCaseImpl<S: SessionRegistry, G: GameRepository> {
    session_registry: Arc<S>,
    game_repository: Arc<G>,
}

impl<S: SessionRegistry, G: GameRepository> GetGameUseCaseImpl<S, G> {
    pub fn new(session_registry: Arc<S>, game_repository: Arc<G>) -> Self {
        Self {
            session_registry,
            game_repository,
        }
    }

    async fn with_session<R>(
        &self,
        session_id: SessionId,
        f: impl FnOnce(&MatchSession) -> R,
    ) -> Result<R, MatchError> {
        if let Some(handle) = self.session_registry.get_handle(session_id) {
            let session = handle.lock().await;
            return Ok(f(&session));
        }
        match self.game_repository.get_game(session_id).await {
            Ok(session) => Ok(f(&session)),
            Err(RepoRetrieveError::NotFound) => Err(MatchError::NotFound),
            Err(e) => Err(MatchError::internal(
                &format!("failed to load game {}", session_id),
                e,
            )),
        }
    }
}

#[async_trait::async_trait]
impl<S: SessionRegistry + Send + Sync + 'static, G: GameRepository + Send + Sync + 'static>
    GetGameUseCase for GetGameUseCaseImpl<S, G>
{
    async fn get_game(&self, session_id: SessionId) -> Result<SessionView, MatchError> {
        let now = Instant::now();
        self.with_session(session_id, |session| SessionView::from(session, now))
            .await
    }

    async fn get_moves(&self, session_id: SessionId) -> Result<Vec<MoveRecord>, MatchError> {
        self.with_session(session_id, |session| session.moves().to_vec())
            .await
    }
}

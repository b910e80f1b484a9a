use std::sync::Arc;

use crate::domain::{
    MatchError, PlayerId, RepoRetrieveError,
    player::{Player, PlayerRepository},
};

#[async_trait::async_trait]
pub trait GetPlayerUseCase {
    async fn get_player(&self, player_id: PlayerId) -> Result<Player, MatchError>;
}

pub struct GetPlayerUseCaseImpl<P: PlayerRepository> {
    player_repository: Arc<P>,
}

impl<P: PlayerRepository> GetPlayerUseCaseImpl<P> {
    pub fn new(player_repository: Arc<P>) -> Self {
        Self { player_repository }
    }
}

#[async_trait::async_trait]
impl<P: PlayerRepository + Send + Sync + 'static> GetPlayerUseCase for GetPlayerUseCaseImpl<P> {
    async fn get_player(&self, player_id: PlayerId) -> Result<Player, MatchError> {
        match self.player_repository.get_player(player_id).await {
            Ok(player) => Ok(player),
            Err(RepoRetrieveError::NotFound) => Err(MatchError::NotFound),
            Err(e) => Err(MatchError::internal(
                &format!("failed to load player {}", player_id),
                e,
            )),
        }
    }
}

use chess_match_app::domain::{
    PlayerId, RepoError, RepoRetrieveError,
    player::{Player, PlayerRepository},
};

use crate::MemoryStore;

#[async_trait::async_trait]
impl PlayerRepository for MemoryStore {
    async fn get_player(&self, player_id: PlayerId) -> Result<Player, RepoRetrieveError> {
        let state = self.state.lock().await;
        state
            .players
            .get(&player_id)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_or_create_player(&self, player_id: PlayerId) -> Result<Player, RepoError> {
        let mut state = self.state.lock().await;
        let player = state.players.entry(player_id).or_insert_with(|| {
            log::debug!("Creating player record for {}", player_id);
            Player::new(player_id)
        });
        Ok(player.clone())
    }
}

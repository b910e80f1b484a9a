use crate::domain::{
    PlayerId, RepoError, RepoRetrieveError, RepoUpdateError, SessionId, player::Player,
    session::MatchSession,
};

#[async_trait::async_trait]
pub trait GameRepository {
    async fn save_ongoing_game(&self, session: &MatchSession) -> Result<(), RepoError>;
    async fn get_game(&self, session_id: SessionId) -> Result<MatchSession, RepoRetrieveError>;
    /// Finished games of a player, most recently ended first.
    async fn query_finished_games(
        &self,
        player_id: PlayerId,
        limit: usize,
    ) -> Result<Vec<MatchSession>, RepoError>;
    /// Stores the finished session together with both players' updated
    /// records. Either everything is written or nothing is.
    async fn finish_game<R: Send + 'static>(
        &self,
        session: MatchSession,
        calc_fn: impl FnOnce(Player, Player) -> (Player, Player, R) + Send + 'static,
    ) -> Result<R, RepoUpdateError>;
}

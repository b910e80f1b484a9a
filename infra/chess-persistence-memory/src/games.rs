use chess_match_app::domain::{
    PlayerId, RepoError, RepoRetrieveError, RepoUpdateError, SessionId,
    game_history::GameRepository, player::Player, session::MatchSession,
};

use crate::MemoryStore;

#[async_trait::async_trait]
impl GameRepository for MemoryStore {
    async fn save_ongoing_game(&self, session: &MatchSession) -> Result<(), RepoError> {
        let mut state = self.state.lock().await;
        if state.finished_games.contains_key(&session.id()) {
            return Err(RepoError::StorageError(format!(
                "game {} is already finished",
                session.id()
            )));
        }
        state.ongoing_games.insert(session.id(), session.clone());
        Ok(())
    }

    async fn get_game(&self, session_id: SessionId) -> Result<MatchSession, RepoRetrieveError> {
        let state = self.state.lock().await;
        state
            .finished_games
            .get(&session_id)
            .or_else(|| state.ongoing_games.get(&session_id))
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn query_finished_games(
        &self,
        player_id: PlayerId,
        limit: usize,
    ) -> Result<Vec<MatchSession>, RepoError> {
        let state = self.state.lock().await;
        let mut games: Vec<&MatchSession> = state
            .finished_games
            .values()
            .filter(|game| game.has_player(player_id))
            .collect();
        games.sort_by(|a, b| b.ended_at().cmp(&a.ended_at()));
        Ok(games.into_iter().take(limit).cloned().collect())
    }

    async fn finish_game<R: Send + 'static>(
        &self,
        session: MatchSession,
        calc_fn: impl FnOnce(Player, Player) -> (Player, Player, R) + Send + 'static,
    ) -> Result<R, RepoUpdateError> {
        let mut state = self.state.lock().await;
        if state.finished_games.contains_key(&session.id()) {
            return Err(RepoUpdateError::Conflict);
        }
        let white = state
            .players
            .get(&session.white_id())
            .cloned()
            .ok_or(RepoUpdateError::NotFound)?;
        let black = state
            .players
            .get(&session.black_id())
            .cloned()
            .ok_or(RepoUpdateError::NotFound)?;

        let (new_white, new_black, res) = calc_fn(white, black);

        state.players.insert(new_white.id, new_white);
        state.players.insert(new_black.id, new_black);
        state.ongoing_games.remove(&session.id());
        state.finished_games.insert(session.id(), session);
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chess_match_app::domain::player::PlayerRepository;
    use chrono::{TimeDelta, Utc};
    use tokio::time::Instant;

    use super::*;

    async fn ended_game(store: &MemoryStore, white: PlayerId, black: PlayerId, offset: i64) -> MatchSession {
        store.get_or_create_player(white).await.unwrap();
        store.get_or_create_player(black).await.unwrap();
        let mut session = MatchSession::new(
            SessionId::new(),
            white,
            black,
            "board".to_string(),
            Duration::from_secs(60),
            Instant::now(),
            Utc::now(),
        );
        store.save_ongoing_game(&session).await.unwrap();
        session
            .resign(black, Utc::now() + TimeDelta::seconds(offset))
            .unwrap();
        session
    }

    fn white_wins(mut white: Player, mut black: Player) -> (Player, Player, i32) {
        white.rating += 10;
        white.wins += 1;
        black.rating -= 10;
        black.losses += 1;
        (white, black, 10)
    }

    #[tokio::test]
    async fn test_finish_game_updates_players_and_archive() {
        let store = MemoryStore::new();
        let (white, black) = (PlayerId::new(), PlayerId::new());
        let session = ended_game(&store, white, black, 0).await;
        let id = session.id();

        assert!(store.get_game(id).await.unwrap().is_active());
        assert_eq!(store.finish_game(session.clone(), white_wins).await.unwrap(), 10);

        assert!(!store.get_game(id).await.unwrap().is_active());
        assert_eq!(store.get_player(white).await.unwrap().rating, 1210);
        assert_eq!(store.get_player(black).await.unwrap().losses, 1);
        assert!(matches!(
            store.finish_game(session.clone(), white_wins).await,
            Err(RepoUpdateError::Conflict)
        ));
        assert_eq!(store.get_player(white).await.unwrap().rating, 1210);
        assert!(store.save_ongoing_game(&session).await.is_err());
    }

    #[tokio::test]
    async fn test_finish_game_unknown_player_changes_nothing() {
        let store = MemoryStore::new();
        let white = PlayerId::new();
        store.get_or_create_player(white).await.unwrap();
        let session = MatchSession::new(
            SessionId::new(),
            white,
            PlayerId::new(),
            "board".to_string(),
            Duration::from_secs(60),
            Instant::now(),
            Utc::now(),
        );

        assert!(matches!(
            store.finish_game(session.clone(), white_wins).await,
            Err(RepoUpdateError::NotFound)
        ));
        assert_eq!(store.get_player(white).await.unwrap().rating, 1200);
        assert!(matches!(
            store.get_game(session.id()).await,
            Err(RepoRetrieveError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_query_finished_games() {
        let store = MemoryStore::new();
        let (a, b, c) = (PlayerId::new(), PlayerId::new(), PlayerId::new());
        for (offset, (white, black)) in [(a, b), (b, a), (a, c)].into_iter().enumerate() {
            let session = ended_game(&store, white, black, offset as i64).await;
            store.finish_game(session, white_wins).await.unwrap();
        }

        let games = store.query_finished_games(a, 10).await.unwrap();
        assert_eq!(games.len(), 3);
        assert!(games.windows(2).all(|w| w[0].ended_at() >= w[1].ended_at()));
        assert_eq!(store.query_finished_games(a, 2).await.unwrap().len(), 2);
        assert_eq!(store.query_finished_games(c, 10).await.unwrap().len(), 1);
        assert!(store.query_finished_games(PlayerId::new(), 10).await.unwrap().is_empty());
    }
}

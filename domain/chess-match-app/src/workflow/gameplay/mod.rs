use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::domain::{
    Color, MatchError, PlayerId, RepoRetrieveError, SessionId,
    game_history::GameRepository,
    session::{MatchSession, MoveRecord, SessionStatus},
    session_registry::{SessionHandle, SessionRegistry},
};

pub mod create;
pub mod do_action;
pub mod finalize_game;
pub mod get;
pub mod list;
pub mod timeout;

#[derive(Clone, Debug)]
pub struct SessionView {
    pub id: SessionId,
    pub white_id: PlayerId,
    pub black_id: PlayerId,
    pub board: String,
    pub turn: Color,
    pub status: SessionStatus,
    pub winner: Option<PlayerId>,
    pub time_remaining: Duration,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub draw_offered_by: Option<PlayerId>,
    pub last_move: Option<MoveRecord>,
    pub move_count: usize,
}

impl SessionView {
    pub fn from(session: &MatchSession, now: Instant) -> Self {
        SessionView {
            id: session.id(),
            white_id: session.white_id(),
            black_id: session.black_id(),
            board: session.board().to_string(),
            turn: session.turn(),
            status: session.status(),
            winner: session.winner(),
            time_remaining: session.time_remaining(now),
            created_at: session.created_at(),
            ended_at: session.ended_at(),
            draw_offered_by: session.draw_offered_by(),
            last_move: session.last_move().cloned(),
            move_count: session.moves().len(),
        }
    }

    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        if player == self.white_id {
            Some(Color::White)
        } else if player == self.black_id {
            Some(Color::Black)
        } else {
            None
        }
    }
}

/// Live handle for a session that can still be mutated. Sessions that only
/// exist in storage have already ended.
async fn resolve_handle<S: SessionRegistry, G: GameRepository>(
    session_registry: &S,
    game_repository: &G,
    session_id: SessionId,
) -> Result<SessionHandle, MatchError> {
    if let Some(handle) = session_registry.get_handle(session_id) {
        return Ok(handle);
    }
    match game_repository.get_game(session_id).await {
        Ok(_) => Err(MatchError::GameNotActive),
        Err(RepoRetrieveError::NotFound) => Err(MatchError::NotFound),
        Err(e) => Err(MatchError::internal(
            &format!("failed to load game {}", session_id),
            e,
        )),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicBool, Ordering},
        },
    };

    use crate::domain::{
        PlayerId, RepoError, RepoRetrieveError, RepoUpdateError, SessionId,
        game_history::GameRepository,
        player::{Player, PlayerRepository},
        session::MatchSession,
    };

    /// Both repositories in one, with switches to make writes fail.
    #[derive(Default)]
    pub struct MockStore {
        pub players: Mutex<HashMap<PlayerId, Player>>,
        pub ongoing: Mutex<HashMap<SessionId, MatchSession>>,
        pub finished: Mutex<Vec<MatchSession>>,
        pub fail_finish: AtomicBool,
        pub fail_save: AtomicBool,
    }

    impl MockStore {
        pub fn player(&self, id: PlayerId) -> Player {
            self.players
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .unwrap_or_else(|| Player::new(id))
        }

        pub fn set_fail_finish(&self, fail: bool) {
            self.fail_finish.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_save(&self, fail: bool) {
            self.fail_save.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl GameRepository for MockStore {
        async fn save_ongoing_game(&self, session: &MatchSession) -> Result<(), RepoError> {
            if self.fail_save.load(Ordering::SeqCst) {
                return Err(RepoError::StorageError("save disabled".to_string()));
            }
            self.ongoing
                .lock()
                .unwrap()
                .insert(session.id(), session.clone());
            Ok(())
        }

        async fn get_game(&self, session_id: SessionId) -> Result<MatchSession, RepoRetrieveError> {
            if let Some(s) = self.finished.lock().unwrap().iter().find(|s| s.id() == session_id) {
                return Ok(s.clone());
            }
            self.ongoing
                .lock()
                .unwrap()
                .get(&session_id)
                .cloned()
                .ok_or(RepoRetrieveError::NotFound)
        }

        async fn query_finished_games(
            &self,
            player_id: PlayerId,
            limit: usize,
        ) -> Result<Vec<MatchSession>, RepoError> {
            let mut games: Vec<MatchSession> = self
                .finished
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.has_player(player_id))
                .cloned()
                .collect();
            games.sort_by(|a, b| b.ended_at().cmp(&a.ended_at()));
            games.truncate(limit);
            Ok(games)
        }

        async fn finish_game<R: Send + 'static>(
            &self,
            session: MatchSession,
            calc_fn: impl FnOnce(Player, Player) -> (Player, Player, R) + Send + 'static,
        ) -> Result<R, RepoUpdateError> {
            if self.fail_finish.load(Ordering::SeqCst) {
                return Err(RepoUpdateError::StorageError("finish disabled".to_string()));
            }
            let white = self.player(session.white_id());
            let black = self.player(session.black_id());
            let (white, black, res) = calc_fn(white, black);
            let mut players = self.players.lock().unwrap();
            players.insert(white.id, white);
            players.insert(black.id, black);
            self.ongoing.lock().unwrap().remove(&session.id());
            self.finished.lock().unwrap().push(session);
            Ok(res)
        }
    }

    #[async_trait::async_trait]
    impl PlayerRepository for MockStore {
        async fn get_player(&self, player_id: PlayerId) -> Result<Player, RepoRetrieveError> {
            self.players
                .lock()
                .unwrap()
                .get(&player_id)
                .cloned()
                .ok_or(RepoRetrieveError::NotFound)
        }

        async fn get_or_create_player(&self, player_id: PlayerId) -> Result<Player, RepoError> {
            Ok(self
                .players
                .lock()
                .unwrap()
                .entry(player_id)
                .or_insert_with(|| Player::new(player_id))
                .clone())
        }
    }
}

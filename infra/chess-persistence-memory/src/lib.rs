use std::collections::HashMap;

use chess_match_app::domain::{
    PlayerId, SessionId, player::Player, session::MatchSession,
};
use tokio::sync::Mutex;

pub mod games;
pub mod players;

#[derive(Default)]
struct StoreState {
    players: HashMap<PlayerId, Player>,
    ongoing_games: HashMap<SessionId, MatchSession>,
    finished_games: HashMap<SessionId, MatchSession>,
}

/// Player and game records kept in process memory. Every operation runs
/// under one lock, which makes multi-record updates such as finishing a game
/// all-or-nothing.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

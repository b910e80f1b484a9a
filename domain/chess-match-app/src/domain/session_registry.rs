use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::domain::{Color, PlayerId, SessionId, session::MatchSession};

pub type SessionHandle = Arc<Mutex<MatchSession>>;

/// Live sessions. A session is registered when it is created and removed
/// once its terminal state has been stored, so every entry here is active
/// or about to be retired by whoever holds its lock.
pub trait SessionRegistry {
    fn register(&self, session: MatchSession) -> SessionHandle;
    fn get_handle(&self, session_id: SessionId) -> Option<SessionHandle>;
    fn handles(&self) -> Vec<SessionHandle>;
    /// Sessions the player takes part in, found without locking any session.
    fn handles_of(&self, player: PlayerId) -> Vec<SessionHandle>;
    fn retire(&self, session_id: SessionId);
    /// Randomly orders two players as (white, black).
    fn assign_colors(&self, first: PlayerId, second: PlayerId) -> (PlayerId, PlayerId);
}

struct LiveSession {
    white_id: PlayerId,
    black_id: PlayerId,
    handle: SessionHandle,
}

pub struct SessionRegistryImpl {
    sessions: Arc<DashMap<SessionId, LiveSession>>,
}

impl SessionRegistryImpl {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }
}

impl SessionRegistry for SessionRegistryImpl {
    fn register(&self, session: MatchSession) -> SessionHandle {
        let session_id = session.id();
        let (white_id, black_id) = (session.white_id(), session.black_id());
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(
            session_id,
            LiveSession {
                white_id,
                black_id,
                handle: handle.clone(),
            },
        );
        handle
    }

    fn get_handle(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.sessions.get(&session_id).map(|entry| entry.handle.clone())
    }

    fn handles(&self) -> Vec<SessionHandle> {
        self.sessions
            .iter()
            .map(|entry| entry.handle.clone())
            .collect()
    }

    fn handles_of(&self, player: PlayerId) -> Vec<SessionHandle> {
        self.sessions
            .iter()
            .filter(|entry| entry.white_id == player || entry.black_id == player)
            .map(|entry| entry.handle.clone())
            .collect()
    }

    fn retire(&self, session_id: SessionId) {
        self.sessions.remove(&session_id);
    }

    fn assign_colors(&self, first: PlayerId, second: PlayerId) -> (PlayerId, PlayerId) {
        let first_color = if rand::random::<bool>() {
            Color::White
        } else {
            Color::Black
        };
        match first_color {
            Color::White => (first, second),
            Color::Black => (second, first),
        }
    }
}

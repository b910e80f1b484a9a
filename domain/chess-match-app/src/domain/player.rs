use crate::domain::{PlayerId, RepoError, RepoRetrieveError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
}

impl Player {
    pub const INITIAL_RATING: i32 = 1200;

    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            rating: Self::INITIAL_RATING,
            wins: 0,
            losses: 0,
        }
    }
}

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn get_player(&self, player_id: PlayerId) -> Result<Player, RepoRetrieveError>;
    async fn get_or_create_player(&self, player_id: PlayerId) -> Result<Player, RepoError>;
}

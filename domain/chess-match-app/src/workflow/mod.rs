pub mod gameplay;
pub mod matchmaking;
pub mod player;

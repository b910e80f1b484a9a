use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchConfig {
    /// Fixed into every session at creation.
    pub turn_deadline: Duration,
    pub clock_interval: Duration,
    pub completed_games_limit: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            turn_deadline: Duration::from_secs(60),
            clock_interval: Duration::from_secs(1),
            completed_games_limit: 10,
        }
    }
}

use std::sync::Arc;

use tokio::time::Instant;

use crate::{
    domain::{
        MatchError, PlayerId, game_history::GameRepository, session_registry::SessionRegistry,
    },
    workflow::gameplay::SessionView,
};

#[async_trait::async_trait]
pub trait ListGamesUseCase {
    /// Active games of a player, most recently created first.
    async fn list_active_games(&self, player_id: PlayerId) -> Vec<SessionView>;
    /// Finished games of a player, most recently ended first. `None` uses the
    /// configured default limit.
    async fn list_completed_games(
        &self,
        player_id: PlayerId,
        limit: Option<usize>,
    ) -> Result<Vec<SessionView>, MatchError>;
}

pub struct ListGamesUseCaseImpl<S: SessionRegistry, G: GameRepository> {
    session_registry: Arc<S>,
    game_repository: Arc<G>,
    default_limit: usize,
}

impl<S: SessionRegistry, G: GameRepository> ListGamesUseCaseImpl<S, G> {
    pub fn new(session_registry: Arc<S>, game_repository: Arc<G>, default_limit: usize) -> Self {
        Self {
            session_registry,
            game_repository,
            default_limit,
        }
    }
}

#[async_trait::async_trait]
impl<S: SessionRegistry + Send + Sync + 'static, G: GameRepository + Send + Sync + 'static>
    ListGamesUseCase for ListGamesUseCaseImpl<S, G>
{
    async fn list_active_games(&self, player_id: PlayerId) -> Vec<SessionView> {
        let now = Instant::now();
        let mut views = Vec::new();
        for handle in self.session_registry.handles_of(player_id) {
            let session = handle.lock().await;
            if session.is_active() {
                views.push(SessionView::from(&session, now));
            }
        }
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        views
    }

    async fn list_completed_games(
        &self,
        player_id: PlayerId,
        limit: Option<usize>,
    ) -> Result<Vec<SessionView>, MatchError> {
        let limit = limit.unwrap_or(self.default_limit);
        let now = Instant::now();
        let games = self
            .game_repository
            .query_finished_games(player_id, limit)
            .await
            .map_err(|e| {
                MatchError::internal(&format!("failed to list games of {}", player_id), e)
            })?;
        Ok(games
            .iter()
            .map(|session| SessionView::from(session, now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeDelta, Utc};

    use crate::{
        domain::{
            SessionId, session::MatchSession, session_registry::SessionRegistryImpl,
        },
        workflow::gameplay::test_support::MockStore,
    };

    use super::*;

    fn session(white: PlayerId, black: PlayerId, offset_secs: i64) -> MatchSession {
        MatchSession::new(
            SessionId::new(),
            white,
            black,
            "start".to_string(),
            Duration::from_secs(60),
            Instant::now(),
            Utc::now() + TimeDelta::seconds(offset_secs),
        )
    }

    #[tokio::test]
    async fn test_list_active_games() {
        let registry = Arc::new(SessionRegistryImpl::new());
        let store = Arc::new(MockStore::default());
        let list = ListGamesUseCaseImpl::new(registry.clone(), store, 10);
        let (a, b, c) = (PlayerId::new(), PlayerId::new(), PlayerId::new());

        let older = session(a, b, 0);
        let newer = session(c, a, 5);
        let other = session(b, c, 10);
        let newer_id = newer.id();
        registry.register(older);
        registry.register(newer);
        registry.register(other);

        let games = list.list_active_games(a).await;
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, newer_id);
        assert!(list.list_active_games(PlayerId::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_active_games_skips_busy_sessions_of_others() {
        let registry = Arc::new(SessionRegistryImpl::new());
        let list = ListGamesUseCaseImpl::new(registry.clone(), Arc::new(MockStore::default()), 10);
        let (a, b, c, d) = (PlayerId::new(), PlayerId::new(), PlayerId::new(), PlayerId::new());

        registry.register(session(a, b, 0));
        let busy = registry.register(session(c, d, 0));
        let _guard = busy.lock().await;

        let games = tokio::time::timeout(Duration::from_secs(1), list.list_active_games(a))
            .await
            .expect("listing waited on another player's session");
        assert_eq!(games.len(), 1);
    }

    #[tokio::test]
    async fn test_list_completed_games_limit() {
        let registry = Arc::new(SessionRegistryImpl::new());
        let store = Arc::new(MockStore::default());
        let list = ListGamesUseCaseImpl::new(registry, store.clone(), 2);
        let (a, b) = (PlayerId::new(), PlayerId::new());

        for i in 0..3 {
            let mut s = session(a, b, 0);
            s.resign(b, Utc::now() + TimeDelta::seconds(i)).unwrap();
            store.finished.lock().unwrap().push(s);
        }

        let games = list.list_completed_games(a, None).await.unwrap();
        assert_eq!(games.len(), 2);
        assert!(games[0].ended_at > games[1].ended_at);
        assert_eq!(list.list_completed_games(b, Some(5)).await.unwrap().len(), 3);
        assert!(list.list_completed_games(PlayerId::new(), None).await.unwrap().is_empty());
    }
}

use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;

use crate::{
    MatchConfig,
    domain::{
        MatchError, PlayerId, SessionId,
        game_history::GameRepository,
        player::PlayerRepository,
        session::MatchSession,
        session_registry::SessionRegistry,
    },
    ports::rules::RulesEngine,
    workflow::gameplay::SessionView,
};

#[async_trait::async_trait]
pub trait CreateGameUseCase {
    async fn create_game(
        &self,
        player1: PlayerId,
        player2: PlayerId,
    ) -> Result<SessionView, MatchError>;
}

pub struct CreateGameUseCaseImpl<
    S: SessionRegistry,
    G: GameRepository,
    P: PlayerRepository,
    RE: RulesEngine,
> {
    session_registry: Arc<S>,
    game_repository: Arc<G>,
    player_repository: Arc<P>,
    rules: Arc<RE>,
    config: MatchConfig,
}

impl<S: SessionRegistry, G: GameRepository, P: PlayerRepository, RE: RulesEngine>
    CreateGameUseCaseImpl<S, G, P, RE>
{
    pub fn new(
        session_registry: Arc<S>,
        game_repository: Arc<G>,
        player_repository: Arc<P>,
        rules: Arc<RE>,
        config: MatchConfig,
    ) -> Self {
        Self {
            session_registry,
            game_repository,
            player_repository,
            rules,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<
    S: SessionRegistry + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    P: PlayerRepository + Send + Sync + 'static,
    RE: RulesEngine + Send + Sync + 'static,
> CreateGameUseCase for CreateGameUseCaseImpl<S, G, P, RE>
{
    async fn create_game(
        &self,
        player1: PlayerId,
        player2: PlayerId,
    ) -> Result<SessionView, MatchError> {
        if player1 == player2 {
            return Err(MatchError::InvalidInput(
                "a player cannot play against themselves".to_string(),
            ));
        }
        for player in [player1, player2] {
            self.player_repository
                .get_or_create_player(player)
                .await
                .map_err(|e| MatchError::internal(&format!("failed to load player {}", player), e))?;
        }

        let (white_id, black_id) = self.session_registry.assign_colors(player1, player2);
        let now = Instant::now();
        let session = MatchSession::new(
            SessionId::new(),
            white_id,
            black_id,
            self.rules.initial_board(),
            self.config.turn_deadline,
            now,
            Utc::now(),
        );

        self.game_repository
            .save_ongoing_game(&session)
            .await
            .map_err(|e| MatchError::internal("failed to save new game", e))?;

        let view = SessionView::from(&session, now);
        self.session_registry.register(session);
        log::info!(
            "Created game {} with white {} and black {}",
            view.id,
            white_id,
            black_id
        );
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{Color, session::SessionStatus, session_registry::SessionRegistryImpl},
        ports::rules::mock::MockRulesEngine,
        workflow::gameplay::test_support::MockStore,
    };

    use super::*;

    fn use_case(
        store: Arc<MockStore>,
        registry: Arc<SessionRegistryImpl>,
    ) -> CreateGameUseCaseImpl<SessionRegistryImpl, MockStore, MockStore, MockRulesEngine> {
        CreateGameUseCaseImpl::new(
            registry,
            store.clone(),
            store,
            Arc::new(MockRulesEngine::new(&["e2e4"])),
            MatchConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_create_game() {
        let store = Arc::new(MockStore::default());
        let registry = Arc::new(SessionRegistryImpl::new());
        let create = use_case(store.clone(), registry.clone());
        let (a, b) = (PlayerId::new(), PlayerId::new());

        let view = create.create_game(a, b).await.unwrap();

        assert_eq!(view.status, SessionStatus::Active);
        assert_eq!(view.turn, Color::White);
        assert_eq!(view.board, "start");
        assert_eq!(view.time_remaining, MatchConfig::default().turn_deadline);
        assert!(view.color_of(a).is_some() && view.color_of(b).is_some());
        assert_ne!(view.color_of(a), view.color_of(b));
        assert!(registry.get_handle(view.id).is_some());
        assert!(store.ongoing.lock().unwrap().contains_key(&view.id));
        assert_eq!(store.players.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_game_against_self_rejected() {
        let store = Arc::new(MockStore::default());
        let registry = Arc::new(SessionRegistryImpl::new());
        let create = use_case(store, registry.clone());
        let a = PlayerId::new();

        assert!(matches!(
            create.create_game(a, a).await,
            Err(MatchError::InvalidInput(_))
        ));
        assert!(registry.handles().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_registers_nothing() {
        let store = Arc::new(MockStore::default());
        store.set_fail_save(true);
        let registry = Arc::new(SessionRegistryImpl::new());
        let create = use_case(store, registry.clone());

        assert_eq!(
            create.create_game(PlayerId::new(), PlayerId::new()).await.unwrap_err(),
            MatchError::Internal
        );
        assert!(registry.handles().is_empty());
    }
}

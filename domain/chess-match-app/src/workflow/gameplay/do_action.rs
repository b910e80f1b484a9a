use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;

use crate::{
    domain::{
        MatchError, PlayerId, SessionId,
        board_move::BoardMove,
        game_history::GameRepository,
        session::DrawOfferOutcome,
        session_registry::SessionRegistry,
    },
    ports::rules::RulesEngine,
    workflow::gameplay::{SessionView, finalize_game::FinalizeGameWorkflow, resolve_handle},
};

#[async_trait::async_trait]
pub trait DoActionUseCase {
    async fn make_move(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Result<SessionView, MatchError>;
    async fn resign(&self, session_id: SessionId, player_id: PlayerId) -> Result<(), MatchError>;
    async fn offer_draw(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> Result<DrawOfferOutcome, MatchError>;
}

pub struct DoActionUseCaseImpl<
    S: SessionRegistry,
    G: GameRepository,
    RE: RulesEngine,
    F: FinalizeGameWorkflow,
> {
    session_registry: Arc<S>,
    game_repository: Arc<G>,
    rules: Arc<RE>,
    finalize_game_workflow: Arc<F>,
}

impl<S: SessionRegistry, G: GameRepository, RE: RulesEngine, F: FinalizeGameWorkflow>
    DoActionUseCaseImpl<S, G, RE, F>
{
    pub fn new(
        session_registry: Arc<S>,
        game_repository: Arc<G>,
        rules: Arc<RE>,
        finalize_game_workflow: Arc<F>,
    ) -> Self {
        Self {
            session_registry,
            game_repository,
            rules,
            finalize_game_workflow,
        }
    }
}

#[async_trait::async_trait]
impl<
    S: SessionRegistry + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    RE: RulesEngine + Send + Sync + 'static,
    F: FinalizeGameWorkflow + Send + Sync + 'static,
> DoActionUseCase for DoActionUseCaseImpl<S, G, RE, F>
{
    async fn make_move(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Result<SessionView, MatchError> {
        let mv = BoardMove::parse(from, to, promotion)?;
        log::debug!(
            "Player {} is playing {} in game {}",
            player_id,
            mv,
            session_id
        );

        let handle = resolve_handle(
            self.session_registry.as_ref(),
            self.game_repository.as_ref(),
            session_id,
        )
        .await?;
        let mut session = handle.lock().await;

        let now = Instant::now();
        let mut next = session.clone();
        next.make_move(self.rules.as_ref(), player_id, &mv, now, Utc::now())?;
        self.finalize_game_workflow
            .commit(&mut session, next)
            .await?;

        Ok(SessionView::from(&session, now))
    }

    async fn resign(&self, session_id: SessionId, player_id: PlayerId) -> Result<(), MatchError> {
        let handle = resolve_handle(
            self.session_registry.as_ref(),
            self.game_repository.as_ref(),
            session_id,
        )
        .await?;
        let mut session = handle.lock().await;

        let mut next = session.clone();
        next.resign(player_id, Utc::now())?;
        self.finalize_game_workflow
            .commit(&mut session, next)
            .await?;

        log::info!("Player {} resigned game {}", player_id, session_id);
        Ok(())
    }

    async fn offer_draw(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> Result<DrawOfferOutcome, MatchError> {
        let handle = resolve_handle(
            self.session_registry.as_ref(),
            self.game_repository.as_ref(),
            session_id,
        )
        .await?;
        let mut session = handle.lock().await;

        let mut next = session.clone();
        let outcome = next.offer_draw(self.rules.as_ref(), player_id, Utc::now())?;
        self.finalize_game_workflow
            .commit(&mut session, next)
            .await?;

        Ok(outcome)
    }
}

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{
        game_history::GameRepository, player::PlayerRepository, queue::QueueServiceImpl,
        rating::EloRatingService, session_registry::SessionRegistryImpl,
    },
    ports::rules::RulesEngine,
    processes::turn_clock::TurnClockRunner,
    workflow::{
        gameplay::{
            create::{CreateGameUseCase, CreateGameUseCaseImpl},
            do_action::{DoActionUseCase, DoActionUseCaseImpl},
            finalize_game::FinalizeGameWorkflowImpl,
            get::{GetGameUseCase, GetGameUseCaseImpl},
            list::{ListGamesUseCase, ListGamesUseCaseImpl},
            timeout::{ForceExpiredMovesUseCase, ForceExpiredMovesUseCaseImpl},
        },
        matchmaking::{
            join::{JoinQueueUseCase, JoinQueueUseCaseImpl},
            leave::{LeaveQueueUseCase, LeaveQueueUseCaseImpl},
            poll::{PollQueueUseCase, PollQueueUseCaseImpl},
            status::{QueueStatusUseCase, QueueStatusUseCaseImpl},
        },
        player::get_player::{GetPlayerUseCase, GetPlayerUseCaseImpl},
    },
};

pub mod config;
pub mod domain;
pub mod ports;
pub mod processes;
pub mod workflow;

pub use config::MatchConfig;

pub struct Application {
    pub jobs: JoinHandle<()>,
    pub shutdown_token: CancellationToken,

    pub create_game_use_case: Box<dyn CreateGameUseCase + Send + Sync + 'static>,
    pub get_game_use_case: Box<dyn GetGameUseCase + Send + Sync + 'static>,
    pub do_action_use_case: Box<dyn DoActionUseCase + Send + Sync + 'static>,
    pub list_games_use_case: Box<dyn ListGamesUseCase + Send + Sync + 'static>,
    pub force_expired_moves_use_case: Box<dyn ForceExpiredMovesUseCase + Send + Sync + 'static>,

    pub join_queue_use_case: Box<dyn JoinQueueUseCase + Send + Sync + 'static>,
    pub poll_queue_use_case: Box<dyn PollQueueUseCase + Send + Sync + 'static>,
    pub leave_queue_use_case: Box<dyn LeaveQueueUseCase + Send + Sync + 'static>,
    pub queue_status_use_case: Box<dyn QueueStatusUseCase + Send + Sync + 'static>,

    pub get_player_use_case: Box<dyn GetPlayerUseCase + Send + Sync + 'static>,
}

impl Application {
    /// Stops the turn clock and waits for it to finish its current sweep.
    pub async fn shutdown(self) {
        self.shutdown_token.cancel();
        if let Err(e) = self.jobs.await {
            log::error!("Background jobs ended abnormally: {}", e);
        }
    }
}

/// Wires the services and use cases together and starts the turn clock.
/// Must be called from within a tokio runtime.
pub fn build_application<
    RE: RulesEngine + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    P: PlayerRepository + Send + Sync + 'static,
>(
    rules: Arc<RE>,
    game_repository: Arc<G>,
    player_repository: Arc<P>,
    config: MatchConfig,
) -> Application {
    let session_registry = Arc::new(SessionRegistryImpl::new());
    let queue_service = Arc::new(QueueServiceImpl::new());
    let rating_service = Arc::new(EloRatingService::new());

    let finalize_game_workflow = Arc::new(FinalizeGameWorkflowImpl::new(
        session_registry.clone(),
        game_repository.clone(),
        rating_service.clone(),
    ));

    let create_game_use_case = Arc::new(CreateGameUseCaseImpl::new(
        session_registry.clone(),
        game_repository.clone(),
        player_repository.clone(),
        rules.clone(),
        config.clone(),
    ));

    let list_games_use_case = Arc::new(ListGamesUseCaseImpl::new(
        session_registry.clone(),
        game_repository.clone(),
        config.completed_games_limit,
    ));

    let force_expired_moves_use_case = Arc::new(ForceExpiredMovesUseCaseImpl::new(
        session_registry.clone(),
        rules.clone(),
        finalize_game_workflow.clone(),
    ));

    let turn_clock = TurnClockRunner::new(
        force_expired_moves_use_case.clone(),
        config.clock_interval,
    );
    let shutdown_token = CancellationToken::new();
    let jobs = tokio::spawn({
        let shutdown = shutdown_token.clone();
        async move {
            turn_clock.run(shutdown).await;
        }
    });

    Application {
        jobs,
        shutdown_token,
        create_game_use_case: Box::new(CreateGameUseCaseImpl::new(
            session_registry.clone(),
            game_repository.clone(),
            player_repository.clone(),
            rules.clone(),
            config.clone(),
        )),
        get_game_use_case: Box::new(GetGameUseCaseImpl::new(
            session_registry.clone(),
            game_repository.clone(),
        )),
        do_action_use_case: Box::new(DoActionUseCaseImpl::new(
            session_registry.clone(),
            game_repository.clone(),
            rules.clone(),
            finalize_game_workflow.clone(),
        )),
        list_games_use_case: Box::new(ListGamesUseCaseImpl::new(
            session_registry.clone(),
            game_repository.clone(),
            config.completed_games_limit,
        )),
        force_expired_moves_use_case: Box::new(ForceExpiredMovesUseCaseImpl::new(
            session_registry.clone(),
            rules.clone(),
            finalize_game_workflow.clone(),
        )),
        join_queue_use_case: Box::new(JoinQueueUseCaseImpl::new(
            queue_service.clone(),
            create_game_use_case.clone(),
        )),
        poll_queue_use_case: Box::new(PollQueueUseCaseImpl::new(
            queue_service.clone(),
            create_game_use_case.clone(),
            list_games_use_case.clone(),
        )),
        leave_queue_use_case: Box::new(LeaveQueueUseCaseImpl::new(queue_service.clone())),
        queue_status_use_case: Box::new(QueueStatusUseCaseImpl::new(queue_service.clone())),
        get_player_use_case: Box::new(GetPlayerUseCaseImpl::new(player_repository.clone())),
    }
}

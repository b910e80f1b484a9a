use std::sync::Arc;

use chess_match_app::build_application;
use chess_persistence_memory::MemoryStore;
use chess_rules_shakmaty::ShakmatyRulesEngine;
use log::info;

use crate::config::{ConfigError, ServerConfig};

mod config;
mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    // a missing .env file is fine, the environment may already be set
    let dotenv = dotenvy::dotenv();

    let server_config = ServerConfig::from_env()?;
    logs::init_logger(&server_config)?;
    if let Err(e) = dotenv {
        if !e.not_found() {
            log::warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    let match_config = server_config.match_config();
    info!(
        "Starting match server: turn deadline {:?}, clock interval {:?}",
        match_config.turn_deadline, match_config.clock_interval
    );

    let store = Arc::new(MemoryStore::new());
    let rules = Arc::new(ShakmatyRulesEngine::new());
    let app = build_application(rules, store.clone(), store, match_config);

    shutdown_signal().await;
    app.shutdown().await;
    info!("Match server stopped");
    Ok(())
}

use std::sync::Arc;

use chess_match_app::{Application, MatchConfig, build_application};
use chess_persistence_memory::MemoryStore;
use chess_rules_shakmaty::ShakmatyRulesEngine;

/// The full application on the shakmaty rules and a fresh in-memory store.
/// Must be called inside a tokio runtime, since it starts the turn clock.
pub fn application(config: MatchConfig) -> Application {
    let store = Arc::new(MemoryStore::new());
    build_application(
        Arc::new(ShakmatyRulesEngine::new()),
        store.clone(),
        store,
        config,
    )
}

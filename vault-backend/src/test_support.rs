//! Shared fixtures for controller tests

use std::path::Path;
use std::sync::Arc;

use crate::gateway::EventBroadcaster;
use crate::vault::{CoalescerConfig, VaultSession};
use crate::AppState;

/// State with no vault bound
pub fn test_state() -> AppState {
    let broadcaster = Arc::new(EventBroadcaster::new(16));
    AppState {
        session: Arc::new(VaultSession::new(
            Arc::clone(&broadcaster),
            CoalescerConfig::default(),
        )),
        broadcaster,
        started_at: std::time::Instant::now(),
    }
}

/// State bound to `dir`
pub async fn bound_state(dir: &Path) -> AppState {
    let state = test_state();
    state.session.bind(dir).await.unwrap();
    state
}

//! Shared types for the API layer.

use std::sync::Arc;

use crate::core_state::CoreState;

/// Shared context for all routes. Just the core state today; router
/// construction goes through it so API-level caches have a home when
/// they show up.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

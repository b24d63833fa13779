use std::sync::Arc;

use mrental_auth::token::TokenManager;
use mrental_dal::Pool;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(tokens: TokenManager, app_config: AppConfig, pool: Pool) -> Self {
        AppState {
            state: Arc::new(AppStateInner {
                tokens,
                app_config,
                pool,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.state.tokens
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }
}

struct AppStateInner {
    pool: Pool,
    tokens: TokenManager,
    app_config: AppConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Page size used when client asks for a page without giving its size
    pub default_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
        }
    }
}

/// Validation context (none) for `axum_valid::Garde` extractors
impl axum::extract::FromRef<AppState> for () {
    fn from_ref(_: &AppState) -> Self {}
}

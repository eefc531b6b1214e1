use std::sync::Arc;

use crate::config::Config;
use crate::identity::IdentityProvider;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Gemini in production; tests swap in stubs.
    pub generator: Arc<dyn TextGenerator>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Config,
}

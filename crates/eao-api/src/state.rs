use eao_core::{ConfigManager, StandardLibrary};
use eao_session::{Session, SessionSettings};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// Builds the session from configuration and resets it once, so a fresh
    /// server already exposes the standard library.
    pub fn new(config: Arc<ConfigManager>) -> anyhow::Result<Self> {
        let library = StandardLibrary::from_config(&config.config().library)?;
        let seed = library.seed()?;
        let session = Session::with_defaults(seed, SessionSettings::from(config.config()))?;
        session.reset();
        info!(
            "Session ready: {} standard nodes, {} standard assets",
            library.nodes.len(),
            library.assets.len()
        );

        Ok(Self {
            session: Arc::new(session),
            config,
        })
    }
}

use std::sync::Arc;

use nw_core::{Config, Pipeline, Result};
use nw_telegram::TelegramPublisher;

pub struct AppState {
    pub pipeline: Pipeline,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl AppState {
    /// Wires the configured provider and channel into a pipeline.
    pub fn from_config(config: &Config) -> Result<Self> {
        let retriever = nw_news::create_retriever(&config.news)?;
        let publisher = Arc::new(TelegramPublisher::new(&config.telegram)?);
        Ok(Self {
            pipeline: Pipeline::new(retriever, publisher),
            allowed_origins: config.server.allowed_origins.clone(),
        })
    }
}

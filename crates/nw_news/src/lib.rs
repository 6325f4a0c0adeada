pub mod providers;
pub mod retriever;

use std::sync::Arc;

use nw_core::{NewsConfig, Result};

pub use providers::{create_provider, NewsProvider};
pub use retriever::Retriever;

/// Builds the configured provider behind a [`Retriever`].
pub fn create_retriever(config: &NewsConfig) -> Result<Arc<Retriever>> {
    let provider = create_provider(config)?;
    Ok(Arc::new(Retriever::new(provider, config.timeout)))
}

pub mod prelude {
    pub use super::providers::NewsProvider;
    pub use super::retriever::Retriever;
    pub use nw_core::{Article, Error, RawArticle, Result};
}

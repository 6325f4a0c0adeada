use std::sync::Arc;

use tracing::{info, warn};

use crate::format::format_article;
use crate::publish::Publisher;
use crate::search::ArticleSearch;
use crate::types::Article;
use crate::{Error, Result};

/// User-facing reason for every failed search.
pub const RETRIEVAL_FAILED: &str = "retrieval failed";
/// User-facing reason when delivery failed without a provider explanation.
pub const PUBLISH_FAILED: &str = "publish failed";

/// Stateless coordinator between the boundary layer and the retrieval/publishing core.
///
/// Every call is independent; the only shared data is the read-only components
/// behind the `Arc`s, so a `Pipeline` can be cloned into as many tasks as needed.
#[derive(Clone)]
pub struct Pipeline {
    search: Arc<dyn ArticleSearch>,
    publisher: Arc<dyn Publisher>,
}

impl Pipeline {
    pub fn new(search: Arc<dyn ArticleSearch>, publisher: Arc<dyn Publisher>) -> Self {
        Self { search, publisher }
    }

    pub async fn search(&self, topic: &str, limit: Option<usize>) -> Result<Vec<Article>> {
        match self.search.search(topic, limit).await {
            Ok(articles) => {
                info!("🔎 Found {} articles for '{}'", articles.len(), topic.trim());
                Ok(articles)
            }
            Err(Error::InvalidInput(reason)) => Err(Error::InvalidInput(reason)),
            Err(e) => {
                warn!("❌ Search for '{}' failed: {}", topic.trim(), e);
                Err(Error::Retrieval(RETRIEVAL_FAILED.to_string()))
            }
        }
    }

    /// Formats `article` and posts it. Posting the same article twice posts twice.
    pub async fn publish(&self, article: &Article) -> Result<()> {
        let message = format_article(article);
        info!("📨 Publishing article {} ({})", article.id, article.link);
        self.publish_message(&message).await
    }

    /// Posts an already rendered message.
    pub async fn publish_message(&self, message: &str) -> Result<()> {
        match self.publisher.publish(message).await {
            Ok(()) => {
                info!("✅ Message published");
                Ok(())
            }
            Err(Error::InvalidInput(reason)) => Err(Error::InvalidInput(reason)),
            Err(Error::Publish(reason)) => {
                warn!("❌ Publish failed: {}", reason);
                Err(Error::Publish(reason))
            }
            Err(e) => {
                warn!("❌ Publish failed: {}", e);
                Err(Error::Publish(PUBLISH_FAILED.to_string()))
            }
        }
    }
}

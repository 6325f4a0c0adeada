use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

pub const DEFAULT_LIMIT: usize = 8;
pub const MAX_LIMIT: usize = 50;

#[async_trait]
pub trait ArticleSearch: Send + Sync {
    /// Returns at most `limit` (default [`DEFAULT_LIMIT`]) deduplicated articles for
    /// `topic`, newest first.
    async fn search(&self, topic: &str, limit: Option<usize>) -> Result<Vec<Article>>;
}

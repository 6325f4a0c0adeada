use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nw_core::search::{DEFAULT_LIMIT, MAX_LIMIT};
use nw_core::{Article, ArticleSearch, Error, RawArticle, Result};
use tracing::{debug, info, warn};

use crate::providers::{NewsProvider, MAX_PAGE_SIZE};

/// Searches one provider and turns its raw items into an ordered, deduplicated result set.
pub struct Retriever {
    provider: Arc<dyn NewsProvider>,
    timeout: Duration,
}

impl Retriever {
    pub fn new(provider: Arc<dyn NewsProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    async fn fetch_once(&self, topic: &str, page_size: usize) -> Result<Vec<RawArticle>> {
        tokio::time::timeout(self.timeout, self.provider.fetch(topic, page_size))
            .await
            .map_err(|_| {
                Error::Retrieval(format!(
                    "{} did not answer within {:?}",
                    self.provider.name(),
                    self.timeout
                ))
            })?
    }

    /// One immediate re-attempt, then the failure is the caller's.
    async fn fetch(&self, topic: &str, page_size: usize) -> Result<Vec<RawArticle>> {
        match self.fetch_once(topic, page_size).await {
            Err(Error::Retrieval(reason)) => {
                warn!("⚠️ {} failed ({}), retrying once", self.provider.name(), reason);
                self.fetch_once(topic, page_size).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl ArticleSearch for Retriever {
    async fn search(&self, topic: &str, limit: Option<usize>) -> Result<Vec<Article>> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(Error::InvalidInput("topic is empty".to_string()));
        }
        let limit = resolve_limit(limit)?;
        let page_size = page_size_for(limit);

        info!("📰 Searching {} for '{}' (limit {})", self.provider.name(), topic, limit);
        let raw = self.fetch(topic, page_size).await?;
        Ok(collect_articles(&raw, limit))
    }
}

pub fn resolve_limit(limit: Option<usize>) -> Result<usize> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(0) => Err(Error::InvalidInput("limit must be at least 1".to_string())),
        Some(n) => Ok(n.min(MAX_LIMIT)),
    }
}

/// Over-fetch so dropped and duplicate items do not starve the result.
pub fn page_size_for(limit: usize) -> usize {
    (limit * 2).min(MAX_PAGE_SIZE).max(limit)
}

/// Normalizes, deduplicates, orders and truncates a provider page.
///
/// Only the first [`MAX_PAGE_SIZE`] raw items are looked at. The first occurrence of
/// an id or of a canonical link wins.
pub fn collect_articles(raw: &[RawArticle], limit: usize) -> Vec<Article> {
    let mut seen_ids = HashSet::new();
    let mut seen_links = HashSet::new();
    let mut articles = Vec::new();

    for item in raw.iter().take(MAX_PAGE_SIZE) {
        let article = match Article::normalize(item) {
            Ok(article) => article,
            Err(e) => {
                debug!("Dropping raw item: {}", e);
                continue;
            }
        };
        let key = article.dedup_key();
        // only kept articles claim their id and link
        if seen_ids.contains(&article.id) || seen_links.contains(&key) {
            debug!("Dropping duplicate: {}", article.link);
            continue;
        }
        seen_ids.insert(article.id.clone());
        seen_links.insert(key);
        articles.push(article);
    }

    // stable: ties keep provider order
    articles.sort_by(newest_first);
    articles.truncate(limit);
    articles
}

fn newest_first(a: &Article, b: &Article) -> Ordering {
    match (a.published, b.published) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

use std::fmt;

use async_trait::async_trait;
use nw_core::{Error, NewsConfig, RawArticle, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::utils::{build_client, get_json};
use super::{NewsProvider, MAX_PAGE_SIZE};

const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";
/// Placeholder NewsAPI serves for articles pulled after indexing.
const REMOVED_TITLE: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<NewsApiArticle> for RawArticle {
    fn from(item: NewsApiArticle) -> Self {
        RawArticle {
            id: None,
            title: item.title,
            link: item.url,
            published: item.published_at,
            source: item.source.and_then(|s| s.name),
            snippet: item.description,
        }
    }
}

/// Client for the NewsAPI `everything` search endpoint.
pub struct NewsApiProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
    language: Option<String>,
}

impl fmt::Debug for NewsApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiProvider")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("language", &self.language)
            .finish()
    }
}

impl NewsApiProvider {
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let endpoint = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => Url::parse(DEFAULT_ENDPOINT)
                .map_err(|e| Error::Configuration(format!("Invalid NewsAPI endpoint: {}", e)))?,
        };
        Ok(Self {
            client: build_client(config.timeout)?,
            endpoint,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch(&self, topic: &str, page_size: usize) -> Result<Vec<RawArticle>> {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("q", topic)
                .append_pair("pageSize", &page_size.min(MAX_PAGE_SIZE).to_string())
                .append_pair("sortBy", "publishedAt");
            if let Some(language) = &self.language {
                query.append_pair("language", language);
            }
        }

        let request = self.client.get(url).header("X-Api-Key", &self.api_key);
        let payload: NewsApiResponse = get_json(self.name(), request).await?;

        if payload.status != "ok" {
            return Err(Error::Retrieval(format!(
                "NewsAPI reported {}: {}",
                payload.code.as_deref().unwrap_or("an error"),
                payload.message.as_deref().unwrap_or("no message")
            )));
        }

        debug!("NewsAPI returned {} items for '{}'", payload.articles.len(), topic);
        Ok(payload
            .articles
            .into_iter()
            .filter(|item| item.title.as_deref() != Some(REMOVED_TITLE))
            .map(RawArticle::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_server;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn config(endpoint: Url) -> NewsConfig {
        NewsConfig {
            provider: nw_core::ProviderKind::NewsApi,
            api_key: "secret-key".to_string(),
            endpoint: Some(endpoint),
            language: Some("fr".to_string()),
            timeout: Duration::from_secs(5),
        }
    }

    async fn serve(status: StatusCode, body: Value) -> (Url, Arc<Mutex<Vec<(HashMap<String, String>, Option<String>)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let router = Router::new().route(
            "/v2/everything",
            get(move |Query(query): Query<HashMap<String, String>>, headers: HeaderMap| {
                let recorder = recorder.clone();
                let body = body.clone();
                async move {
                    let key = headers
                        .get("x-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    recorder.lock().unwrap().push((query, key));
                    (status, Json(body))
                }
            }),
        );
        let base = test_server::spawn(router).await;
        (base.join("v2/everything").unwrap(), seen)
    }

    #[tokio::test]
    async fn test_fetch_maps_items_and_sends_query() {
        let (endpoint, seen) = serve(
            StatusCode::OK,
            json!({
                "status": "ok",
                "totalResults": 2,
                "articles": [
                    {
                        "source": {"id": null, "name": "France 24"},
                        "title": "Vote count begins",
                        "url": "https://www.france24.com/vote",
                        "publishedAt": "2024-06-09T20:00:00Z",
                        "description": "Polls closed at 8pm."
                    },
                    {
                        "source": {"id": null, "name": "[Removed]"},
                        "title": "[Removed]",
                        "url": "https://removed.com",
                        "publishedAt": "1970-01-01T00:00:00Z",
                        "description": "[Removed]"
                    }
                ]
            }),
        )
        .await;

        let provider = NewsApiProvider::new(&config(endpoint)).unwrap();
        let items = provider.fetch("élections européennes", 16).await.unwrap();

        assert_eq!(
            items,
            vec![RawArticle {
                id: None,
                title: Some("Vote count begins".to_string()),
                link: Some("https://www.france24.com/vote".to_string()),
                published: Some("2024-06-09T20:00:00Z".to_string()),
                source: Some("France 24".to_string()),
                snippet: Some("Polls closed at 8pm.".to_string()),
            }]
        );

        let seen = seen.lock().unwrap();
        let (query, key) = &seen[0];
        assert_eq!(query.get("q").map(String::as_str), Some("élections européennes"));
        assert_eq!(query.get("pageSize").map(String::as_str), Some("16"));
        assert_eq!(query.get("sortBy").map(String::as_str), Some("publishedAt"));
        assert_eq!(query.get("language").map(String::as_str), Some("fr"));
        assert_eq!(key.as_deref(), Some("secret-key"));
    }

    #[tokio::test]
    async fn test_provider_error_status_is_retrieval_error() {
        let (endpoint, _) = serve(
            StatusCode::UNAUTHORIZED,
            json!({"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}),
        )
        .await;
        let provider = NewsApiProvider::new(&config(endpoint)).unwrap();
        let err = provider.fetch("elections", 8).await.unwrap_err();
        assert!(matches!(err, Error::Retrieval(ref m) if m.contains("401")));
    }

    #[tokio::test]
    async fn test_error_payload_with_ok_status() {
        let (endpoint, _) = serve(
            StatusCode::OK,
            json!({"status": "error", "code": "rateLimited", "message": "Too many requests"}),
        )
        .await;
        let provider = NewsApiProvider::new(&config(endpoint)).unwrap();
        let err = provider.fetch("elections", 8).await.unwrap_err();
        assert_eq!(
            err,
            Error::Retrieval("NewsAPI reported rateLimited: Too many requests".to_string())
        );
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let (endpoint, _) = serve(StatusCode::OK, json!({"articles": "nope"})).await;
        let provider = NewsApiProvider::new(&config(endpoint)).unwrap();
        assert!(matches!(
            provider.fetch("elections", 8).await,
            Err(Error::Retrieval(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        let endpoint = Url::parse("http://127.0.0.1:9/v2/everything").unwrap();
        let provider = NewsApiProvider::new(&config(endpoint)).unwrap();
        assert!(matches!(
            provider.fetch("elections", 8).await,
            Err(Error::Retrieval(_))
        ));
    }
}

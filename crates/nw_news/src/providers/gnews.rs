use std::fmt;

use async_trait::async_trait;
use nw_core::{Error, NewsConfig, RawArticle, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::utils::{build_client, get_json};
use super::{NewsProvider, MAX_PAGE_SIZE};

const DEFAULT_ENDPOINT: &str = "https://gnews.io/api/v4/search";

#[derive(Debug, Deserialize)]
struct GNewsResponse {
    #[serde(default)]
    articles: Vec<GNewsArticle>,
    #[serde(default)]
    errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GNewsArticle {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source: Option<GNewsSource>,
}

#[derive(Debug, Deserialize)]
struct GNewsSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<GNewsArticle> for RawArticle {
    fn from(item: GNewsArticle) -> Self {
        RawArticle {
            id: item.id,
            title: item.title,
            link: item.url,
            published: item.published_at,
            source: item.source.and_then(|s| s.name),
            snippet: item.description,
        }
    }
}

/// Client for the GNews v4 search endpoint.
pub struct GNewsProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
    language: Option<String>,
}

impl fmt::Debug for GNewsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GNewsProvider")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("language", &self.language)
            .finish()
    }
}

impl GNewsProvider {
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let endpoint = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => Url::parse(DEFAULT_ENDPOINT)
                .map_err(|e| Error::Configuration(format!("Invalid GNews endpoint: {}", e)))?,
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
impl NewsProvider for GNewsProvider {
    fn name(&self) -> &str {
        "GNews"
    }

    async fn fetch(&self, topic: &str, page_size: usize) -> Result<Vec<RawArticle>> {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("q", topic)
                .append_pair("max", &page_size.min(MAX_PAGE_SIZE).to_string())
                .append_pair("sortby", "publishedAt")
                .append_pair("apikey", &self.api_key);
            if let Some(language) = &self.language {
                query.append_pair("lang", language);
            }
        }

        let payload: GNewsResponse = get_json(self.name(), self.client.get(url)).await?;

        if let Some(errors) = payload.errors {
            return Err(Error::Retrieval(format!("GNews reported errors: {}", errors)));
        }

        debug!("GNews returned {} items for '{}'", payload.articles.len(), topic);
        Ok(payload.articles.into_iter().map(RawArticle::from).collect())
    }
}

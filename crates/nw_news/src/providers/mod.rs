use std::sync::Arc;

use async_trait::async_trait;
use nw_core::{Error, NewsConfig, ProviderKind, RawArticle, Result};

pub mod gnews;
pub mod newsapi;

pub use gnews::GNewsProvider;
pub use newsapi::NewsApiProvider;

/// Upper bound accepted by both supported providers for one page.
pub const MAX_PAGE_SIZE: usize = 100;

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Returns the name of the provider
    fn name(&self) -> &str;

    /// Fetches at most `page_size` raw items matching `topic`, in provider order
    async fn fetch(&self, topic: &str, page_size: usize) -> Result<Vec<RawArticle>>;
}

pub fn create_provider(config: &NewsConfig) -> Result<Arc<dyn NewsProvider>> {
    let provider: Arc<dyn NewsProvider> = match config.provider {
        ProviderKind::NewsApi => Arc::new(NewsApiProvider::new(config)?),
        ProviderKind::GNews => Arc::new(GNewsProvider::new(config)?),
    };
    Ok(provider)
}

/// Common utilities for providers
pub(crate) mod utils {
    use super::*;
    use reqwest::{Client, RequestBuilder};
    use serde::de::DeserializeOwned;
    use std::time::Duration;

    pub fn build_client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newswire/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))
    }

    /// Sends the request and decodes a 2xx JSON body.
    pub async fn get_json<T: DeserializeOwned>(provider: &str, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            // some providers take the key as a query parameter
            let e = e.without_url();
            if e.is_timeout() {
                Error::Retrieval(format!("{} timed out", provider))
            } else {
                Error::Retrieval(format!("{} unreachable: {}", provider, e))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                Error::Retrieval(format!("{} body could not be read: {}", provider, e.without_url()))
            })?;

        if !status.is_success() {
            return Err(Error::Retrieval(format!(
                "{} returned HTTP {}: {}",
                provider,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Retrieval(format!("{} returned a malformed payload: {}", provider, e)))
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use axum::Router;
    use url::Url;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub async fn spawn(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }
}

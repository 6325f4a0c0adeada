use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use nw_core::{Article, Error, RawArticle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub topic: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub articles: Vec<Article>,
}

/// Either an article to format, or a message that is already rendered.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub article: Option<RawArticle>,
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn search_news(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload?;
    let articles = state.pipeline.search(&request.topic, request.limit).await?;
    Ok(Json(SearchResponse { articles }))
}

pub async fn post_telegram(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    match (request.article, request.message) {
        (Some(raw), None) => {
            let article = Article::normalize(&raw)?;
            state.pipeline.publish(&article).await?;
        }
        (None, Some(message)) => state.pipeline.publish_message(&message).await?,
        (Some(_), Some(_)) => {
            return Err(Error::InvalidInput(
                "send either 'article' or 'message', not both".to_string(),
            )
            .into())
        }
        (None, None) => {
            return Err(Error::InvalidInput("'article' or 'message' is required".to_string()).into())
        }
    }
    Ok(Json(json!({ "ok": true })))
}

pub async fn health() -> &'static str {
    "ok"
}

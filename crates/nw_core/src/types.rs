use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::{Error, Result};

/// Links longer than this are rejected so a formatted message always has room for them.
pub const MAX_LINK_LEN: usize = 2048;

/// A news item that passed normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub link: Url,
    /// `None` when the source omitted or mangled the timestamp.
    pub published: Option<DateTime<Utc>>,
    /// `None` when the outlet is unknown.
    pub source: Option<String>,
    pub snippet: String,
}

/// An item as handed over by a provider or by the boundary layer, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl Article {
    /// Validates a raw item into an `Article`.
    ///
    /// Items without an absolute http(s) link are rejected. Missing timestamps and
    /// sources become `None`, a missing title falls back to the link, and a missing
    /// snippet becomes the empty string.
    pub fn normalize(raw: &RawArticle) -> Result<Article> {
        let link_text = non_blank(raw.link.as_deref())
            .ok_or_else(|| Error::InvalidInput("article link is missing".to_string()))?;

        let link = Url::parse(&link_text)
            .map_err(|e| Error::InvalidInput(format!("malformed article link {}: {}", link_text, e)))?;

        if !matches!(link.scheme(), "http" | "https") {
            return Err(Error::InvalidInput(format!(
                "unsupported link scheme: {}",
                link.scheme()
            )));
        }

        if link.as_str().len() > MAX_LINK_LEN {
            return Err(Error::InvalidInput(format!(
                "article link exceeds {} characters",
                MAX_LINK_LEN
            )));
        }

        let id = non_blank(raw.id.as_deref()).unwrap_or_else(|| derive_id(&link));
        let title = non_blank(raw.title.as_deref()).unwrap_or_else(|| link.to_string());
        let published = raw.published.as_deref().and_then(parse_timestamp);
        let source = non_blank(raw.source.as_deref());
        let snippet = non_blank(raw.snippet.as_deref()).unwrap_or_default();

        Ok(Article {
            id,
            title,
            link,
            published,
            source,
            snippet,
        })
    }

    /// Key used to collapse the same item served under different ids.
    pub fn dedup_key(&self) -> String {
        canonical_link(&self.link)
    }
}

/// Case-insensitive, trailing-slash-insensitive rendering of a link.
pub fn canonical_link(link: &Url) -> String {
    link.as_str().trim_end_matches('/').to_lowercase()
}

/// Stable id for items the provider did not identify itself.
pub fn derive_id(link: &Url) -> String {
    let digest = Sha256::digest(canonical_link(link).as_bytes());
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    let collapsed = value?.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

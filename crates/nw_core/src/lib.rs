pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod search;
pub mod types;

pub use config::{Config, NewsConfig, ProviderKind, ServerConfig, TelegramConfig};
pub use error::{Error, Result};
pub use format::format_article;
pub use pipeline::Pipeline;
pub use publish::Publisher;
pub use search::ArticleSearch;
pub use types::{Article, RawArticle};

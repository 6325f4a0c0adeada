use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Posts `message` once to the configured channel. Never retried.
    async fn publish(&self, message: &str) -> Result<()>;
}

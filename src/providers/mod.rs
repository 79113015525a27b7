pub mod local;

use anyhow::Result;
use async_trait::async_trait;

/// A decoded unread message as handed over by the retrieval side. All fields
/// are plain text; nothing here is persisted.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Email {
    #[serde(default)]
    pub subject: String,
    pub from: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub body: String,
}

#[async_trait]
pub trait MailSource: Send + Sync {
    /// Returns up to `max` unread messages, oldest first as stored.
    async fn fetch_unread(&self, max: usize) -> Result<Vec<Email>>;
}

use super::{Email, MailSource};
use crate::cleaning;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

const SNIPPET_CHARS: usize = 100;

/// Reads unread messages from a local JSON export (a plain array of message
/// records). Stands in for a live mail account; account auth and retrieval
/// happen outside this tool.
pub struct LocalMailbox {
    path: PathBuf,
}

impl LocalMailbox {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl MailSource for LocalMailbox {
    async fn fetch_unread(&self, max: usize) -> Result<Vec<Email>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("mailbox export not found at {}", self.path.display()))?;

        let mut emails: Vec<Email> = serde_json::from_str(&content)
            .with_context(|| format!("malformed mailbox export at {}", self.path.display()))?;
        emails.truncate(max);

        for email in &mut emails {
            if email.snippet.is_empty() {
                email.snippet = cleaning::preview(&email.body, SNIPPET_CHARS);
            }
        }

        debug!(count = emails.len(), "loaded unread messages");
        Ok(emails)
    }
}

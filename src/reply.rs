use crate::profile::Profile;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("model did not respond within 60s")]
    Timeout,
    #[error("model invocation failed: {stderr}")]
    Failed { stderr: String },
    #[error("model returned empty output")]
    Empty,
    #[error("failed to run ollama: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the instruction prompt for a reply draft. Pure string formatting;
/// deterministic for identical inputs.
pub fn compose_prompt(email_body: &str, sender: &str, profile: &Profile) -> String {
    format!(
        r#"You are {name}, a {role}. Your skills include: {skills}.
Write a reply to the following email in a {tone} tone. Draft only the
final text of the reply, with no preamble.

From: {sender}
Message: {email_body}

Reply:
"#,
        name = profile.name,
        role = profile.role,
        skills = profile.skills.join(", "),
        tone = profile.tone(),
        sender = sender,
        email_body = email_body,
    )
}

/// Drafts a reply by piping the composed prompt through `ollama run <model>`.
/// One attempt, hard 60s cap; no fallback model. The cluster document is
/// never touched by this path, so cancelling a hung generation is always safe.
pub async fn generate_reply(
    email_body: &str,
    sender: &str,
    profile: &Profile,
    model: &str,
) -> Result<String, ReplyError> {
    let prompt = compose_prompt(email_body, sender, profile);
    debug!(model, prompt_len = prompt.len(), "invoking ollama");

    let mut child = Command::new("ollama")
        .args(["run", model])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(prompt.as_bytes()).await?;
    }

    let output = timeout(GENERATION_TIMEOUT, child.wait_with_output())
        .await
        .map_err(|_| ReplyError::Timeout)??;

    if !output.status.success() {
        return Err(ReplyError::Failed {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let reply = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if reply.is_empty() {
        return Err(ReplyError::Empty);
    }
    Ok(reply)
}

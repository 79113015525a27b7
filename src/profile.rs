use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Personal profile used to condition reply drafts. Loaded once at startup
/// and passed by reference; never written by this tool.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub preferred_tone: Option<String>,
}

impl Profile {
    /// A missing profile is fatal: reply drafts impersonate the user, so
    /// there is no sensible default to substitute.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| {
            format!(
                "profile not found at {} (create it with name/role/skills/preferred_tone)",
                path.display()
            )
        })?;
        let profile: Profile = serde_yaml::from_str(&content)
            .with_context(|| format!("malformed profile at {}", path.display()))?;
        Ok(profile)
    }

    pub fn tone(&self) -> &str {
        self.preferred_tone.as_deref().unwrap_or("professional")
    }
}

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cluster file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("cluster '{0}' already exists")]
    Duplicate(String),
    #[error("cluster name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed cluster file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A named keyword bucket used to classify incoming email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    #[serde(deserialize_with = "string_entries")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub auto_reply: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClusterFile {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

/// The backing document is hand-editable, so `auto_reply` shows up both as a
/// native bool and as the strings "true"/"false". Normalized here; the
/// ambiguous form never leaves the store.
fn bool_or_string<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(de)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid auto_reply value: {other:?}"
            ))),
        },
    }
}

/// Non-string keyword entries are dropped rather than failing the whole load.
fn string_entries<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(de)?;
    Ok(raw
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// Store over the cluster document. Every operation reads the file fresh;
/// there is no in-memory cache surviving between calls.
pub struct ClusterStore {
    path: PathBuf,
}

impl ClusterStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn list(&self) -> Result<Vec<Cluster>, ClusterError> {
        Ok(self.read()?.clusters)
    }

    pub fn add(&self, name: &str, keywords: &[String], auto_reply: bool) -> Result<(), ClusterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClusterError::EmptyName);
        }

        let mut doc = self.read()?;
        if doc.clusters.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(ClusterError::Duplicate(name.to_string()));
        }

        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        doc.clusters.push(Cluster {
            name: name.to_string(),
            keywords,
            auto_reply,
        });
        self.write(&doc)
    }

    /// Removes clusters whose name matches exactly. Deliberately stricter
    /// than the case-insensitive duplicate check in `add`.
    pub fn delete(&self, name: &str) -> Result<(), ClusterError> {
        let mut doc = self.read()?;
        doc.clusters.retain(|c| c.name != name);
        self.write(&doc)
    }

    fn read(&self) -> Result<ClusterFile, ClusterError> {
        if !self.path.exists() {
            return Err(ClusterError::NotFound(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write to a sibling temp file and rename over the document, so a failed
    /// write leaves the previous version intact.
    fn write(&self, doc: &ClusterFile) -> Result<(), ClusterError> {
        let content = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seed(dir: &std::path::Path, json: &str) -> ClusterStore {
        let path = dir.join("clusters.json");
        fs::write(&path, json).unwrap();
        ClusterStore::new(path)
    }

    const BASIC: &str = r#"{"clusters": [{"name": "Sales", "keywords": ["invoice"], "auto_reply": false}]}"#;

    #[test]
    fn add_appends_at_end_with_trimmed_lowercased_keywords() {
        let dir = tempdir().unwrap();
        let store = seed(dir.path(), BASIC);

        store
            .add("  Recruiter ", &[" Job ".into(), "OPPORTUNITY".into()], true)
            .unwrap();

        let clusters = store.list().unwrap();
        assert_eq!(clusters.len(), 2);
        let added = &clusters[1];
        assert_eq!(added.name, "Recruiter");
        assert_eq!(added.keywords, vec!["job", "opportunity"]);
        assert!(added.auto_reply);
    }

    #[test]
    fn add_rejects_duplicate_name_case_insensitively() {
        let dir = tempdir().unwrap();
        let store = seed(dir.path(), BASIC);
        let before = fs::read(dir.path().join("clusters.json")).unwrap();

        let err = store.add("SALES", &["deal".into()], false).unwrap_err();
        assert!(matches!(err, ClusterError::Duplicate(ref n) if n == "SALES"));

        // Document is untouched byte-for-byte.
        let after = fs::read(dir.path().join("clusters.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn add_rejects_empty_name() {
        let dir = tempdir().unwrap();
        let store = seed(dir.path(), BASIC);
        assert!(matches!(
            store.add("   ", &["x".into()], false),
            Err(ClusterError::EmptyName)
        ));
    }

    #[test]
    fn add_on_missing_document_is_not_found() {
        let dir = tempdir().unwrap();
        let store = ClusterStore::new(dir.path().join("clusters.json"));
        assert!(matches!(
            store.add("Sales", &["invoice".into()], false),
            Err(ClusterError::NotFound(_))
        ));
    }

    #[test]
    fn list_on_missing_document_propagates() {
        let dir = tempdir().unwrap();
        let store = ClusterStore::new(dir.path().join("clusters.json"));
        assert!(store.list().is_err());
    }

    #[test]
    fn delete_is_exact_match_only() {
        let dir = tempdir().unwrap();
        let store = seed(
            dir.path(),
            r#"{"clusters": [
                {"name": "Sales", "keywords": ["invoice"], "auto_reply": false},
                {"name": "sales", "keywords": ["deal"], "auto_reply": false}
            ]}"#,
        );

        store.delete("Sales").unwrap();

        let clusters = store.list().unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].name, "sales");
    }

    #[test]
    fn auto_reply_accepts_string_booleans() {
        let dir = tempdir().unwrap();
        let store = seed(
            dir.path(),
            r#"{"clusters": [
                {"name": "A", "keywords": [], "auto_reply": "true"},
                {"name": "B", "keywords": [], "auto_reply": "false"},
                {"name": "C", "keywords": [], "auto_reply": true}
            ]}"#,
        );

        let clusters = store.list().unwrap();
        assert!(clusters[0].auto_reply);
        assert!(!clusters[1].auto_reply);
        assert!(clusters[2].auto_reply);
    }

    #[test]
    fn non_string_keywords_are_skipped() {
        let dir = tempdir().unwrap();
        let store = seed(
            dir.path(),
            r#"{"clusters": [{"name": "A", "keywords": ["job", 42, null, "offer"], "auto_reply": false}]}"#,
        );

        let clusters = store.list().unwrap();
        assert_eq!(clusters[0].keywords, vec!["job", "offer"]);
    }

    #[test]
    fn missing_keywords_field_is_an_error() {
        let dir = tempdir().unwrap();
        let store = seed(dir.path(), r#"{"clusters": [{"name": "A", "auto_reply": false}]}"#);
        assert!(matches!(store.list(), Err(ClusterError::Parse(_))));
    }
}

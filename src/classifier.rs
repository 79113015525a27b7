use crate::clusters::Cluster;
use regex::Regex;
use tracing::debug;

/// Name reported for email that no cluster claims.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Assigns an email to the first cluster with a matching keyword, scanning
/// clusters in stored order and keywords in stored order within each cluster.
/// Returns the matched cluster so callers can read its auto-reply flag
/// without a second lookup.
pub fn classify<'a>(subject: &str, body: &str, clusters: &'a [Cluster]) -> Option<&'a Cluster> {
    let text = format!("{} {}", subject, body).to_lowercase();

    for cluster in clusters {
        for keyword in &cluster.keywords {
            if keyword_matches(&text, keyword) {
                debug!(cluster = %cluster.name, keyword = %keyword, "matched");
                return Some(cluster);
            }
        }
    }

    None
}

/// Whole-word match: "cat" must not match "category" or "concatenate".
fn keyword_matches(text: &str, keyword: &str) -> bool {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return false;
    }
    let pattern = format!(r"\b{}\b", regex::escape(&keyword));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(name: &str, keywords: &[&str]) -> Cluster {
        Cluster {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            auto_reply: false,
        }
    }

    #[test]
    fn matches_whole_words_only() {
        let clusters = vec![cluster("Pets", &["cat"])];
        assert!(classify("", "The cat sat", &clusters).is_some());
        assert!(classify("", "a new category", &clusters).is_none());
        assert!(classify("", "concatenate strings", &clusters).is_none());
    }

    #[test]
    fn match_is_case_insensitive() {
        let clusters = vec![cluster("Pets", &["CAT"])];
        assert!(classify("Cat pictures", "", &clusters).is_some());
    }

    #[test]
    fn first_cluster_wins_on_shared_keyword() {
        let clusters = vec![cluster("A", &["x"]), cluster("B", &["x"])];
        let hit = classify("", "contains x here", &clusters).unwrap();
        assert_eq!(hit.name, "A");
    }

    #[test]
    fn no_match_returns_none() {
        let clusters = vec![cluster("A", &["alpha"]), cluster("B", &["beta"])];
        assert!(classify("hello", "world", &clusters).is_none());
    }

    #[test]
    fn empty_keyword_list_never_matches() {
        let clusters = vec![cluster("Empty", &[])];
        assert!(classify("anything", "at all", &clusters).is_none());
    }

    #[test]
    fn subject_and_body_are_both_searched() {
        let clusters = vec![cluster("Billing", &["invoice"])];
        assert!(classify("Your invoice", "", &clusters).is_some());
        assert!(classify("", "the invoice is attached", &clusters).is_some());
    }

    #[test]
    fn keyword_with_regex_metacharacters_is_literal() {
        let clusters = vec![cluster("Promo", &["50% off"])];
        assert!(classify("", "get 50% off today", &clusters).is_some());
        assert!(classify("", "get 500 offers", &clusters).is_none());
    }

    #[test]
    fn recruiter_scenario() {
        let clusters = vec![Cluster {
            name: "Recruiter".to_string(),
            keywords: vec!["job".to_string(), "opportunity".to_string()],
            auto_reply: true,
        }];

        let hit = classify("Job Opportunity", "We have an opening", &clusters).unwrap();
        assert_eq!(hit.name, "Recruiter");
        assert!(hit.auto_reply);
    }
}

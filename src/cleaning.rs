use regex::Regex;
use std::sync::OnceLock;

/// Tidies a decoded email body for display: drops zero-width characters,
/// turns non-breaking spaces into plain spaces, and collapses whitespace runs.
pub fn clean_body(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    static ZERO_WIDTH: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();

    let zero_width =
        ZERO_WIDTH.get_or_init(|| Regex::new("[\u{200b}\u{200c}\u{200d}\u{2060}\u{feff}]").unwrap());
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let text = zero_width.replace_all(text, "");
    let text = text.replace('\u{a0}', " ");
    let text = whitespace.replace_all(&text, " ");
    text.trim().to_string()
}

/// Truncates a cleaned body for one-line previews.
pub fn preview(text: &str, max_chars: usize) -> String {
    let cleaned = clean_body(text);
    if cleaned.chars().count() <= max_chars {
        cleaned
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}…", truncated.trim_end())
    }
}

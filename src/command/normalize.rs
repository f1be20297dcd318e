// Markup normalization for mention bodies.
//
// Mastodon wraps text in paragraphs and mentions in anchors/spans. Only the
// bare token forms below are removed; anything with attributes is left alone.

/// Wrapper tokens removed before looking for the trigger, in removal order.
pub const STRIPPED_TOKENS: [&str; 6] = ["<p>", "</p>", "</span>", "<span>", "</a>", "<a>"];

/// Remove every occurrence of the wrapper tokens.
pub fn strip_markup(content: &str) -> String {
    let mut normalized = content.to_string();
    for token in STRIPPED_TOKENS {
        if normalized.contains(token) {
            normalized = normalized.replace(token, "");
        }
    }
    normalized
}

/// Trim a segment, then strip each server suffix it starts with, in order.
pub fn strip_server_suffixes<'a>(segment: &'a str, server_suffixes: &[String]) -> &'a str {
    let mut segment = segment.trim();
    for suffix in server_suffixes {
        if suffix.is_empty() {
            continue;
        }
        if let Some(rest) = segment.strip_prefix(suffix.as_str()) {
            segment = rest.trim();
        }
    }
    segment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup_removes_bare_tokens() {
        assert_eq!(strip_markup("<p><span>@bot</span> this</p>"), "@bot this");
        assert_eq!(strip_markup("<a>@bot</a>"), "@bot");
    }

    #[test]
    fn test_strip_markup_keeps_attributed_tags() {
        let html = r#"<a href="https://x.example/@bot" class="u-url">@bot</a>"#;
        assert_eq!(
            strip_markup(html),
            r#"<a href="https://x.example/@bot" class="u-url">@bot"#
        );
    }

    #[test]
    fn test_strip_server_suffixes_in_order() {
        let suffixes = vec!["@server".to_string(), ".social".to_string()];
        assert_eq!(strip_server_suffixes("  @server  rt ", &suffixes), "rt");
        // The second suffix is checked against what the first left behind
        assert_eq!(strip_server_suffixes("@server .social this", &suffixes), "this");
        assert_eq!(strip_server_suffixes("this", &suffixes), "this");
    }

    #[test]
    fn test_empty_suffix_is_ignored() {
        let suffixes = vec![String::new()];
        assert_eq!(strip_server_suffixes(" parent ", &suffixes), "parent");
    }
}

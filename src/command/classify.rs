// Command classification for normalized mention text.

use super::normalize::{strip_markup, strip_server_suffixes};
use super::Command;

/// Classify a raw message body.
///
/// The body is split on every occurrence of `trigger_name`; each segment
/// after an occurrence is inspected on its own, in order, and the first
/// segment that reads as a command decides the result.
pub fn classify(content: &str, trigger_name: &str, server_suffixes: &[String]) -> Option<Command> {
    if trigger_name.is_empty() {
        return None;
    }

    let normalized = strip_markup(content);
    if !normalized.contains(trigger_name) {
        return None;
    }

    normalized
        .split(trigger_name)
        .skip(1)
        .map(|segment| strip_server_suffixes(segment, server_suffixes))
        .find_map(classify_segment)
}

/// Classify the text following one trigger occurrence.
fn classify_segment(segment: &str) -> Option<Command> {
    if prefix_eq_ignore_case(segment, "this") {
        return Some(Command::Retoot);
    }
    if ["RT", "Rt", "rt", "rT"].iter().any(|p| segment.starts_with(p)) {
        return Some(Command::Retoot);
    }
    if prefix_eq_ignore_case(segment, "parent") {
        return Some(Command::ShareParent);
    }
    None
}

/// Whether the first `expected.len()` characters of `text` equal the
/// lowercase ASCII word `expected`, ignoring case. Shorter text never matches.
fn prefix_eq_ignore_case(text: &str, expected: &str) -> bool {
    let mut chars = text.chars();
    expected.chars().all(|want| {
        chars
            .next()
            .is_some_and(|got| got.to_lowercase().eq(std::iter::once(want)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffixes() -> Vec<String> {
        vec!["@server".to_string()]
    }

    #[test]
    fn test_prefix_eq_ignore_case() {
        assert!(prefix_eq_ignore_case("ThIs one", "this"));
        assert!(prefix_eq_ignore_case("this", "this"));
        assert!(!prefix_eq_ignore_case("thi", "this"));
        assert!(!prefix_eq_ignore_case("", "this"));
        assert!(!prefix_eq_ignore_case("that", "this"));
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        assert_eq!(classify("@bot é", "bot", &[]), None);
        assert_eq!(classify("@bot 🎉🎉🎉🎉🎉🎉", "bot", &[]), None);
    }

    #[test]
    fn test_retoot_keywords() {
        assert_eq!(classify("@bot this", "bot", &[]), Some(Command::Retoot));
        assert_eq!(classify("@bot THIS please", "bot", &[]), Some(Command::Retoot));
        for rt in ["RT", "Rt", "rt", "rT"] {
            assert_eq!(
                classify(&format!("@bot {rt}"), "bot", &[]),
                Some(Command::Retoot),
                "{rt} should be a retoot"
            );
        }
    }

    #[test]
    fn test_parent_keyword() {
        assert_eq!(classify("@bot Parent", "bot", &[]), Some(Command::ShareParent));
        assert_eq!(classify("@bot paren", "bot", &[]), None);
    }

    #[test]
    fn test_trigger_with_nothing_after() {
        assert_eq!(classify("hello @bot", "bot", &[]), None);
        assert_eq!(classify("", "bot", &[]), None);
    }

    #[test]
    fn test_empty_trigger_never_matches() {
        assert_eq!(classify("this", "", &[]), None);
    }

    #[test]
    fn test_later_occurrence_is_inspected() {
        // First mention carries no command; the second one does
        let content = "<p>@bot hello, @bot@server parent</p>";
        assert_eq!(classify(content, "bot", &suffixes()), Some(Command::ShareParent));
    }

    #[test]
    fn test_first_matching_occurrence_wins() {
        let content = "@bot rt and @bot parent";
        assert_eq!(classify(content, "bot", &[]), Some(Command::Retoot));
    }

    #[test]
    fn test_suffix_only_stripped_when_configured() {
        assert_eq!(classify("@bot@server this", "bot", &[]), None);
        assert_eq!(
            classify("@bot@server this", "bot", &suffixes()),
            Some(Command::Retoot)
        );
    }
}

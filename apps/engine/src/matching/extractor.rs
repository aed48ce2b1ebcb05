use std::collections::BTreeSet;

use crate::matching::normalizer::normalize;
use crate::matching::vocabulary::SKILL_VOCABULARY;

/// Extracts every vocabulary skill whose literal phrase occurs in the text.
///
/// A skill is present iff its contiguous phrase occurs as a substring of the
/// normalized text; multi-word skills are never matched as scattered tokens.
/// Deterministic over (text, vocabulary) and never fails; empty text yields
/// the empty set.
pub fn extract(text: &str) -> BTreeSet<String> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return BTreeSet::new();
    }

    SKILL_VOCABULARY
        .iter()
        .filter(|skill| normalized.contains(*skill))
        .map(|skill| skill.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_kubernetes_and_docker() {
        let skills = extract("Experienced with Kubernetes and Docker");
        let expected: BTreeSet<String> =
            ["kubernetes", "docker"].iter().map(|s| s.to_string()).collect();
        assert_eq!(skills, expected);
    }

    #[test]
    fn test_result_is_subset_of_vocabulary() {
        let skills = extract(
            "Ten years of Python, React and AWS, plus strong communication and mentoring.",
        );
        assert!(!skills.is_empty());
        for skill in &skills {
            assert!(SKILL_VOCABULARY.contains(&skill.as_str()));
        }
    }

    #[test]
    fn test_idempotent_over_normalization() {
        let text = "Senior RUST engineer,\nMachine   Learning background";
        assert_eq!(extract(text), extract(&normalize(text)));
    }

    #[test]
    fn test_empty_text_yields_empty_set() {
        assert!(extract("").is_empty());
        assert!(extract("   ").is_empty());
    }

    #[test]
    fn test_multi_word_skill_requires_contiguous_phrase() {
        assert!(extract("machine learning pipelines").contains("machine learning"));
        // Scattered tokens do not count as the phrase.
        assert!(!extract("a machine for learning").contains("machine learning"));
    }

    #[test]
    fn test_matches_across_line_breaks() {
        assert!(extract("machine\nlearning at scale").contains("machine learning"));
    }
}

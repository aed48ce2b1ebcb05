/// Normalizes free text for substring matching: lower-cases and collapses
/// all whitespace runs (including newlines) to single spaces, so multi-word
/// skills match across line breaks.
///
/// Pure and idempotent; empty input yields empty output.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

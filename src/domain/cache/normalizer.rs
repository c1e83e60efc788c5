//! Query canonicalization used as the exact-match key

/// Canonical form of a query: lower-cased, trimmed, internal whitespace
/// runs collapsed to a single space.
///
/// Total and deterministic. Empty or whitespace-only input yields `""`.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

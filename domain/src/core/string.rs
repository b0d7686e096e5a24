//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Normalize free text for equality comparison.
///
/// Lowercases, collapses runs of whitespace into a single space and strips
/// surrounding whitespace and trailing punctuation, so that
/// `"Missing  error handling."` and `"missing error handling"` compare equal.
pub fn normalize(s: &str) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(['.', '!', '?', ',', ';', ':'])
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'é' is 2 bytes; cutting inside it must back up to a boundary
        assert_eq!(truncate("héllo wörld", 5), "h...");
        assert_eq!(truncate("héllo wörld", 6), "hé...");
        assert_eq!(truncate("héllo", 20), "héllo");
    }

    #[test]
    fn test_normalize_collapses_whitespace_and_case() {
        assert_eq!(
            normalize("  Missing   Error\thandling. "),
            "missing error handling"
        );
    }

    #[test]
    fn test_normalize_strips_trailing_punctuation_only() {
        assert_eq!(normalize("Use of unwrap()!"), "use of unwrap()");
        assert_eq!(normalize("a.b.c"), "a.b.c");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize("   "), "");
    }
}

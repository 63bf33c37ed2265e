//! Dialogue text helpers
//!
//! Scene dialogue is stored wrapped in double quotes and spoken without them.

/// Wrap trimmed text in double quotes unless already wrapped
///
/// Empty input becomes `""`.
#[must_use]
pub fn ensure_quoted(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') {
        return trimmed.to_string();
    }
    format!("\"{trimmed}\"")
}

/// Trim text and drop one pair of surrounding double quotes
#[must_use]
pub fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_text() {
        assert_eq!(ensure_quoted("  Hello there "), "\"Hello there\"");
        assert_eq!(ensure_quoted(""), "\"\"");
        assert_eq!(ensure_quoted("   "), "\"\"");
    }

    #[test]
    fn keeps_existing_quotes() {
        assert_eq!(ensure_quoted(" \"Halt!\" "), "\"Halt!\"");
    }

    #[test]
    fn strips_one_pair() {
        assert_eq!(strip_quotes(" \"Halt!\" "), "Halt!");
        assert_eq!(strip_quotes("\"\"x\"\""), "\"x\"");
        assert_eq!(strip_quotes("no quotes"), "no quotes");
        assert_eq!(strip_quotes("\""), "\"");
        assert_eq!(strip_quotes(""), "");
    }

    #[test]
    fn strip_undoes_ensure() {
        for text in ["a", "  spaced  ", "\"already\"", ""] {
            assert_eq!(strip_quotes(&ensure_quoted(text)), strip_quotes(text));
        }
    }
}

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_\s-]").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").unwrap());
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Generate a URL-friendly slug from a title.
///
/// Characters outside `[a-z0-9_ -]` are dropped (accents included), runs of
/// whitespace and underscores become a single hyphen, and leading/trailing
/// hyphens are trimmed.
pub fn generate_slug(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(lowered.trim(), "");
    let hyphenated = SEPARATORS.replace_all(&stripped, "-");
    let collapsed = HYPHEN_RUNS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_slug_basic_title() {
        assert_eq!(generate_slug("Getting Started with Rust!"), "getting-started-with-rust");
    }

    #[test]
    fn test_generate_slug_collapses_separators() {
        assert_eq!(generate_slug("  foo__bar -- baz  "), "foo-bar-baz");
        assert_eq!(generate_slug("---hello---"), "hello");
    }

    #[test]
    fn test_generate_slug_drops_non_ascii() {
        assert_eq!(generate_slug("Café déjà vu"), "caf-dj-vu");
        assert_eq!(generate_slug("!!!"), "");
    }
}

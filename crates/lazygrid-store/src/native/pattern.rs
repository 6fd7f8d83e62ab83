//! `%`-wildcard pattern matching.

use regex::Regex;

/// Wildcard used by LIKE patterns: zero or more characters.
pub const WILDCARD: char = '%';

/// A compiled LIKE pattern.
///
/// `%` matches zero or more characters; every other character matches
/// itself. The pattern must match the whole text, not a substring.
///
/// # Example
///
/// ```
/// use lazygrid_store::LikePattern;
///
/// let pattern = LikePattern::new("%oe%", false).unwrap();
/// assert!(pattern.is_match("Joe"));
/// assert!(pattern.is_match("JOE"));
/// assert!(!pattern.is_match("Jo"));
/// ```
#[derive(Debug, Clone)]
pub struct LikePattern {
    pattern: String,
    case_sensitive: bool,
    regex: Regex,
}

impl LikePattern {
    /// Compiles a LIKE pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex engine's error if the translated expression
    /// exceeds its size limits.
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        let regex = Regex::new(&Self::to_regex(pattern, case_sensitive))?;
        Ok(Self {
            pattern: pattern.to_string(),
            case_sensitive,
            regex,
        })
    }

    /// Translates a LIKE pattern into an anchored regular expression.
    pub fn to_regex(pattern: &str, case_sensitive: bool) -> String {
        let flags = if case_sensitive { "(?s)" } else { "(?si)" };
        let body: Vec<String> = pattern.split(WILDCARD).map(regex::escape).collect();
        format!(r"{flags}\A{}\z", body.join(".*"))
    }

    /// Returns true if `text` matches the whole pattern.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Returns the original pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns whether matching is case-sensitive.
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_contains() {
        let pattern = LikePattern::new("%oe%", false).unwrap();
        assert!(pattern.is_match("Joe"));
        assert!(pattern.is_match("JOE"));
        assert!(pattern.is_match("oe"));
        assert!(!pattern.is_match("Jon"));
    }

    #[test]
    fn test_case_sensitive_contains() {
        let pattern = LikePattern::new("%oe%", true).unwrap();
        assert!(pattern.is_match("Joe"));
        assert!(!pattern.is_match("JOE"));
    }

    #[test]
    fn test_whole_string_match() {
        let pattern = LikePattern::new("Jo", true).unwrap();
        assert!(pattern.is_match("Jo"));
        assert!(!pattern.is_match("Joe"));
        assert!(!pattern.is_match("AJo"));
    }

    #[test]
    fn test_prefix_and_suffix() {
        let prefix = LikePattern::new("Jo%", true).unwrap();
        assert!(prefix.is_match("Joanna"));
        assert!(!prefix.is_match("Ajo"));

        let suffix = LikePattern::new("%son", true).unwrap();
        assert!(suffix.is_match("Jackson"));
        assert!(!suffix.is_match("Jacksons"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = LikePattern::new("a.b(c)%", true).unwrap();
        assert!(pattern.is_match("a.b(c)d"));
        assert!(!pattern.is_match("axb(c)d"));
    }

    #[test]
    fn test_wildcard_spans_newlines() {
        let pattern = LikePattern::new("a%b", true).unwrap();
        assert!(pattern.is_match("a\nb"));
    }

    #[test]
    fn test_only_wildcard_matches_everything() {
        let pattern = LikePattern::new("%", true).unwrap();
        assert!(pattern.is_match(""));
        assert!(pattern.is_match("anything"));
    }

    #[test]
    fn test_empty_pattern_matches_only_empty() {
        let pattern = LikePattern::new("", false).unwrap();
        assert!(pattern.is_match(""));
        assert!(!pattern.is_match("x"));
    }

    #[test]
    fn test_to_regex() {
        assert_eq!(LikePattern::to_regex("%a.b", true), r"(?s)\A.*a\.b\z");
        assert_eq!(LikePattern::to_regex("x", false), r"(?si)\Ax\z");
    }
}

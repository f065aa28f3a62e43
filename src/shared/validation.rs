use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Slug format produced by [`slugify`]
    /// - Valid: "broken-street-light", "flood-2024", "a"
    /// - Invalid: "-leading", "trailing-", "double--dash", "Upper", "under_score"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9-]").unwrap();
    static ref DASH_RUN: Regex = Regex::new(r"-{2,}").unwrap();
}

/// Derive a URL slug from a title: lowercase, whitespace runs become `-`,
/// anything outside `[a-z0-9-]` is dropped.
pub fn slugify(title: &str) -> String {
    let lower = title.trim().to_lowercase();
    let dashed = WHITESPACE_RUN.replace_all(&lower, "-");
    let stripped = NON_SLUG_CHARS.replace_all(&dashed, "");
    let collapsed = DASH_RUN.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// Slug for a new record; falls back to the id prefix when the title
/// has no usable characters.
pub fn slug_with_suffix(title: &str, suffix: &str) -> String {
    let base = slugify(title);
    if base.is_empty() {
        suffix.to_string()
    } else {
        format!("{}-{}", base, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Broken Street Light"), "broken-street-light");
        assert_eq!(slugify("  Flood   in Sector 7! "), "flood-in-sector-7");
        assert_eq!(slugify("Water/Sewage: leak"), "watersewage-leak");
    }

    #[test]
    fn test_slugify_output_matches_regex() {
        for title in ["Pothole -- Main Rd", "A", "Ünïcode Park", "tree_fell down"] {
            let slug = slugify(title);
            assert!(SLUG_REGEX.is_match(&slug), "bad slug {:?} for {:?}", slug, title);
        }
    }

    #[test]
    fn test_slugify_empty_when_nothing_usable() {
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(slug_with_suffix("!!!", "ab12cd34"), "ab12cd34");
        assert_eq!(slug_with_suffix("Park", "ab12cd34"), "park-ab12cd34");
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-org"));
        assert!(!SLUG_REGEX.is_match("org-"));
        assert!(!SLUG_REGEX.is_match("org--name"));
        assert!(!SLUG_REGEX.is_match("Org"));
        assert!(!SLUG_REGEX.is_match(""));
    }
}

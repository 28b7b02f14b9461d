use wishlist_common::{MAX_TITLE_CHARS, UNKNOWN_TITLE};

/// Clean raw page text into a bounded, single-line title.
///
/// Missing or blank input yields [`UNKNOWN_TITLE`]. Otherwise every whitespace run
/// (newlines included) collapses to one space, the ends are trimmed, and the result
/// is cut hard at [`MAX_TITLE_CHARS`] characters.
pub fn normalize_title(raw: Option<&str>) -> String {
    let collapsed = raw
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    if collapsed.is_empty() {
        return UNKNOWN_TITLE.to_string();
    }
    collapsed.chars().take(MAX_TITLE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_is_sentinel() {
        assert_eq!(normalize_title(None), "Unknown Item");
        assert_eq!(normalize_title(Some("")), "Unknown Item");
        assert_eq!(normalize_title(Some(" \n\t ")), "Unknown Item");
    }

    #[test]
    fn collapses_whitespace_and_newlines() {
        assert_eq!(normalize_title(Some("  a\n\nb   c  ")), "a b c");
        assert_eq!(normalize_title(Some("Air Max\r\n 90")), "Air Max 90");
    }

    #[test]
    fn cuts_at_limit_without_word_boundary() {
        let long = "word ".repeat(100);
        let out = normalize_title(Some(&long));
        assert_eq!(out.chars().count(), 140);
        assert!(out.starts_with("word word"));
    }

    #[test]
    fn cut_is_by_character_not_byte() {
        let long = "ü".repeat(300);
        let out = normalize_title(Some(&long));
        assert_eq!(out.chars().count(), 140);
    }

    #[test]
    fn short_titles_are_untouched() {
        assert_eq!(normalize_title(Some("Cozy Hoodie")), "Cozy Hoodie");
    }
}

//! Shared helper functions for CLI commands

use crate::core::identity::PartId;

/// Format a PartId for table display, truncating the ULID
///
/// `PART-` plus the first 8 ULID characters and "...", enough to tell
/// parts apart at a glance in a terminal listing.
pub fn format_short_id(id: &PartId) -> String {
    truncate_str(&id.to_string(), 16)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Join a tag set for a single table cell
pub fn join_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "-".to_string()
    } else {
        tags.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_short_id() {
        let formatted = format_short_id(&PartId::new());
        assert_eq!(formatted.chars().count(), 16);
        assert!(formatted.starts_with("PART-"));
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Ø-ring gasket", 6), "Ø-r...");
    }

    #[test]
    fn test_join_tags() {
        assert_eq!(join_tags(&[]), "-");
        assert_eq!(join_tags(&["A".into(), "B".into()]), "A, B");
    }
}

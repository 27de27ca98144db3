/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring match. `needle` should already be lowercased.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Rating with a star, one decimal place: 4.5 -> "★ 4.5"
pub fn format_rating(rating: f64) -> String {
    format!("★ {:.1}", rating)
}

/// Relative age for the status bar, e.g. "5m ago", "2h ago".
pub fn format_age(minutes: i64) -> String {
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Pádel Español", 8), "Pádel...");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Al Quoz Industrial", "quoz"));
        assert!(!contains_ignore_case("Marina", "palm"));
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(4.0), "★ 4.0");
        assert_eq!(format_rating(4.66), "★ 4.7");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(-3), "just now");
        assert_eq!(format_age(0), "just now");
        assert_eq!(format_age(5), "5m ago");
        assert_eq!(format_age(90), "2h ago");
        assert_eq!(format_age(80), "1h ago");
        assert_eq!(format_age(1440 * 2 + 60), "2d ago");
        assert_eq!(format_age(1440 + 13 * 60), "2d ago");
    }
}

pub const DEFAULT_MAX_CHARS: usize = 45;

const ELLIPSIS: &str = "...";

/// Shortens `path` to at most `max_chars` characters by dropping leading
/// segments, keeping as many trailing segments as fit behind `...`.
///
/// Single-segment paths are returned as-is even when too long. When not even
/// the last segment fits, the result is the ellipsis cut down to the budget.
pub fn abbreviate(path: &str, max_chars: usize) -> String {
    if path.chars().count() <= max_chars {
        return path.to_string();
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() <= 1 {
        return path.to_string();
    }

    let mut suffix = String::new();
    for segment in segments.iter().rev() {
        // Room for the ellipsis, a separator and this segment in front of what we have.
        let candidate = ELLIPSIS.len() + 1 + segment.chars().count() + 1 + suffix.chars().count();
        if candidate > max_chars {
            break;
        }
        suffix = format!("/{}{}", segment, suffix);
    }

    if suffix.is_empty() {
        return ELLIPSIS.chars().take(max_chars).collect();
    }
    format!("{}{}", ELLIPSIS, suffix)
}

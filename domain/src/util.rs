//! Shared utility functions.

/// Shorten `s` to at most `max_bytes` for log output, never splitting a
/// UTF-8 character. Appends `…` when anything was cut.
pub fn preview(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);
    format!("{}…", &s[..end])
}

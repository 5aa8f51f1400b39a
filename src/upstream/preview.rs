//! Bounded, markup-escaped previews of upstream text.

/// Default number of characters kept in a preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Truncate `raw` to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(raw: &str, max_chars: usize) -> &str {
    match raw.char_indices().nth(max_chars) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

fn entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape the characters that are significant in HTML markup.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match entity(c) {
            Some(e) => escaped.push_str(e),
            None => escaped.push(c),
        }
    }
    escaped
}

/// Escape `raw` and cap the *escaped* result at `max_chars` characters.
/// An entity that would cross the bound is dropped whole, never cut in half.
pub fn bounded_preview(raw: &str, max_chars: usize) -> String {
    let mut preview = String::new();
    let mut used = 0;
    for c in raw.chars() {
        let width = entity(c).map_or(1, str::len);
        if used + width > max_chars {
            break;
        }
        used += width;
        match entity(c) {
            Some(e) => preview.push_str(e),
            None => preview.push(c),
        }
    }
    preview
}

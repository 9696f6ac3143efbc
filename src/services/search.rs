//! Free-text search filter semantics shared by the list views.
//!
//! A filter is optional: absent or empty input disables it and the listing
//! returns every record in insertion order. Present input matches records
//! containing it as a case-insensitive substring.

/// Normalizes a raw search input. Absent and empty inputs both mean
/// "no filter".
pub fn normalize(input: Option<&str>) -> Option<&str> {
    match input {
        Some(term) if !term.is_empty() => Some(term),
        _ => None,
    }
}

/// Builds an `ILIKE` pattern matching the term as a substring, escaping
/// LIKE metacharacters so user input always matches literally.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

//! Free-text sanitization — the boundary between model output and the
//! rest of the system.
//!
//! Everything the upstream returns (and every player-entered name that
//! lands inside a prompt or a scenario) passes through [`sanitize`] before
//! it reaches storage or a client. This is a security filter against
//! markup/script injection via model output, not a cosmetic one.

/// Punctuation that survives sanitization.
const ALLOWED_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', '\'', '"', '-', ':', ';', '(', ')', '&',
];

/// Sanitize free text: strip `<...>` markup spans, drop every character
/// outside the allow-list (alphanumerics, whitespace, a small punctuation
/// set), trim, and truncate to `max_length` characters.
///
/// Truncation counts `char`s, so multi-byte text is never split inside a
/// code point.
#[must_use]
pub fn sanitize(text: &str, max_length: usize) -> String {
    let mut filtered = String::with_capacity(text.len().min(max_length * 4));
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_alphanumeric()
                || c.is_whitespace()
                || ALLOWED_PUNCTUATION.contains(&c) =>
            {
                filtered.push(c);
            }
            _ => {}
        }
    }
    filtered.trim().chars().take(max_length).collect()
}

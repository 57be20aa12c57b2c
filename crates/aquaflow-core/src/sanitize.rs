//! Free-text input sanitization.
//!
//! Strips HTML-tag-like substrings, entity-escapes the remaining special
//! characters, trims, and truncates. Escaping runs after tag stripping, so an
//! input crafted across the strip boundary is not neutralized — this is
//! best-effort hardening for stored text, not a full XSS barrier.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Default maximum length applied when a call site has no tighter bound.
pub const DEFAULT_MAX_LEN: usize = 255;

static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    // Also swallows an unterminated trailing "<..." fragment.
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>?").unwrap())
}

/// Sanitize a free-text field, in order: strip tag-like substrings, escape
/// `& < > " '` to named entities, trim surrounding whitespace, truncate to
/// `max_len` characters.
///
/// The returned string never exceeds `max_len` characters.
pub fn sanitize(input: &str, max_len: usize) -> String {
    let stripped = tag_re().replace_all(input, "");

    let mut escaped = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped.trim().chars().take(max_len).collect()
}

/// Sanitize a dynamically-typed field. Non-string values yield the empty
/// string rather than an error.
pub fn sanitize_value(value: &Value, max_len: usize) -> String {
    match value {
        Value::String(s) => sanitize(s, max_len),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

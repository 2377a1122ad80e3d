//! Strict ISBN-13 recognition.
//!
//! Accepts an optional `ISBN`, `ISBN:`, `ISBN-13` or `ISBN-13:` prefix
//! followed by a space, then either 13 bare digits or 17 characters of
//! digits grouped by hyphens or spaces (four separators), starting with
//! `978` or `979`.

use std::sync::LazyLock;

use regex::Regex;

static ISBN13_GROUPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^97[89][- ]?[0-9]{1,5}[- ]?[0-9]+[- ]?[0-9]+[- ]?[0-9]$")
        .expect("ISBN-13 pattern is valid")
});

/// Does `text` look like an ISBN-13?
pub fn is_isbn13(text: &str) -> bool {
    let body = strip_prefix(text).unwrap_or(text);
    has_isbn13_shape(body) && ISBN13_GROUPS.is_match(body)
}

fn strip_prefix(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("ISBN")?;
    let rest = rest.strip_prefix("-13").unwrap_or(rest);
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    rest.strip_prefix(' ')
}

/// Length and grouping constraints the group pattern alone cannot express.
fn has_isbn13_shape(body: &str) -> bool {
    if body.len() == 13 && body.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }

    body.len() == 17
        && body.bytes().all(|b| b.is_ascii_digit() || b == b'-' || b == b' ')
        && leading_groups(body) >= 4
}

/// Count the runs of digits at the start of `body` that are each followed by
/// a single separator.
fn leading_groups(body: &str) -> usize {
    let bytes = body.as_bytes();
    let mut groups = 0;
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == start || i == bytes.len() || !matches!(bytes[i], b'-' | b' ') {
            break;
        }
        groups += 1;
        i += 1;
    }

    groups
}

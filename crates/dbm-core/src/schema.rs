//! Schema dump normalization and comparison

use regex::Regex;
use std::sync::OnceLock;

static TRAILING_SPACES_RE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn trailing_spaces_regex() -> &'static Regex {
    TRAILING_SPACES_RE.get_or_init(|| Regex::new(r" +\n").expect("valid regex"))
}

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Strip trailing spaces from every line of a schema dump.
pub fn normalize_dump(dump: &str) -> String {
    trailing_spaces_regex().replace_all(dump, "\n").into_owned()
}

/// Compare two dumps ignoring all whitespace.
pub fn schemas_equal(a: &str, b: &str) -> bool {
    let ws = whitespace_regex();
    ws.replace_all(a, "") == ws.replace_all(b, "")
}

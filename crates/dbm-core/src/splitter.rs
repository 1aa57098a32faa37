//! Statement splitting for queries that cannot run in one transaction
//!
//! `ALTER TYPE ... ADD VALUE` may not share a transaction with statements
//! that use the new value, so a multi-statement query containing it has to be
//! executed one statement at a time. Splitting is a plain scan for `;`, not a
//! SQL parse: a terminator inside a string literal or a routine body is
//! treated as a statement boundary. Queries defining routines are therefore
//! refused rather than split.

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::sync::OnceLock;

static ALTER_TYPE_RE: OnceLock<Regex> = OnceLock::new();
static TWO_TERMINATORS_RE: OnceLock<Regex> = OnceLock::new();
static ROUTINE_RE: OnceLock<Regex> = OnceLock::new();

fn alter_type_regex() -> &'static Regex {
    ALTER_TYPE_RE.get_or_init(|| Regex::new(r"(?i)\bALTER\s+TYPE\b").expect("valid regex"))
}

fn two_terminators_regex() -> &'static Regex {
    TWO_TERMINATORS_RE.get_or_init(|| Regex::new(r"(?s);.*;").expect("valid regex"))
}

fn routine_regex() -> &'static Regex {
    ROUTINE_RE.get_or_init(|| {
        Regex::new(r"(?i)\bCREATE\s+(?:OR\s+REPLACE\s+)?(?:FUNCTION|PROCEDURE)\b")
            .expect("valid regex")
    })
}

/// True when the query alters an enum type and holds more than one statement.
pub fn must_split(query: &str) -> bool {
    alter_type_regex().is_match(query) && two_terminators_regex().is_match(query)
}

/// True when the query defines a routine whose body would be cut apart.
pub fn cannot_split(query: &str) -> bool {
    routine_regex().is_match(query)
}

/// Split a query at every `;`, dropping empty fragments.
pub fn split(query: &str) -> Vec<String> {
    query
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Split a query, refusing when a routine definition would be corrupted.
pub fn plan_split(query: &str) -> CoreResult<Vec<String>> {
    if cannot_split(query) {
        return Err(CoreError::UnsplittableQuery);
    }
    Ok(split(query))
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;

//! Strongly-typed patch hash wrapper.

use crate::checksum::compute_patch_checksum;
use crate::error::{CoreError, CoreResult};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Prefix PostgreSQL uses when rendering `bytea` values as text.
const BYTEA_HEX_PREFIX: &str = "\\x";

/// Lowercase hex SHA-384 digest identifying a patch by its content.
///
/// The ledger stores hashes as `bytea`; this type owns the conversion between
/// the hex form used in the repository and the `\x`-prefixed text form the
/// database hands back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchHash(String);

impl PatchHash {
    /// Hash raw patch content.
    pub fn from_content(content: &str) -> Self {
        Self(compute_patch_checksum(content))
    }

    /// Parse a hex digest, normalizing to lowercase.
    pub fn from_hex(value: &str) -> CoreResult<Self> {
        let value = value.trim();
        if value.is_empty() || hex::decode(value).is_err() {
            return Err(CoreError::InvalidLedgerHash {
                value: value.to_string(),
            });
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// Parse the text rendering of a `bytea` ledger value (`\x0123...`).
    pub fn from_db(value: &str) -> CoreResult<Self> {
        match value.trim().strip_prefix(BYTEA_HEX_PREFIX) {
            Some(rest) => Self::from_hex(rest),
            None => Err(CoreError::InvalidLedgerHash {
                value: value.to_string(),
            }),
        }
    }

    /// Render as a SQL `bytea` hex literal, e.g. `'\x0123'`.
    pub fn to_sql_literal(&self) -> String {
        format!("'{}{}'", BYTEA_HEX_PREFIX, self.0)
    }

    /// Return the hex digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log output.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for PatchHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatchHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for PatchHash {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PatchHash {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PatchHash {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PatchHash {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

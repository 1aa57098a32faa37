//! Applied-patch ledger statements
//!
//! The ledger is a two-column table inside the target database recording
//! which patch hashes have been applied and when.

use crate::error::{CoreError, CoreResult};
use crate::patch_hash::PatchHash;
use serde_json::Value;
use std::collections::HashSet;

/// Name of the ledger table
pub const LEDGER_TABLE: &str = "db_patches";

/// DDL creating the ledger table
pub const CREATE_LEDGER_TABLE: &str = "CREATE TABLE db_patches ( \
     hash bytea PRIMARY KEY NOT NULL, \
     applied_time timestamp with time zone DEFAULT now() NOT NULL \
     CHECK (date_part('timezone', applied_time) = 0));";

/// Query listing applied hashes
pub const SELECT_APPLIED_HASHES: &str = "SELECT hash FROM db_patches";

/// Render the statement recording `hashes` as applied.
///
/// ```
/// use dbm_core::ledger::insert_statement;
/// use dbm_core::PatchHash;
/// let hash = PatchHash::from_hex("00ff").unwrap();
/// assert_eq!(
///     insert_statement(&[hash]),
///     "INSERT INTO db_patches (hash) VALUES\n    ('\\x00ff');"
/// );
/// ```
pub fn insert_statement(hashes: &[PatchHash]) -> String {
    let values = hashes
        .iter()
        .map(|h| format!("\n    ({})", h.to_sql_literal()))
        .collect::<Vec<_>>()
        .join(",");
    format!("INSERT INTO {} (hash) VALUES{};", LEDGER_TABLE, values)
}

/// Decode the JSON rows returned for [`SELECT_APPLIED_HASHES`].
pub fn decode_hash_rows(rows: &[Value]) -> CoreResult<HashSet<PatchHash>> {
    rows.iter()
        .map(|row| {
            let value = row
                .get("hash")
                .and_then(Value::as_str)
                .ok_or_else(|| CoreError::InvalidLedgerHash {
                    value: row.to_string(),
                })?;
            PatchHash::from_db(value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_statement_multiple_hashes() {
        let a = PatchHash::from_hex("aa").unwrap();
        let b = PatchHash::from_hex("bb").unwrap();
        assert_eq!(
            insert_statement(&[a, b]),
            "INSERT INTO db_patches (hash) VALUES\n    ('\\xaa'),\n    ('\\xbb');"
        );
    }

    #[test]
    fn test_decode_hash_rows() {
        let rows = vec![json!({"hash": "\\xaa"}), json!({"hash": "\\xBB"})];
        let hashes = decode_hash_rows(&rows).unwrap();
        assert_eq!(hashes.len(), 2);
        assert!(hashes.contains("aa"));
        assert!(hashes.contains("bb"));
    }

    #[test]
    fn test_decode_hash_rows_rejects_missing_column() {
        let rows = vec![json!({"other": 1})];
        assert!(decode_hash_rows(&rows).is_err());
    }

    #[test]
    fn test_create_table_is_single_statement() {
        assert_eq!(CREATE_LEDGER_TABLE.matches(';').count(), 1);
        assert!(CREATE_LEDGER_TABLE.contains("hash bytea PRIMARY KEY"));
    }
}

//! Dev instance naming
//!
//! In dev mode every distinct patch list gets its own database, named after
//! a hash of the concatenated patch contents. Dropping trailing patches from
//! the hash yields the names of ancestor databases, which can be cloned to
//! provision a new instance without replaying every patch.

use crate::checksum::compute_instance_checksum;
use crate::patch::PatchSet;

/// PostgreSQL truncates identifiers to this many bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Derives database names from the patch list.
pub struct InstanceNamer<'a> {
    base: &'a str,
    patches: &'a PatchSet,
}

impl<'a> InstanceNamer<'a> {
    /// Create a namer for the configured base database name
    pub fn new(base: &'a str, patches: &'a PatchSet) -> Self {
        Self { base, patches }
    }

    /// Base database name
    pub fn base(&self) -> &str {
        self.base
    }

    /// Name of the database commands should target.
    pub fn instance_name(&self, dev_mode: bool) -> String {
        if dev_mode {
            self.name_skipping(0)
        } else {
            self.base.to_string()
        }
    }

    /// Hash of all but the last `skip` patches; empty when no patches remain.
    pub fn version_hash(&self, skip: usize) -> String {
        let patches = self.patches.patches();
        if skip >= patches.len() {
            return String::new();
        }
        let content = patches[..patches.len() - skip]
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        compute_instance_checksum(&content)
    }

    /// Dev instance name with the last `skip` patches excluded.
    pub fn name_skipping(&self, skip: usize) -> String {
        let hash = self.version_hash(skip);
        if hash.is_empty() {
            return self.base.to_string();
        }
        truncate_identifier(&format!("{}_{}", self.base, hash))
    }

    /// Candidate ancestor names, nearest first, ending with the base name.
    pub fn candidate_names(&self) -> Vec<String> {
        (0..=self.patches.len())
            .map(|skip| self.name_skipping(skip))
            .collect()
    }
}

/// Truncate to the identifier limit without splitting a UTF-8 character.
fn truncate_identifier(name: &str) -> String {
    if name.len() <= MAX_IDENTIFIER_LEN {
        return name.to_string();
    }
    let mut end = MAX_IDENTIFIER_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

#[cfg(test)]
#[path = "instance_test.rs"]
mod tests;

//! SHA-2 checksum utilities for patch identity and dev instance naming.

use sha2::{Digest, Sha224, Sha384};

/// Compute the SHA-384 checksum of a patch's content
pub fn compute_patch_checksum(s: &str) -> String {
    let mut hasher = Sha384::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Compute the SHA-224 checksum used to version dev databases
pub fn compute_instance_checksum(s: &str) -> String {
    let mut hasher = Sha224::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

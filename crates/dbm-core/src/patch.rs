//! Patch discovery
//!
//! A patch directory holds files named `<digits>.sql`, `<digits>.py` or
//! `<digits>.sh`. Directories named with digits only carry assets for the
//! patch of the same number and are skipped. Patches are identified by the
//! SHA-384 of their content and ordered by their numeric prefix.

use crate::error::{CoreError, CoreResult};
use crate::patch_hash::PatchHash;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static PATCH_FILE_RE: OnceLock<Regex> = OnceLock::new();
static ASSET_DIR_RE: OnceLock<Regex> = OnceLock::new();

/// `<digits>.<ext>` with the digits and extension captured
fn patch_file_regex() -> &'static Regex {
    PATCH_FILE_RE.get_or_init(|| Regex::new(r"^(\d+)\.(sql|py|sh)$").expect("valid regex"))
}

fn asset_dir_regex() -> &'static Regex {
    ASSET_DIR_RE.get_or_init(|| Regex::new(r"^\d+$").expect("valid regex"))
}

/// How a patch is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchKind {
    /// Executed by the SQL client, batched with neighbouring SQL patches
    Sql,
    /// Executed by the configured Python interpreter
    Python,
    /// Executed directly as a program
    Shell,
}

impl PatchKind {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "sql" => Some(Self::Sql),
            "py" => Some(Self::Python),
            "sh" => Some(Self::Shell),
            _ => None,
        }
    }
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchKind::Sql => write!(f, "sql"),
            PatchKind::Python => write!(f, "python"),
            PatchKind::Shell => write!(f, "shell"),
        }
    }
}

/// A single patch file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Content hash
    pub hash: PatchHash,

    /// Raw file content
    pub content: String,

    /// Absolute path of the patch file
    pub path: PathBuf,

    /// How the patch is applied
    pub kind: PatchKind,

    /// Numeric prefix as written in the file name (leading zeros kept)
    pub number: String,
}

impl Patch {
    /// Compare two patches by numeric prefix, then by path.
    fn order(&self, other: &Self) -> Ordering {
        compare_numeric(&self.number, &other.number).then_with(|| self.path.cmp(&other.path))
    }
}

/// Compare two digit strings as numbers without parsing them.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// The ordered set of patches found in a patch directory
#[derive(Debug, Clone)]
pub struct PatchSet {
    dir: PathBuf,
    patches: Vec<Patch>,
}

impl PatchSet {
    /// Discover all patches in `dir`.
    ///
    /// Fails on unreadable directories, entries that are not patches or asset
    /// directories, and files with identical content.
    pub fn discover(dir: &Path) -> CoreResult<Self> {
        if !dir.is_dir() {
            return Err(CoreError::PatchDirNotFound {
                path: dir.display().to_string(),
            });
        }

        let mut patches = Vec::new();
        let mut seen: HashMap<PatchHash, PathBuf> = HashMap::new();

        let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::IoWithPath {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                return Err(CoreError::InvalidPatchFilename {
                    path: path.display().to_string(),
                    reason: "file name is not valid UTF-8".to_string(),
                });
            };

            if path.is_dir() {
                if asset_dir_regex().is_match(name) {
                    log::debug!("Skipping patch asset directory {}", path.display());
                    continue;
                }
                return Err(CoreError::InvalidPatchFilename {
                    path: path.display().to_string(),
                    reason: "only digit-named asset directories may live next to patches"
                        .to_string(),
                });
            }

            let patch = Self::load_patch(&path, name)?;
            if let Some(existing) = seen.get(&patch.hash) {
                return Err(CoreError::DuplicatePatchHash {
                    hash: patch.hash.to_string(),
                    path: path.display().to_string(),
                    existing: existing.display().to_string(),
                });
            }
            seen.insert(patch.hash.clone(), path.clone());
            patches.push(patch);
        }

        patches.sort_by(Patch::order);
        log::debug!("Discovered {} patches in {}", patches.len(), dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            patches,
        })
    }

    fn load_patch(path: &Path, name: &str) -> CoreResult<Patch> {
        let captures =
            patch_file_regex()
                .captures(name)
                .ok_or_else(|| CoreError::InvalidPatchFilename {
                    path: path.display().to_string(),
                    reason: "expected <digits>.sql, <digits>.py or <digits>.sh".to_string(),
                })?;
        let number = captures[1].to_string();
        let kind = PatchKind::from_extension(&captures[2]).ok_or_else(|| {
            CoreError::InvalidPatchFilename {
                path: path.display().to_string(),
                reason: format!("unknown extension '{}'", &captures[2]),
            }
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(Patch {
            hash: PatchHash::from_content(&content),
            content,
            path: path.to_path_buf(),
            kind,
            number,
        })
    }

    /// Build a set from already-loaded patches, sorting them.
    pub fn from_patches(dir: impl Into<PathBuf>, mut patches: Vec<Patch>) -> Self {
        patches.sort_by(Patch::order);
        Self {
            dir: dir.into(),
            patches,
        }
    }

    /// Directory the patches were discovered in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Patches in application order
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Iterate over patches in application order
    pub fn iter(&self) -> std::slice::Iter<'_, Patch> {
        self.patches.iter()
    }

    /// Number of patches
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Whether the directory holds no patches
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Hashes of every patch on disk
    pub fn hashes(&self) -> HashSet<&PatchHash> {
        self.patches.iter().map(|p| &p.hash).collect()
    }

    /// Patches whose hash is not in `applied`, in application order.
    pub fn unapplied<'a>(&'a self, applied: &HashSet<PatchHash>) -> Vec<&'a Patch> {
        self.patches
            .iter()
            .filter(|p| !applied.contains(&p.hash))
            .collect()
    }

    /// Applied hashes that no patch on disk accounts for.
    pub fn invalid_hashes(&self, applied: &HashSet<PatchHash>) -> BTreeSet<PatchHash> {
        let current = self.hashes();
        applied
            .iter()
            .filter(|h| !current.contains(h))
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a PatchSet {
    type Item = &'a Patch;
    type IntoIter = std::slice::Iter<'a, Patch>;

    fn into_iter(self) -> Self::IntoIter {
        self.patches.iter()
    }
}

#[cfg(test)]
#[path = "patch_test.rs"]
mod tests;

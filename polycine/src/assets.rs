//! Asset loading seam
//!
//! The core never touches I/O transports directly: a caller-supplied
//! [`AssetSource`] turns names into byte buffers. Historically all
//! cutscene assets live flat in a single `DATA/` directory with
//! upper-case DOS names, which [`DirSource`] reproduces.

use std::path::PathBuf;

use thiserror::Error;

/// Errors an asset source can produce
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// No asset with this name exists
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying transport failed
    #[error("io: {0}")]
    Io(String),
}

/// Supplies asset bytes by name
///
/// Names are logical file names with extension (`"INTRO1.CMD"`).
/// Implementations may block; the core only calls this at load
/// boundaries, never per frame.
pub trait AssetSource {
    fn load(&self, name: &str) -> Result<Vec<u8>, AssetError>;
}

/// Filesystem asset source rooted at a data directory
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirSource {
    fn load(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.root.join(name);
        std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(name.to_string())
            } else {
                AssetError::Io(format!("{}: {e}", path.display()))
            }
        })
    }
}

/// Cutscene-name to profile-name mapping
///
/// A few cutscenes play a profile whose name differs from their own;
/// everything else maps to itself.
const PRF_NAME_TABLE: &[(&str, &str)] = &[("INTRO1", "INTROL3")];

/// Resolve the profile (PRF) name for a cutscene name
pub fn prf_name_for(cutscene: &str) -> &str {
    PRF_NAME_TABLE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(cutscene))
        .map(|(_, prf)| *prf)
        .unwrap_or(cutscene)
}

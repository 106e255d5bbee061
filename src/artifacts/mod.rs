//! Reading and writing the per-view artifact files.
//!
//! A persisted view is a set of files sharing one base name:
//!
//! - `<name>_<angle>.cvfh` — global shape descriptor (PCD histogram)
//! - `<name>_<angle>.pcd`  — raw reference cloud (ASCII PCD)
//! - `<name>_<angle>.mat4` — capture pose, 16 whitespace-separated values
//! - `<name>_<angle>.crh`  — rotational signature (PCD histogram)
//!
//! Histogram artifacts use the same PCD container as clouds, with a single
//! data row carrying the histogram values. Only the ASCII subset of the
//! format is supported.

pub mod mat4;
pub mod pcd;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure loading or parsing a single artifact file.
///
/// Artifact errors are recoverable by design: the database loader logs the
/// failed view and moves on to the next one.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("{path}: expected {expected} values, found {found}")]
    Length {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
    #[error("missing companion file {path}")]
    MissingCompanion { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, ArtifactError>;

/// Derive the object name encoded in an artifact file name.
///
/// Strips the directory, the extension, and the trailing `_<angle>` suffix:
/// `/data/cup_45.cvfh` names the object `cup`. A file without an angle
/// suffix names the object after its whole stem.
pub fn object_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = match stem.rfind('_') {
        Some(idx) => &stem[..idx],
        None => stem,
    };
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

//! The model database: persisted view artifacts loaded into memory.
//!
//! Loading walks a directory tree for descriptor files and assembles each
//! one with its three companions (cloud, pose, signature) into a
//! [`View`]. A view with a missing or unreadable artifact is skipped with
//! a warning; only an unreadable directory or an empty known-object list
//! fails the load. Files are visited in lexicographic path order so view
//! indices are reproducible across runs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rkyv::{Archive, Deserialize, Serialize};
use tracing::{info, warn};

use crate::artifacts::{self, mat4, pcd, ArtifactError};
use crate::view::{View, DESCRIPTOR_LEN, SIGNATURE_BINS};

/// Ordered, immutable collection of loaded views.
///
/// View positions are stable once loaded; descriptor-index results are
/// positions into this ordering.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
pub struct ViewDatabase {
    pub views: Vec<View>,
}

impl ViewDatabase {
    /// Build a database directly from views, e.g. for tests or when the
    /// artifacts were assembled elsewhere.
    pub fn from_views(views: Vec<View>) -> Self {
        Self { views }
    }

    /// Number of loaded views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// The view at a descriptor-index position.
    pub fn get(&self, index: usize) -> Option<&View> {
        self.views.get(index)
    }

    /// Load every complete view artifact set under `dir`.
    ///
    /// Descriptor files whose encoded object name is not in
    /// `known_objects` are skipped silently; incomplete or malformed
    /// artifact sets are skipped with a warning. The caller reads the
    /// loaded count from [`len`](Self::len).
    pub fn load_directory<P: AsRef<Path>>(dir: P, known_objects: &[String]) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        if known_objects.is_empty() {
            anyhow::bail!("no known objects configured");
        }
        info!("Loading view artifacts from {}", dir.display());

        let mut descriptor_files = Vec::new();
        collect_descriptor_files(dir, &mut descriptor_files)
            .with_context(|| format!("cannot read artifact directory {}", dir.display()))?;
        descriptor_files.sort();

        let mut views = Vec::new();
        for path in &descriptor_files {
            let Some(name) = artifacts::object_name(path) else {
                continue;
            };
            if !known_objects.contains(&name) {
                continue;
            }
            match load_view(path, name) {
                Ok(view) => views.push(view),
                Err(err) => warn!("skipping view {}: {}", path.display(), err),
            }
        }

        info!(
            "Loaded {} views for {} known objects",
            views.len(),
            known_objects.len()
        );
        Ok(Self { views })
    }
}

/// Recursively gather descriptor artifact paths under `dir`.
fn collect_descriptor_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_descriptor_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "cvfh") {
            out.push(path);
        }
    }
    Ok(())
}

/// Assemble one view from a descriptor file and its companions.
fn load_view(descriptor_path: &Path, name: String) -> Result<View, ArtifactError> {
    let descriptor = pcd::read_histogram(descriptor_path)?;
    check_length(descriptor_path, &descriptor, DESCRIPTOR_LEN)?;

    let cloud = pcd::read_point_cloud(companion(descriptor_path, "pcd")?)?;
    let pose = mat4::read_matrix(companion(descriptor_path, "mat4")?)?;

    let signature_path = companion(descriptor_path, "crh")?;
    let signature = pcd::read_histogram(&signature_path)?;
    check_length(&signature_path, &signature, SIGNATURE_BINS)?;

    Ok(View::new(name, descriptor, pose, signature, cloud))
}

fn companion(path: &Path, extension: &str) -> Result<PathBuf, ArtifactError> {
    let companion = path.with_extension(extension);
    if companion.exists() {
        Ok(companion)
    } else {
        Err(ArtifactError::MissingCompanion { path: companion })
    }
}

fn check_length(path: &Path, values: &[f32], expected: usize) -> Result<(), ArtifactError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(ArtifactError::Length {
            path: path.into(),
            expected,
            found: values.len(),
        })
    }
}

// ── Serialization ───────────────────────────────────────────────────────────

impl ViewDatabase {
    /// Serialize the database to bytes using rkyv.
    pub fn to_rkyv_bytes(&self) -> Vec<u8> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .expect("rkyv serialization failed")
            .to_vec()
    }

    /// Save the loaded database to a single cache file for fast startup.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let bytes = self.to_rkyv_bytes();
        std::fs::write(path.as_ref(), &bytes)?;
        info!(
            "Saved view database to {} ({} bytes)",
            path.as_ref().display(),
            bytes.len()
        );
        Ok(())
    }

    /// Load a database saved with [`save_to_file`](Self::save_to_file).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let db = rkyv::from_bytes::<Self, rkyv::rancor::Error>(&bytes)
            .map_err(|e| anyhow::anyhow!("rkyv deserialization failed: {}", e))?;
        info!("Loaded view database: {} views", db.len());
        Ok(db)
    }
}

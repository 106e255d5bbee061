//! View-based 6-DOF recognition pipeline.
//!
//! Classifies one segmented cluster at a time against a database of stored
//! object views:
//!
//! 1. **Descriptor extraction**: the collaborator computes the cluster's
//!    global shape descriptor.
//! 2. **Candidate search**: the descriptor index returns the k nearest
//!    stored views.
//! 3. **Roll correlation**: the best candidate's rotational signature is
//!    correlated against the query's to recover the residual rotation
//!    about the vertical axis.
//! 4. **Pose synthesis**: the roll rotation composes with the matched
//!    view's capture pose, and the centroids combine into the final
//!    translation.
//!
//! Every step can drop the cluster without failing the batch; the status
//! on [`ClassifyResult`] says how far a cluster got.

pub mod classify;
pub mod database;
pub mod roll;

use crate::descriptor_index::{DescriptorIndex, Neighbor};
use crate::extract::FeatureExtractor;
use crate::Pose;

use database::ViewDatabase;

// ── Status codes ────────────────────────────────────────────────────────────

/// Outcome of a single-cluster classification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyStatus {
    /// A labeled 6-DOF pose was produced.
    Classified,
    /// Normal, descriptor or signature extraction failed on the cluster.
    ExtractionFailed,
    /// The descriptor index returned no candidates.
    NoCandidates,
    /// No roll angle correlated against the matched view's signature.
    NoRollAngle,
}

// ── Configuration ───────────────────────────────────────────────────────────

/// Parameters for roll-angle correlation and peak selection.
#[derive(Debug, Clone, PartialEq)]
pub struct RollConfig {
    /// Maximum number of roll candidates kept per correlation. Default 5.
    pub max_candidates: usize,
    /// Keep only peaks scoring at least this fraction of the best peak.
    /// Default 0.8.
    pub min_peak_ratio: f32,
    /// Minimum circular separation between kept peaks, in degrees.
    /// Default 10.
    pub min_separation_deg: f32,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            max_candidates: 5,
            min_peak_ratio: 0.8,
            min_separation_deg: 10.0,
        }
    }
}

/// Parameters controlling per-cluster classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    /// Number of nearest descriptor neighbors to retrieve. Default 5.
    pub num_neighbors: usize,
    /// Roll correlation parameters.
    pub roll: RollConfig,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            num_neighbors: 5,
            roll: RollConfig::default(),
        }
    }
}

// ── Results ─────────────────────────────────────────────────────────────────

/// A labeled 6-DOF pose for one classified cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// Name of the matched object.
    pub label: String,
    /// Full rigid transform of the object in the sensor frame.
    pub pose: Pose,
    /// Recognition method tag, always `"sixdof"`.
    pub method: &'static str,
}

/// Full outcome of one classification attempt, including diagnostics.
#[derive(Debug, Clone)]
pub struct ClassifyResult {
    /// The labeled pose, present only on [`ClassifyStatus::Classified`].
    pub result: Option<ClassificationResult>,
    /// Best descriptor match, present once the index query found one.
    pub neighbor: Option<Neighbor>,
    /// Correlated roll angle in degrees, present on success.
    pub roll_deg: Option<f64>,
    /// Wall-clock time spent on this cluster, in milliseconds.
    pub classify_time_ms: f32,
    /// Outcome status.
    pub status: ClassifyStatus,
}

impl ClassifyResult {
    /// Create a failure result with the given status and elapsed time.
    pub(crate) fn failure(status: ClassifyStatus, classify_time_ms: f32) -> Self {
        Self {
            result: None,
            neighbor: None,
            roll_deg: None,
            classify_time_ms,
            status,
        }
    }
}

// ── Recognition context ─────────────────────────────────────────────────────

/// Immutable recognition state: the loaded view database, the descriptor
/// index built over it, and the feature extractor collaborator.
///
/// Built once at startup and then only read; every classification call
/// takes `&self`, so a context shares freely across request handling.
pub struct RecognitionContext {
    database: ViewDatabase,
    index: DescriptorIndex,
    extractor: Box<dyn FeatureExtractor>,
    config: RecognitionConfig,
}

impl RecognitionContext {
    /// Build a context over a loaded database.
    ///
    /// The descriptor index is built here, over the database's views in
    /// load order, so index positions and database positions agree. An
    /// empty database is valid; its context classifies nothing.
    pub fn new(
        database: ViewDatabase,
        extractor: Box<dyn FeatureExtractor>,
        config: RecognitionConfig,
    ) -> Self {
        let descriptors: Vec<Vec<f32>> = database
            .views
            .iter()
            .map(|v| v.descriptor.clone())
            .collect();
        let index = DescriptorIndex::build(&descriptors);
        Self {
            database,
            index,
            extractor,
            config,
        }
    }

    /// The loaded view database.
    pub fn database(&self) -> &ViewDatabase {
        &self.database
    }

    /// The descriptor index over the database.
    pub fn index(&self) -> &DescriptorIndex {
        &self.index
    }

    /// The active configuration.
    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }
}

//! Seams to the external perception collaborators.
//!
//! Descriptor math and scene segmentation live outside this crate (in
//! practice a PCL bridge or an equivalent library). The pipeline only
//! depends on these traits; implementations decide how normals,
//! descriptors and signatures are actually computed.

use crate::cloud::{NormalCloud, PointCloud};

/// Splits a raw scene cloud into candidate object clusters.
///
/// Returning an empty list means there is nothing to classify; it is not
/// an error. A returned `Err` skips the whole scene.
pub trait Segmenter {
    fn segment(&self, scene: &PointCloud) -> anyhow::Result<Vec<PointCloud>>;
}

/// Computes per-cluster features for matching.
///
/// Implementations must be deterministic for a given cloud and their own
/// configured parameters; the recognition results inherit whatever
/// repeatability the extractor provides.
pub trait FeatureExtractor {
    /// Estimate surface normals, index-aligned with the cloud.
    fn estimate_normals(&self, cloud: &PointCloud) -> anyhow::Result<NormalCloud>;

    /// Viewpoint-normalized global shape descriptor,
    /// [`DESCRIPTOR_LEN`](crate::DESCRIPTOR_LEN) components.
    fn global_descriptor(
        &self,
        cloud: &PointCloud,
        normals: &NormalCloud,
    ) -> anyhow::Result<Vec<f32>>;

    /// Rotational signature about the vertical axis through `centroid`,
    /// [`SIGNATURE_BINS`](crate::SIGNATURE_BINS) bins.
    fn roll_signature(
        &self,
        cloud: &PointCloud,
        normals: &NormalCloud,
        centroid: nalgebra::Vector4<f32>,
    ) -> anyhow::Result<Vec<f32>>;

    /// Legacy circular-projection descriptor, written by the dataset
    /// builder only. Extractors that never feed the builder can keep the
    /// default, which reports the format as unsupported.
    fn basic_descriptor(&self, _cloud: &PointCloud) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("basic descriptor not supported by this extractor")
    }
}

/// Numeric parameters for feature extraction, passed through to the
/// extractor untouched. Radii are in the cloud's metric units.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorParams {
    /// Neighborhood radius for normals and the basic descriptor.
    pub vfh_radius: f64,
    /// Neighborhood radius for normals feeding the global descriptor.
    pub cvfh_radius: f64,
    /// Vertical slice count of the basic circular projection.
    pub cph_vertical_bins: usize,
    /// Radial ring count of the basic circular projection.
    pub cph_radial_bins: usize,
}

impl Default for ExtractorParams {
    fn default() -> Self {
        Self {
            vfh_radius: 0.03,
            cvfh_radius: 0.03,
            cph_vertical_bins: 5,
            cph_radial_bins: 10,
        }
    }
}

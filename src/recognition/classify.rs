//! Per-cluster classification: extraction, candidate search, roll
//! correlation and pose synthesis.

use std::time::Instant;

use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3, Vector4};
use tracing::{debug, info, warn};

use crate::cloud::PointCloud;
use crate::extract::Segmenter;
use crate::view::View;

use super::roll;
use super::{ClassificationResult, ClassifyResult, ClassifyStatus, RecognitionContext};

impl RecognitionContext {
    /// Classify one segmented cluster.
    ///
    /// Never fails the caller: any unusable stage drops the cluster and
    /// reports how far it got in the returned status.
    pub fn classify_cluster(&self, cluster: &PointCloud) -> ClassifyResult {
        let start = Instant::now();

        // ── Descriptor extraction ──
        let normals = match self.extractor.estimate_normals(cluster) {
            Ok(normals) => normals,
            Err(err) => {
                warn!("normal estimation failed: {:#}", err);
                return ClassifyResult::failure(ClassifyStatus::ExtractionFailed, elapsed_ms(start));
            }
        };
        let descriptor = match self.extractor.global_descriptor(cluster, &normals) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                warn!("descriptor extraction failed: {:#}", err);
                return ClassifyResult::failure(ClassifyStatus::ExtractionFailed, elapsed_ms(start));
            }
        };

        // ── Candidate search ──
        let neighbors = self.index.query(&descriptor, self.config.num_neighbors);
        let Some(best) = neighbors.first().copied() else {
            debug!(
                "no descriptor candidates for cluster of {} points",
                cluster.len()
            );
            return ClassifyResult::failure(ClassifyStatus::NoCandidates, elapsed_ms(start));
        };
        let view = &self.database.views[best.index];

        // ── Roll correlation ──
        let centroid = cluster.centroid();
        let signature = match self.extractor.roll_signature(cluster, &normals, centroid) {
            Ok(signature) => signature,
            Err(err) => {
                warn!("signature extraction failed: {:#}", err);
                return ClassifyResult::failure(ClassifyStatus::ExtractionFailed, elapsed_ms(start));
            }
        };
        let candidates = roll::correlate(&signature, &view.signature, &self.config.roll);
        let Some(roll_best) = candidates.first() else {
            debug!("no roll angle correlated against '{}'", view.name);
            let mut result =
                ClassifyResult::failure(ClassifyStatus::NoRollAngle, elapsed_ms(start));
            result.neighbor = Some(best);
            return result;
        };
        for alt in &candidates[1..] {
            debug!(
                "alternate roll {:.1} deg (score {:.3}) for '{}'",
                alt.angle_deg, alt.score, view.name
            );
        }

        // ── Pose synthesis ──
        let pose = compose_pose(roll_best.angle_deg, view, centroid);
        debug!(
            "classified '{}' at roll {:.1} deg, descriptor distance {:.4}",
            view.name, roll_best.angle_deg, best.distance
        );

        ClassifyResult {
            result: Some(ClassificationResult {
                label: view.name.clone(),
                pose,
                method: "sixdof",
            }),
            neighbor: Some(best),
            roll_deg: Some(roll_best.angle_deg),
            classify_time_ms: elapsed_ms(start),
            status: ClassifyStatus::Classified,
        }
    }

    /// Segment a scene and classify every cluster independently.
    ///
    /// Per-cluster misses drop that cluster only. A segmentation failure
    /// or an empty segmentation yields an empty list.
    pub fn classify_scene(
        &self,
        scene: &PointCloud,
        segmenter: &dyn Segmenter,
    ) -> Vec<ClassificationResult> {
        let clusters = match segmenter.segment(scene) {
            Ok(clusters) => clusters,
            Err(err) => {
                warn!("segmentation failed: {:#}", err);
                return Vec::new();
            }
        };
        if clusters.is_empty() {
            info!("segmentation returned no clusters");
            return Vec::new();
        }

        clusters
            .iter()
            .filter_map(|cluster| self.classify_cluster(cluster).result)
            .collect()
    }
}

// ── Pose synthesis ──────────────────────────────────────────────────────────

/// Compose the final 6-DOF pose from the correlated roll angle, the
/// matched view's capture pose, and the query centroid.
///
/// The roll rotation applies about the vertical axis on top of the view's
/// capture rotation. Translations add component-wise: the stored centroid
/// locates the object in the view's frame, the query centroid locates the
/// cluster in the sensor frame.
fn compose_pose(roll_deg: f64, view: &View, query_centroid: Vector4<f32>) -> Matrix4<f64> {
    // A zero roll must wrap to the identity rotation.
    let roll_rad =
        (std::f64::consts::TAU - roll_deg.to_radians()).rem_euclid(std::f64::consts::TAU);
    let roll_rotation: Matrix3<f64> = *UnitQuaternion::from_axis_angle(&Vector3::z_axis(), roll_rad)
        .to_rotation_matrix()
        .matrix();
    let rotation = roll_rotation * view.pose_rotation();

    let view_centroid = view.centroid_vec();
    let mut pose = Matrix4::identity();
    pose.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
    pose[(0, 3)] = (query_centroid.x + view_centroid.x) as f64;
    pose[(1, 3)] = (query_centroid.y + view_centroid.y) as f64;
    pose[(2, 3)] = (query_centroid.z + view_centroid.z) as f64;
    pose
}

#[inline]
fn elapsed_ms(start: Instant) -> f32 {
    start.elapsed().as_secs_f32() * 1000.0
}

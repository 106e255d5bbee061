//! Shared test doubles: deterministic geometry-driven feature extraction
//! and canned segmenters, plus synthetic object clouds.
//!
//! `GeomExtractor` computes real features from the cloud's own geometry,
//! so rotating or translating a cluster changes its features the way a
//! real extractor's would: the descriptor is invariant to rigid motion in
//! the horizontal plane, and the rotational signature shifts with the
//! roll angle.

#![allow(dead_code)]

use nalgebra::{Vector3, Vector4};
use sixdof::{
    FeatureExtractor, Normal, NormalCloud, Point, PointCloud, Segmenter, View, DESCRIPTOR_LEN,
    SIGNATURE_BINS,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();
}

// ── Feature extraction double ───────────────────────────────────────────────

/// Deterministic feature extraction from cloud geometry alone.
///
/// The descriptor is a soft-binned histogram of point distances from the
/// centroid, normalized to unit mass: invariant under rotation about any
/// axis and under translation. The rotational signature is a soft-binned
/// azimuth histogram weighted by height above the centroid, so rotating
/// the cloud about the vertical axis shifts it circularly, and a cloud of
/// uniform height yields a flat signature.
pub struct GeomExtractor;

impl FeatureExtractor for GeomExtractor {
    fn estimate_normals(&self, cloud: &PointCloud) -> anyhow::Result<NormalCloud> {
        if cloud.len() < 3 {
            anyhow::bail!("degenerate cluster of {} points", cloud.len());
        }
        Ok(NormalCloud::from_normals(
            cloud
                .points
                .iter()
                .map(|_| Normal {
                    nx: 0.0,
                    ny: 0.0,
                    nz: 1.0,
                    curvature: 0.0,
                })
                .collect(),
        ))
    }

    fn global_descriptor(
        &self,
        cloud: &PointCloud,
        _normals: &NormalCloud,
    ) -> anyhow::Result<Vec<f32>> {
        let c = cloud.centroid();
        let center = Vector3::new(c.x, c.y, c.z);
        let dists: Vec<f64> = cloud
            .points
            .iter()
            .map(|p| (p.xyz() - center).norm() as f64)
            .collect();
        let max = dists.iter().fold(0.0f64, |a, &b| a.max(b));
        if max <= 0.0 {
            anyhow::bail!("all points coincide");
        }
        let mut hist = vec![0.0f32; DESCRIPTOR_LEN];
        for d in dists {
            let u = d / (max * 1.0001) * DESCRIPTOR_LEN as f64;
            let i0 = u.floor() as usize;
            let frac = u - i0 as f64;
            hist[i0] += (1.0 - frac) as f32;
            hist[(i0 + 1) % DESCRIPTOR_LEN] += frac as f32;
        }
        let total: f32 = hist.iter().sum();
        Ok(hist.iter().map(|v| v / total).collect())
    }

    fn roll_signature(
        &self,
        cloud: &PointCloud,
        _normals: &NormalCloud,
        centroid: Vector4<f32>,
    ) -> anyhow::Result<Vec<f32>> {
        let mut hist = vec![0.0f32; SIGNATURE_BINS];
        for p in &cloud.points {
            let az = ((p.y - centroid.y) as f64)
                .atan2((p.x - centroid.x) as f64)
                .rem_euclid(std::f64::consts::TAU);
            let u = az / std::f64::consts::TAU * SIGNATURE_BINS as f64;
            let i0 = (u.floor() as usize) % SIGNATURE_BINS;
            let frac = (u - u.floor()) as f32;
            let d = p.z - centroid.z;
            let w = d + d * d;
            hist[i0] += (1.0 - frac) * w;
            hist[(i0 + 1) % SIGNATURE_BINS] += frac * w;
        }
        Ok(hist)
    }
}

// ── Segmenter doubles ───────────────────────────────────────────────────────

/// Ignores the scene and returns a fixed set of clusters.
pub struct FixedSegmenter(pub Vec<PointCloud>);

impl Segmenter for FixedSegmenter {
    fn segment(&self, _scene: &PointCloud) -> anyhow::Result<Vec<PointCloud>> {
        Ok(self.0.clone())
    }
}

/// Always reports a segmentation backend failure.
pub struct FailingSegmenter;

impl Segmenter for FailingSegmenter {
    fn segment(&self, _scene: &PointCloud) -> anyhow::Result<Vec<PointCloud>> {
        anyhow::bail!("segmentation backend offline")
    }
}

// ── Synthetic objects ───────────────────────────────────────────────────────

fn shape_cloud<R, Z>(points: usize, radius: R, height: Z) -> PointCloud
where
    R: Fn(f64) -> f64,
    Z: Fn(f64) -> f64,
{
    let mut cloud = PointCloud::new();
    for i in 0..points {
        let phi = i as f64 * std::f64::consts::TAU / points as f64;
        let r = radius(phi);
        cloud.push(Point::new(
            (r * phi.cos()) as f32,
            (r * phi.sin()) as f32,
            height(phi) as f32,
        ));
    }
    cloud
}

/// Asymmetric lumpy object; radius and height both vary with azimuth, so
/// its rotational signature has one dominant peak.
pub fn cup_cloud() -> PointCloud {
    recentered(&shape_cloud(
        720,
        |phi| 1.0 + 0.35 * phi.cos() + 0.15 * (2.0 * phi + 0.7).sin(),
        |phi| 0.3 * phi.sin() + 0.12 * (2.0 * phi + 0.5).cos(),
    ))
}

/// A second object with a clearly different radial profile.
pub fn bowl_cloud() -> PointCloud {
    recentered(&shape_cloud(
        720,
        |phi| 0.6 + 0.2 * (3.0 * phi).sin(),
        |phi| 0.1 * phi.cos(),
    ))
}

/// Perfectly level circular ring: rotationally featureless, so its
/// signature comes out flat and roll correlation finds nothing.
pub fn ring_cloud() -> PointCloud {
    shape_cloud(360, |_| 1.0, |_| 0.0)
}

/// Shift a cloud so its centroid lands on the origin.
pub fn recentered(cloud: &PointCloud) -> PointCloud {
    let c = cloud.centroid();
    cloud.translated(Vector3::new(-c.x, -c.y, -c.z))
}

/// Rotate a cloud counterclockwise about the vertical axis.
pub fn rotated_z(cloud: &PointCloud, angle_deg: f64) -> PointCloud {
    let (s, c) = angle_deg.to_radians().sin_cos();
    PointCloud::from_points(
        cloud
            .points
            .iter()
            .map(|p| {
                let x = p.x as f64;
                let y = p.y as f64;
                Point::new((c * x - s * y) as f32, (s * x + c * y) as f32, p.z)
            })
            .collect(),
    )
}

// ── View construction ───────────────────────────────────────────────────────

pub fn identity_pose() -> [[f64; 4]; 4] {
    let mut pose = [[0.0; 4]; 4];
    for (i, row) in pose.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    pose
}

/// Build a database view the way the capture tool would: features come
/// from the extractor run on the reference cloud.
pub fn make_view(extractor: &GeomExtractor, name: &str, cloud: &PointCloud, pose: [[f64; 4]; 4]) -> View {
    let normals = extractor.estimate_normals(cloud).expect("reference cloud too small");
    let descriptor = extractor
        .global_descriptor(cloud, &normals)
        .expect("descriptor extraction failed");
    let signature = extractor
        .roll_signature(cloud, &normals, cloud.centroid())
        .expect("signature extraction failed");
    View::new(name.to_string(), descriptor, pose, signature, cloud.clone())
}

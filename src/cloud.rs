//! Point cloud storage types shared across the recognition pipeline.
//!
//! Clouds are stored as plain `f32` arrays so they serialize directly with
//! rkyv. Centroid accumulation runs in `f64` and converts back on return.

use rkyv::{Archive, Deserialize, Serialize};

/// A single 3-D point.
#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Position as a nalgebra vector.
    pub fn xyz(&self) -> nalgebra::Vector3<f32> {
        nalgebra::Vector3::new(self.x, self.y, self.z)
    }
}

/// An unorganized 3-D point cloud.
///
/// Used both for segmented query clusters (ephemeral, one classification
/// call) and for the reference clouds stored with each database view.
#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<Point>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Homogeneous centroid of the cloud (`w` = 1).
    ///
    /// An empty cloud yields the origin rather than NaN.
    pub fn centroid(&self) -> nalgebra::Vector4<f32> {
        if self.points.is_empty() {
            return nalgebra::Vector4::new(0.0, 0.0, 0.0, 1.0);
        }
        let mut sum = [0.0f64; 3];
        for p in &self.points {
            sum[0] += p.x as f64;
            sum[1] += p.y as f64;
            sum[2] += p.z as f64;
        }
        let n = self.points.len() as f64;
        nalgebra::Vector4::new(
            (sum[0] / n) as f32,
            (sum[1] / n) as f32,
            (sum[2] / n) as f32,
            1.0,
        )
    }

    /// A copy of the cloud rigidly shifted by `offset`.
    pub fn translated(&self, offset: nalgebra::Vector3<f32>) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| Point::new(p.x + offset.x, p.y + offset.y, p.z + offset.z))
                .collect(),
        }
    }
}

/// A per-point surface normal with the local curvature estimate.
#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
pub struct Normal {
    pub nx: f32,
    pub ny: f32,
    pub nz: f32,
    pub curvature: f32,
}

/// Surface normals for a cloud, index-aligned with the cloud's points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalCloud {
    pub normals: Vec<Normal>,
}

impl NormalCloud {
    pub fn new() -> Self {
        Self {
            normals: Vec::new(),
        }
    }

    pub fn from_normals(normals: Vec<Normal>) -> Self {
        Self { normals }
    }

    pub fn len(&self) -> usize {
        self.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_of_symmetric_cloud() {
        let cloud = PointCloud::from_points(vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(-1.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 4.0),
            Point::new(0.0, -2.0, -4.0),
        ]);
        let c = cloud.centroid();
        assert_eq!(c, nalgebra::Vector4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn centroid_of_empty_cloud_is_origin() {
        let cloud = PointCloud::new();
        assert_eq!(cloud.centroid(), nalgebra::Vector4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn translated_shifts_centroid() {
        let cloud = PointCloud::from_points(vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 2.0, 2.0),
        ]);
        let moved = cloud.translated(nalgebra::Vector3::new(1.0, -1.0, 0.5));
        let c = moved.centroid();
        assert!((c.x - 2.0).abs() < 1e-6);
        assert!((c.y - 0.0).abs() < 1e-6);
        assert!((c.z - 1.5).abs() < 1e-6);
    }
}

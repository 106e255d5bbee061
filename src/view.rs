//! A single stored training observation of a known object.

use rkyv::{Archive, Deserialize, Serialize};

use crate::PointCloud;

/// Number of components in a global shape descriptor.
pub const DESCRIPTOR_LEN: usize = 308;

/// Number of bins in a rotational signature histogram.
pub const SIGNATURE_BINS: usize = 90;

/// One captured view of a known object: its shape descriptor, the raw
/// reference cloud, the rigid transform recorded at capture time, and the
/// rotational signature used for roll disambiguation.
///
/// Pose is stored row-major in `f64`; descriptors and signatures stay in
/// `f32` as captured. The centroid is derived from the pose translation
/// column at construction, so the two can never disagree.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
pub struct View {
    /// Object identifier shared by all views of the same object.
    pub name: String,
    /// Viewpoint-normalized shape descriptor, `DESCRIPTOR_LEN` components.
    pub descriptor: Vec<f32>,
    /// Row-major 4x4 rigid transform recorded when the view was captured.
    pub pose: [[f64; 4]; 4],
    /// Homogeneous centroid at capture time, equal to the pose translation.
    pub centroid: [f32; 4],
    /// Circular histogram of shape variation about the vertical axis,
    /// `SIGNATURE_BINS` bins over 360 degrees.
    pub signature: Vec<f32>,
    /// Raw captured reference cloud.
    pub cloud: PointCloud,
}

impl View {
    /// Assemble a view, deriving the centroid from the pose translation column.
    pub fn new(
        name: String,
        descriptor: Vec<f32>,
        pose: [[f64; 4]; 4],
        signature: Vec<f32>,
        cloud: PointCloud,
    ) -> Self {
        let centroid = [
            pose[0][3] as f32,
            pose[1][3] as f32,
            pose[2][3] as f32,
            pose[3][3] as f32,
        ];
        Self {
            name,
            descriptor,
            pose,
            centroid,
            signature,
            cloud,
        }
    }

    /// Capture pose as a nalgebra matrix.
    pub fn pose_matrix(&self) -> nalgebra::Matrix4<f64> {
        nalgebra::Matrix4::from_fn(|r, c| self.pose[r][c])
    }

    /// Rotation block of the capture pose.
    pub fn pose_rotation(&self) -> nalgebra::Matrix3<f64> {
        nalgebra::Matrix3::from_fn(|r, c| self.pose[r][c])
    }

    /// Capture centroid as a homogeneous vector.
    pub fn centroid_vec(&self) -> nalgebra::Vector4<f32> {
        nalgebra::Vector4::from_column_slice(&self.centroid)
    }
}

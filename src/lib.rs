//! # sixdof
//!
//! View-based **6-DOF pose recognition** for rigid objects from segmented
//! 3-D point-cloud clusters.
//!
//! Given a cluster cut out of a depth-sensor scene, `sixdof` identifies
//! which known object it most resembles and recovers the object's full
//! position and orientation relative to the sensor. Objects are known
//! through a database of captured views: per-view shape descriptors,
//! reference clouds, capture poses and rotational signatures, produced
//! offline by the dataset builder.
//!
//! ## Features
//!
//! - **View matching** — global shape descriptors index captured object
//!   views; an exact nearest-neighbor search keeps results deterministic
//! - **Roll disambiguation** — circular correlation of rotational
//!   signatures upgrades a descriptor match to a full 6-DOF pose
//! - **Partial-failure tolerant** — broken artifacts and unclassifiable
//!   clusters are skipped and logged, never fatal
//! - **Fast startup** — a loaded database serializes with
//!   [rkyv](https://docs.rs/rkyv) into a single cache file
//! - **Pluggable perception** — segmentation and descriptor math stay
//!   behind traits, so any PCL-like backend can drive the pipeline
//!
//! ## Example
//!
//! ```no_run
//! use sixdof::{RecognitionConfig, RecognitionContext, ViewDatabase};
//!
//! # struct Bridge;
//! # impl sixdof::FeatureExtractor for Bridge {
//! #     fn estimate_normals(&self, _: &sixdof::PointCloud) -> anyhow::Result<sixdof::NormalCloud> { todo!() }
//! #     fn global_descriptor(&self, _: &sixdof::PointCloud, _: &sixdof::NormalCloud) -> anyhow::Result<Vec<f32>> { todo!() }
//! #     fn roll_signature(&self, _: &sixdof::PointCloud, _: &sixdof::NormalCloud, _: sixdof::Centroid) -> anyhow::Result<Vec<f32>> { todo!() }
//! # }
//! // Load the persisted views for the objects this deployment knows.
//! let known = vec!["cup".to_string(), "bowl".to_string()];
//! let db = ViewDatabase::load_directory("data/views/sixdof", &known).unwrap();
//!
//! // Build the immutable recognition context once at startup; `Bridge`
//! // is whatever computes descriptors in your deployment.
//! let context = RecognitionContext::new(db, Box::new(Bridge), RecognitionConfig::default());
//!
//! // Classify a segmented cluster.
//! # let cluster = sixdof::PointCloud::new();
//! let outcome = context.classify_cluster(&cluster);
//! if let Some(result) = outcome.result {
//!     println!("{} at\n{}", result.label, result.pose);
//! }
//! ```
//!
//! ## Pipeline overview
//!
//! 1. **Extraction** — the collaborator computes the query cluster's
//!    global shape descriptor (308 components) and rotational signature
//!    (90-bin circular histogram)
//! 2. **Candidate search** — the descriptor index returns the k nearest
//!    stored views by Euclidean distance
//! 3. **Roll correlation** — the query signature correlates against the
//!    best view's signature over all circular shifts; peaks become
//!    candidate roll angles
//! 4. **Pose synthesis** — the best roll angle rotates the view's capture
//!    pose about the vertical axis, and the query and view centroids sum
//!    into the final translation
//!
//! ## References
//!
//! - R. B. Rusu, G. Bradski, R. Thibaux, J. Hsu, "Fast 3D Recognition and
//!   Pose Using the Viewpoint Feature Histogram," IROS 2010
//! - A. Aldoma et al., "CAD-Model Recognition and 6DOF Pose Estimation
//!   Using 3D Cues," ICCV Workshops 2011

pub mod artifacts;
pub mod capture;
pub mod cloud;
pub mod descriptor_index;
pub mod extract;
pub mod recognition;
pub mod view;

pub use artifacts::ArtifactError;
pub use capture::{SaveOptions, ViewWriter};
pub use cloud::{Normal, NormalCloud, Point, PointCloud};
pub use descriptor_index::{DescriptorIndex, Neighbor};
pub use extract::{ExtractorParams, FeatureExtractor, Segmenter};
pub use recognition::database::ViewDatabase;
pub use recognition::{
    ClassificationResult, ClassifyResult, ClassifyStatus, RecognitionConfig, RecognitionContext,
    RollConfig,
};
pub use view::{View, DESCRIPTOR_LEN, SIGNATURE_BINS};

// Commonly used types
// Note: descriptors, signatures and clouds stay in 32-bit floats as
// captured. Pose composition switches to 64-bit; chained f32 rotation
// products lose accuracy faster than downstream consumers tolerate.
pub type Pose = nalgebra::Matrix4<f64>;
pub type Rotation = nalgebra::Matrix3<f64>;
pub type Centroid = nalgebra::Vector4<f32>;

//! Offline dataset builder: computes and persists per-view artifacts.
//!
//! `ViewWriter` is the capture-side counterpart of the database loader.
//! Given a segmented cluster of a known object on the capture rig, it
//! computes the selected descriptor families and writes them under the
//! output directory using the `<name>_<angle>` naming scheme. The
//! `sixdof/` subdirectory receives the complete artifact set the
//! recognition database loads.

use std::path::{Path, PathBuf};

use nalgebra::Vector3;
use tracing::{info, warn};

use crate::artifacts::{mat4, pcd};
use crate::cloud::PointCloud;
use crate::extract::FeatureExtractor;
use crate::Pose;

/// Artifact families the writer produces per captured view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Raw cloud, `<name>_<angle>.pcd`.
    pub save_cloud: bool,
    /// Legacy circular-projection descriptor, `<name>_<angle>.cph`.
    pub save_basic: bool,
    /// Global shape descriptor on its own, `<name>_<angle>.cvfh`.
    pub save_descriptor: bool,
    /// Complete loadable view set under `sixdof/`: descriptor,
    /// signature, capture pose and cloud.
    pub save_sixdof: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            save_cloud: true,
            save_basic: false,
            save_descriptor: true,
            save_sixdof: true,
        }
    }
}

impl SaveOptions {
    fn any(&self) -> bool {
        self.save_cloud || self.save_basic || self.save_descriptor || self.save_sixdof
    }
}

/// Writes captured views to disk as artifact files.
pub struct ViewWriter {
    out_dir: PathBuf,
    options: SaveOptions,
    table_center: Option<[f32; 3]>,
}

impl ViewWriter {
    pub fn new<P: AsRef<Path>>(out_dir: P, options: SaveOptions) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
            options,
            table_center: None,
        }
    }

    /// Reference point subtracted from every captured cluster, typically
    /// the center of the capture table, so stored measurements are
    /// relative to it.
    pub fn with_table_center(mut self, center: [f32; 3]) -> Self {
        self.table_center = Some(center);
        self
    }

    /// Compute and persist the selected artifact families for one
    /// captured cluster.
    ///
    /// `angle_deg` distinguishes views of the same object and becomes the
    /// file-name suffix; `pose` is the rig transform recorded for this
    /// view, stored with the sixdof set. Returns the files written. With
    /// every family disabled this warns and writes nothing, which is not
    /// an error.
    pub fn write_view(
        &self,
        extractor: &dyn FeatureExtractor,
        cluster: &PointCloud,
        name: &str,
        angle_deg: u32,
        pose: &Pose,
    ) -> anyhow::Result<Vec<PathBuf>> {
        if !self.options.any() {
            warn!("all artifact families disabled, not saving view '{}'", name);
            return Ok(Vec::new());
        }

        let cluster = match self.table_center {
            Some([x, y, z]) => cluster.translated(Vector3::new(-x, -y, -z)),
            None => cluster.clone(),
        };
        let base = format!("{name}_{angle_deg}");
        let mut written = Vec::new();

        if self.options.save_cloud {
            let path = self.out_dir.join(format!("{base}.pcd"));
            pcd::write_point_cloud(&path, &cluster)?;
            written.push(path);
        }
        if self.options.save_basic {
            let basic = extractor.basic_descriptor(&cluster)?;
            let path = self.out_dir.join(format!("{base}.cph"));
            pcd::write_histogram(&path, "cph", &basic)?;
            written.push(path);
        }

        // The remaining families share the global descriptor.
        if self.options.save_descriptor || self.options.save_sixdof {
            let normals = extractor.estimate_normals(&cluster)?;
            let descriptor = extractor.global_descriptor(&cluster, &normals)?;

            if self.options.save_descriptor {
                let path = self.out_dir.join(format!("{base}.cvfh"));
                pcd::write_histogram(&path, "vfh", &descriptor)?;
                written.push(path);
            }
            if self.options.save_sixdof {
                let signature =
                    extractor.roll_signature(&cluster, &normals, cluster.centroid())?;
                let dir = self.out_dir.join("sixdof");
                std::fs::create_dir_all(&dir)?;

                let descriptor_path = dir.join(format!("{base}.cvfh"));
                pcd::write_histogram(&descriptor_path, "vfh", &descriptor)?;
                written.push(descriptor_path);

                let signature_path = dir.join(format!("{base}.crh"));
                pcd::write_histogram(&signature_path, "crh", &signature)?;
                written.push(signature_path);

                let pose_path = dir.join(format!("{base}.mat4"));
                mat4::write_matrix(&pose_path, &pose_rows(pose))?;
                written.push(pose_path);

                let cloud_path = dir.join(format!("{base}.pcd"));
                pcd::write_point_cloud(&cloud_path, &cluster)?;
                written.push(cloud_path);
            }
        }

        info!("Saved {} artifact file(s) for view '{}'", written.len(), base);
        Ok(written)
    }
}

fn pose_rows(pose: &Pose) -> [[f64; 4]; 4] {
    let mut rows = [[0.0f64; 4]; 4];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = pose[(r, c)];
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::NormalCloud;

    struct UnusedExtractor;

    impl FeatureExtractor for UnusedExtractor {
        fn estimate_normals(&self, _cloud: &PointCloud) -> anyhow::Result<NormalCloud> {
            unreachable!("extractor must not run with all families disabled")
        }

        fn global_descriptor(
            &self,
            _cloud: &PointCloud,
            _normals: &NormalCloud,
        ) -> anyhow::Result<Vec<f32>> {
            unreachable!()
        }

        fn roll_signature(
            &self,
            _cloud: &PointCloud,
            _normals: &NormalCloud,
            _centroid: nalgebra::Vector4<f32>,
        ) -> anyhow::Result<Vec<f32>> {
            unreachable!()
        }
    }

    #[test]
    fn disabled_families_warn_and_write_nothing() {
        let options = SaveOptions {
            save_cloud: false,
            save_basic: false,
            save_descriptor: false,
            save_sixdof: false,
        };
        let writer = ViewWriter::new("does-not-exist", options);
        let written = writer
            .write_view(
                &UnusedExtractor,
                &PointCloud::new(),
                "cup",
                0,
                &Pose::identity(),
            )
            .unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn pose_rows_are_row_major() {
        let mut pose = Pose::identity();
        pose[(0, 3)] = 7.0;
        pose[(2, 1)] = -3.0;
        let rows = pose_rows(&pose);
        assert_eq!(rows[0][3], 7.0);
        assert_eq!(rows[2][1], -3.0);
        assert_eq!(rows[3][3], 1.0);
    }
}

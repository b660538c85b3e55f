use std::fs;
use std::path::Path;

use pilesim_core::{vec3, Scalar, Vec3};
use pilesim_materials::FrictMat;
use serde::{Deserialize, Serialize};

use crate::{IoError, IoResult};

/// Run configuration. Written verbatim to `initial_parameters.json`; any subset of keys can be
/// loaded back, the rest fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialParameters {
    /// Provisional; the pile geometry decides the real height.
    pub pile_radius: Scalar,
    pub pile_height: Scalar,
    pub pile_insertion_velocity: Scalar,
    /// Also used as the sphere radius when generating the pack.
    pub sphere_diameter_mean: Scalar,
    /// Relative radius fuzz of the generated pack.
    pub sphere_diameter_std_dev: Scalar,
    pub sphere_pack_initial_height: Scalar,
    pub base_box_height_ratio_to_mean_diameter: Scalar,
    pub simulation_box_width: Scalar,
    pub flag_import_existing_pack_file: bool,
    pub flag_import_heavy_stl_model: bool,
    /// Use `contact_material` for every body instead of the engine default material.
    pub manual_contact_model: bool,
    #[serde(alias = "flag_output_VTK")]
    pub flag_output_snapshots: bool,
    /// Recorded for reference; the controller is evaluated every step.
    pub check_state_iter_interval: u64,
    pub export_data_iter_interval: u64,
    pub local_voxel_of_interest: Vec<Scalar>,
    pub contact_material: FrictMat,
}

impl Default for InitialParameters {
    fn default() -> Self {
        Self {
            pile_radius: 0.125,
            pile_height: 1.0,
            pile_insertion_velocity: -0.2,
            sphere_diameter_mean: 0.0025,
            sphere_diameter_std_dev: 0.0,
            sphere_pack_initial_height: 0.5,
            base_box_height_ratio_to_mean_diameter: 5.0,
            simulation_box_width: 0.04,
            flag_import_existing_pack_file: false,
            flag_import_heavy_stl_model: false,
            manual_contact_model: true,
            flag_output_snapshots: true,
            check_state_iter_interval: 50,
            export_data_iter_interval: 100,
            local_voxel_of_interest: Vec::new(),
            contact_material: FrictMat::default(),
        }
    }
}

/// Geometry derived from the parameters before anything is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub base_box_height: Scalar,
    pub lower_bound: Scalar,
    pub lower_y: Scalar,
    pub upper_bound: Scalar,
    pub upper_y: Scalar,
    /// Where the lowest point of the pile model goes.
    pub pile_origin: Vec3,
    /// Initial cell height; replaced once the pile is measured.
    pub cell_height: Scalar,
    /// Informational lowest pile position.
    pub pause_pile_y: Scalar,
}

impl Layout {
    pub fn cloud_min(&self) -> Vec3 { vec3(self.lower_bound, self.lower_y, self.lower_bound) }
    pub fn cloud_max(&self) -> Vec3 { vec3(self.upper_bound, self.upper_y, self.upper_bound) }
}

impl InitialParameters {
    pub fn layout(&self) -> Layout {
        let d = self.sphere_diameter_mean;
        let w = self.simulation_box_width;
        let base = d * self.base_box_height_ratio_to_mean_diameter;
        let lower_y = 2.0 * d + base / 2.0;
        let upper_y = lower_y + self.sphere_pack_initial_height - d;
        let pile_y = upper_y + d + self.pile_radius;
        Layout {
            base_box_height: base,
            lower_bound: d,
            lower_y,
            upper_bound: w - d,
            upper_y,
            pile_origin: vec3(w / 2.0, pile_y, w / 2.0),
            cell_height: (pile_y + self.pile_height + self.pile_radius).ceil(),
            pause_pile_y: base / 2.0 + self.pile_radius + d,
        }
    }

    /// Base box centre and half extents. The box is wider than the cell on purpose so it
    /// always overlaps every sphere column.
    pub fn base_box(&self) -> (Vec3, Vec3) {
        let w = self.simulation_box_width;
        let base = self.layout().base_box_height;
        (vec3(w / 2.0, 0.0, w / 2.0), vec3(2.0 * w, base / 2.0, 2.0 * w))
    }

    /// Material every body gets.
    pub fn material(&self) -> FrictMat {
        if self.manual_contact_model { self.contact_material } else { FrictMat::default() }
    }

    pub fn validate(&self) -> IoResult<()> {
        let d = self.sphere_diameter_mean;
        if !(d > 0.0) {
            return Err(IoError::invalid_content(format!("sphere_diameter_mean must be positive, got {d}")));
        }
        if !(self.simulation_box_width > 2.0 * d) {
            return Err(IoError::invalid_content("simulation_box_width must exceed two mean diameters"));
        }
        if self.export_data_iter_interval == 0 {
            return Err(IoError::invalid_content("export_data_iter_interval must be at least 1"));
        }
        if !(self.sphere_diameter_std_dev >= 0.0 && self.sphere_diameter_std_dev < 1.0) {
            return Err(IoError::invalid_content("sphere_diameter_std_dev must lie in [0, 1)"));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> IoResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| IoError::open(path, e))?;
        let p: Self = serde_json::from_str(&text)?;
        p.validate()?;
        Ok(p)
    }

    /// Pretty JSON, four-space indent.
    pub fn write_json(&self, path: &Path) -> IoResult<()> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        fs::write(path, buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_layout() {
        let p = InitialParameters::default();
        let l = p.layout();
        assert_relative_eq!(l.base_box_height, 0.0125, epsilon = 1e-15);
        assert_relative_eq!(l.lower_y, 0.01125, epsilon = 1e-15);
        assert_relative_eq!(l.upper_bound, 0.0375, epsilon = 1e-15);
        assert_relative_eq!(l.upper_y, 0.50875, epsilon = 1e-12);
        assert_relative_eq!(l.pile_origin.y, 0.63625, epsilon = 1e-12);
        assert_eq!(l.pile_origin.x, 0.02);
        assert_eq!(l.cell_height, 2.0);
        let (c, h) = p.base_box();
        assert_eq!(c, vec3(0.02, 0.0, 0.02));
        assert_relative_eq!(h.x, 0.08);
        assert_relative_eq!(h.y, 0.00625, epsilon = 1e-15);
    }

    #[test]
    fn json_roundtrip_and_legacy_key() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("initial_parameters.json");
        let p = InitialParameters { export_data_iter_interval: 10, ..Default::default() };
        p.write_json(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"pile_radius\": 0.125"));
        assert_eq!(InitialParameters::load(&path).unwrap(), p);

        fs::write(&path, r#"{ "flag_output_VTK": false, "sphere_diameter_mean": 0.003 }"#).unwrap();
        let q = InitialParameters::load(&path).unwrap();
        assert!(!q.flag_output_snapshots);
        assert_eq!(q.sphere_diameter_mean, 0.003);
        assert_eq!(q.export_data_iter_interval, 100);
    }

    #[test]
    fn rejects_bad_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("p.json");
        fs::write(&path, r#"{ "export_data_iter_interval": 0 }"#).unwrap();
        assert!(matches!(InitialParameters::load(&path), Err(IoError::InvalidContent { .. })));
        assert!(matches!(InitialParameters::load(&tmp.path().join("missing.json")), Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn default_material_when_not_manual() {
        let p = InitialParameters {
            manual_contact_model: false,
            contact_material: FrictMat { young: 5.0e6, ..FrictMat::default() },
            ..Default::default()
        };
        assert_eq!(p.material(), FrictMat::default());
    }
}

use pilesim_core::{Scalar, Vec3};
use crate::FrictPhys;

/// Forces acting on the second body of a contact; the first body receives the negation.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ContactForces {
    pub normal: Vec3,
    pub shear: Vec3,
    pub sliding: bool,
}

impl ContactForces {
    #[inline] pub fn total(&self) -> Vec3 { self.normal + self.shear }
}

/// Linear-elastic normal spring plus incremental Coulomb-capped shear spring.
///
/// `n` is the unit normal pointing from the first body to the second, `un > 0` the overlap,
/// `prev_shear` the shear force carried from the previous step and `dus` the tangential
/// relative displacement of the second body over this step.
pub fn cundall_strack(phys: &FrictPhys, n: Vec3, un: Scalar, prev_shear: Vec3, dus: Vec3) -> ContactForces {
    let fn_mag = phys.kn * un.max(0.0);
    let normal = n * fn_mag;

    // rotate the old shear into the current tangent plane, keeping its magnitude
    let mut shear = prev_shear - n * prev_shear.dot(n);
    let old_len = prev_shear.length();
    let new_len = shear.length();
    if new_len > 0.0 { shear *= old_len / new_len; }

    shear -= (dus - n * dus.dot(n)) * phys.ks;

    let cap = fn_mag * phys.tan_phi;
    let s = shear.length();
    let sliding = s > cap;
    if sliding {
        shear = if s > 0.0 { shear * (cap / s) } else { Vec3::ZERO };
    }
    ContactForces { normal, shear, sliding }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilesim_core::vec3;
    use approx::assert_relative_eq;

    fn phys() -> FrictPhys { FrictPhys { kn: 1.0e6, ks: 2.5e5, tan_phi: 0.5 } }

    #[test]
    fn normal_spring() {
        let f = cundall_strack(&phys(), Vec3::Y, 1.0e-4, Vec3::ZERO, Vec3::ZERO);
        assert_relative_eq!(f.normal.y, 100.0, max_relative = 1e-12);
        assert_eq!(f.shear, Vec3::ZERO);
        assert!(!f.sliding);
    }

    #[test]
    fn shear_capped_by_coulomb() {
        let f = cundall_strack(&phys(), Vec3::Y, 1.0e-4, Vec3::ZERO, vec3(1.0e-3, 0.0, 0.0));
        assert!(f.sliding);
        assert_relative_eq!(f.shear.length(), 50.0, max_relative = 1e-12);
        assert!(f.shear.x < 0.0);
    }

    #[test]
    fn elastic_shear_accumulates() {
        let p = phys();
        let f1 = cundall_strack(&p, Vec3::Y, 1.0e-4, Vec3::ZERO, vec3(1.0e-5, 0.0, 0.0));
        let f2 = cundall_strack(&p, Vec3::Y, 1.0e-4, f1.shear, vec3(1.0e-5, 0.0, 0.0));
        assert_relative_eq!(f1.shear.x, -2.5, max_relative = 1e-12);
        assert_relative_eq!(f2.shear.x, -5.0, max_relative = 1e-12);
        assert!(!f2.sliding);
    }

    #[test]
    fn normal_component_of_displacement_ignored() {
        let f = cundall_strack(&phys(), Vec3::Y, 1.0e-4, Vec3::ZERO, vec3(0.0, 1.0, 0.0));
        assert_eq!(f.shear, Vec3::ZERO);
    }
}

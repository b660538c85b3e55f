pub mod law;

use pilesim_core::Scalar;
use serde::{Deserialize, Serialize};

pub use law::{cundall_strack, ContactForces};

/// Elastic-frictional material. Units in SI; `poisson` is the shear-to-normal stiffness ratio
/// and `friction_angle` is in radians.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrictMat {
    pub density: Scalar,
    pub young: Scalar,
    pub poisson: Scalar,
    pub friction_angle: Scalar,
}

impl Default for FrictMat {
    fn default() -> Self {
        Self { density: 1000.0, young: 1.0e9, poisson: 0.25, friction_angle: 0.5 }
    }
}

impl FrictMat {
    /// Compression wave speed `sqrt(E / rho)`.
    #[inline] pub fn p_wave_speed(&self) -> Scalar { (self.young / self.density).sqrt() }
}

/// Pair properties the contact law runs on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrictPhys {
    pub kn: Scalar,
    pub ks: Scalar,
    pub tan_phi: Scalar,
}

/// Mix two materials for a contact with reference radii `ra` and `rb`.
/// Stiffnesses are springs in series; friction takes the weaker side.
pub fn frict_phys(a: &FrictMat, ra: Scalar, b: &FrictMat, rb: Scalar) -> FrictPhys {
    let (ea, eb) = (a.young * ra, b.young * rb);
    let kn = 2.0 * ea * eb / (ea + eb);
    let (sa, sb) = (ea * a.poisson, eb * b.poisson);
    let ks = if sa + sb > 0.0 { 2.0 * sa * sb / (sa + sb) } else { 0.0 };
    let tan_phi = a.friction_angle.min(b.friction_angle).tan();
    FrictPhys { kn, ks, tan_phi }
}

/// Stable time step estimate for a sphere of radius `r`.
#[inline]
pub fn p_wave_time_step(mat: &FrictMat, r: Scalar) -> Scalar { r / mat.p_wave_speed() }

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn symmetry() {
        let a = FrictMat { young: 5.0e8, poisson: 0.3, friction_angle: 0.4, ..FrictMat::default() };
        let b = FrictMat::default();
        let p1 = frict_phys(&a, 0.002, &b, 0.003);
        let p2 = frict_phys(&b, 0.003, &a, 0.002);
        assert_relative_eq!(p1.kn, p2.kn, max_relative = 1e-12);
        assert_relative_eq!(p1.ks, p2.ks, max_relative = 1e-12);
        assert_relative_eq!(p1.tan_phi, 0.4f64.tan());
    }

    #[test]
    fn identical_spheres() {
        let m = FrictMat::default();
        let p = frict_phys(&m, 0.0025, &m, 0.0025);
        assert_relative_eq!(p.kn, m.young * 0.0025, max_relative = 1e-12);
        assert_relative_eq!(p.ks, p.kn * m.poisson, max_relative = 1e-12);
    }

    #[test]
    fn time_step() {
        let m = FrictMat::default();
        assert_relative_eq!(p_wave_time_step(&m, 0.0025), 0.0025 / 1000.0, max_relative = 1e-12);
    }
}

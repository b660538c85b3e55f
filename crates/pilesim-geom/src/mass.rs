use pilesim_core::Scalar;

#[derive(Copy, Clone, Debug)]
pub struct MassProps {
    pub mass: Scalar,
    pub inv_mass: Scalar,
    /// Scalar moment of inertia; spheres are isotropic.
    pub inertia: Scalar,
    pub inv_inertia: Scalar,
}

impl MassProps {
    pub fn infinite() -> Self {
        Self { mass: Scalar::INFINITY, inv_mass: 0.0, inertia: Scalar::INFINITY, inv_inertia: 0.0 }
    }

    pub fn from_sphere(radius: Scalar, density: Scalar) -> Self {
        let vol = (4.0/3.0) * core::f64::consts::PI * radius*radius*radius;
        let m = density * vol;
        let ii = 0.4 * m * radius * radius;
        Self { mass: m, inv_mass: 1.0/m, inertia: ii, inv_inertia: 1.0/ii }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sphere_mass() {
        let m = MassProps::from_sphere(0.5, 1000.0);
        assert_relative_eq!(m.mass, 1000.0 * core::f64::consts::PI / 6.0, max_relative = 1e-12);
        assert_relative_eq!(m.inertia, 0.4 * m.mass * 0.25, max_relative = 1e-12);
        assert_eq!(MassProps::infinite().inv_mass, 0.0);
    }
}

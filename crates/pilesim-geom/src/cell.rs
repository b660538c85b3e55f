use pilesim_core::{Scalar, Vec3, vec3};

/// Axis-aligned simulation cell with optional periodicity per axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PeriodicCell {
    pub size: Vec3,
    pub periodic: [bool; 3],
}

impl PeriodicCell {
    /// Periodic along x and z, bounded along the vertical y axis.
    pub fn periodic_xz(width: Scalar, height: Scalar) -> Self {
        Self { size: vec3(width, height, width), periodic: [true, false, true] }
    }

    pub fn set_height(&mut self, h: Scalar) { self.size.y = h; }

    /// Map a point back into `[0, L)` on every periodic axis.
    pub fn wrap(&self, p: Vec3) -> Vec3 {
        let mut q = p;
        for k in 0..3 {
            if self.periodic[k] && self.size[k] > 0.0 {
                q[k] = p[k].rem_euclid(self.size[k]);
            }
        }
        q
    }

    #[inline]
    pub fn min_image_axis(&self, d: Scalar, k: usize) -> Scalar {
        if !self.periodic[k] || self.size[k] <= 0.0 { return d; }
        let l = self.size[k];
        d - l * (d / l).round()
    }

    /// Shortest separation vector between two points under the periodic images.
    pub fn min_image(&self, d: Vec3) -> Vec3 {
        vec3(self.min_image_axis(d.x, 0), self.min_image_axis(d.y, 1), self.min_image_axis(d.z, 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wrap_and_min_image() {
        let c = PeriodicCell::periodic_xz(0.04, 1.0);
        let p = c.wrap(vec3(-0.01, 2.0, 0.05));
        assert_relative_eq!(p.x, 0.03, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0);
        assert_relative_eq!(p.z, 0.01, epsilon = 1e-12);

        let d = c.min_image(vec3(0.035, 0.5, -0.03));
        assert_relative_eq!(d.x, -0.005, epsilon = 1e-12);
        assert_relative_eq!(d.y, 0.5);
        assert_relative_eq!(d.z, 0.01, epsilon = 1e-12);
    }
}

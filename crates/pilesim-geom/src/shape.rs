use pilesim_core::types::Vec3;
use pilesim_core::Scalar;
use crate::aabb::Aabb;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere { r: Scalar },
    /// Axis-aligned box given by half extents.
    Box { hx: Scalar, hy: Scalar, hz: Scalar },
    /// Triangle; vertices are relative to the body position (the centroid).
    Facet { v: [Vec3; 3] },
}

impl Shape {
    #[inline] pub fn is_sphere(&self) -> bool { matches!(self, Shape::Sphere { .. }) }
    #[inline] pub fn radius(&self) -> Option<Scalar> {
        match *self { Shape::Sphere { r } => Some(r), _ => None }
    }
}

#[inline]
pub fn aabb_of(shape: &Shape, pos: Vec3) -> Aabb {
    match *shape {
        Shape::Sphere { r } => Aabb::from_center_half_extents(pos, Vec3::splat(r)),
        Shape::Box { hx, hy, hz } => Aabb::from_center_half_extents(pos, Vec3::new(hx, hy, hz)),
        Shape::Facet { v } => {
            let mn = v[0].min(v[1]).min(v[2]);
            let mx = v[0].max(v[1]).max(v[2]);
            Aabb::new(pos + mn, pos + mx)
        }
    }
}

/// Closest point to `p` on triangle `abc` (Voronoi-region walk).
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 { return a; }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 { return b; }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 { return c; }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilesim_core::vec3;
    use approx::assert_relative_eq;

    #[test]
    fn closest_point_regions() {
        let (a, b, c) = (vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(0.0, 0.0, 1.0));
        // above the face
        let q = closest_point_on_triangle(vec3(0.2, 1.0, 0.2), a, b, c);
        assert_relative_eq!(q.x, 0.2); assert_relative_eq!(q.y, 0.0); assert_relative_eq!(q.z, 0.2);
        // beyond vertex b
        assert_eq!(closest_point_on_triangle(vec3(2.0, 0.5, -1.0), a, b, c), b);
        // beside edge bc
        let q = closest_point_on_triangle(vec3(1.0, 0.0, 1.0), a, b, c);
        assert_relative_eq!(q.x, 0.5); assert_relative_eq!(q.z, 0.5);
    }

    #[test]
    fn facet_aabb_is_offset_by_position() {
        let s = Shape::Facet { v: [vec3(-1.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(0.0, 0.0, 2.0)] };
        let bb = aabb_of(&s, vec3(10.0, 5.0, 0.0));
        assert_eq!(bb.min, vec3(9.0, 5.0, 0.0));
        assert_eq!(bb.max, vec3(11.0, 5.0, 2.0));
    }
}

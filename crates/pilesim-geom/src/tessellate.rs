use pilesim_core::{Scalar, Vec3, vec3};

/// Closed faceted cylinder standing on `base_center`, axis along +y.
/// Caps are fans around their centre, so every cap triangle sits exactly at the cap height.
pub fn facet_cylinder(radius: Scalar, height: Scalar, segments: usize, base_center: Vec3) -> Vec<[Vec3; 3]> {
    let n = segments.max(3);
    let ring = |i: usize, y: Scalar| {
        let a = core::f64::consts::TAU * (i % n) as Scalar / n as Scalar;
        base_center + vec3(radius * a.cos(), y, radius * a.sin())
    };
    let bottom_c = base_center;
    let top_c = base_center + vec3(0.0, height, 0.0);

    let mut tris = Vec::with_capacity(4 * n);
    for i in 0..n {
        let (b0, b1) = (ring(i, 0.0), ring(i + 1, 0.0));
        let (t0, t1) = (ring(i, height), ring(i + 1, height));
        tris.push([bottom_c, b1, b0]);
        tris.push([b0, b1, t1]);
        tris.push([b0, t1, t0]);
        tris.push([top_c, t0, t1]);
    }
    tris
}

use pilesim_core::{Scalar, Vec3};
use pilesim_geom::{closest_point_on_triangle, PeriodicCell, Shape};

/// Narrow-phase result. `a` is the non-sphere side (or the lower sphere), `b` always a sphere.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Contact {
    pub a: usize,
    pub b: usize,
    /// Unit normal from A to B.
    pub normal: Vec3,
    pub depth: Scalar,
    pub point: Vec3,
    /// Add to B's stored position to get the periodic image that touches A.
    pub shift_b: Vec3,
}

#[inline]
fn separation(cell: Option<&PeriodicCell>, d: Vec3) -> Vec3 {
    match cell { Some(c) => c.min_image(d), None => d }
}

#[inline] fn clamp_vec3(p: Vec3, mn: Vec3, mx: Vec3) -> Vec3 { p.clamp(mn, mx) }

pub(crate) fn sphere_sphere(
    (a, pa, ra): (usize, Vec3, Scalar),
    (b, pb, rb): (usize, Vec3, Scalar),
    cell: Option<&PeriodicCell>,
) -> Option<Contact> {
    let d = separation(cell, pb - pa);
    let dist2 = d.length_squared();
    let rsum = ra + rb;
    if dist2 >= rsum * rsum { return None; }
    let dist = dist2.sqrt();
    let normal = if dist > 1.0e-12 { d / dist } else { Vec3::Y };
    let depth = rsum - dist;
    Some(Contact {
        a, b, normal, depth,
        point: pa + normal * (ra - 0.5 * depth),
        shift_b: pa + d - pb,
    })
}

/// Box `a` (axis aligned, static) against sphere `b`. Boxes span the whole cell, so no image shift.
pub(crate) fn box_sphere(
    (a, pc, half): (usize, Vec3, Vec3),
    (b, ps, r): (usize, Vec3, Scalar),
) -> Option<Contact> {
    let q = clamp_vec3(ps, pc - half, pc + half);
    let mut n = ps - q; // box -> sphere
    let dist = n.length();
    if dist >= r { return None; }
    if dist > 1.0e-12 { n /= dist; } else { n = Vec3::Y; }
    Some(Contact { a, b, normal: n, depth: r - dist, point: q, shift_b: Vec3::ZERO })
}

/// Facet `a` (vertices relative to `pf`) against sphere `b`. Facets are two-sided.
pub(crate) fn facet_sphere(
    (a, pf, v): (usize, Vec3, [Vec3; 3]),
    (b, ps, r): (usize, Vec3, Scalar),
    cell: Option<&PeriodicCell>,
) -> Option<Contact> {
    let ps_img = pf + separation(cell, ps - pf);
    let q = closest_point_on_triangle(ps_img, pf + v[0], pf + v[1], pf + v[2]);
    let mut n = ps_img - q;
    let dist = n.length();
    if dist >= r { return None; }
    if dist > 1.0e-12 {
        n /= dist;
    } else {
        n = (v[1] - v[0]).cross(v[2] - v[0]).normalize_or_zero();
        if n == Vec3::ZERO { return None; }
    }
    Some(Contact { a, b, normal: n, depth: r - dist, point: q, shift_b: ps_img - ps })
}

/// Dispatch on the shape pair; returns `None` for pairs the engine does not collide.
pub(crate) fn collide(
    (i, si, pi): (usize, &Shape, Vec3),
    (k, sk, pk): (usize, &Shape, Vec3),
    cell: Option<&PeriodicCell>,
) -> Option<Contact> {
    match (*si, *sk) {
        (Shape::Sphere { r: ra }, Shape::Sphere { r: rb }) => sphere_sphere((i, pi, ra), (k, pk, rb), cell),
        (Shape::Box { hx, hy, hz }, Shape::Sphere { r }) => box_sphere((i, pi, Vec3::new(hx, hy, hz)), (k, pk, r)),
        (Shape::Sphere { r }, Shape::Box { hx, hy, hz }) => box_sphere((k, pk, Vec3::new(hx, hy, hz)), (i, pi, r)),
        (Shape::Facet { v }, Shape::Sphere { r }) => facet_sphere((i, pi, v), (k, pk, r), cell),
        (Shape::Sphere { r }, Shape::Facet { v }) => facet_sphere((k, pk, v), (i, pi, r), cell),
        _ => None,
    }
}

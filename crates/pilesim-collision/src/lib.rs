use pilesim_geom::{Aabb, PeriodicCell};

/// Deterministic 1D sweep-and-prune along Y (the axis a periodic cell never wraps),
/// full AABB overlap on the other two axes, NaN-safe and stable.
/// Returned pairs are `(i, k)` with `i < k`, sorted.
pub fn pairs_sap(aabbs: &[Aabb], cell: Option<&PeriodicCell>) -> Vec<(usize, usize)> {
    #[derive(Copy, Clone)]
    struct Elem { min: f64, max: f64, idx: usize }

    let mut elems: Vec<Elem> = Vec::with_capacity(aabbs.len());
    for (i, a) in aabbs.iter().enumerate() {
        let mut mn = a.min.y;
        let mut mx = a.max.y;
        if !mn.is_finite() || !mx.is_finite() { continue; }
        if mn > mx { core::mem::swap(&mut mn, &mut mx); }
        elems.push(Elem { min: mn, max: mx, idx: i });
    }

    elems.sort_by(|a, b| a.min.total_cmp(&b.min).then(a.idx.cmp(&b.idx)));

    let mut active: Vec<Elem> = Vec::new();
    let mut out: Vec<(usize, usize)> = Vec::new();

    for e in elems {
        active.retain(|j| j.max >= e.min);
        for j in &active {
            let (i, k) = if j.idx < e.idx { (j.idx, e.idx) } else { (e.idx, j.idx) };
            let (aa, bb) = (&aabbs[i], &aabbs[k]);
            let hit = match cell {
                Some(c) => aa.overlaps_periodic(bb, c),
                None => aa.overlaps(bb),
            };
            if hit { out.push((i, k)); }
        }
        active.push(e);
    }

    out.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilesim_core::{vec3, Vec3};

    fn ball(x: f64, y: f64, z: f64, r: f64) -> Aabb {
        Aabb::from_center_half_extents(vec3(x, y, z), Vec3::splat(r))
    }

    #[test]
    fn finds_plain_overlaps() {
        let boxes = [ball(0.0, 0.0, 0.0, 1.0), ball(1.5, 0.5, 0.0, 1.0), ball(5.0, 0.0, 0.0, 1.0)];
        assert_eq!(pairs_sap(&boxes, None), vec![(0, 1)]);
    }

    #[test]
    fn stacked_column() {
        let boxes: Vec<Aabb> = (0..5).map(|i| ball(0.0, i as f64 * 1.9, 0.0, 1.0)).collect();
        assert_eq!(pairs_sap(&boxes, None), vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn periodic_neighbours() {
        let cell = PeriodicCell::periodic_xz(0.04, 1.0);
        let boxes = [ball(0.001, 0.1, 0.02, 0.0025), ball(0.0395, 0.1, 0.02, 0.0025)];
        assert!(pairs_sap(&boxes, None).is_empty());
        assert_eq!(pairs_sap(&boxes, Some(&cell)), vec![(0, 1)]);
    }

    #[test]
    fn skips_non_finite() {
        let boxes = [ball(0.0, f64::NAN, 0.0, 1.0), ball(0.0, 0.0, 0.0, 1.0)];
        assert!(pairs_sap(&boxes, None).is_empty());
    }
}

//! Loose sphere packs: random periodic clouds and their text files.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use pilesim_core::{vec3, Scalar, Vec3};
use pilesim_geom::PeriodicCell;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, warn};

use crate::{IoError, IoResult};

/// Solid fraction the cloud aims for when no count is given.
const TARGET_SOLID_FRACTION: Scalar = 0.35;
const MAX_ATTEMPTS: usize = 1000;
const PERIODIC_TAG: &str = "##PERIODIC::";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub r: Scalar,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpherePack {
    pub spheres: Vec<Sphere>,
    /// Period along x and z when the pack was generated periodic (y entry is informational).
    pub periodic: Option<Vec3>,
}

/// Uniform bucket grid over the cloud box, wrapping on the periodic axes.
struct Grid {
    min: Vec3,
    n: [i64; 3],
    width: Vec3,
    wrap: [bool; 3],
    cells: HashMap<[i64; 3], Vec<usize>>,
}

impl Grid {
    fn new(min: Vec3, size: Vec3, reach: Scalar, wrap: [bool; 3]) -> Self {
        let mut n = [1i64; 3];
        let mut width = size;
        for k in 0..3 {
            n[k] = ((size[k] / reach).floor() as i64).max(1);
            width[k] = size[k] / n[k] as Scalar;
        }
        Self { min, n, width, wrap, cells: HashMap::new() }
    }

    fn key(&self, p: Vec3) -> [i64; 3] {
        let mut key = [0i64; 3];
        for k in 0..3 {
            key[k] = (((p[k] - self.min[k]) / self.width[k]).floor() as i64).clamp(0, self.n[k] - 1);
        }
        key
    }

    fn insert(&mut self, p: Vec3, idx: usize) {
        let key = self.key(p);
        self.cells.entry(key).or_default().push(idx);
    }

    fn neighbours(&self, p: Vec3) -> impl Iterator<Item = usize> + '_ {
        let c = self.key(p);
        let offsets = (-1..=1).flat_map(|i| (-1..=1).flat_map(move |j| (-1..=1).map(move |k| [i, j, k])));
        offsets
            .filter_map(move |o| {
                let mut key = [0i64; 3];
                for a in 0..3 {
                    let v = c[a] + o[a];
                    key[a] = if self.wrap[a] { v.rem_euclid(self.n[a]) } else if (0..self.n[a]).contains(&v) { v } else { return None };
                }
                self.cells.get(&key)
            })
            .flatten()
            .copied()
    }
}

impl SpherePack {
    #[inline] pub fn len(&self) -> usize { self.spheres.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.spheres.is_empty() }

    /// Random sequential placement of non-overlapping spheres inside `[min, max]`.
    ///
    /// Radii are `r_mean * (1 ± r_rel_fuzz)`. With `periodic` the x and z axes wrap with the box
    /// span as period and overlap is tested on the minimum image. Placement stops at the target
    /// count or at the first sphere that finds no room after `MAX_ATTEMPTS` tries. A box with no
    /// room for the largest sphere between its bounded walls yields an empty pack.
    pub fn make_cloud(min: Vec3, max: Vec3, r_mean: Scalar, r_rel_fuzz: Scalar, seed: u64, periodic: bool) -> Self {
        let size = max - min;
        if !(size.min_element() > 0.0 && r_mean > 0.0) { return Self::default(); }
        let volume = size.x * size.y * size.z;
        let target = (TARGET_SOLID_FRACTION * volume / (4.0 / 3.0 * core::f64::consts::PI * r_mean.powi(3))) as usize;

        let wrap = [periodic, false, periodic];
        let cell = PeriodicCell { size, periodic: wrap };
        let fuzz = r_rel_fuzz.abs().min(0.99);
        let r_max = r_mean * (1.0 + fuzz);
        // the largest sphere must fit between the walls of every bounded axis
        if (0..3).any(|k| !wrap[k] && size[k] <= 2.0 * r_max) { return Self::default(); }
        let mut grid = Grid::new(min, size, 2.0 * r_max, wrap);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut spheres: Vec<Sphere> = Vec::with_capacity(target);

        'place: for _ in 0..target {
            let r = if fuzz > 0.0 { r_mean * rng.gen_range(1.0 - fuzz..=1.0 + fuzz) } else { r_mean };
            for _ in 0..MAX_ATTEMPTS {
                let mut c = Vec3::ZERO;
                for k in 0..3 {
                    c[k] = if wrap[k] { rng.gen_range(min[k]..max[k]) } else { rng.gen_range(min[k] + r..max[k] - r) };
                }
                let free = grid.neighbours(c).all(|j| {
                    let s = &spheres[j];
                    cell.min_image(c - s.center).length_squared() >= (r + s.r) * (r + s.r)
                });
                if free {
                    grid.insert(c, spheres.len());
                    spheres.push(Sphere { center: c, r });
                    continue 'place;
                }
            }
            debug!(placed = spheres.len(), target, "cloud saturated");
            break;
        }
        if spheres.len() < target / 2 {
            warn!(placed = spheres.len(), target, "sparse sphere cloud");
        }
        Self { spheres, periodic: periodic.then_some(size) }
    }

    /// `##PERIODIC:: x y z` header when periodic, then `x y z r` per sphere.
    pub fn save(&self, path: &Path) -> IoResult<()> {
        let mut out = String::with_capacity(64 * (self.spheres.len() + 1));
        if let Some(p) = self.periodic {
            let _ = writeln!(out, "{PERIODIC_TAG} {:e} {:e} {:e}", p.x, p.y, p.z);
        }
        for s in &self.spheres {
            let _ = writeln!(out, "{:e} {:e} {:e} {:e}", s.center.x, s.center.y, s.center.z, s.r);
        }
        fs::write(path, out)?;
        Ok(())
    }

    pub fn load(path: &Path) -> IoResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| IoError::open(path, e))?;
        let mut pack = Self::default();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix(PERIODIC_TAG) {
                let v = parse_floats::<3>(rest, lineno)?;
                pack.periodic = Some(vec3(v[0], v[1], v[2]));
                continue;
            }
            if line.is_empty() || line.starts_with('#') { continue; }
            let v = parse_floats::<4>(line, lineno)?;
            pack.spheres.push(Sphere { center: vec3(v[0], v[1], v[2]), r: v[3] });
        }
        Ok(pack)
    }
}

fn parse_floats<const N: usize>(s: &str, lineno: usize) -> IoResult<[Scalar; N]> {
    let mut out = [0.0; N];
    let mut it = s.split_whitespace();
    for x in out.iter_mut() {
        let tok = it.next()
            .ok_or_else(|| IoError::invalid_content(format!("line {}: expected {N} numbers", lineno + 1)))?;
        *x = tok.parse()?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud(seed: u64) -> SpherePack {
        SpherePack::make_cloud(vec3(0.0, 0.0, 0.0), vec3(0.04, 0.05, 0.04), 0.0025, 0.2, seed, true)
    }

    #[test]
    fn cloud_has_no_overlaps() {
        let p = cloud(1);
        assert!(p.len() > 50, "only {} spheres", p.len());
        let cell = PeriodicCell { size: vec3(0.04, 0.05, 0.04), periodic: [true, false, true] };
        for (i, a) in p.spheres.iter().enumerate() {
            assert!(a.r >= 0.0025 * 0.8 - 1e-15 && a.r <= 0.0025 * 1.2 + 1e-15);
            assert!(a.center.y - a.r >= -1e-15 && a.center.y + a.r <= 0.05 + 1e-15);
            for b in &p.spheres[i + 1..] {
                let d = cell.min_image(a.center - b.center).length();
                assert!(d >= a.r + b.r - 1e-12, "overlap {d} < {}", a.r + b.r);
            }
        }
    }

    #[test]
    fn cloud_is_seeded() {
        assert_eq!(cloud(1), cloud(1));
        assert_ne!(cloud(1), cloud(2));
    }

    #[test]
    fn cloud_needs_room_between_walls() {
        let flat = SpherePack::make_cloud(Vec3::ZERO, vec3(0.04, 0.004, 0.04), 0.0025, 0.2, 1, true);
        assert!(flat.is_empty());
        let degenerate = SpherePack::make_cloud(Vec3::ZERO, vec3(0.04, 0.05, 0.0), 0.0025, 0.2, 1, false);
        assert!(degenerate.is_empty());
        let uniform = SpherePack::make_cloud(Vec3::ZERO, vec3(0.04, 0.05, 0.04), 0.0025, 0.0, 3, true);
        assert!(!uniform.is_empty() && uniform.spheres.iter().all(|s| s.r == 0.0025));
    }

    #[test]
    fn save_load_preserves_pack() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sphere_pack.txt");
        let p = cloud(7);
        p.save(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("##PERIODIC:: "));
        let q = SpherePack::load(&path).unwrap();
        assert_eq!(q, p);
    }

    #[test]
    fn load_rejects_short_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.txt");
        fs::write(&path, "0.1 0.2 0.3 0.01\n0.1 0.2\n").unwrap();
        assert!(matches!(SpherePack::load(&path), Err(IoError::InvalidContent { .. })));
    }
}

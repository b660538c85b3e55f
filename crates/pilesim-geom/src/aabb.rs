use pilesim_core::types::Vec3;
use crate::cell::PeriodicCell;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aabb { pub min: Vec3, pub max: Vec3 }

impl Aabb {
    #[inline] pub fn new(min: Vec3, max: Vec3) -> Self { Self { min, max } }
    #[inline] pub fn from_center_half_extents(c: Vec3, he: Vec3) -> Self {
        Self { min: c - he, max: c + he }
    }

    #[inline] pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x || self.min.x > other.max.x ||
            self.max.y < other.min.y || self.min.y > other.max.y ||
            self.max.z < other.min.z || self.min.z > other.max.z)
    }

    /// Overlap test honouring periodic axes of `cell`. A box at least one period wide on an
    /// axis overlaps everything along that axis.
    pub fn overlaps_periodic(&self, other: &Aabb, cell: &PeriodicCell) -> bool {
        for k in 0..3 {
            let (amin, amax, bmin, bmax) = (self.min[k], self.max[k], other.min[k], other.max[k]);
            if !cell.periodic[k] {
                if amax < bmin || amin > bmax { return false; }
                continue;
            }
            let period = cell.size[k];
            let (ea, eb) = (amax - amin, bmax - bmin);
            if ea >= period || eb >= period { continue; }
            let dc = cell.min_image_axis(0.5 * (bmin + bmax) - 0.5 * (amin + amax), k);
            if dc.abs() > 0.5 * (ea + eb) { return false; }
        }
        true
    }
}

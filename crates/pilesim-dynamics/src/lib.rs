mod newton;

use pilesim_core::types::{Velocity, Vec3};
use pilesim_core::{Dofs, Scalar};
use pilesim_geom::MassProps;

pub use newton::Newton;

/// Input descriptor when creating a body.
#[derive(Copy, Clone, Debug)]
pub struct BodyDesc {
    pub pos: Vec3,
    pub vel: Velocity,
    pub mass: MassProps,
    pub blocked: Dofs,
}

/// SoA body storage with deterministic ID = index semantics.
pub struct Bodies {
    pos: Vec<Vec3>,
    linvel: Vec<Vec3>,
    angvel: Vec<Vec3>,
    force: Vec<Vec3>,
    torque: Vec<Vec3>,
    mass: Vec<Scalar>,
    inv_mass: Vec<Scalar>,
    inv_inertia: Vec<Scalar>,
    blocked: Vec<Dofs>,
}

impl Bodies {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            pos:         Vec::with_capacity(cap),
            linvel:      Vec::with_capacity(cap),
            angvel:      Vec::with_capacity(cap),
            force:       Vec::with_capacity(cap),
            torque:      Vec::with_capacity(cap),
            mass:        Vec::with_capacity(cap),
            inv_mass:    Vec::with_capacity(cap),
            inv_inertia: Vec::with_capacity(cap),
            blocked:     Vec::with_capacity(cap),
        }
    }

    pub fn add(&mut self, desc: BodyDesc) -> u32 {
        self.pos.push(desc.pos);
        self.linvel.push(desc.vel.lin);
        self.angvel.push(desc.vel.ang);
        self.force.push(Vec3::ZERO);
        self.torque.push(Vec3::ZERO);
        self.mass.push(desc.mass.mass);
        self.inv_mass.push(desc.mass.inv_mass);
        self.inv_inertia.push(desc.mass.inv_inertia);
        self.blocked.push(desc.blocked);
        (self.pos.len() as u32) - 1
    }

    #[inline] pub fn len(&self) -> usize { self.pos.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.pos.is_empty() }
    #[inline] pub fn contains(&self, id: u32) -> bool { (id as usize) < self.pos.len() }

    // -------- Accessors used by world/solver/hash --------
    #[inline] pub fn pos(&self, id: u32) -> Vec3 { self.pos[id as usize] }
    #[inline] pub fn set_pos(&mut self, id: u32, p: Vec3) { self.pos[id as usize] = p; }

    #[inline] pub fn vel(&self, id: u32) -> Velocity {
        let i = id as usize;
        Velocity { lin: self.linvel[i], ang: self.angvel[i] }
    }
    #[inline] pub fn set_vel(&mut self, id: u32, v: Velocity) {
        let i = id as usize;
        self.linvel[i] = v.lin;
        self.angvel[i] = v.ang;
    }
    #[inline] pub fn set_linvel(&mut self, id: u32, v: Vec3) { self.linvel[id as usize] = v; }

    #[inline] pub fn force(&self, id: u32) -> Vec3 { self.force[id as usize] }
    #[inline] pub fn torque(&self, id: u32) -> Vec3 { self.torque[id as usize] }
    #[inline] pub fn mass_of(&self, id: u32) -> Scalar { self.mass[id as usize] }
    #[inline] pub fn inv_mass_of(&self, id: u32) -> Scalar { self.inv_mass[id as usize] }
    #[inline] pub fn inv_inertia_of(&self, id: u32) -> Scalar { self.inv_inertia[id as usize] }

    #[inline] pub fn blocked(&self, id: u32) -> Dofs { self.blocked[id as usize] }
    #[inline] pub fn set_blocked(&mut self, id: u32, d: Dofs) { self.blocked[id as usize] = d; }

    /// Free to move under forces on at least one axis and carrying finite mass.
    #[inline] pub fn is_dynamic(&self, id: u32) -> bool {
        let i = id as usize;
        !self.blocked[i].is_all() && self.inv_mass[i] > 0.0
    }

    // -------- Force accumulators --------
    pub fn reset_forces(&mut self) {
        for f in &mut self.force { *f = Vec3::ZERO; }
        for t in &mut self.torque { *t = Vec3::ZERO; }
    }
    #[inline] pub fn add_force(&mut self, id: u32, f: Vec3) { self.force[id as usize] += f; }
    #[inline] pub fn add_torque(&mut self, id: u32, t: Vec3) { self.torque[id as usize] += t; }

    /// Add a position delta (already scaled for this body).
    #[inline] pub fn apply_position_delta(&mut self, id: u32, dp: Vec3) {
        self.pos[id as usize] += dp;
    }

    // Iterator for hashing in stable order
    pub fn indices(&self) -> impl ExactSizeIterator<Item=u32> + '_ {
        0..(self.len() as u32)
    }
}

impl Default for Bodies {
    fn default() -> Self { Self::with_capacity(0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilesim_core::vec3;

    #[test]
    fn add_and_lock() {
        let mut b = Bodies::default();
        let s = b.add(BodyDesc {
            pos: vec3(0.0, 1.0, 0.0), vel: Velocity::default(),
            mass: MassProps::from_sphere(0.01, 2500.0), blocked: Dofs::NONE,
        });
        let f = b.add(BodyDesc {
            pos: Vec3::ZERO, vel: Velocity::default(), mass: MassProps::infinite(), blocked: Dofs::ALL,
        });
        assert!(b.is_dynamic(s));
        assert!(!b.is_dynamic(f));
        b.set_blocked(s, Dofs::ALL);
        assert!(!b.is_dynamic(s));
        assert!(b.contains(1) && !b.contains(2));
    }

    #[test]
    fn forces_reset() {
        let mut b = Bodies::default();
        let s = b.add(BodyDesc {
            pos: Vec3::ZERO, vel: Velocity::default(), mass: MassProps::from_sphere(0.01, 2500.0), blocked: Dofs::NONE,
        });
        b.add_force(s, vec3(1.0, 2.0, 3.0));
        b.add_torque(s, Vec3::X);
        b.reset_forces();
        assert_eq!(b.force(s), Vec3::ZERO);
        assert_eq!(b.torque(s), Vec3::ZERO);
    }
}

mod contact;
mod engine;

use std::collections::BTreeMap;

use pilesim_core::{
    BodyId, Dofs, MaterialId, Scalar, StepHasher, StepStage, StepStats, Vec3, Velocity, hash_vec3,
};
use pilesim_geom::{Aabb, MassProps, PeriodicCell, Shape, aabb_of};
use pilesim_materials::{ContactForces, FrictMat, FrictPhys, cundall_strack, frict_phys, p_wave_time_step};
use pilesim_collision::pairs_sap;
use pilesim_dynamics::{Bodies, BodyDesc, Newton};
use pilesim_viz::ScheduleRecorder;
use tracing::debug;

use crate::contact::{collide, Contact};

/* ---------------- Collider & Interaction ---------------- */
#[derive(Copy, Clone, Debug)]
pub struct Collider {
    pub body: BodyId,
    pub shape: Shape,
    pub aabb: Aabb,
    pub material: MaterialId,
}

/// Live contact between two bodies. The shear part of `forces` is carried to the next step.
#[derive(Copy, Clone, Debug)]
pub struct Interaction {
    pub normal: Vec3,
    pub depth: Scalar,
    pub phys: FrictPhys,
    /// Forces on the second body; the first body receives the negation.
    pub forces: ContactForces,
}

/* ---------------- Builder ---------------- */
pub struct WorldBuilder {
    pub bodies: usize,
    pub dt: Scalar,
    pub damping: Scalar,
}

impl WorldBuilder {
    pub fn new() -> Self { Self { bodies: 128, dt: 1.0e-6, damping: 0.2 } }

    pub fn with_capacity(mut self, bodies: usize) -> Self {
        self.bodies = bodies;
        self
    }


    pub fn build(self) -> World {
        let mut w = World::with_capacity(self.bodies);
        w.dt = self.dt;
        w.newton.damping = self.damping;
        w
    }
}

impl Default for WorldBuilder {
    fn default() -> Self { Self::new() }
}

/* ---------------- World ---------------- */
/// DEM scene: one collider per body, collider index equals body index.
pub struct World {
    bodies: Bodies,
    colliders: Vec<Collider>,
    materials: Vec<FrictMat>,
    cell: Option<PeriodicCell>,
    newton: Newton,
    dt: Scalar,
    iter: u64,
    paused: bool,
    schedule: ScheduleRecorder,
    interactions: BTreeMap<(u32, u32), Interaction>,
}

impl World {
    pub fn with_capacity(bodies: usize) -> Self {
        Self {
            bodies: Bodies::with_capacity(bodies),
            colliders: Vec::with_capacity(bodies),
            materials: Vec::new(),
            cell: None,
            newton: Newton::default(),
            dt: 1.0e-6,
            iter: 0,
            paused: false,
            schedule: ScheduleRecorder::new(),
            interactions: BTreeMap::new(),
        }
    }

    // Read-only helpers.
    #[inline] pub fn num_bodies(&self) -> u32 { self.bodies.len() as u32 }
    #[inline] pub fn dt(&self) -> Scalar { self.dt }
    #[inline] pub fn set_dt(&mut self, dt: Scalar) { self.dt = dt; }
    #[inline] pub fn cell(&self) -> Option<&PeriodicCell> { self.cell.as_ref() }
    #[inline] pub fn num_interactions(&self) -> usize { self.interactions.len() }
    pub fn interactions(&self) -> impl Iterator<Item = (BodyId, BodyId, &Interaction)> + '_ {
        self.interactions.iter().map(|(&(a, b), i)| (BodyId(a), BodyId(b), i))
    }

    pub fn add_material(&mut self, mat: FrictMat) -> MaterialId {
        self.materials.push(mat);
        MaterialId(self.materials.len() as u32 - 1)
    }

    pub fn set_periodic_cell(&mut self, cell: PeriodicCell) { self.cell = Some(cell); }
    pub fn set_cell_height(&mut self, h: Scalar) {
        if let Some(c) = self.cell.as_mut() { c.set_height(h); }
    }

    fn material(&self, m: MaterialId) -> FrictMat {
        debug_assert!((m.0 as usize) < self.materials.len(), "unknown {m}");
        self.materials.get(m.0 as usize).copied().unwrap_or_default()
    }

    fn add(&mut self, pos: Vec3, shape: Shape, mass: MassProps, blocked: Dofs, material: MaterialId) -> BodyId {
        let id = BodyId(self.bodies.add(BodyDesc { pos, vel: Velocity::default(), mass, blocked }));
        self.colliders.push(Collider { body: id, shape, aabb: aabb_of(&shape, pos), material });
        id
    }

    /// Free sphere, mass from the material density.
    pub fn add_sphere(&mut self, center: Vec3, r: Scalar, material: MaterialId) -> BodyId {
        let mass = MassProps::from_sphere(r, self.material(material).density);
        self.add(center, Shape::Sphere { r }, mass, Dofs::NONE, material)
    }

    /// Fixed axis-aligned box.
    pub fn add_box(&mut self, center: Vec3, half: Vec3, material: MaterialId) -> BodyId {
        self.add(center, Shape::Box { hx: half.x, hy: half.y, hz: half.z }, MassProps::infinite(), Dofs::ALL, material)
    }

    /// Fixed triangle given in world coordinates; the body sits at its centroid.
    pub fn add_facet(&mut self, tri: [Vec3; 3], material: MaterialId) -> BodyId {
        let c = (tri[0] + tri[1] + tri[2]) / 3.0;
        let v = [tri[0] - c, tri[1] - c, tri[2] - c];
        self.add(c, Shape::Facet { v }, MassProps::infinite(), Dofs::ALL, material)
    }

    /// Stable explicit step from the stiffest sphere, `None` without spheres.
    pub fn p_wave_timestep(&self) -> Option<Scalar> {
        self.colliders.iter()
            .filter_map(|c| c.shape.radius().map(|r| p_wave_time_step(&self.material(c.material), r)))
            .reduce(Scalar::min)
    }

    /* ---------------- Step ---------------- */
    pub fn step(&mut self) -> StepStats {
        self.schedule.clear();

        self.schedule.push(StepStage::ForceReset);
        self.bodies.reset_forces();

        self.schedule.push(StepStage::UpdateAabbs);
        self.update_aabbs();

        self.schedule.push(StepStage::Broadphase);
        let aabbs: Vec<Aabb> = self.colliders.iter().map(|c| c.aabb).collect();
        let pairs = pairs_sap(&aabbs, self.cell.as_ref());

        self.schedule.push(StepStage::Narrowphase);
        let contacts: Vec<Contact> = pairs.iter().filter_map(|&(i, k)| self.narrow(i, k)).collect();

        self.schedule.push(StepStage::ContactLaw);
        self.apply_contact_law(&contacts);

        self.schedule.push(StepStage::Integrate);
        self.newton.integrate(&mut self.bodies, self.dt);

        self.iter += 1;
        if self.iter % 10_000 == 0 {
            debug!(iter = self.iter, pairs = pairs.len(), contacts = contacts.len(), "step");
        }
        StepStats { iter: self.iter, pairs_tested: pairs.len() as u32, contacts: contacts.len() as u32 }
    }

    fn update_aabbs(&mut self) {
        for c in self.colliders.iter_mut() {
            let id = c.body.0;
            if let (Some(cell), true) = (self.cell.as_ref(), c.shape.is_sphere()) {
                let p = self.bodies.pos(id);
                let w = cell.wrap(p);
                if w != p { self.bodies.set_pos(id, w); }
            }
            c.aabb = aabb_of(&c.shape, self.bodies.pos(id));
        }
    }

    fn narrow(&self, i: usize, k: usize) -> Option<Contact> {
        let (a, b) = (&self.colliders[i], &self.colliders[k]);
        if !self.bodies.is_dynamic(a.body.0) && !self.bodies.is_dynamic(b.body.0) { return None; }
        collide(
            (i, &a.shape, self.bodies.pos(a.body.0)),
            (k, &b.shape, self.bodies.pos(b.body.0)),
            self.cell.as_ref(),
        )
    }

    /// Sphere radius, or twice the partner sphere's radius for boxes and facets.
    fn reference_radius(&self, ci: usize, other: usize) -> Scalar {
        match self.colliders[ci].shape {
            Shape::Sphere { r } => r,
            _ => 2.0 * self.colliders[other].shape.radius().unwrap_or(0.0),
        }
    }

    fn pair_phys(&self, a: usize, b: usize) -> FrictPhys {
        let (ca, cb) = (&self.colliders[a], &self.colliders[b]);
        frict_phys(
            &self.material(ca.material), self.reference_radius(a, b),
            &self.material(cb.material), self.reference_radius(b, a),
        )
    }

    fn apply_contact_law(&mut self, contacts: &[Contact]) {
        let mut next = BTreeMap::new();
        for c in contacts {
            let (ia, ib) = (self.colliders[c.a].body.0, self.colliders[c.b].body.0);
            let prev = self.interactions.get(&(ia, ib)).copied();
            let phys = match prev { Some(p) => p.phys, None => self.pair_phys(c.a, c.b) };
            let prev_shear = prev.map_or(Vec3::ZERO, |p| p.forces.shear);

            let arm_a = c.point - self.bodies.pos(ia);
            let arm_b = c.point - (self.bodies.pos(ib) + c.shift_b);
            let (va, vb) = (self.bodies.vel(ia), self.bodies.vel(ib));
            let v_rel = (vb.lin + vb.ang.cross(arm_b)) - (va.lin + va.ang.cross(arm_a));

            let forces = cundall_strack(&phys, c.normal, c.depth, prev_shear, v_rel * self.dt);
            let f = forces.total();
            self.bodies.add_force(ib, f);
            self.bodies.add_torque(ib, arm_b.cross(f));
            self.bodies.add_force(ia, -f);
            self.bodies.add_torque(ia, arm_a.cross(-f));

            next.insert((ia, ib), Interaction { normal: c.normal, depth: c.depth, phys, forces });
        }
        self.interactions = next;
    }

    /* ---------------- Global summaries ---------------- */
    fn free_bodies(&self) -> impl Iterator<Item = u32> + '_ {
        self.bodies.indices().filter(|&i| self.bodies.is_dynamic(i))
    }

    /// Mean resultant force on free bodies over mean contact force. NaN while nothing touches.
    pub fn unbalanced_force(&self) -> Scalar {
        let (sum, n) = self.free_bodies().fold((0.0, 0usize), |(s, n), i| (s + self.bodies.force(i).length(), n + 1));
        if n == 0 || self.interactions.is_empty() { return Scalar::NAN; }
        let contact_sum: Scalar = self.interactions.values().map(|i| i.forces.total().length()).sum();
        if contact_sum <= 0.0 { return Scalar::NAN; }
        (sum / n as Scalar) / (contact_sum / self.interactions.len() as Scalar)
    }

    /// Contact endpoints on free bodies per free body.
    pub fn avg_num_interactions(&self) -> Scalar {
        let n = self.free_bodies().count();
        if n == 0 { return 0.0; }
        let ends: usize = self.interactions.keys()
            .map(|&(a, b)| self.bodies.is_dynamic(a) as usize + self.bodies.is_dynamic(b) as usize)
            .sum();
        ends as Scalar / n as Scalar
    }

    pub fn step_hash(&self) -> [u8; 32] {
        let mut h = StepHasher::new();
        h.update_bytes(&self.iter.to_le_bytes());
        h.update_bytes(&self.schedule.digest());
        for i in self.bodies.indices() {
            let vel = self.bodies.vel(i);
            h.update_bytes(&i.to_le_bytes());
            hash_vec3(&mut h, &self.bodies.pos(i));
            hash_vec3(&mut h, &vel.lin);
            hash_vec3(&mut h, &vel.ang);
        }
        for (&(a, b), it) in &self.interactions {
            h.update_bytes(&a.to_le_bytes());
            h.update_bytes(&b.to_le_bytes());
            hash_vec3(&mut h, &it.forces.shear);
        }
        h.finalize()
    }
}

impl Default for World {
    fn default() -> Self { WorldBuilder::new().build() }
}

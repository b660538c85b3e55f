use pilesim_controllers::{BodyAccess, ControlError, ControlResult, Engine, Simulation};
use pilesim_core::{BodyId, Dofs, Scalar, StepStats, Vec3};
use pilesim_geom::Shape;
use pilesim_viz::{BodyRecord, ContactRecord, FieldSource};

use crate::World;

impl World {
    fn known(&self, id: BodyId) -> ControlResult<u32> {
        if self.bodies.contains(id.0) { Ok(id.0) } else { Err(ControlError::UnknownBody(id)) }
    }
}

impl BodyAccess for World {
    fn position(&self, id: BodyId) -> Option<Vec3> {
        self.bodies.contains(id.0).then(|| self.bodies.pos(id.0))
    }
    fn velocity(&self, id: BodyId) -> Option<Vec3> {
        self.bodies.contains(id.0).then(|| self.bodies.vel(id.0).lin)
    }
    fn force(&self, id: BodyId) -> Option<Vec3> {
        self.bodies.contains(id.0).then(|| self.bodies.force(id.0))
    }

    fn set_velocity(&mut self, id: BodyId, v: Vec3) -> ControlResult<()> {
        let i = self.known(id)?;
        self.bodies.set_linvel(i, v);
        Ok(())
    }
    fn set_position(&mut self, id: BodyId, p: Vec3) -> ControlResult<()> {
        let i = self.known(id)?;
        self.bodies.set_pos(i, p);
        if let Some(c) = self.colliders.get_mut(i as usize) {
            c.aabb = pilesim_geom::aabb_of(&c.shape, p);
        }
        Ok(())
    }
    fn block_dofs(&mut self, id: BodyId, dofs: Dofs) -> ControlResult<()> {
        let i = self.known(id)?;
        self.bodies.set_blocked(i, dofs);
        Ok(())
    }
}

impl Simulation for World {
    fn iter(&self) -> u64 { self.iter }
    fn unbalanced_force(&self) -> Scalar { World::unbalanced_force(self) }
    fn avg_num_interactions(&self) -> Scalar { World::avg_num_interactions(self) }
    fn friction_angle(&self) -> Option<Scalar> { self.materials.first().map(|m| m.friction_angle) }
    fn set_gravity(&mut self, g: Vec3) { self.newton.gravity = g; }
    fn pause(&mut self) { self.paused = true; }
}

impl Engine for World {
    /// One step unless paused; a paused world reports the current counter and does nothing.
    fn advance(&mut self) -> StepStats {
        if self.paused { return StepStats { iter: self.iter, ..StepStats::default() }; }
        self.step()
    }
    fn is_paused(&self) -> bool { self.paused }
}

#[inline] fn arr(v: Vec3) -> [f64; 3] { v.to_array() }

impl FieldSource for World {
    fn visit_bodies(&self, f: &mut dyn FnMut(BodyRecord)) {
        for c in &self.colliders {
            let i = c.body.0;
            let (shape, radius) = match c.shape {
                Shape::Sphere { r } => ("sphere", r),
                Shape::Box { .. } => ("box", 0.0),
                Shape::Facet { .. } => ("facet", 0.0),
            };
            f(BodyRecord {
                id: i,
                shape,
                pos: arr(self.bodies.pos(i)),
                vel: arr(self.bodies.vel(i).lin),
                force: arr(self.bodies.force(i)),
                radius,
            });
        }
    }

    fn visit_contacts(&self, f: &mut dyn FnMut(ContactRecord)) {
        for (&(a, b), it) in &self.interactions {
            f(ContactRecord {
                a, b,
                normal: arr(it.normal),
                normal_force: arr(it.forces.normal),
                shear_force: arr(it.forces.shear),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::World;
    use approx::assert_relative_eq;
    use pilesim_core::vec3;
    use pilesim_materials::FrictMat;

    #[test]
    fn unknown_ids() {
        let mut w = World::default();
        assert_eq!(w.position(BodyId(3)), None);
        assert!(matches!(w.set_velocity(BodyId(3), Vec3::ZERO), Err(ControlError::UnknownBody(BodyId(3)))));
        assert!(w.block_dofs(BodyId(0), Dofs::ALL).is_err());
        assert_eq!(Simulation::friction_angle(&w), None);
    }

    #[test]
    fn driven_facet_keeps_velocity() {
        let mut w = World::default();
        let m = w.add_material(FrictMat::default());
        let f = w.add_facet([vec3(0.0, 1.0, 0.0), vec3(1.0, 1.0, 0.0), vec3(0.0, 1.0, 1.0)], m);
        w.set_dt(1.0e-3);
        w.set_gravity(vec3(0.0, -9.81, 0.0));
        w.block_dofs(f, Dofs::ALL).unwrap();
        w.set_velocity(f, vec3(0.0, -0.2, 0.0)).unwrap();
        for _ in 0..10 { w.advance(); }
        assert_eq!(w.velocity(f), Some(vec3(0.0, -0.2, 0.0)));
        assert_relative_eq!(w.position(f).unwrap().y, 1.0 - 0.002, epsilon = 1e-12);
        assert_eq!(Simulation::iter(&w), 10);
        assert_relative_eq!(Simulation::friction_angle(&w).unwrap(), 0.5);
    }

    #[test]
    fn paused_world_does_not_step() {
        let mut w = World::default();
        let m = w.add_material(FrictMat::default());
        let s = w.add_sphere(vec3(0.0, 1.0, 0.0), 0.01, m);
        w.set_velocity(s, vec3(1.0, 0.0, 0.0)).unwrap();
        w.advance();
        w.pause();
        let before = w.step_hash();
        let stats = w.advance();
        assert!(w.is_paused());
        assert_eq!(stats.iter, 1);
        assert_eq!(w.step_hash(), before);
    }

    #[test]
    fn snapshot_visits_everything() {
        let mut w = World::default();
        let m = w.add_material(FrictMat { young: 1.0e6, ..FrictMat::default() });
        w.add_box(vec3(0.0, 0.0, 0.0), vec3(1.0, 0.1, 1.0), m);
        w.add_sphere(vec3(0.0, 0.105, 0.0), 0.01, m);
        w.step();
        let mut bodies = Vec::new();
        w.visit_bodies(&mut |b| bodies.push(b));
        let mut contacts = Vec::new();
        w.visit_contacts(&mut |c| contacts.push(c));
        assert_eq!(bodies.iter().map(|b| b.shape).collect::<Vec<_>>(), vec!["box", "sphere"]);
        assert_eq!(bodies[1].radius, 0.01);
        assert_eq!(contacts.len(), 1);
        assert_eq!((contacts[0].a, contacts[0].b), (0, 1));
        assert!(contacts[0].normal_force[1] > 0.0);
    }
}

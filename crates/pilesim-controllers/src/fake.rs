use pilesim_core::{BodyId, Dofs, Scalar, Vec3};
use crate::{BodyAccess, ControlError, ControlResult, Simulation};

#[derive(Clone, Debug, Default)]
pub struct FakeBody {
    pub pos: Vec3,
    pub vel: Vec3,
    pub force: Vec3,
    pub blocked: Dofs,
}

/// Scriptable engine stand-in: every global summary is a plain field.
#[derive(Clone, Debug)]
pub struct FakeSim {
    pub bodies: Vec<FakeBody>,
    pub iter: u64,
    pub unbalanced: Scalar,
    pub coordination: Scalar,
    pub friction: Option<Scalar>,
    pub gravity: Vec3,
    pub paused: bool,
    pub writes: usize,
}

impl Default for FakeSim {
    fn default() -> Self {
        Self {
            bodies: Vec::new(), iter: 0, unbalanced: 1.0, coordination: 0.0,
            friction: Some(0.5), gravity: Vec3::ZERO, paused: false, writes: 0,
        }
    }
}

impl FakeSim {
    pub fn push(&mut self, pos: Vec3, vel: Vec3) -> BodyId {
        self.bodies.push(FakeBody { pos, vel, ..FakeBody::default() });
        BodyId(self.bodies.len() as u32 - 1)
    }
    fn body_mut(&mut self, id: BodyId) -> ControlResult<&mut FakeBody> {
        self.writes += 1;
        self.bodies.get_mut(id.0 as usize).ok_or(ControlError::UnknownBody(id))
    }
}

impl BodyAccess for FakeSim {
    fn position(&self, id: BodyId) -> Option<Vec3> { self.bodies.get(id.0 as usize).map(|b| b.pos) }
    fn velocity(&self, id: BodyId) -> Option<Vec3> { self.bodies.get(id.0 as usize).map(|b| b.vel) }
    fn force(&self, id: BodyId) -> Option<Vec3> { self.bodies.get(id.0 as usize).map(|b| b.force) }
    fn set_velocity(&mut self, id: BodyId, v: Vec3) -> ControlResult<()> { self.body_mut(id)?.vel = v; Ok(()) }
    fn set_position(&mut self, id: BodyId, p: Vec3) -> ControlResult<()> { self.body_mut(id)?.pos = p; Ok(()) }
    fn block_dofs(&mut self, id: BodyId, dofs: Dofs) -> ControlResult<()> { self.body_mut(id)?.blocked = dofs; Ok(()) }
}

impl Simulation for FakeSim {
    fn iter(&self) -> u64 { self.iter }
    fn unbalanced_force(&self) -> Scalar { self.unbalanced }
    fn avg_num_interactions(&self) -> Scalar { self.coordination }
    fn friction_angle(&self) -> Option<Scalar> { self.friction }
    fn set_gravity(&mut self, g: Vec3) { self.gravity = g; }
    fn pause(&mut self) { self.paused = true; }
}

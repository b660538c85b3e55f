use pilesim_core::{BodyId, Dofs, Scalar, StepStats, Vec3};
use crate::ControlResult;

/// Narrow per-body view of the engine. Reads return `None` for ids the engine does not hold.
pub trait BodyAccess {
    fn position(&self, id: BodyId) -> Option<Vec3>;
    fn velocity(&self, id: BodyId) -> Option<Vec3>;
    /// Resultant force accumulated on the body during the last step.
    fn force(&self, id: BodyId) -> Option<Vec3>;

    fn set_velocity(&mut self, id: BodyId, v: Vec3) -> ControlResult<()>;
    fn set_position(&mut self, id: BodyId, p: Vec3) -> ControlResult<()>;
    fn block_dofs(&mut self, id: BodyId, dofs: Dofs) -> ControlResult<()>;
}

/// Global state and controls the stage controller relies on.
pub trait Simulation: BodyAccess {
    /// Number of completed steps.
    fn iter(&self) -> u64;
    fn unbalanced_force(&self) -> Scalar;
    fn avg_num_interactions(&self) -> Scalar;
    /// Friction angle of the first material, if any material exists.
    fn friction_angle(&self) -> Option<Scalar>;
    fn set_gravity(&mut self, g: Vec3);
    /// Stop further stepping. Effects of the current step stay in place.
    fn pause(&mut self);
}

pub trait Engine: Simulation {
    fn advance(&mut self) -> StepStats;
    fn is_paused(&self) -> bool;
}

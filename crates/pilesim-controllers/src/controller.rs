use std::ops::Range;

use pilesim_core::{vec3, BodyId, Dofs, Scalar, Vec3};
use tracing::info;

use crate::{metrics, ControlError, ControlResult, PileBodySet, Simulation, Stage};

/// Transition guards and the kinematics imposed on the pile.
#[derive(Clone, Debug)]
pub struct ControllerParams {
    /// Gravity stays off until the step counter passes this.
    pub settle_steps: u64,
    /// Deposition may not end before this step.
    pub deposit_min_steps: u64,
    pub unbalanced_threshold: Scalar,
    /// Slowest sphere must move slower than this for the pack to count as deposited.
    pub rest_speed_threshold: Scalar,
    pub gravity: Vec3,
    /// Vertical pile velocity during insertion (negative is downwards).
    pub insertion_velocity: Scalar,
    pub mean_diameter: Scalar,
    /// Body ids of the sphere pack.
    pub spheres: Range<u32>,
}

impl ControllerParams {
    pub fn new(spheres: Range<u32>, mean_diameter: Scalar, insertion_velocity: Scalar) -> Self {
        Self {
            settle_steps: 500,
            deposit_min_steps: 10_000,
            unbalanced_threshold: 0.05,
            rest_speed_threshold: 0.1,
            gravity: vec3(0.0, -9.81, 0.0),
            insertion_velocity,
            mean_diameter,
            spheres,
        }
    }
}

/// Which termination test stopped the insertion. Both are kept on purpose: one is an absolute
/// depth, the other a travel distance, and they can fire together.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PauseReason {
    pub bottom_reached: bool,
    pub full_length: bool,
}

impl PauseReason {
    pub fn evaluate(pile_bottom_y: Scalar, reference: Scalar, mean_diameter: Scalar, pile_height: Scalar) -> Option<Self> {
        let bottom_reached = pile_bottom_y <= mean_diameter;
        let full_length = (reference - pile_bottom_y).abs() >= pile_height;
        (bottom_reached || full_length).then_some(Self { bottom_reached, full_length })
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Transition {
    Stay,
    Depositing,
    Inserting { top_y: Scalar, offset: Scalar },
    Paused(PauseReason),
}

/// Settle → deposit → insert, evaluated once per step.
pub struct StageController {
    params: ControllerParams,
    pile: PileBodySet,
    stage: Stage,
    reference_disp: Option<Scalar>,
    halted: bool,
}

impl StageController {
    pub fn new(params: ControllerParams, pile: PileBodySet) -> Self {
        Self { params, pile, stage: Stage::Settling, reference_disp: None, halted: false }
    }

    #[inline] pub fn stage(&self) -> Stage { self.stage }
    #[inline] pub fn params(&self) -> &ControllerParams { &self.params }
    #[inline] pub fn pile(&self) -> &PileBodySet { &self.pile }
    #[inline] pub fn is_halted(&self) -> bool { self.halted }
    /// Pack surface height captured when insertion began.
    #[inline] pub fn reference_displacement(&self) -> Option<Scalar> { self.reference_disp }

    pub fn check<S: Simulation + ?Sized>(&mut self, sim: &mut S) -> ControlResult<Transition> {
        if self.halted { return Ok(Transition::Stay); }
        let step = sim.iter();

        match self.stage {
            Stage::Settling => {
                if step > self.params.settle_steps {
                    sim.set_gravity(self.params.gravity);
                    self.advance_stage();
                    info!(step, "gravity on, deposition started");
                    return Ok(Transition::Depositing);
                }
            }
            Stage::Depositing => {
                if self.deposited(&*sim, step)? {
                    let (top_y, offset) = self.start_insertion(sim)?;
                    info!(step, top_y, offset, "pack at rest, pile insertion started");
                    return Ok(Transition::Inserting { top_y, offset });
                }
            }
            Stage::Inserting => {
                let y = self.pile.bottom_y(&*sim)?;
                let reference = self.reference_disp.unwrap_or(y);
                if let Some(reason) = PauseReason::evaluate(y, reference, self.params.mean_diameter, self.pile.height()) {
                    sim.pause();
                    self.halted = true;
                    info!(step, pile_bottom_y = y, bottom_reached = reason.bottom_reached,
                          full_length = reason.full_length, "insertion finished, simulation paused");
                    return Ok(Transition::Paused(reason));
                }
            }
        }
        Ok(Transition::Stay)
    }

    fn advance_stage(&mut self) {
        if let Some(next) = self.stage.next() { self.stage = next; }
    }

    fn deposited<S: Simulation + ?Sized>(&self, sim: &S, step: u64) -> ControlResult<bool> {
        let p = &self.params;
        if !(metrics::unbalanced_force(sim) < p.unbalanced_threshold && step > p.deposit_min_steps) {
            return Ok(false);
        }
        Ok(metrics::min_speed(sim, p.spheres.clone())? < p.rest_speed_threshold)
    }

    /// Park the pile tip one mean diameter above the pack and start driving it down.
    /// All reads happen before the first write.
    fn start_insertion<S: Simulation + ?Sized>(&mut self, sim: &mut S) -> ControlResult<(Scalar, Scalar)> {
        let top_y = metrics::max_y(&*sim, self.params.spheres.clone())? + self.params.mean_diameter;
        let initial_disp = self.pile.bottom_y(&*sim)?;
        let offset = initial_disp - top_y;

        let shifted = self.pile.ids().iter()
            .map(|&id| sim.position(id).map(|p| (id, p - Vec3::Y * offset)).ok_or(ControlError::UnknownBody(id)))
            .collect::<ControlResult<Vec<(BodyId, Vec3)>>>()?;

        let v = vec3(0.0, self.params.insertion_velocity, 0.0);
        for (id, p) in shifted {
            sim.block_dofs(id, Dofs::ALL)?;
            sim.set_velocity(id, v)?;
            sim.set_position(id, p)?;
        }

        self.reference_disp = Some(top_y);
        self.advance_stage();
        Ok((top_y, offset))
    }
}

//! Scalar summaries read from the engine. None of these mutate the simulation.

use std::ops::Range;

use pilesim_core::{BodyId, Scalar, Vec3};
use crate::{ControlError, ControlResult, PileBodySet, Simulation};

/// Everything one telemetry row needs besides the step and the stage.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Metrics {
    pub unbalanced_force: Scalar,
    pub friction_angle: Scalar,
    pub coordination_number: Scalar,
    pub pile_bottom_y: Scalar,
    pub pile_force: Vec3,
}

#[inline]
pub fn unbalanced_force<S: Simulation + ?Sized>(sim: &S) -> Scalar { sim.unbalanced_force() }

#[inline]
pub fn coordination_number<S: Simulation + ?Sized>(sim: &S) -> Scalar { sim.avg_num_interactions() }

/// Single-material convention: the first material's angle stands for the whole assembly.
pub fn friction_angle<S: Simulation + ?Sized>(sim: &S) -> ControlResult<Scalar> {
    sim.friction_angle().ok_or(ControlError::NoMaterial)
}

fn fold_range<S, F>(sim: &S, ids: Range<u32>, what: &'static str, read: F, pick: fn(Scalar, Scalar) -> Scalar) -> ControlResult<Scalar>
where
    S: Simulation + ?Sized,
    F: Fn(&S, BodyId) -> Option<Scalar>,
{
    let mut acc: Option<Scalar> = None;
    for i in ids {
        let id = BodyId(i);
        let x = read(sim, id).ok_or(ControlError::UnknownBody(id))?;
        acc = Some(match acc { None => x, Some(a) => pick(a, x) });
    }
    acc.ok_or(ControlError::EmptyRange(what))
}

pub fn min_speed<S: Simulation + ?Sized>(sim: &S, ids: Range<u32>) -> ControlResult<Scalar> {
    fold_range(sim, ids, "min_speed", |s, id| s.velocity(id).map(|v| v.length()), Scalar::min)
}

pub fn max_speed<S: Simulation + ?Sized>(sim: &S, ids: Range<u32>) -> ControlResult<Scalar> {
    fold_range(sim, ids, "max_speed", |s, id| s.velocity(id).map(|v| v.length()), Scalar::max)
}

pub fn min_y<S: Simulation + ?Sized>(sim: &S, ids: Range<u32>) -> ControlResult<Scalar> {
    fold_range(sim, ids, "min_y", |s, id| s.position(id).map(|p| p.y), Scalar::min)
}

pub fn max_y<S: Simulation + ?Sized>(sim: &S, ids: Range<u32>) -> ControlResult<Scalar> {
    fold_range(sim, ids, "max_y", |s, id| s.position(id).map(|p| p.y), Scalar::max)
}

/// Sum of the resultant forces on `ids`; an empty subset sums to zero.
pub fn net_force<S: Simulation + ?Sized>(sim: &S, ids: &[BodyId]) -> ControlResult<Vec3> {
    let mut f = Vec3::ZERO;
    for &id in ids {
        f += sim.force(id).ok_or(ControlError::UnknownBody(id))?;
    }
    Ok(f)
}

/// Read every telemetry scalar for the current step.
pub fn sample<S: Simulation + ?Sized>(sim: &S, pile: &PileBodySet) -> ControlResult<Metrics> {
    Ok(Metrics {
        unbalanced_force: unbalanced_force(sim),
        friction_angle: friction_angle(sim)?,
        coordination_number: coordination_number(sim),
        pile_bottom_y: pile.bottom_y(sim)?,
        pile_force: net_force(sim, pile.ids())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeSim;
    use pilesim_core::vec3;
    use approx::assert_relative_eq;

    #[test]
    fn min_speed_over_fixture() {
        let mut sim = FakeSim::default();
        sim.push(vec3(0.0, 0.1, 0.0), vec3(0.05, 0.0, 0.0));
        sim.push(vec3(0.0, 0.2, 0.0), vec3(0.0, -0.2, 0.0));
        sim.push(vec3(0.0, 0.3, 0.0), vec3(0.3, 0.4, 0.0));
        assert_relative_eq!(min_speed(&sim, 0..3).unwrap(), 0.05);
        assert_relative_eq!(max_speed(&sim, 0..3).unwrap(), 0.5);
        assert_relative_eq!(min_y(&sim, 0..3).unwrap(), 0.1);
        assert_relative_eq!(max_y(&sim, 1..3).unwrap(), 0.3);
    }

    #[test]
    fn empty_range_is_fatal() {
        let sim = FakeSim::default();
        assert!(matches!(min_speed(&sim, 0..0), Err(ControlError::EmptyRange("min_speed"))));
        assert!(matches!(max_y(&sim, 3..3), Err(ControlError::EmptyRange(_))));
    }

    #[test]
    fn out_of_range_id_is_fatal() {
        let mut sim = FakeSim::default();
        sim.push(Vec3::ZERO, Vec3::ZERO);
        assert!(matches!(min_y(&sim, 0..2), Err(ControlError::UnknownBody(BodyId(1)))));
    }

    #[test]
    fn net_force_sums_subset() {
        let mut sim = FakeSim::default();
        for i in 0..4 {
            let id = sim.push(Vec3::ZERO, Vec3::ZERO);
            sim.bodies[id.0 as usize].force = vec3(1.0, i as f64, -2.0);
        }
        let f = net_force(&sim, &[BodyId(1), BodyId(3)]).unwrap();
        assert_eq!(f, vec3(2.0, 4.0, -4.0));
        assert_eq!(net_force(&sim, &[]).unwrap(), Vec3::ZERO);
        assert!(net_force(&sim, &[BodyId(9)]).is_err());
    }

    #[test]
    fn friction_angle_needs_a_material() {
        let mut sim = FakeSim::default();
        sim.friction = None;
        assert!(matches!(friction_angle(&sim), Err(ControlError::NoMaterial)));
    }
}

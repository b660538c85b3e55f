use pilesim_core::{Scalar, Vec3};
use crate::Bodies;

/// Explicit leap-frog integrator with Cundall's non-viscous damping.
#[derive(Copy, Clone, Debug)]
pub struct Newton {
    pub damping: Scalar,
    pub gravity: Vec3,
}

impl Default for Newton {
    fn default() -> Self { Self { damping: 0.2, gravity: Vec3::ZERO } }
}

impl Newton {
    #[inline]
    fn damp(&self, a: Scalar, v: Scalar, dt: Scalar) -> Scalar {
        let s = a * (v + 0.5 * dt * a);
        if s > 0.0 { a * (1.0 - self.damping) } else if s < 0.0 { a * (1.0 + self.damping) } else { a }
    }

    /// Advance every body by `dt`. Gravity is folded into the force of dynamic bodies first, so
    /// the force accumulator read after the step is the full unbalanced force on the body.
    /// Locked axes keep their imposed velocity; every body is moved by its velocity.
    pub fn integrate(&self, bodies: &mut Bodies, dt: Scalar) {
        for id in 0..bodies.len() as u32 {
            let blocked = bodies.blocked(id);
            let mut vel = bodies.vel(id);

            if bodies.is_dynamic(id) {
                let m = bodies.mass_of(id);
                bodies.add_force(id, self.gravity * m);
                let im = bodies.inv_mass_of(id);
                let f = bodies.force(id);
                for k in 0..3 {
                    if blocked.lin_locked(k) { continue; }
                    let a = self.damp(f[k] * im, vel.lin[k], dt);
                    vel.lin[k] += a * dt;
                }
                let ii = bodies.inv_inertia_of(id);
                let t = bodies.torque(id);
                for k in 0..3 {
                    if blocked.ang_locked(k) { continue; }
                    let aa = self.damp(t[k] * ii, vel.ang[k], dt);
                    vel.ang[k] += aa * dt;
                }
                bodies.set_vel(id, vel);
            }

            bodies.apply_position_delta(id, vel.lin * dt);
        }
    }
}

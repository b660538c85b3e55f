use pilesim_world::*;
use pilesim_core::{vec3, hex32};
use pilesim_materials::FrictMat;

fn main() {
    let mut w = WorldBuilder::new().with_capacity(64).build();
    let m = w.add_material(FrictMat { young: 1.0e6, ..FrictMat::default() });

    // Ground (static)
    w.add_box(vec3(0.0, 0.0, 0.0), vec3(1.0, 0.1, 1.0), m);

    // Falling spheres
    for i in 0..4 {
        w.add_sphere(vec3(0.03 * i as f64, 0.15 + 0.01 * i as f64, 0.0), 0.01, m);
    }
    let dt = 0.5 * w.p_wave_timestep().unwrap_or(1.0e-4);
    w.set_dt(dt);
    pilesim_controllers::Simulation::set_gravity(&mut w, vec3(0.0, -9.81, 0.0));

    for step in 0..600 {
        let stats = w.step();
        if step % 50 == 0 {
            println!("step {step:03}  pairs={}  contacts={}  hash={}", stats.pairs_tested, stats.contacts, hex32(w.step_hash()));
        }
    }
}

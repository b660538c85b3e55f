use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use pilesim_controllers::PileBodySet;
use pilesim_core::{BodyId, Scalar};
use pilesim_geom::{facet_cylinder, PeriodicCell};
use pilesim_io::{load_stl, InitialParameters, SpherePack, Triangle};
use pilesim_world::{World, WorldBuilder};
use tracing::info;

const PACK_SEED: u64 = 1;
const STL_SCALE: Scalar = 1.0 / 1000.0;
const CYLINDER_SEGMENTS: usize = 24;

/// Where the pile comes from.
pub enum PileSource {
    Stl(PathBuf),
    /// Closed faceted cylinder, radius capped at a quarter of the cell width.
    Procedural,
}

pub struct Scene {
    pub world: World,
    pub pile: PileBodySet,
    pub spheres: Range<u32>,
}

/// Base box, sphere pack, periodic cell and pile, in that order; body 0 is the box.
pub fn build_scene(params: &mut InitialParameters, pack_file: &Path, pile: PileSource) -> Result<Scene> {
    let layout = params.layout();
    let mut w = WorldBuilder::new().build();
    let mat = w.add_material(params.material());

    // ----- BASE BOX -----
    let (c, half) = params.base_box();
    w.add_box(c, half, mat);

    // ----- SPHERES -----
    let pack = if params.flag_import_existing_pack_file {
        SpherePack::load(pack_file).with_context(|| format!("loading sphere pack {}", pack_file.display()))?
    } else {
        let p = SpherePack::make_cloud(
            layout.cloud_min(), layout.cloud_max(),
            params.sphere_diameter_mean, params.sphere_diameter_std_dev, PACK_SEED, true,
        );
        if let Some(dir) = pack_file.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        p.save(pack_file).with_context(|| format!("saving sphere pack {}", pack_file.display()))?;
        p
    };
    if pack.is_empty() { bail!("sphere pack is empty"); }
    let first = w.num_bodies();
    for s in &pack.spheres {
        w.add_sphere(s.center, s.r, mat);
    }
    let spheres = first..w.num_bodies();
    println!("{} spheres are generated", spheres.len());

    w.set_periodic_cell(PeriodicCell::periodic_xz(params.simulation_box_width, layout.cell_height));

    // ----- PILE -----
    let tris: Vec<Triangle> = match pile {
        PileSource::Stl(path) => load_stl(&path, STL_SCALE, layout.pile_origin)
            .with_context(|| format!("importing pile model {}", path.display()))?,
        PileSource::Procedural => {
            let r = params.pile_radius.min(0.25 * params.simulation_box_width);
            facet_cylinder(r, params.pile_height, CYLINDER_SEGMENTS, layout.pile_origin)
        }
    };
    if tris.is_empty() { bail!("pile model has no facets"); }
    let ids: Vec<BodyId> = tris.iter().map(|t| w.add_facet(*t, mat)).collect();
    println!("{} facets of pile model are imported", ids.len());

    let pile = PileBodySet::from_positions(&w, &ids).context("partitioning pile facets")?;
    let (bottom, top) = pile.initial_extent();
    params.pile_height = pile.height();
    println!("Pile is initially located across coordinates {bottom:4.2} to {top:4.2}");

    w.set_cell_height(top.ceil());

    let dt = w.p_wave_timestep().context("no spheres to derive a time step from")?;
    w.set_dt(0.5 * dt);
    info!(dt = 0.5 * dt, bodies = w.num_bodies(), "scene ready");

    Ok(Scene { world: w, pile, spheres })
}

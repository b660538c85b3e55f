// Pile insertion into a periodic granular bed: settle, deposit under gravity, then drive the
// pile down at constant velocity while logging telemetry.

mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser};
use pilesim_controllers::{ControllerParams, StageController};
use pilesim_io::{InitialParameters, Session, TelemetryExporter};
use scene::{build_scene, PileSource};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "pile_insertion", version, about = "DEM pile insertion into a periodic sphere pack")]
struct Opts {
    /// JSON file with initial parameters (missing keys take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding `temp/` inputs and receiving `result/`
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Pile model; defaults to temp/pile_v2_light.stl (or the heavy model if configured)
    #[arg(long)]
    pile_stl: Option<PathBuf>,

    /// Build the pile as a faceted cylinder instead of importing an STL
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "pile_stl")]
    procedural_pile: bool,

    /// Stop after this many steps even if the pile has not finished
    #[arg(long)]
    max_steps: Option<u64>,

    /// Never write spatial snapshots
    #[arg(long, action = ArgAction::SetTrue)]
    no_snapshots: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let opts = Opts::parse();
    let level = match opts.verbose { 0 => Level::INFO, 1 => Level::DEBUG, _ => Level::TRACE };
    tracing_subscriber::fmt().with_max_level(level).with_target(false).init();

    if let Err(e) = run(opts) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(opts: Opts) -> Result<()> {
    println!();
    println!("-------------------------------------");
    let start = Local::now();
    println!("Simulation started at {}", start.format("%Y/%m/%d %H:%M:%S%.6f"));

    let mut params = match &opts.config {
        Some(p) => InitialParameters::load(p).with_context(|| format!("reading {}", p.display()))?,
        None => InitialParameters::default(),
    };
    params.validate().context("initial parameters")?;

    let l = params.layout();
    println!("Box width: {:>4.2}", params.simulation_box_width);
    println!("Base box height: {:>4.2}", l.base_box_height);
    println!("Initial Y of top of sphere pack: {:>4.2}", l.upper_y);
    println!("Initial Y of bottom of pile: {:>4.2}", l.pile_origin.y);
    println!("Initial Y of top of pile: {:>4.2}", l.pile_origin.y + params.pile_height + params.pile_radius);
    println!("Box height: {:>4.2}", l.cell_height);
    println!("Final Y of bottom of pile: {:>4.2}", l.pause_pile_y);

    // ----- OUTPUT LAYOUT -----
    let stamp = start.format("%Y-%m-%d_%H-%M-%S").to_string();
    let out_dir = opts.root.join("result").join(&stamp);
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let csv_path = out_dir.join(format!("{stamp}_output.csv"));
    let temp_dir = opts.root.join("temp");
    let pack_file = temp_dir.join("sphere_pack_pile_insertion.txt");

    params.write_json(&out_dir.join("initial_parameters.json")).context("writing initial_parameters.json")?;

    let pile_src = if opts.procedural_pile {
        PileSource::Procedural
    } else {
        let default = if params.flag_import_heavy_stl_model { "pile_v1_heavy.stl" } else { "pile_v2_light.stl" };
        PileSource::Stl(opts.pile_stl.clone().unwrap_or_else(|| temp_dir.join(default)))
    };

    let scene = build_scene(&mut params, &pack_file, pile_src).context("building scene")?;

    let snapshot_dir = (params.flag_output_snapshots && !opts.no_snapshots).then(|| out_dir.join("snapshots"));
    let exporter = TelemetryExporter::create(&csv_path, snapshot_dir)
        .with_context(|| format!("opening {}", csv_path.display()))?;
    let ctrl = StageController::new(
        ControllerParams::new(scene.spheres.clone(), params.sphere_diameter_mean, params.pile_insertion_velocity),
        scene.pile,
    );

    let mut session = Session::new(scene.world, ctrl, exporter, params.export_data_iter_interval)
        .with_max_steps(opts.max_steps);
    let summary = session.run().context("simulation stopped")?;

    let elapsed = Local::now() - start;
    println!("-------------------------------------");
    println!("Steps: {}  Rows: {}  Stage: {}", summary.steps, summary.rows, summary.stage);
    let plot = session.exporter().plot();
    if let Some(last) = plot.last() {
        println!("Last export: iter {}  UnF {:.3}  Fy_cy {:.2}", last.iter, last.unbalanced_force, last.force_y);
    }
    let mut track = plot.pile_track();
    if let Some((start_iter, start_y)) = track.next() {
        let (end_iter, end_y) = track.last().unwrap_or((start_iter, start_y));
        println!("Pile tip: {start_y:.3} at iter {start_iter} -> {end_y:.3} at iter {end_iter}");
    }
    if let Some(r) = summary.pause {
        println!("Pile stopped (bottom reached: {}, full length: {})", r.bottom_reached, r.full_length);
    }
    println!("Output: {}", csv_path.display());
    println!("Elapsed: {:.1} s", elapsed.num_milliseconds() as f64 / 1000.0);
    Ok(())
}

//! Run inputs and outputs: parameters, pile geometry, sphere packs, telemetry and the run loop.

mod error;
pub mod params;
pub mod stl;
pub mod pack;
pub mod telemetry;
pub mod session;

pub use error::{IoError, IoResult};
pub use params::{InitialParameters, Layout};
pub use stl::{load_stl, parse_stl, Triangle};
pub use pack::{Sphere, SpherePack};
pub use telemetry::{CsvSink, TelemetryExporter, TelemetryRow};
pub use session::{Session, SessionSummary};

mod error;
mod access;
pub mod metrics;
mod pile;
mod stage;
mod controller;
#[cfg(test)]
pub(crate) mod fake;

pub use error::{ControlError, ControlResult};
pub use access::{BodyAccess, Simulation, Engine};
pub use metrics::Metrics;
pub use pile::PileBodySet;
pub use stage::Stage;
pub use controller::{StageController, ControllerParams, Transition, PauseReason};

pub mod scalar;
pub mod ids;
pub mod types;
pub mod hash;
pub mod time;
pub mod schedule;

pub use scalar::Scalar;
pub use ids::{BodyId, MaterialId};
pub use types::{Vec3, Velocity, Dofs, vec3};
pub use hash::{StepHasher, hash_vec3, hex32};
pub use time::StepStats;
pub use schedule::{StepStage, schedule_digest};

pub mod aabb;
pub mod cell;
pub mod shape;
pub mod mass;
pub mod tessellate;

pub use aabb::Aabb;
pub use cell::PeriodicCell;
pub use shape::{Shape, aabb_of, closest_point_on_triangle};
pub use mass::MassProps;
pub use tessellate::facet_cylinder;

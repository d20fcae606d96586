//! Geometry value types

mod angle;
mod bounds;
mod plane;

pub use angle::Angle;
pub use bounds::Bounds;
pub use plane::Plane;

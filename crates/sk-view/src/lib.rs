//! Camera and hit-testing layer
//!
//! Owns the view/projection state, the screen-to-world ray construction
//! every pointer event goes through, and the screen-space hit tests shared
//! by sketchers and scene selection.

pub mod camera;
pub mod hit;

pub use camera::Camera;
pub use hit::{HitLine, PickContext, Tolerances};

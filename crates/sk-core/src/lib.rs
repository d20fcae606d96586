//! Core data model for the sketching engine
//!
//! Provides:
//! - Geometry value types (angle, plane, bounds) on top of `glam` f64 math
//! - The per-entity attribute store with momento snapshot/revert semantics
//! - Sketchable shapes with dirty-flag-driven geometry recomputation
//! - The `Sketch` container and the abstract render-target seam

pub mod attr;
pub mod geom;
pub mod render;
pub mod shape;
pub mod sketch;

pub use attr::{AttrError, AttrKey, AttrMap, AttrStore, AttrValue};
pub use geom::{Angle, Bounds, Plane};
pub use render::{RecordingTarget, RenderTarget};
pub use shape::{arc_stop_point, boxed_corners, GeometryBuffers, ShapeKind, Sketchable};
pub use sketch::Sketch;

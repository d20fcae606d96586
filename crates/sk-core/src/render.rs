//! Abstract drawing seam
//!
//! The engine issues point/polyline primitives through this trait; the
//! concrete graphics backend lives entirely outside the core.

use glam::DVec3;

/// Drawing target the dirty pipeline renders into
pub trait RenderTarget {
    /// Draw connected line segments through the given world points
    fn draw_polyline(&mut self, points: &[DVec3]);

    /// Draw vertex markers at the given world points
    fn draw_points(&mut self, points: &[DVec3]);
}

/// Recording target for tests and headless consumers
#[derive(Debug, Default, Clone)]
pub struct RecordingTarget {
    pub polylines: Vec<Vec<DVec3>>,
    pub points: Vec<Vec<DVec3>>,
}

impl RenderTarget for RecordingTarget {
    fn draw_polyline(&mut self, points: &[DVec3]) {
        self.polylines.push(points.to_vec());
    }

    fn draw_points(&mut self, points: &[DVec3]) {
        self.points.push(points.to_vec());
    }
}

//! Orbit camera and screen/world mapping

use glam::{DMat4, DVec2, DVec3, DVec4};
use serde::{Deserialize, Serialize};

use sk_core::Bounds;

use crate::hit::HitLine;

const MIN_DISTANCE: f64 = 1e-3;
const MAX_PITCH: f64 = 1.54;
const DEGENERATE_W: f64 = 1e-9;

/// Perspective orbit camera
///
/// Owns the view/projection state and converts between screen pixels and
/// world rays. All hit-test tolerances are made zoom-independent through
/// `viewport_to_world_scaling`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Orbit target
    target: DVec3,
    /// Distance from the eye to the target
    distance: f64,
    /// Azimuth around the world Z axis, radians
    yaw: f64,
    /// Elevation from the XY plane, radians
    pitch: f64,
    /// Vertical field of view, radians
    fov_y: f64,
    aspect: f64,
    near: f64,
    far: f64,
}

impl Camera {
    pub fn new(aspect: f64) -> Self {
        Self {
            target: DVec3::ZERO,
            distance: 10.0,
            yaw: 0.0,
            pitch: 0.0,
            fov_y: 45f64.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn target(&self) -> DVec3 {
        self.target
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn set_distance(&mut self, distance: f64) {
        self.distance = distance.max(MIN_DISTANCE);
    }

    pub fn set_orientation(&mut self, yaw: f64, pitch: f64) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn update_aspect(&mut self, aspect: f64) {
        self.aspect = aspect;
    }

    /// Eye position derived from target, orientation and distance
    pub fn eye(&self) -> DVec3 {
        let dir = DVec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
        );
        self.target + dir * self.distance
    }

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.eye(), self.target, DVec3::Z)
    }

    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to screen pixels
    ///
    /// Returns None for points behind the eye or when the projection is
    /// degenerate, so callers treat the case as "no interaction" instead of
    /// propagating non-finite values.
    pub fn world_to_screen(&self, world: DVec3, viewport: DVec2) -> Option<DVec2> {
        let clip = self.view_proj() * world.extend(1.0);
        if !clip.w.is_finite() || clip.w <= DEGENERATE_W {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !ndc.is_finite() {
            return None;
        }
        Some(DVec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        ))
    }

    /// Construct the world ray under a screen pixel
    pub fn screen_to_world(&self, screen: DVec2, viewport: DVec2) -> Option<HitLine> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let inverse = self.view_proj().inverse();
        if !inverse.is_finite() {
            tracing::warn!("degenerate view projection, skipping ray construction");
            return None;
        }
        let ndc = DVec2::new(
            screen.x / viewport.x * 2.0 - 1.0,
            1.0 - screen.y / viewport.y * 2.0,
        );
        let front = unproject(&inverse, ndc, 0.0)?;
        let back = unproject(&inverse, ndc, 1.0)?;
        Some(HitLine {
            front,
            back,
            world_per_pixel: self.viewport_to_world_scaling(viewport),
        })
    }

    /// World units per screen pixel at the orbit target distance
    pub fn viewport_to_world_scaling(&self, viewport: DVec2) -> f64 {
        if viewport.y <= 0.0 {
            return 0.0;
        }
        2.0 * self.distance * (self.fov_y * 0.5).tan() / viewport.y
    }

    /// World units per screen pixel at the depth of a specific world point
    ///
    /// None when the point is at or behind the eye. The hit tests
    /// deliberately use the target-depth [`Self::viewport_to_world_scaling`]
    /// captured on the [`HitLine`] instead; sketch geometry sits near the
    /// orbit target, so the per-point refinement is offered for callers
    /// working far off-plane.
    pub fn scene_to_world_scaling(&self, world: DVec3, viewport: DVec2) -> Option<f64> {
        if viewport.y <= 0.0 {
            return None;
        }
        let forward = (self.target - self.eye()).normalize_or_zero();
        let depth = (world - self.eye()).dot(forward);
        if depth <= DEGENERATE_W {
            return None;
        }
        Some(2.0 * depth * (self.fov_y * 0.5).tan() / viewport.y)
    }

    /// Rotate the view around the target by pixel deltas
    pub fn orbit(&mut self, dx: f64, dy: f64, sensitivity: f64) {
        self.yaw -= dx * sensitivity;
        self.pitch = (self.pitch + dy * sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Translate the target parallel to the view plane by pixel deltas
    pub fn pan(&mut self, dx: f64, dy: f64, viewport: DVec2) {
        let scale = self.viewport_to_world_scaling(viewport);
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(DVec3::Z).normalize_or_zero();
        let up = right.cross(forward);
        self.target += (-right * dx + up * dy) * scale;
    }

    /// Move the eye toward (positive steps) or away from the target
    pub fn dolly(&mut self, steps: f64) {
        self.distance = (self.distance * 0.9f64.powf(steps)).max(MIN_DISTANCE);
    }

    /// Frame the given bounds, keeping the current orientation
    pub fn frame(&mut self, bounds: &Bounds) {
        let radius = bounds.diagonal().length() * 0.5;
        self.target = bounds.center();
        if radius > 0.0 {
            self.distance = (radius / (self.fov_y * 0.5).sin() * 1.1).max(MIN_DISTANCE);
        }
    }
}

fn unproject(inverse: &DMat4, ndc: DVec2, depth: f64) -> Option<DVec3> {
    let p = *inverse * DVec4::new(ndc.x, ndc.y, depth, 1.0);
    if !p.w.is_finite() || p.w.abs() < DEGENERATE_W {
        return None;
    }
    let world = p.truncate() / p.w;
    world.is_finite().then_some(world)
}

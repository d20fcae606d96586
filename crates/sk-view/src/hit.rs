//! Screen-space hit testing
//!
//! All tests compare against pixel tolerances so behaviour is independent
//! of zoom and viewport resolution: point tests project into screen space,
//! segment and curve tests scale world distances by the camera's
//! world-per-pixel factor captured on the `HitLine`.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use sk_core::{Angle, Plane};

use crate::camera::Camera;

const PARALLEL_EPS: f64 = 1e-9;

/// Pixel tolerances for hit testing
///
/// The defaults are deliberate interaction constants; override them
/// rather than re-deriving values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Vertex / control-point pick radius, screen pixels
    pub vertex_px: f64,
    /// Smaller radius for center handles, screen pixels
    pub center_px: f64,
    /// Edge / curve pick distance, screen pixels
    pub edge_px: f64,
    /// Relative residual accepted by the implicit ellipse test
    pub ellipse_residual: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            vertex_px: 6.0,
            center_px: 4.0,
            edge_px: 6.0,
            ellipse_residual: 0.1,
        }
    }
}

/// A screen-cursor-derived world ray
///
/// `front`/`back` are the near/far unprojections of one pixel;
/// `world_per_pixel` is the camera scaling captured at construction so
/// world-space distances can be compared against pixel tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitLine {
    pub front: DVec3,
    pub back: DVec3,
    pub world_per_pixel: f64,
}

impl HitLine {
    /// Unit direction from front to back
    pub fn direction(&self) -> DVec3 {
        (self.back - self.front).normalize_or_zero()
    }

    /// Intersect the ray with a plane
    ///
    /// None when the ray is parallel to the plane or the intersection lies
    /// behind the near point.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<DVec3> {
        let dir = self.back - self.front;
        let denom = dir.dot(plane.normal);
        if denom.abs() < PARALLEL_EPS {
            return None;
        }
        let t = (plane.origin - self.front).dot(plane.normal) / denom;
        if t < 0.0 {
            return None;
        }
        Some(self.front + dir * t)
    }

    /// Shortest world distance between the ray and a segment
    pub fn distance_to_segment(&self, a: DVec3, b: DVec3) -> f64 {
        closest_segment_segment(self.front, self.back, a, b)
    }
}

/// Everything one pointer event needs for hit testing: the camera, the
/// cursor, and the ray under it
#[derive(Debug, Clone)]
pub struct PickContext<'a> {
    pub camera: &'a Camera,
    pub viewport: DVec2,
    pub cursor: DVec2,
    pub ray: HitLine,
    pub tolerances: Tolerances,
}

impl<'a> PickContext<'a> {
    /// Build a context for the cursor position; None when the camera cannot
    /// construct a ray (degenerate projection)
    pub fn new(
        camera: &'a Camera,
        viewport: DVec2,
        cursor: DVec2,
        tolerances: Tolerances,
    ) -> Option<Self> {
        let ray = camera.screen_to_world(cursor, viewport)?;
        Some(Self {
            camera,
            viewport,
            cursor,
            ray,
            tolerances,
        })
    }

    /// Cursor projected onto a plane through the event ray
    pub fn on_plane(&self, plane: &Plane) -> Option<DVec3> {
        self.ray.intersect_plane(plane)
    }

    /// Vertex test: screen distance to the projected point
    pub fn hit_point(&self, world: DVec3) -> bool {
        self.hit_point_with(world, self.tolerances.vertex_px)
    }

    /// Center-handle test with the smaller tolerance
    pub fn hit_center(&self, world: DVec3) -> bool {
        self.hit_point_with(world, self.tolerances.center_px)
    }

    pub fn hit_point_with(&self, world: DVec3, tolerance_px: f64) -> bool {
        match self.camera.world_to_screen(world, self.viewport) {
            Some(screen) => screen.distance(self.cursor) <= tolerance_px,
            None => false,
        }
    }

    /// Segment test: ray-to-segment world distance scaled to pixels
    pub fn hit_segment(&self, a: DVec3, b: DVec3) -> bool {
        let scale = self.ray.world_per_pixel;
        if scale <= 0.0 {
            return false;
        }
        self.ray.distance_to_segment(a, b) / scale <= self.tolerances.edge_px
    }

    /// Circle/arc rim test: radial distance within the edge tolerance
    pub fn hit_circle(&self, plane: &Plane, center: DVec3, radius: f64) -> bool {
        let scale = self.ray.world_per_pixel;
        if scale <= 0.0 {
            return false;
        }
        let Some(point) = self.on_plane(plane) else {
            return false;
        };
        ((point - center).length() - radius).abs() / scale <= self.tolerances.edge_px
    }

    /// Ellipse test: implicit-equation residual in the tilted local frame
    pub fn hit_ellipse(&self, plane: &Plane, anchor1: DVec3, anchor2: DVec3, tilt: Angle) -> bool {
        let Some(point) = self.on_plane(plane) else {
            return false;
        };
        let a1 = plane.to_local(anchor1);
        let a2 = plane.to_local(anchor2);
        let rx = (a2.x - a1.x).abs() * 0.5;
        let ry = (a2.y - a1.y).abs() * 0.5;
        if rx < PARALLEL_EPS || ry < PARALLEL_EPS {
            return false;
        }
        let center = (a1 + a2) * 0.5;
        let local = (-tilt).rotate(plane.to_local(point) - center);
        let residual = (local.x / rx).powi(2) + (local.y / ry).powi(2) - 1.0;
        residual.abs() <= self.tolerances.ellipse_residual
    }

    /// Box boundary test: any of the four edges
    pub fn hit_box(&self, corners: &[DVec3; 4]) -> bool {
        (0..4).any(|i| self.hit_segment(corners[i], corners[(i + 1) % 4]))
    }
}

/// Closest vertex within the vertex tolerance
///
/// Vertex hits take priority over edge hits: callers test vertices first
/// and skip edge tests entirely when this returns Some.
pub fn pick_vertex(ctx: &PickContext<'_>, points: &[DVec3]) -> Option<usize> {
    let mut closest: Option<(usize, f64)> = None;
    for (i, &p) in points.iter().enumerate() {
        let Some(screen) = ctx.camera.world_to_screen(p, ctx.viewport) else {
            continue;
        };
        let dist = screen.distance(ctx.cursor);
        if dist <= ctx.tolerances.vertex_px && closest.is_none_or(|(_, d)| dist < d) {
            closest = Some((i, dist));
        }
    }
    closest.map(|(i, _)| i)
}

/// Closest polyline segment within the edge tolerance
///
/// Returns the index of the segment's first vertex; for a closed polyline
/// the final index wraps back to vertex 0.
pub fn pick_segment(ctx: &PickContext<'_>, points: &[DVec3], closed: bool) -> Option<usize> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    let scale = ctx.ray.world_per_pixel;
    if scale <= 0.0 {
        return None;
    }
    let segments = if closed { n } else { n - 1 };
    let mut closest: Option<(usize, f64)> = None;
    for i in 0..segments {
        let dist = ctx.ray.distance_to_segment(points[i], points[(i + 1) % n]) / scale;
        if dist <= ctx.tolerances.edge_px && closest.is_none_or(|(_, d)| dist < d) {
            closest = Some((i, dist));
        }
    }
    closest.map(|(i, _)| i)
}

/// Closest distance between segments p1-q1 and p2-q2
fn closest_segment_segment(p1: DVec3, q1: DVec3, p2: DVec3, q2: DVec3) -> f64 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= PARALLEL_EPS && e <= PARALLEL_EPS {
        (0.0, 0.0)
    } else if a <= PARALLEL_EPS {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= PARALLEL_EPS {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom.abs() > PARALLEL_EPS {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    ((p1 + d1 * s) - (p2 + d2 * t)).length()
}

//! Sketchable shapes with cached renderable geometry
//!
//! A `Sketchable` is an editable entity living inside a `Sketch`. Its
//! attributes are the source of truth; the point/direction buffers are a
//! cache regenerated by `compute_geometry` whenever the attribute store is
//! dirty. `render` never draws stale buffers.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attr::{AttrError, AttrKey, AttrMap, AttrStore, AttrValue};
use crate::geom::{Angle, Bounds, Plane};
use crate::render::RenderTarget;

/// Number of segments used to sample a full curve turn
pub const CURVE_SEGMENTS: usize = 64;

const DEGENERATE_EPS: f64 = 1e-9;

/// Shape kinds a sketch can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Open or closed polyline
    Line,
    /// Axis box from two anchors, with tilt
    Rectangle,
    /// Ellipse inscribed in the anchor box, with tilt
    Ellipse,
    /// Circular arc from center, start point and signed sweep
    Arc,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Line => "Line",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Ellipse => "Ellipse",
            ShapeKind::Arc => "Arc",
        }
    }

    /// Shapes edited through the two-anchor box protocol
    pub fn is_boxed(&self) -> bool {
        matches!(self, ShapeKind::Rectangle | ShapeKind::Ellipse)
    }
}

/// Cached renderable buffers regenerated from attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryBuffers {
    /// Sample points of the shape itself
    pub solid_points: Vec<DVec3>,
    /// Polyline to draw (closing segment included for closed shapes)
    pub wireframe_points: Vec<DVec3>,
    /// Unit tangent per solid point
    pub directions: Vec<DVec3>,
}

/// An editable entity with transactional apply/revert semantics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sketchable {
    id: Uuid,
    kind: ShapeKind,
    attrs: AttrStore,
    geometry: GeometryBuffers,
}

impl Sketchable {
    /// New empty line (no vertices, open)
    pub fn new_line() -> Self {
        let mut initial = AttrMap::new();
        initial.insert(AttrKey::Points, AttrValue::PointList(Vec::new()));
        initial.insert(AttrKey::Closed, AttrValue::Bool(false));
        Self::with_attrs(ShapeKind::Line, initial)
    }

    /// New rectangle with both anchors at the plane origin
    pub fn new_rectangle(plane: &Plane) -> Self {
        Self::with_attrs(ShapeKind::Rectangle, boxed_initial(plane))
    }

    /// New ellipse with both anchors at the plane origin
    pub fn new_ellipse(plane: &Plane) -> Self {
        Self::with_attrs(ShapeKind::Ellipse, boxed_initial(plane))
    }

    /// New zero-sweep arc at the plane origin
    pub fn new_arc(plane: &Plane) -> Self {
        let mut initial = AttrMap::new();
        initial.insert(AttrKey::Center, AttrValue::Point(plane.origin));
        initial.insert(AttrKey::Start, AttrValue::Point(plane.origin));
        initial.insert(AttrKey::Sweep, AttrValue::Angle(Angle::ZERO));
        Self::with_attrs(ShapeKind::Arc, initial)
    }

    fn with_attrs(kind: ShapeKind, initial: AttrMap) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            attrs: AttrStore::new(initial),
            geometry: GeometryBuffers::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn attrs(&self) -> &AttrStore {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut AttrStore {
        &mut self.attrs
    }

    pub fn is_dirty(&self) -> bool {
        self.attrs.is_dirty()
    }

    /// Cached buffers; stale while dirty, use `render` for the guarded path
    pub fn geometry(&self) -> &GeometryBuffers {
        &self.geometry
    }

    /// Commit the current edit: the live attributes become a new momento
    pub fn snapshot(&mut self) {
        self.attrs.snapshot();
    }

    /// Discard the current edit, restoring the last momento
    pub fn revert(&mut self) {
        self.attrs.revert();
    }

    /// Regenerate the cached buffers from the current attributes
    ///
    /// Idempotent; clears the dirty flag. Degenerate configurations produce
    /// empty buffers rather than non-finite points.
    pub fn compute_geometry(&mut self, plane: &Plane) -> Result<(), AttrError> {
        self.geometry = match self.kind {
            ShapeKind::Line => line_geometry(&self.attrs)?,
            ShapeKind::Rectangle => rectangle_geometry(&self.attrs, plane)?,
            ShapeKind::Ellipse => ellipse_geometry(&self.attrs, plane)?,
            ShapeKind::Arc => arc_geometry(&self.attrs, plane)?,
        };
        self.attrs.mark_clean();
        Ok(())
    }

    /// Draw the shape, recomputing geometry first if it is stale
    pub fn render(
        &mut self,
        plane: &Plane,
        target: &mut dyn RenderTarget,
    ) -> Result<(), AttrError> {
        if self.attrs.is_dirty() {
            self.compute_geometry(plane)?;
        }
        target.draw_polyline(&self.geometry.wireframe_points);
        target.draw_points(&self.geometry.solid_points);
        Ok(())
    }

    /// Bounds of the cached wireframe; None for empty or never-computed shapes
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.geometry.wireframe_points.iter().copied())
    }
}

fn boxed_initial(plane: &Plane) -> AttrMap {
    let mut initial = AttrMap::new();
    initial.insert(AttrKey::Anchor1, AttrValue::Point(plane.origin));
    initial.insert(AttrKey::Anchor2, AttrValue::Point(plane.origin));
    initial.insert(AttrKey::Tilt, AttrValue::Angle(Angle::ZERO));
    initial
}

/// World-space corners of a boxed shape: anchor1, the two derived corners
/// and anchor2, in winding order, with tilt applied about the box center
pub fn boxed_corners(attrs: &AttrStore, plane: &Plane) -> Result<[DVec3; 4], AttrError> {
    let a1 = plane.to_local(attrs.point(AttrKey::Anchor1)?);
    let a2 = plane.to_local(attrs.point(AttrKey::Anchor2)?);
    let tilt = attrs.angle(AttrKey::Tilt)?;
    let center = (a1 + a2) * 0.5;

    let locals = [
        a1,
        DVec2::new(a2.x, a1.y),
        a2,
        DVec2::new(a1.x, a2.y),
    ];
    Ok(locals.map(|p| plane.to_world(center + tilt.rotate(p - center))))
}

/// Synthetic arc stop point: the start point swept about the center
pub fn arc_stop_point(attrs: &AttrStore, plane: &Plane) -> Result<DVec3, AttrError> {
    let center = plane.to_local(attrs.point(AttrKey::Center)?);
    let start = plane.to_local(attrs.point(AttrKey::Start)?);
    let sweep = attrs.angle(AttrKey::Sweep)?;
    Ok(plane.to_world(center + sweep.rotate(start - center)))
}

fn line_geometry(attrs: &AttrStore) -> Result<GeometryBuffers, AttrError> {
    let points = attrs.points(AttrKey::Points)?.to_vec();
    let closed = attrs.flag(AttrKey::Closed)?;

    let mut wireframe = points.clone();
    if closed && points.len() >= 3 {
        wireframe.push(points[0]);
    }
    let directions = tangents(&points, closed);
    Ok(GeometryBuffers {
        solid_points: points,
        wireframe_points: wireframe,
        directions,
    })
}

fn rectangle_geometry(attrs: &AttrStore, plane: &Plane) -> Result<GeometryBuffers, AttrError> {
    let corners = boxed_corners(attrs, plane)?;
    let solid = corners.to_vec();
    let mut wireframe = solid.clone();
    wireframe.push(corners[0]);
    let directions = tangents(&solid, true);
    Ok(GeometryBuffers {
        solid_points: solid,
        wireframe_points: wireframe,
        directions,
    })
}

fn ellipse_geometry(attrs: &AttrStore, plane: &Plane) -> Result<GeometryBuffers, AttrError> {
    let a1 = plane.to_local(attrs.point(AttrKey::Anchor1)?);
    let a2 = plane.to_local(attrs.point(AttrKey::Anchor2)?);
    let tilt = attrs.angle(AttrKey::Tilt)?;

    let center = (a1 + a2) * 0.5;
    let rx = (a2.x - a1.x).abs() * 0.5;
    let ry = (a2.y - a1.y).abs() * 0.5;
    if rx < DEGENERATE_EPS || ry < DEGENERATE_EPS {
        tracing::debug!("ellipse with degenerate radii, skipping geometry");
        return Ok(GeometryBuffers::default());
    }

    let mut solid = Vec::with_capacity(CURVE_SEGMENTS);
    for i in 0..CURVE_SEGMENTS {
        let t = i as f64 / CURVE_SEGMENTS as f64 * std::f64::consts::TAU;
        let local = DVec2::new(rx * t.cos(), ry * t.sin());
        solid.push(plane.to_world(center + tilt.rotate(local)));
    }
    let mut wireframe = solid.clone();
    wireframe.push(solid[0]);
    let directions = tangents(&solid, true);
    Ok(GeometryBuffers {
        solid_points: solid,
        wireframe_points: wireframe,
        directions,
    })
}

fn arc_geometry(attrs: &AttrStore, plane: &Plane) -> Result<GeometryBuffers, AttrError> {
    let center = plane.to_local(attrs.point(AttrKey::Center)?);
    let start = plane.to_local(attrs.point(AttrKey::Start)?);
    let sweep = attrs.angle(AttrKey::Sweep)?;

    let spoke = start - center;
    if spoke.length() < DEGENERATE_EPS {
        tracing::debug!("arc with zero radius, skipping geometry");
        return Ok(GeometryBuffers::default());
    }

    let turns = sweep.radians().abs() / std::f64::consts::TAU;
    let segments = ((CURVE_SEGMENTS as f64 * turns).ceil() as usize).max(2);
    let mut solid = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let frac = i as f64 / segments as f64;
        let angle = Angle::from_radians(sweep.radians() * frac);
        solid.push(plane.to_world(center + angle.rotate(spoke)));
    }
    let wireframe = solid.clone();
    let directions = tangents(&solid, false);
    Ok(GeometryBuffers {
        solid_points: solid,
        wireframe_points: wireframe,
        directions,
    })
}

/// Unit tangent per point; the last open-polyline point reuses the previous
/// segment direction
fn tangents(points: &[DVec3], closed: bool) -> Vec<DVec3> {
    let n = points.len();
    if n < 2 {
        return vec![DVec3::ZERO; n];
    }
    let mut dirs = Vec::with_capacity(n);
    for i in 0..n {
        let d = if i + 1 < n {
            points[i + 1] - points[i]
        } else if closed {
            points[0] - points[i]
        } else {
            // final open-polyline vertex reuses the incoming direction
            points[i] - points[i - 1]
        };
        dirs.push(d.normalize_or_zero());
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_points(shape: &mut Sketchable, points: Vec<DVec3>) {
        shape.attrs_mut().set(AttrKey::Points, AttrValue::PointList(points));
    }

    #[test]
    fn test_compute_clears_dirty_and_is_idempotent() {
        let plane = Plane::xy();
        let mut line = Sketchable::new_line();
        set_points(&mut line, vec![DVec3::ZERO, DVec3::X, DVec3::Y]);

        line.compute_geometry(&plane).unwrap();
        assert!(!line.is_dirty());
        let first = line.geometry().clone();

        line.compute_geometry(&plane).unwrap();
        assert!(!line.is_dirty());
        assert_eq!(line.geometry(), &first);
    }

    #[test]
    fn test_closed_line_wireframe_loops() {
        let plane = Plane::xy();
        let mut line = Sketchable::new_line();
        set_points(&mut line, vec![DVec3::ZERO, DVec3::X, DVec3::Y]);
        line.attrs_mut().set(AttrKey::Closed, AttrValue::Bool(true));
        line.compute_geometry(&plane).unwrap();

        let wire = &line.geometry().wireframe_points;
        assert_eq!(wire.len(), 4);
        assert_eq!(wire[0], wire[3]);
    }

    #[test]
    fn test_rectangle_corners() {
        let plane = Plane::xy();
        let mut rect = Sketchable::new_rectangle(&plane);
        rect.attrs_mut().set(AttrKey::Anchor1, AttrValue::Point(DVec3::ZERO));
        rect.attrs_mut()
            .set(AttrKey::Anchor2, AttrValue::Point(DVec3::new(2.0, 2.0, 0.0)));
        rect.compute_geometry(&plane).unwrap();

        let solid = &rect.geometry().solid_points;
        assert_eq!(solid.len(), 4);
        assert!((solid[0] - DVec3::ZERO).length() < 1e-9);
        assert!((solid[1] - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-9);
        assert!((solid[2] - DVec3::new(2.0, 2.0, 0.0)).length() < 1e-9);
        assert!((solid[3] - DVec3::new(0.0, 2.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_tilted_rectangle_keeps_center() {
        let plane = Plane::xy();
        let mut rect = Sketchable::new_rectangle(&plane);
        rect.attrs_mut().set(AttrKey::Anchor1, AttrValue::Point(DVec3::ZERO));
        rect.attrs_mut()
            .set(AttrKey::Anchor2, AttrValue::Point(DVec3::new(2.0, 1.0, 0.0)));
        rect.attrs_mut()
            .set(AttrKey::Tilt, AttrValue::Angle(Angle::from_degrees(30.0)));
        rect.compute_geometry(&plane).unwrap();

        let solid = &rect.geometry().solid_points;
        let center = solid.iter().sum::<DVec3>() / 4.0;
        assert!((center - DVec3::new(1.0, 0.5, 0.0)).length() < 1e-9);
        // edge lengths survive the rotation
        assert!(((solid[1] - solid[0]).length() - 2.0).abs() < 1e-9);
        assert!(((solid[2] - solid[1]).length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_samples_start_and_stop() {
        let plane = Plane::xy();
        let mut arc = Sketchable::new_arc(&plane);
        arc.attrs_mut().set(AttrKey::Center, AttrValue::Point(DVec3::ZERO));
        arc.attrs_mut().set(AttrKey::Start, AttrValue::Point(DVec3::X));
        arc.attrs_mut()
            .set(AttrKey::Sweep, AttrValue::Angle(Angle::from_degrees(90.0)));
        arc.compute_geometry(&plane).unwrap();

        let solid = &arc.geometry().solid_points;
        assert!((solid[0] - DVec3::X).length() < 1e-9);
        assert!((solid[solid.len() - 1] - DVec3::Y).length() < 1e-9);
    }

    #[test]
    fn test_degenerate_shapes_produce_empty_buffers() {
        let plane = Plane::xy();

        let mut arc = Sketchable::new_arc(&plane);
        arc.compute_geometry(&plane).unwrap();
        assert!(arc.geometry().solid_points.is_empty());
        assert!(!arc.is_dirty());

        let mut ellipse = Sketchable::new_ellipse(&plane);
        ellipse.compute_geometry(&plane).unwrap();
        assert!(ellipse.geometry().wireframe_points.is_empty());
    }

    #[test]
    fn test_ellipse_points_satisfy_implicit_equation() {
        let plane = Plane::xy();
        let mut ellipse = Sketchable::new_ellipse(&plane);
        ellipse
            .attrs_mut()
            .set(AttrKey::Anchor1, AttrValue::Point(DVec3::new(-2.0, -1.0, 0.0)));
        ellipse
            .attrs_mut()
            .set(AttrKey::Anchor2, AttrValue::Point(DVec3::new(2.0, 1.0, 0.0)));
        ellipse.compute_geometry(&plane).unwrap();

        for p in &ellipse.geometry().solid_points {
            let r = (p.x / 2.0).powi(2) + p.y.powi(2);
            assert!((r - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_directions_are_unit_tangents() {
        let plane = Plane::xy();
        let mut line = Sketchable::new_line();
        set_points(&mut line, vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 3.0, 0.0)]);
        line.compute_geometry(&plane).unwrap();

        let dirs = &line.geometry().directions;
        assert_eq!(dirs.len(), 3);
        assert!((dirs[0] - DVec3::X).length() < 1e-9);
        assert!((dirs[1] - DVec3::Y).length() < 1e-9);
        // last point reuses the incoming direction
        assert!((dirs[2] - DVec3::Y).length() < 1e-9);
    }

    #[test]
    fn test_revert_restores_shape() {
        let plane = Plane::xy();
        let mut line = Sketchable::new_line();
        set_points(&mut line, vec![DVec3::ZERO, DVec3::X]);
        line.snapshot();

        set_points(&mut line, vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z]);
        line.revert();
        line.compute_geometry(&plane).unwrap();

        assert_eq!(line.geometry().solid_points.len(), 2);
    }
}

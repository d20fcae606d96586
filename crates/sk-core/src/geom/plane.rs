//! Sketch plane with an orthonormal local frame

use glam::{DMat4, DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// A plane in 3D space carrying the 2D frame sketch math is done in
///
/// `x_axis`, `y_axis` and `normal` are mutually orthonormal; the
/// constructors maintain that invariant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Plane {
    /// Origin of the plane in 3D space
    pub origin: DVec3,
    /// Normal vector of the plane
    pub normal: DVec3,
    /// Local X axis (for 2D to 3D mapping)
    pub x_axis: DVec3,
    /// Local Y axis (for 2D to 3D mapping)
    pub y_axis: DVec3,
}

impl Default for Plane {
    fn default() -> Self {
        Self::xy()
    }
}

impl Plane {
    /// XY plane at origin (Z = 0)
    pub fn xy() -> Self {
        Self {
            origin: DVec3::ZERO,
            normal: DVec3::Z,
            x_axis: DVec3::X,
            y_axis: DVec3::Y,
        }
    }

    /// XZ plane at origin (Y = 0)
    pub fn xz() -> Self {
        Self {
            origin: DVec3::ZERO,
            normal: DVec3::Y,
            x_axis: DVec3::X,
            y_axis: DVec3::Z,
        }
    }

    /// YZ plane at origin (X = 0)
    pub fn yz() -> Self {
        Self {
            origin: DVec3::ZERO,
            normal: DVec3::X,
            x_axis: DVec3::Y,
            y_axis: DVec3::Z,
        }
    }

    /// Create a custom plane, re-orthonormalizing the given axes
    pub fn new(origin: DVec3, normal: DVec3, x_axis: DVec3) -> Self {
        let normal = normal.normalize();
        let x_axis = (x_axis - normal * x_axis.dot(normal)).normalize();
        let y_axis = normal.cross(x_axis);
        Self {
            origin,
            normal,
            x_axis,
            y_axis,
        }
    }

    /// Convert a 2D point in the plane frame to 3D world coordinates
    pub fn to_world(&self, point: DVec2) -> DVec3 {
        self.origin + self.x_axis * point.x + self.y_axis * point.y
    }

    /// Convert a 3D world point to 2D plane coordinates
    pub fn to_local(&self, point: DVec3) -> DVec2 {
        let local = point - self.origin;
        DVec2::new(local.dot(self.x_axis), local.dot(self.y_axis))
    }

    /// Get the transform matrix from plane space to world space
    pub fn transform(&self) -> DMat4 {
        DMat4::from_cols(
            self.x_axis.extend(0.0),
            self.y_axis.extend(0.0),
            self.normal.extend(0.0),
            self.origin.extend(1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_transform() {
        let plane = Plane::xy();
        let point_2d = DVec2::new(1.0, 2.0);
        let point_3d = plane.to_world(point_2d);

        assert_eq!(point_3d, DVec3::new(1.0, 2.0, 0.0));

        let back = plane.to_local(point_3d);
        assert!((back - point_2d).length() < 1e-9);
    }

    #[test]
    fn test_new_orthonormalizes() {
        // x_axis deliberately not perpendicular to the normal
        let plane = Plane::new(DVec3::ONE, DVec3::Z, DVec3::new(1.0, 0.0, 0.5));

        assert!(plane.normal.dot(plane.x_axis).abs() < 1e-12);
        assert!(plane.normal.dot(plane.y_axis).abs() < 1e-12);
        assert!(plane.x_axis.dot(plane.y_axis).abs() < 1e-12);
        assert!((plane.x_axis.length() - 1.0).abs() < 1e-12);
        assert!((plane.y_axis.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_local_round_trip_off_origin() {
        let plane = Plane::new(DVec3::new(3.0, -1.0, 2.0), DVec3::new(0.0, 1.0, 1.0), DVec3::X);
        let p = DVec2::new(-2.5, 4.0);
        let back = plane.to_local(plane.to_world(p));
        assert!((back - p).length() < 1e-9);
    }
}

//! Angle type with wrap-around arithmetic

use std::f64::consts::{PI, TAU};
use std::ops::{Add, Neg, Sub};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An angle in radians with trig convenience and wrap-around arithmetic
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);
    pub const FULL_TURN: Angle = Angle(TAU);

    pub fn from_radians(radians: f64) -> Self {
        Angle(radians)
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Angle(degrees.to_radians())
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }

    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    pub fn tan(self) -> f64 {
        self.0.tan()
    }

    pub fn abs(self) -> Angle {
        Angle(self.0.abs())
    }

    /// Wrap into the half-open interval (-PI, PI]
    pub fn normalized(self) -> Angle {
        let mut r = self.0 % TAU;
        if r <= -PI {
            r += TAU;
        } else if r > PI {
            r -= TAU;
        }
        Angle(r)
    }

    /// Signed angle from `a` to `b` in the 2D plane, in (-PI, PI]
    pub fn signed_between(a: DVec2, b: DVec2) -> Angle {
        Angle(a.perp_dot(b).atan2(a.dot(b)))
    }

    /// Rotate a 2D vector by this angle
    pub fn rotate(self, v: DVec2) -> DVec2 {
        let (s, c) = self.0.sin_cos();
        DVec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0 - rhs.0)
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_normalized_wraps() {
        assert_relative_eq!(Angle::from_radians(TAU + 0.5).normalized().radians(), 0.5);
        assert_relative_eq!(Angle::from_radians(-TAU - 0.5).normalized().radians(), -0.5);
        assert_relative_eq!(Angle::from_radians(PI).normalized().radians(), PI);
    }

    #[test]
    fn test_signed_between_quadrants() {
        let x = DVec2::X;
        assert_relative_eq!(Angle::signed_between(x, DVec2::Y).radians(), FRAC_PI_2);
        assert_relative_eq!(Angle::signed_between(x, -DVec2::Y).radians(), -FRAC_PI_2);
        assert_relative_eq!(Angle::signed_between(x, -x).radians(), PI);
    }

    #[test]
    fn test_rotate() {
        let v = Angle::from_degrees(90.0).rotate(DVec2::X);
        assert!((v - DVec2::Y).length() < 1e-12);
    }

    #[test]
    fn test_arithmetic() {
        let sum = Angle::from_degrees(170.0) + Angle::from_degrees(20.0);
        assert_relative_eq!(sum.normalized().degrees(), -170.0, epsilon = 1e-9);
    }
}

//! Axis-aligned bounding box

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounds of a set of world points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    /// Compute the bounds of a point set; None for an empty set
    pub fn from_points<I>(points: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    /// Smallest bounds containing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn diagonal(&self) -> DVec3 {
        self.max - self.min
    }

    /// Grow the bounds by a uniform margin on every side
    pub fn expand(&self, margin: f64) -> Bounds {
        Bounds {
            min: self.min - DVec3::splat(margin),
            max: self.max + DVec3::splat(margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bounds = Bounds::from_points([
            DVec3::new(1.0, -2.0, 0.0),
            DVec3::new(-1.0, 3.0, 2.0),
            DVec3::new(0.5, 0.5, -1.0),
        ])
        .unwrap();

        assert_eq!(bounds.min, DVec3::new(-1.0, -2.0, -1.0));
        assert_eq!(bounds.max, DVec3::new(1.0, 3.0, 2.0));
        assert_eq!(bounds.center(), DVec3::new(0.0, 0.5, 0.5));
    }

    #[test]
    fn test_empty() {
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_union_and_expand() {
        let a = Bounds::from_points([DVec3::ZERO, DVec3::ONE]).unwrap();
        let b = Bounds::from_points([DVec3::splat(2.0)]).unwrap();
        let u = a.union(&b);
        assert_eq!(u.max, DVec3::splat(2.0));
        assert_eq!(u.expand(1.0).min, DVec3::splat(-1.0));
    }
}

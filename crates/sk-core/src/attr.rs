//! Entity attribute store with momento snapshot/revert semantics
//!
//! Every editable entity keeps its state in a fixed set of typed attribute
//! slots. Interactive edits mutate the live slots; `snapshot` marks an
//! apply boundary and `revert` discards everything since the last one.

use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::geom::Angle;

/// Attribute access errors
///
/// These indicate caller-contract violations (the attribute schema is fixed
/// per shape kind at construction time), never recoverable runtime state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttrError {
    #[error("attribute {0:?} was never set")]
    Missing(AttrKey),

    #[error("attribute {key:?} holds {found}, expected {expected}")]
    Type {
        key: AttrKey,
        expected: &'static str,
        found: &'static str,
    },
}

/// Attribute slots known at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttrKey {
    /// Ordered vertex list of a line
    Points,
    /// Whether a line loops back to its first vertex
    Closed,
    /// First corner anchor of a boxed shape
    Anchor1,
    /// Second corner anchor of a boxed shape
    Anchor2,
    /// Rotation of a boxed shape about its center
    Tilt,
    /// Arc center
    Center,
    /// Arc start point
    Start,
    /// Signed arc sweep
    Sweep,
}

/// Attribute value variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Point(DVec3),
    Angle(Angle),
    Bool(bool),
    PointList(Vec<DVec3>),
    Entity(Uuid),
}

impl AttrValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Point(_) => "Point",
            AttrValue::Angle(_) => "Angle",
            AttrValue::Bool(_) => "Bool",
            AttrValue::PointList(_) => "PointList",
            AttrValue::Entity(_) => "Entity",
        }
    }
}

/// One full attribute snapshot
pub type AttrMap = BTreeMap<AttrKey, AttrValue>;

/// Attribute store with a momento stack and a dirty flag
///
/// Invariants:
/// - the momento stack always holds at least the construction-time snapshot
/// - any mutation marks the store dirty
/// - `revert` restores the last snapshot and marks dirty so cached geometry
///   is regenerated from the restored values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttrStore {
    values: AttrMap,
    momentos: Vec<AttrMap>,
    dirty: bool,
}

impl AttrStore {
    /// Create a store; the initial values become momento 0
    pub fn new(initial: AttrMap) -> Self {
        Self {
            momentos: vec![initial.clone()],
            values: initial,
            dirty: true,
        }
    }

    /// Set an attribute value, marking the store dirty
    pub fn set(&mut self, key: AttrKey, value: AttrValue) {
        self.values.insert(key, value);
        self.dirty = true;
    }

    /// Read an attribute value
    pub fn get(&self, key: AttrKey) -> Result<&AttrValue, AttrError> {
        self.values.get(&key).ok_or(AttrError::Missing(key))
    }

    pub fn point(&self, key: AttrKey) -> Result<DVec3, AttrError> {
        match self.get(key)? {
            AttrValue::Point(p) => Ok(*p),
            other => Err(type_error(key, "Point", other)),
        }
    }

    pub fn angle(&self, key: AttrKey) -> Result<Angle, AttrError> {
        match self.get(key)? {
            AttrValue::Angle(a) => Ok(*a),
            other => Err(type_error(key, "Angle", other)),
        }
    }

    pub fn flag(&self, key: AttrKey) -> Result<bool, AttrError> {
        match self.get(key)? {
            AttrValue::Bool(b) => Ok(*b),
            other => Err(type_error(key, "Bool", other)),
        }
    }

    pub fn points(&self, key: AttrKey) -> Result<&[DVec3], AttrError> {
        match self.get(key)? {
            AttrValue::PointList(ps) => Ok(ps),
            other => Err(type_error(key, "PointList", other)),
        }
    }

    pub fn entity(&self, key: AttrKey) -> Result<Uuid, AttrError> {
        match self.get(key)? {
            AttrValue::Entity(id) => Ok(*id),
            other => Err(type_error(key, "Entity", other)),
        }
    }

    /// Append a full copy of the live attributes as a new momento
    pub fn snapshot(&mut self) {
        self.momentos.push(self.values.clone());
    }

    /// Restore the live attributes from the most recent momento
    pub fn revert(&mut self) {
        if let Some(last) = self.momentos.last() {
            self.values = last.clone();
        }
        self.dirty = true;
    }

    /// Number of momentos taken (at least 1)
    pub fn momento_count(&self) -> usize {
        self.momentos.len()
    }

    /// The momento stack, oldest first (for document-level undo consumers)
    pub fn momentos(&self) -> &[AttrMap] {
        &self.momentos
    }

    pub fn values(&self) -> &AttrMap {
        &self.values
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

fn type_error(key: AttrKey, expected: &'static str, found: &AttrValue) -> AttrError {
    AttrError::Type {
        key,
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AttrStore {
        let mut initial = AttrMap::new();
        initial.insert(AttrKey::Center, AttrValue::Point(DVec3::ZERO));
        initial.insert(AttrKey::Sweep, AttrValue::Angle(Angle::ZERO));
        AttrStore::new(initial)
    }

    #[test]
    fn test_set_marks_dirty() {
        let mut s = store();
        s.mark_clean();
        s.set(AttrKey::Center, AttrValue::Point(DVec3::ONE));
        assert!(s.is_dirty());
    }

    #[test]
    fn test_missing_attribute_is_error() {
        let s = store();
        assert_eq!(s.point(AttrKey::Anchor1), Err(AttrError::Missing(AttrKey::Anchor1)));
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let s = store();
        let err = s.flag(AttrKey::Center).unwrap_err();
        assert_eq!(
            err,
            AttrError::Type {
                key: AttrKey::Center,
                expected: "Bool",
                found: "Point",
            }
        );
    }

    #[test]
    fn test_snapshot_revert_inverse() {
        let mut s = store();
        s.set(AttrKey::Center, AttrValue::Point(DVec3::new(1.0, 2.0, 3.0)));
        s.snapshot();
        let before = s.values().clone();

        s.set(AttrKey::Center, AttrValue::Point(DVec3::splat(9.0)));
        s.set(AttrKey::Sweep, AttrValue::Angle(Angle::from_degrees(45.0)));
        s.revert();

        assert_eq!(s.values(), &before);
    }

    #[test]
    fn test_revert_stops_at_last_snapshot() {
        let mut s = store();
        s.set(AttrKey::Center, AttrValue::Point(DVec3::ONE));
        s.snapshot();
        s.set(AttrKey::Center, AttrValue::Point(DVec3::splat(2.0)));
        s.revert();
        s.revert();

        // Still the snapshotted value, not the construction-time one
        assert_eq!(s.point(AttrKey::Center).unwrap(), DVec3::ONE);
        assert_eq!(s.momento_count(), 2);
    }

    #[test]
    fn test_revert_marks_dirty() {
        let mut s = store();
        s.mark_clean();
        s.revert();
        assert!(s.is_dirty());
    }

    #[test]
    fn test_construction_momento_always_present() {
        let s = AttrStore::new(AttrMap::new());
        assert_eq!(s.momento_count(), 1);
    }
}

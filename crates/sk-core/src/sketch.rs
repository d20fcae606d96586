//! Sketch container

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attr::AttrError;
use crate::geom::{Bounds, Plane};
use crate::render::RenderTarget;
use crate::shape::Sketchable;

/// A 2D editing surface: a plane plus the sketchables drawn on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sketch {
    /// Unique identifier
    pub id: Uuid,
    /// Name of the sketch
    pub name: String,
    /// Plane defining the 2D coordinate frame all children are edited in
    pub plane: Plane,
    children: Vec<Sketchable>,
}

impl Default for Sketch {
    fn default() -> Self {
        Self::new("Sketch", Plane::xy())
    }
}

impl Sketch {
    /// Create a new sketch on the given plane
    pub fn new(name: impl Into<String>, plane: Plane) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            plane,
            children: Vec::new(),
        }
    }

    /// Add a sketchable, returning its id
    pub fn add(&mut self, shape: Sketchable) -> Uuid {
        let id = shape.id();
        self.children.push(shape);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&Sketchable> {
        self.children.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Sketchable> {
        self.children.iter_mut().find(|s| s.id() == id)
    }

    /// Remove a sketchable by id
    pub fn remove(&mut self, id: Uuid) -> Option<Sketchable> {
        let index = self.children.iter().position(|s| s.id() == id)?;
        Some(self.children.remove(index))
    }

    pub fn children(&self) -> &[Sketchable] {
        &self.children
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Sketchable> {
        self.children.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Render every child; dirty children recompute their geometry first
    pub fn render_all(&mut self, target: &mut dyn RenderTarget) -> Result<(), AttrError> {
        let plane = self.plane;
        for shape in &mut self.children {
            shape.render(&plane, target)?;
        }
        Ok(())
    }

    /// World bounds of all children, recomputing stale geometry
    pub fn bounds(&mut self) -> Result<Option<Bounds>, AttrError> {
        let plane = self.plane;
        let mut total: Option<Bounds> = None;
        for shape in &mut self.children {
            if shape.is_dirty() {
                shape.compute_geometry(&plane)?;
            }
            if let Some(b) = shape.bounds() {
                total = Some(match total {
                    Some(t) => t.union(&b),
                    None => b,
                });
            }
        }
        Ok(total)
    }
}

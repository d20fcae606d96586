//! Per-shape edit state machines
//!
//! A sketcher binds to exactly one sketchable and interprets raw input
//! events as edits to its attributes. Every sketcher follows the same
//! lifecycle: it is created either in a placement mode (new shape) or in
//! `Idle` (editing an existing shape), runs until its status leaves
//! `Active`, and is then applied (snapshot) or cancelled (revert) by the
//! owning interactor.

mod arc;
mod boxed;
mod line;

pub use arc::{ArcHandle, ArcSketcher};
pub use boxed::{BoxHandle, BoxedSketcher};
pub use line::LineSketcher;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sk_core::{Sketch, Sketchable};
use sk_view::{Camera, PickContext};

use crate::config::InteractionConfig;
use crate::event::InputEvent;
use crate::InteractError;

/// Active editing tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SketchTool {
    /// Pick and edit existing shapes
    #[default]
    Select,
    Line,
    Rectangle,
    Ellipse,
    Arc,
}

impl SketchTool {
    pub fn name(&self) -> &'static str {
        match self {
            SketchTool::Select => "Select",
            SketchTool::Line => "Line",
            SketchTool::Rectangle => "Rectangle",
            SketchTool::Ellipse => "Ellipse",
            SketchTool::Arc => "Arc",
        }
    }

    /// Tools that create a new shape when activated
    pub fn is_drawing(&self) -> bool {
        !matches!(self, SketchTool::Select)
    }
}

/// Where an edit session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketcherStatus {
    /// Still consuming events
    Active,
    /// Finished; the owner applies the edit and tears the sketcher down
    Done,
    /// Aborted; the owner reverts the edit and tears the sketcher down
    Cancelled,
}

/// Everything a sketcher sees while handling one event
pub struct EditContext<'a> {
    pub camera: &'a Camera,
    pub viewport: DVec2,
    pub config: &'a InteractionConfig,
    pub sketch: &'a mut Sketch,
}

impl<'a> EditContext<'a> {
    /// Hit-test context for the cursor; None when the camera cannot build
    /// a ray
    pub fn pick(&self, cursor: DVec2) -> Option<PickContext<'a>> {
        PickContext::new(self.camera, self.viewport, cursor, self.config.tolerances)
    }

    /// Cursor projected onto the sketch plane, grid-snapped when enabled
    ///
    /// None when the ray misses the plane (parallel view or degenerate
    /// projection); sketchers skip the event in that case.
    pub fn cursor_on_plane(&self, cursor: DVec2) -> Option<DVec3> {
        let ray = self.camera.screen_to_world(cursor, self.viewport)?;
        let world = ray.intersect_plane(&self.sketch.plane)?;
        Some(self.snapped(world))
    }

    /// Snap a plane point to the grid in sketch-local coordinates
    pub fn snapped(&self, world: DVec3) -> DVec3 {
        let pitch = self.config.grid_spacing;
        if !self.config.snap_to_grid || pitch <= 0.0 {
            return world;
        }
        let plane = self.sketch.plane;
        let local = plane.to_local(world);
        plane.to_world(DVec2::new(
            (local.x / pitch).round() * pitch,
            (local.y / pitch).round() * pitch,
        ))
    }

    pub fn shape(&self, id: Uuid) -> Result<&Sketchable, InteractError> {
        self.sketch.get(id).ok_or(InteractError::ShapeNotFound(id))
    }

    pub fn shape_mut(&mut self, id: Uuid) -> Result<&mut Sketchable, InteractError> {
        self.sketch
            .get_mut(id)
            .ok_or(InteractError::ShapeNotFound(id))
    }
}

/// One edit session bound to a single sketchable
///
/// Handlers receive the event mutably and call `consume` on anything they
/// act on, so unconsumed events fall through to camera navigation.
pub trait Sketcher {
    /// The sketchable this session edits
    fn shape_id(&self) -> Uuid;

    fn status(&self) -> SketcherStatus;

    /// Whether a press-drag is in flight (used to suppress hover feedback)
    fn is_dragging(&self) -> bool;

    fn on_button_press(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError>;

    fn on_button_release(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError>;

    fn on_motion(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError>;

    fn on_wheel(
        &mut self,
        _event: &mut InputEvent,
        _ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        Ok(())
    }

    fn on_key_press(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError>;

    /// Commit the session; called once after the status turns `Done`
    fn apply(&mut self, ctx: &mut EditContext<'_>) -> Result<(), InteractError> {
        apply_edit(ctx, self.shape_id())
    }

    /// Discard the session; called once after the status turns `Cancelled`
    fn cancel(&mut self, ctx: &mut EditContext<'_>) -> Result<(), InteractError> {
        cancel_edit(ctx, self.shape_id())
    }
}

/// Default apply: the live attributes become a new momento
pub(crate) fn apply_edit(ctx: &mut EditContext<'_>, id: Uuid) -> Result<(), InteractError> {
    let shape = ctx.shape_mut(id)?;
    shape.snapshot();
    tracing::info!(kind = shape.kind().name(), %id, "edit applied");
    Ok(())
}

/// Default cancel: restore the last momento
pub(crate) fn cancel_edit(ctx: &mut EditContext<'_>, id: Uuid) -> Result<(), InteractError> {
    let shape = ctx.shape_mut(id)?;
    shape.revert();
    tracing::info!(kind = shape.kind().name(), %id, "edit cancelled");
    Ok(())
}

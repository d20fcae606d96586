//! Two-anchor box sketcher shared by rectangles and ellipses
//!
//! Placement is press-drag-release: the press pins the first anchor, the
//! drag rubber-bands the second, the release commits it with a momento.
//! Afterwards the session idles; dragging a corner moves the nearest
//! anchor, and grabbing one of the two derived corners re-anchors the box
//! so that corner becomes the live anchor.

use glam::{DVec2, DVec3};
use uuid::Uuid;

use sk_core::{boxed_corners, AttrKey, AttrValue, Plane, Sketchable};

use crate::event::{EventKind, InputEvent, Key, PointerButton};
use crate::sketcher::{cancel_edit, EditContext, Sketcher, SketcherStatus};
use crate::InteractError;

/// The four corner handles of a boxed shape
///
/// `DerivedA`/`DerivedB` are the corners not stored as anchors: in the
/// untilted local frame, (a2.x, a1.y) and (a1.x, a2.y).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxHandle {
    Anchor1,
    Anchor2,
    DerivedA,
    DerivedB,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BoxMode {
    PlacingAnchor1,
    PlacingAnchor2,
    Idle,
    Dragging { handle: BoxHandle },
}

/// Edit session for `ShapeKind::Rectangle` and `ShapeKind::Ellipse`
pub struct BoxedSketcher {
    shape: Uuid,
    mode: BoxMode,
    status: SketcherStatus,
    created: bool,
    hovered: Option<BoxHandle>,
}

impl BoxedSketcher {
    pub fn add_rectangle(ctx: &mut EditContext<'_>) -> Self {
        let plane = ctx.sketch.plane;
        Self::add(ctx, Sketchable::new_rectangle(&plane))
    }

    pub fn add_ellipse(ctx: &mut EditContext<'_>) -> Self {
        let plane = ctx.sketch.plane;
        Self::add(ctx, Sketchable::new_ellipse(&plane))
    }

    fn add(ctx: &mut EditContext<'_>, shape: Sketchable) -> Self {
        let kind = shape.kind();
        let id = ctx.sketch.add(shape);
        tracing::info!(%id, kind = kind.name(), "box placement started");
        Self {
            shape: id,
            mode: BoxMode::PlacingAnchor1,
            status: SketcherStatus::Active,
            created: true,
            hovered: None,
        }
    }

    /// Edit an existing boxed shape
    pub fn edit(shape: Uuid) -> Self {
        Self {
            shape,
            mode: BoxMode::Idle,
            status: SketcherStatus::Active,
            created: false,
            hovered: None,
        }
    }

    pub fn hovered(&self) -> Option<BoxHandle> {
        self.hovered
    }

    fn set_anchor(
        &self,
        ctx: &mut EditContext<'_>,
        key: AttrKey,
        world: DVec3,
    ) -> Result<(), InteractError> {
        ctx.shape_mut(self.shape)?
            .attrs_mut()
            .set(key, AttrValue::Point(world));
        Ok(())
    }

    /// Move one anchor so its corner follows the cursor, undoing the tilt
    /// about the current box center
    fn drag_anchor(
        &self,
        ctx: &mut EditContext<'_>,
        handle: BoxHandle,
        world: DVec3,
    ) -> Result<(), InteractError> {
        let key = match handle {
            BoxHandle::Anchor1 => AttrKey::Anchor1,
            BoxHandle::Anchor2 => AttrKey::Anchor2,
            // derived corners are re-anchored before a drag ever starts
            BoxHandle::DerivedA | BoxHandle::DerivedB => return Ok(()),
        };
        let plane = ctx.sketch.plane;
        let attrs = ctx.shape(self.shape)?.attrs();
        let a1 = plane.to_local(attrs.point(AttrKey::Anchor1)?);
        let a2 = plane.to_local(attrs.point(AttrKey::Anchor2)?);
        let tilt = attrs.angle(AttrKey::Tilt)?;
        let center = (a1 + a2) * 0.5;
        let local = center + (-tilt).rotate(plane.to_local(world) - center);
        self.set_anchor(ctx, key, plane.to_world(local))
    }

    /// Swap the anchor pair so the grabbed derived corner becomes anchor 2
    fn reanchor(
        &self,
        ctx: &mut EditContext<'_>,
        handle: BoxHandle,
    ) -> Result<(), InteractError> {
        let plane = ctx.sketch.plane;
        let attrs = ctx.shape(self.shape)?.attrs();
        let a1 = plane.to_local(attrs.point(AttrKey::Anchor1)?);
        let a2 = plane.to_local(attrs.point(AttrKey::Anchor2)?);
        let (new_a1, new_a2) = match handle {
            BoxHandle::DerivedA => (DVec2::new(a1.x, a2.y), DVec2::new(a2.x, a1.y)),
            BoxHandle::DerivedB => (DVec2::new(a2.x, a1.y), DVec2::new(a1.x, a2.y)),
            BoxHandle::Anchor1 | BoxHandle::Anchor2 => return Ok(()),
        };
        self.set_anchor(ctx, AttrKey::Anchor1, plane.to_world(new_a1))?;
        self.set_anchor(ctx, AttrKey::Anchor2, plane.to_world(new_a2))
    }

    fn corners(&self, ctx: &EditContext<'_>) -> Result<[DVec3; 4], InteractError> {
        let plane: Plane = ctx.sketch.plane;
        Ok(boxed_corners(ctx.shape(self.shape)?.attrs(), &plane)?)
    }

    /// Corner handle under the cursor; anchors win over derived corners
    fn handle_at(
        &self,
        ctx: &EditContext<'_>,
        cursor: DVec2,
    ) -> Result<Option<BoxHandle>, InteractError> {
        let corners = self.corners(ctx)?;
        let Some(pick) = ctx.pick(cursor) else {
            return Ok(None);
        };
        let order = [
            (BoxHandle::Anchor1, corners[0]),
            (BoxHandle::Anchor2, corners[2]),
            (BoxHandle::DerivedA, corners[1]),
            (BoxHandle::DerivedB, corners[3]),
        ];
        Ok(order
            .into_iter()
            .find(|(_, world)| pick.hit_point(*world))
            .map(|(handle, _)| handle))
    }

    fn press_idle(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        match self.handle_at(ctx, event.pos)? {
            Some(handle @ (BoxHandle::Anchor1 | BoxHandle::Anchor2)) => {
                self.mode = BoxMode::Dragging { handle };
                event.consume();
            }
            Some(handle) => {
                self.reanchor(ctx, handle)?;
                self.mode = BoxMode::Dragging {
                    handle: BoxHandle::Anchor2,
                };
                event.consume();
            }
            None => {
                // pressing empty space ends the edit
                self.status = SketcherStatus::Done;
                event.consume();
            }
        }
        Ok(())
    }
}

impl Sketcher for BoxedSketcher {
    fn shape_id(&self) -> Uuid {
        self.shape
    }

    fn status(&self) -> SketcherStatus {
        self.status
    }

    fn is_dragging(&self) -> bool {
        matches!(
            self.mode,
            BoxMode::PlacingAnchor2 | BoxMode::Dragging { .. }
        )
    }

    fn on_button_press(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        let EventKind::ButtonPress { button, .. } = event.kind else {
            return Ok(());
        };
        match button {
            PointerButton::Secondary => {
                self.status = SketcherStatus::Cancelled;
                event.consume();
                Ok(())
            }
            PointerButton::Primary => match self.mode {
                BoxMode::PlacingAnchor1 => {
                    let Some(world) = ctx.cursor_on_plane(event.pos) else {
                        return Ok(());
                    };
                    self.set_anchor(ctx, AttrKey::Anchor1, world)?;
                    self.set_anchor(ctx, AttrKey::Anchor2, world)?;
                    self.mode = BoxMode::PlacingAnchor2;
                    event.consume();
                    Ok(())
                }
                BoxMode::Idle => self.press_idle(event, ctx),
                _ => Ok(()),
            },
            PointerButton::Middle => Ok(()),
        }
    }

    fn on_button_release(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        if !matches!(event.kind, EventKind::ButtonRelease { button: PointerButton::Primary }) {
            return Ok(());
        }
        match self.mode {
            BoxMode::PlacingAnchor2 => {
                if let Some(world) = ctx.cursor_on_plane(event.pos) {
                    self.set_anchor(ctx, AttrKey::Anchor2, world)?;
                }
                // placement is an apply boundary of its own
                ctx.shape_mut(self.shape)?.snapshot();
                self.mode = BoxMode::Idle;
                event.consume();
            }
            BoxMode::Dragging { .. } => {
                self.mode = BoxMode::Idle;
                event.consume();
            }
            _ => {}
        }
        Ok(())
    }

    fn on_motion(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        match self.mode {
            BoxMode::PlacingAnchor2 => {
                let Some(world) = ctx.cursor_on_plane(event.pos) else {
                    return Ok(());
                };
                self.set_anchor(ctx, AttrKey::Anchor2, world)?;
                event.consume();
                Ok(())
            }
            BoxMode::Dragging { handle } => {
                let Some(world) = ctx.cursor_on_plane(event.pos) else {
                    return Ok(());
                };
                self.drag_anchor(ctx, handle, world)?;
                event.consume();
                Ok(())
            }
            BoxMode::Idle => {
                self.hovered = self.handle_at(ctx, event.pos)?;
                Ok(())
            }
            BoxMode::PlacingAnchor1 => Ok(()),
        }
    }

    fn on_key_press(
        &mut self,
        event: &mut InputEvent,
        _ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        let EventKind::KeyPress { key } = event.kind else {
            return Ok(());
        };
        match key {
            Key::Escape => {
                self.status = SketcherStatus::Cancelled;
                event.consume();
            }
            Key::Enter => {
                if self.mode == BoxMode::Idle {
                    self.status = SketcherStatus::Done;
                    event.consume();
                }
            }
            Key::Delete => {}
        }
        Ok(())
    }

    fn cancel(&mut self, ctx: &mut EditContext<'_>) -> Result<(), InteractError> {
        if self.created && matches!(self.mode, BoxMode::PlacingAnchor1 | BoxMode::PlacingAnchor2) {
            // never fully placed, remove it outright
            ctx.sketch
                .remove(self.shape)
                .ok_or(InteractError::ShapeNotFound(self.shape))?;
            tracing::info!(shape = %self.shape, "in-progress box discarded");
            Ok(())
        } else {
            cancel_edit(ctx, self.shape)
        }
    }
}

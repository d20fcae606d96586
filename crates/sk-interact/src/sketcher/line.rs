//! Polyline sketcher
//!
//! A new line starts in `AddingVertex`: every primary press commits the
//! floating vertex and starts the next one, clicking the first vertex (or
//! double-clicking) closes the loop, Enter commits an open polyline.
//! Editing an existing line starts in `Idle`: vertices are picked before
//! edges, edges drag both endpoints, and pressing empty space ends the
//! session.

use glam::DVec3;
use uuid::Uuid;

use sk_core::{AttrKey, AttrValue, Sketchable};
use sk_view::hit::{pick_segment, pick_vertex};

use crate::event::{EventKind, InputEvent, Key, PointerButton};
use crate::sketcher::{cancel_edit, EditContext, Sketcher, SketcherStatus};
use crate::InteractError;

/// Fewest committed vertices that may form a closed loop
const MIN_CLOSED_VERTICES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum LineMode {
    /// Placing vertices; the last list entry floats under the cursor
    AddingVertex,
    Idle,
    DragVertex { index: usize },
    DragEdge { index: usize, last: DVec3 },
}

/// Edit session for a `ShapeKind::Line`
pub struct LineSketcher {
    shape: Uuid,
    mode: LineMode,
    status: SketcherStatus,
    created: bool,
    selection: Vec<usize>,
    hovered: Option<usize>,
}

impl LineSketcher {
    /// Create a new empty line in the sketch and start placing vertices
    pub fn add(ctx: &mut EditContext<'_>) -> Self {
        let id = ctx.sketch.add(Sketchable::new_line());
        tracing::info!(%id, "line placement started");
        Self {
            shape: id,
            mode: LineMode::AddingVertex,
            status: SketcherStatus::Active,
            created: true,
            selection: Vec::new(),
            hovered: None,
        }
    }

    /// Edit an existing line
    pub fn edit(shape: Uuid) -> Self {
        Self {
            shape,
            mode: LineMode::Idle,
            status: SketcherStatus::Active,
            created: false,
            selection: Vec::new(),
            hovered: None,
        }
    }

    /// Indices of the currently selected vertices
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    /// Vertex under the cursor while idle
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    fn points(&self, ctx: &EditContext<'_>) -> Result<Vec<DVec3>, InteractError> {
        Ok(ctx.shape(self.shape)?.attrs().points(AttrKey::Points)?.to_vec())
    }

    fn set_points(
        &self,
        ctx: &mut EditContext<'_>,
        points: Vec<DVec3>,
    ) -> Result<(), InteractError> {
        ctx.shape_mut(self.shape)?
            .attrs_mut()
            .set(AttrKey::Points, AttrValue::PointList(points));
        Ok(())
    }

    fn close(&mut self, ctx: &mut EditContext<'_>, mut points: Vec<DVec3>) -> Result<(), InteractError> {
        points.pop(); // drop the floating vertex
        self.set_points(ctx, points)?;
        ctx.shape_mut(self.shape)?
            .attrs_mut()
            .set(AttrKey::Closed, AttrValue::Bool(true));
        self.status = SketcherStatus::Done;
        tracing::debug!(shape = %self.shape, "line closed");
        Ok(())
    }

    /// Commit the line as an open polyline, dropping the floating vertex
    fn finish_open(&mut self, ctx: &mut EditContext<'_>) -> Result<(), InteractError> {
        let mut points = self.points(ctx)?;
        points.pop();
        if points.len() < 2 {
            self.status = SketcherStatus::Cancelled;
            return Ok(());
        }
        self.set_points(ctx, points)?;
        self.status = SketcherStatus::Done;
        Ok(())
    }

    fn press_adding(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
        clicks: u8,
    ) -> Result<(), InteractError> {
        let Some(world) = ctx.cursor_on_plane(event.pos) else {
            return Ok(());
        };
        let mut points = self.points(ctx)?;
        let committed = points.len().saturating_sub(1);

        if committed >= MIN_CLOSED_VERTICES {
            let on_first = ctx
                .pick(event.pos)
                .is_some_and(|pick| pick.hit_point(points[0]));
            if on_first || clicks >= 2 {
                self.close(ctx, points)?;
                event.consume();
                return Ok(());
            }
        }

        // commit the floating vertex and start the next one
        if let Some(last) = points.last_mut() {
            *last = world;
        } else {
            points.push(world);
        }
        points.push(world);
        self.set_points(ctx, points)?;
        event.consume();
        Ok(())
    }

    fn press_idle(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        let points = self.points(ctx)?;
        let Some(pick) = ctx.pick(event.pos) else {
            return Ok(());
        };

        if let Some(index) = pick_vertex(&pick, &points) {
            if event.modifiers.shift {
                if !self.selection.contains(&index) {
                    self.selection.push(index);
                }
            } else if !self.selection.contains(&index) {
                self.selection = vec![index];
            }
            self.mode = LineMode::DragVertex { index };
            event.consume();
            return Ok(());
        }

        let closed = ctx.shape(self.shape)?.attrs().flag(AttrKey::Closed)?;
        if let Some(index) = pick_segment(&pick, &points, closed) {
            if let Some(world) = ctx.cursor_on_plane(event.pos) {
                self.mode = LineMode::DragEdge { index, last: world };
                event.consume();
            }
            return Ok(());
        }

        // pressing empty space ends the edit
        self.status = SketcherStatus::Done;
        event.consume();
        Ok(())
    }

    fn delete_selection(&mut self, ctx: &mut EditContext<'_>) -> Result<(), InteractError> {
        if self.selection.is_empty() {
            return Ok(());
        }
        let points = self.points(ctx)?;
        let remaining: Vec<DVec3> = points
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.selection.contains(i))
            .map(|(_, &p)| p)
            .collect();
        if remaining.len() < MIN_CLOSED_VERTICES {
            ctx.shape_mut(self.shape)?
                .attrs_mut()
                .set(AttrKey::Closed, AttrValue::Bool(false));
        }
        self.set_points(ctx, remaining)?;
        self.selection.clear();
        self.hovered = None;
        Ok(())
    }
}

impl Sketcher for LineSketcher {
    fn shape_id(&self) -> Uuid {
        self.shape
    }

    fn status(&self) -> SketcherStatus {
        self.status
    }

    fn is_dragging(&self) -> bool {
        matches!(
            self.mode,
            LineMode::DragVertex { .. } | LineMode::DragEdge { .. }
        )
    }

    fn on_button_press(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        let EventKind::ButtonPress { button, clicks } = event.kind else {
            return Ok(());
        };
        match button {
            PointerButton::Secondary => {
                self.status = SketcherStatus::Cancelled;
                event.consume();
                Ok(())
            }
            PointerButton::Primary => match self.mode {
                LineMode::AddingVertex => self.press_adding(event, ctx, clicks),
                LineMode::Idle => self.press_idle(event, ctx),
                _ => Ok(()),
            },
            PointerButton::Middle => Ok(()),
        }
    }

    fn on_button_release(
        &mut self,
        event: &mut InputEvent,
        _ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        if !matches!(event.kind, EventKind::ButtonRelease { button: PointerButton::Primary }) {
            return Ok(());
        }
        if self.is_dragging() {
            self.mode = LineMode::Idle;
            event.consume();
        }
        Ok(())
    }

    fn on_motion(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        match self.mode {
            LineMode::AddingVertex => {
                let Some(world) = ctx.cursor_on_plane(event.pos) else {
                    return Ok(());
                };
                let mut points = self.points(ctx)?;
                if let Some(last) = points.last_mut() {
                    *last = world;
                    self.set_points(ctx, points)?;
                    event.consume();
                }
                Ok(())
            }
            LineMode::DragVertex { index } => {
                let Some(world) = ctx.cursor_on_plane(event.pos) else {
                    return Ok(());
                };
                let mut points = self.points(ctx)?;
                if let Some(p) = points.get_mut(index) {
                    *p = world;
                    self.set_points(ctx, points)?;
                }
                event.consume();
                Ok(())
            }
            LineMode::DragEdge { index, last } => {
                let Some(world) = ctx.cursor_on_plane(event.pos) else {
                    return Ok(());
                };
                let delta = world - last;
                let mut points = self.points(ctx)?;
                let n = points.len();
                if n >= 2 {
                    points[index] += delta;
                    points[(index + 1) % n] += delta;
                    self.set_points(ctx, points)?;
                }
                self.mode = LineMode::DragEdge { index, last: world };
                event.consume();
                Ok(())
            }
            LineMode::Idle => {
                // hover feedback only, the event stays available downstream
                let points = self.points(ctx)?;
                self.hovered = ctx
                    .pick(event.pos)
                    .and_then(|pick| pick_vertex(&pick, &points));
                Ok(())
            }
        }
    }

    fn on_key_press(
        &mut self,
        event: &mut InputEvent,
        ctx: &mut EditContext<'_>,
    ) -> Result<(), InteractError> {
        let EventKind::KeyPress { key } = event.kind else {
            return Ok(());
        };
        match key {
            Key::Escape => {
                self.status = SketcherStatus::Cancelled;
                event.consume();
                Ok(())
            }
            Key::Enter => {
                if self.mode == LineMode::AddingVertex {
                    self.finish_open(ctx)?;
                } else {
                    self.status = SketcherStatus::Done;
                }
                event.consume();
                Ok(())
            }
            Key::Delete => {
                if self.mode == LineMode::Idle {
                    self.delete_selection(ctx)?;
                    event.consume();
                }
                Ok(())
            }
        }
    }

    fn cancel(&mut self, ctx: &mut EditContext<'_>) -> Result<(), InteractError> {
        if self.created {
            // a never-applied line is removed outright
            ctx.sketch
                .remove(self.shape)
                .ok_or(InteractError::ShapeNotFound(self.shape))?;
            tracing::info!(shape = %self.shape, "in-progress line discarded");
            Ok(())
        } else {
            cancel_edit(ctx, self.shape)
        }
    }
}

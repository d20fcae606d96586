//! Arc sketcher
//!
//! Placement is three presses: center, start point, stop point. The stop
//! press fixes the signed sweep from the start spoke to the cursor spoke;
//! grabbing outside the start radius flips the sweep the long way around
//! so arcs beyond a half turn stay reachable. Afterwards the session
//! idles with three draggable handles: the center (smaller pick radius),
//! the start point and the synthetic stop point.

use glam::{DVec2, DVec3};
use uuid::Uuid;

use sk_core::{arc_stop_point, Angle, AttrKey, AttrValue, Sketchable};

use crate::event::{EventKind, InputEvent, Key, PointerButton};
use crate::sketcher::{cancel_edit, EditContext, Sketcher, SketcherStatus};
use crate::InteractError;

const RADIUS_EPS: f64 = 1e-6;

/// The three draggable handles of an arc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcHandle {
    Center,
    Start,
    /// Synthetic handle at the swept end of the arc
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ArcMode {
    PlacingCenter,
    PlacingStart,
    PlacingStop,
    Idle,
    Dragging { handle: ArcHandle },
}

/// Edit session for a `ShapeKind::Arc`
pub struct ArcSketcher {
    shape: Uuid,
    mode: ArcMode,
    status: SketcherStatus,
    created: bool,
    hovered: Option<ArcHandle>,
}

impl ArcSketcher {
    /// Create a new arc in the sketch and start placing its center
    pub fn add(ctx: &mut EditContext<'_>) -> Self {
        let plane = ctx.sketch.plane;
        let id = ctx.sketch.add(Sketchable::new_arc(&plane));
        tracing::info!(%id, "arc placement started");
        Self {
            shape: id,
            mode: ArcMode::PlacingCenter,
            status: SketcherStatus::Active,
            created: true,
            hovered: None,
        }
    }

    /// Edit an existing arc
    pub fn edit(shape: Uuid) -> Self {
        Self {
            shape,
            mode: ArcMode::Idle,
            status: SketcherStatus::Active,
            created: false,
            hovered: None,
        }
    }

    pub fn hovered(&self) -> Option<ArcHandle> {
        self.hovered
    }

    fn set_point(
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

    /// Recompute the signed sweep so the arc ends under the cursor
    fn update_sweep(
        &self,
        ctx: &mut EditContext<'_>,
        world: DVec3,
    ) -> Result<(), InteractError> {
        let plane = ctx.sketch.plane;
        let attrs = ctx.shape(self.shape)?.attrs();
        let center = plane.to_local(attrs.point(AttrKey::Center)?);
        let start = plane.to_local(attrs.point(AttrKey::Start)?);
        let v0 = start - center;
        let v1 = plane.to_local(world) - center;
        if v0.length() < RADIUS_EPS || v1.length() < RADIUS_EPS {
            return Ok(());
        }
        let mut sweep = Angle::signed_between(v0, v1);
        // outside the start radius the cursor selects the long way around
        if v1.length() > v0.length() {
            sweep = if sweep.radians() >= 0.0 {
                sweep - Angle::FULL_TURN
            } else {
                sweep + Angle::FULL_TURN
            };
        }
        ctx.shape_mut(self.shape)?
            .attrs_mut()
            .set(AttrKey::Sweep, AttrValue::Angle(sweep));
        Ok(())
    }

    /// Handle under the cursor; the center uses the smaller pick radius
    fn handle_at(
        &self,
        ctx: &EditContext<'_>,
        cursor: DVec2,
    ) -> Result<Option<ArcHandle>, InteractError> {
        let plane = ctx.sketch.plane;
        let attrs = ctx.shape(self.shape)?.attrs();
        let center = attrs.point(AttrKey::Center)?;
        let start = attrs.point(AttrKey::Start)?;
        let stop = arc_stop_point(attrs, &plane)?;
        let Some(pick) = ctx.pick(cursor) else {
            return Ok(None);
        };
        if pick.hit_center(center) {
            return Ok(Some(ArcHandle::Center));
        }
        if pick.hit_point(start) {
            return Ok(Some(ArcHandle::Start));
        }
        if pick.hit_point(stop) {
            return Ok(Some(ArcHandle::Stop));
        }
        Ok(None)
    }
}

impl Sketcher for ArcSketcher {
    fn shape_id(&self) -> Uuid {
        self.shape
    }

    fn status(&self) -> SketcherStatus {
        self.status
    }

    fn is_dragging(&self) -> bool {
        matches!(self.mode, ArcMode::Dragging { .. })
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
                return Ok(());
            }
            PointerButton::Middle => return Ok(()),
            PointerButton::Primary => {}
        }

        match self.mode {
            ArcMode::PlacingCenter => {
                let Some(world) = ctx.cursor_on_plane(event.pos) else {
                    return Ok(());
                };
                self.set_point(ctx, AttrKey::Center, world)?;
                self.set_point(ctx, AttrKey::Start, world)?;
                self.mode = ArcMode::PlacingStart;
                event.consume();
            }
            ArcMode::PlacingStart => {
                let Some(world) = ctx.cursor_on_plane(event.pos) else {
                    return Ok(());
                };
                self.set_point(ctx, AttrKey::Start, world)?;
                self.mode = ArcMode::PlacingStop;
                event.consume();
            }
            ArcMode::PlacingStop => {
                if let Some(world) = ctx.cursor_on_plane(event.pos) {
                    self.update_sweep(ctx, world)?;
                }
                // placement is an apply boundary of its own
                ctx.shape_mut(self.shape)?.snapshot();
                self.mode = ArcMode::Idle;
                event.consume();
            }
            ArcMode::Idle => match self.handle_at(ctx, event.pos)? {
                Some(handle) => {
                    self.mode = ArcMode::Dragging { handle };
                    event.consume();
                }
                None => {
                    // pressing empty space ends the edit
                    self.status = SketcherStatus::Done;
                    event.consume();
                }
            },
            ArcMode::Dragging { .. } => {}
        }
        Ok(())
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
            self.mode = ArcMode::Idle;
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
            ArcMode::PlacingStart => {
                let Some(world) = ctx.cursor_on_plane(event.pos) else {
                    return Ok(());
                };
                self.set_point(ctx, AttrKey::Start, world)?;
                event.consume();
            }
            ArcMode::PlacingStop => {
                let Some(world) = ctx.cursor_on_plane(event.pos) else {
                    return Ok(());
                };
                self.update_sweep(ctx, world)?;
                event.consume();
            }
            ArcMode::Dragging { handle } => {
                let Some(world) = ctx.cursor_on_plane(event.pos) else {
                    return Ok(());
                };
                match handle {
                    ArcHandle::Center => self.set_point(ctx, AttrKey::Center, world)?,
                    ArcHandle::Start => self.set_point(ctx, AttrKey::Start, world)?,
                    ArcHandle::Stop => self.update_sweep(ctx, world)?,
                }
                event.consume();
            }
            ArcMode::Idle => {
                self.hovered = self.handle_at(ctx, event.pos)?;
            }
            ArcMode::PlacingCenter => {}
        }
        Ok(())
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
                if self.mode == ArcMode::Idle {
                    self.status = SketcherStatus::Done;
                    event.consume();
                }
            }
            Key::Delete => {}
        }
        Ok(())
    }

    fn cancel(&mut self, ctx: &mut EditContext<'_>) -> Result<(), InteractError> {
        let placing = matches!(
            self.mode,
            ArcMode::PlacingCenter | ArcMode::PlacingStart | ArcMode::PlacingStop
        );
        if self.created && placing {
            // never fully placed, remove it outright
            ctx.sketch
                .remove(self.shape)
                .ok_or(InteractError::ShapeNotFound(self.shape))?;
            tracing::info!(shape = %self.shape, "in-progress arc discarded");
            Ok(())
        } else {
            cancel_edit(ctx, self.shape)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec2;

    use sk_core::{Plane, Sketch};
    use sk_view::Camera;

    use crate::config::InteractionConfig;

    const VIEWPORT: DVec2 = DVec2::new(800.0, 600.0);

    /// Head-on camera over a YZ sketch plane
    struct Rig {
        camera: Camera,
        config: InteractionConfig,
        sketch: Sketch,
    }

    impl Rig {
        fn new() -> Self {
            let mut camera = Camera::new(VIEWPORT.x / VIEWPORT.y);
            camera.set_orientation(0.0, 0.0);
            Self {
                camera,
                config: InteractionConfig::default(),
                sketch: Sketch::new("test", Plane::yz()),
            }
        }

        fn ctx(&mut self) -> EditContext<'_> {
            EditContext {
                camera: &self.camera,
                viewport: VIEWPORT,
                config: &self.config,
                sketch: &mut self.sketch,
            }
        }

        fn over(&self, world: DVec3) -> DVec2 {
            self.camera.world_to_screen(world, VIEWPORT).unwrap()
        }

        fn press(&mut self, s: &mut ArcSketcher, world: DVec3) {
            let mut ev = InputEvent::button_press(self.over(world), PointerButton::Primary);
            s.on_button_press(&mut ev, &mut self.ctx()).unwrap();
        }

        fn motion(&mut self, s: &mut ArcSketcher, world: DVec3) {
            let mut ev = InputEvent::motion(self.over(world));
            s.on_motion(&mut ev, &mut self.ctx()).unwrap();
        }

        fn sweep_degrees(&self, s: &ArcSketcher) -> f64 {
            self.sketch
                .get(s.shape_id())
                .unwrap()
                .attrs()
                .angle(AttrKey::Sweep)
                .unwrap()
                .degrees()
        }
    }

    const CENTER: DVec3 = DVec3::new(0.0, 0.0, 0.0);
    const START: DVec3 = DVec3::new(0.0, 1.0, 0.0);

    /// Center at the origin, start one unit along plane-x
    fn placed_arc(rig: &mut Rig, stop: DVec3) -> ArcSketcher {
        let mut s = ArcSketcher::add(&mut rig.ctx());
        rig.press(&mut s, CENTER);
        rig.press(&mut s, START);
        rig.press(&mut s, stop);
        s
    }

    #[test]
    fn test_three_press_placement_counterclockwise() {
        let mut rig = Rig::new();
        // stop inside the radius so ray-reconstruction noise cannot flip it
        let s = placed_arc(&mut rig, DVec3::new(0.0, 0.0, 0.9));

        assert_relative_eq!(rig.sweep_degrees(&s), 90.0, epsilon = 1e-4);
        assert_eq!(s.status(), SketcherStatus::Active); // idles for handle edits
        let shape = rig.sketch.get(s.shape_id()).unwrap();
        assert_eq!(shape.attrs().momento_count(), 2);
        assert!((shape.attrs().point(AttrKey::Start).unwrap() - START).length() < 1e-6);
    }

    #[test]
    fn test_clockwise_sweep_is_negative() {
        let mut rig = Rig::new();
        let s = placed_arc(&mut rig, DVec3::new(0.0, 0.0, -0.9));
        assert_relative_eq!(rig.sweep_degrees(&s), -90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_outside_radius_sweeps_the_long_way() {
        let mut rig = Rig::new();
        // cursor at twice the radius: the short +90 becomes the long -270
        let s = placed_arc(&mut rig, DVec3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(rig.sweep_degrees(&s), -270.0, epsilon = 1e-4);
    }

    #[test]
    fn test_drag_stop_handle() {
        let mut rig = Rig::new();
        let mut s = placed_arc(&mut rig, DVec3::new(0.0, 0.0, 0.9));

        // the synthetic stop handle sits on the radius at the swept end
        rig.press(&mut s, DVec3::new(0.0, 0.0, 1.0));
        assert!(s.is_dragging());
        rig.motion(&mut s, DVec3::new(0.0, -0.5, 0.5));
        assert_relative_eq!(rig.sweep_degrees(&s), 135.0, epsilon = 1e-4);
    }

    #[test]
    fn test_drag_center() {
        let mut rig = Rig::new();
        let mut s = placed_arc(&mut rig, DVec3::new(0.0, 0.0, 0.9));

        rig.press(&mut s, CENTER);
        assert!(s.is_dragging());
        let target = DVec3::new(0.0, 0.5, 0.5);
        rig.motion(&mut s, target);

        let center = rig
            .sketch
            .get(s.shape_id())
            .unwrap()
            .attrs()
            .point(AttrKey::Center)
            .unwrap();
        assert!((center - target).length() < 1e-6);
    }

    #[test]
    fn test_zero_radius_keeps_sweep_unchanged() {
        let mut rig = Rig::new();
        let mut s = ArcSketcher::add(&mut rig.ctx());
        rig.press(&mut s, CENTER);
        rig.press(&mut s, CENTER); // start on top of the center
        rig.motion(&mut s, DVec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(rig.sweep_degrees(&s), 0.0);
    }

    #[test]
    fn test_press_empty_space_ends_edit() {
        let mut rig = Rig::new();
        let mut s = placed_arc(&mut rig, DVec3::new(0.0, 0.0, 0.9));
        rig.press(&mut s, DVec3::new(0.0, 8.0, 6.0));
        assert_eq!(s.status(), SketcherStatus::Done);
    }

    #[test]
    fn test_escape_mid_placement_removes_shape() {
        let mut rig = Rig::new();
        let mut s = ArcSketcher::add(&mut rig.ctx());
        rig.press(&mut s, CENTER);

        let mut ev = InputEvent::key_press(DVec2::ZERO, Key::Escape);
        s.on_key_press(&mut ev, &mut rig.ctx()).unwrap();
        assert_eq!(s.status(), SketcherStatus::Cancelled);
        s.cancel(&mut rig.ctx()).unwrap();
        assert!(rig.sketch.is_empty());
    }

    #[test]
    fn test_hover_reports_handles() {
        let mut rig = Rig::new();
        let mut s = placed_arc(&mut rig, DVec3::new(0.0, 0.0, 0.9));

        rig.motion(&mut s, START);
        assert_eq!(s.hovered(), Some(ArcHandle::Start));
        rig.motion(&mut s, DVec3::new(0.0, 0.0, 1.0));
        assert_eq!(s.hovered(), Some(ArcHandle::Stop));
        rig.motion(&mut s, CENTER);
        assert_eq!(s.hovered(), Some(ArcHandle::Center));
        rig.motion(&mut s, DVec3::new(0.0, 8.0, 6.0));
        assert_eq!(s.hovered(), None);
    }
}

//! Editor facade
//!
//! Owns the scene state and the two standard interactors, and wires them
//! into a chain for every incoming event. Frontends feed `handle_event`
//! and call `render` once per frame; everything else happens through
//! named actions or the interactors themselves.

use glam::DVec2;

use sk_core::{RenderTarget, Sketch};
use sk_view::Camera;
use uuid::Uuid;

use crate::event::InputEvent;
use crate::interactor::{InteractorChain, SceneContext, SketchInteractor, ViewInteractor};
use crate::sketcher::SketchTool;
use crate::InteractError;

pub struct Editor {
    pub scene: SceneContext,
    sketch_interactor: SketchInteractor,
    view_interactor: ViewInteractor,
}

impl Editor {
    pub fn new(viewport: DVec2) -> Self {
        let aspect = if viewport.y > 0.0 {
            viewport.x / viewport.y
        } else {
            1.0
        };
        Self {
            scene: SceneContext::new(Camera::new(aspect), viewport),
            sketch_interactor: SketchInteractor::new(),
            view_interactor: ViewInteractor::new(),
        }
    }

    pub fn sketch_interactor(&self) -> &SketchInteractor {
        &self.sketch_interactor
    }

    /// Offer one event to the interactor chain
    pub fn handle_event(&mut self, event: &mut InputEvent) -> Result<(), InteractError> {
        let mut chain = InteractorChain::new();
        chain.push(&mut self.sketch_interactor);
        chain.push(&mut self.view_interactor);
        chain.dispatch(event, &mut self.scene)
    }

    /// Start drawing a new shape with the given tool
    pub fn begin(&mut self, tool: SketchTool) -> Result<Uuid, InteractError> {
        self.sketch_interactor.begin(&mut self.scene, tool)
    }

    /// Start editing an existing shape
    pub fn begin_edit(&mut self, shape: Uuid) -> Result<(), InteractError> {
        self.sketch_interactor.begin_edit(&mut self.scene, shape)
    }

    /// Cancel the edit session in flight, if any
    pub fn cancel_edit(&mut self) -> Result<(), InteractError> {
        self.sketch_interactor.cancel_active(&mut self.scene)
    }

    /// Close the open sketch, cancelling any live edit session first so
    /// the sketch is handed back with every shape at an apply boundary
    pub fn close_sketch(&mut self) -> Result<Option<Sketch>, InteractError> {
        self.sketch_interactor.cancel_active(&mut self.scene)?;
        Ok(self.scene.close_sketch())
    }

    /// Frame the whole sketch in the viewport; a no-op without content
    pub fn zoom_to_fit(&mut self) -> Result<(), InteractError> {
        let Some(sketch) = self.scene.sketch.as_mut() else {
            return Ok(());
        };
        if let Some(bounds) = sketch.bounds()? {
            self.scene.camera.frame(&bounds);
        }
        Ok(())
    }

    /// Draw the open sketch, recomputing stale geometry first
    pub fn render(&mut self, target: &mut dyn RenderTarget) -> Result<(), InteractError> {
        if let Some(sketch) = self.scene.sketch.as_mut() {
            sketch.render_all(target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    use sk_core::{AttrKey, AttrValue, Plane, RecordingTarget, Sketch, Sketchable};

    use crate::event::PointerButton;
    use crate::InteractError;

    const VIEWPORT: DVec2 = DVec2::new(800.0, 600.0);

    /// Editor with a YZ-plane sketch open, camera head-on
    fn editor() -> Editor {
        let mut editor = Editor::new(VIEWPORT);
        editor.scene.open_sketch(Sketch::new("test", Plane::yz()));
        editor
    }

    fn over(editor: &Editor, world: DVec3) -> DVec2 {
        editor
            .scene
            .camera
            .world_to_screen(world, VIEWPORT)
            .unwrap()
    }

    fn click(editor: &mut Editor, world: DVec3) {
        let pos = over(editor, world);
        let mut press = InputEvent::button_press(pos, PointerButton::Primary);
        editor.handle_event(&mut press).unwrap();
        let mut release = InputEvent::button_release(pos, PointerButton::Primary);
        editor.handle_event(&mut release).unwrap();
    }

    #[test]
    fn test_line_drawn_end_to_end() {
        let mut editor = editor();
        let id = editor.begin(SketchTool::Line).unwrap();

        let corners = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
            DVec3::new(0.0, 2.0, 2.0),
            DVec3::new(0.0, 0.0, 2.0),
        ];
        for p in corners {
            click(&mut editor, p);
        }
        click(&mut editor, corners[0]);
        assert!(!editor.sketch_interactor().is_editing());

        let mut target = RecordingTarget::default();
        editor.render(&mut target).unwrap();
        // 4 vertices plus the closing segment
        assert_eq!(target.polylines.len(), 1);
        assert_eq!(target.polylines[0].len(), 5);
        assert!(
            editor
                .scene
                .sketch
                .as_ref()
                .unwrap()
                .get(id)
                .unwrap()
                .attrs()
                .flag(AttrKey::Closed)
                .unwrap()
        );
    }

    #[test]
    fn test_navigation_works_while_drawing() {
        let mut editor = editor();
        editor.begin(SketchTool::Line).unwrap();

        let yaw_before = editor.scene.camera.eye();
        let mut press = InputEvent::button_press(VIEWPORT * 0.5, PointerButton::Middle);
        editor.handle_event(&mut press).unwrap();
        let mut motion = InputEvent::motion(VIEWPORT * 0.5 + DVec2::new(25.0, 0.0));
        editor.handle_event(&mut motion).unwrap();

        // the middle-drag fell through the sketch layer to the view layer
        assert!((editor.scene.camera.eye() - yaw_before).length() > 1e-6);
        assert!(editor.sketch_interactor().is_editing());
    }

    #[test]
    fn test_cancel_edit_without_session_is_ok() {
        let mut editor = editor();
        editor.cancel_edit().unwrap();
    }

    #[test]
    fn test_close_sketch_cancels_live_session() {
        let mut editor = editor();
        editor.begin(SketchTool::Line).unwrap();
        click(&mut editor, DVec3::new(0.0, 1.0, 1.0));

        let sketch = editor.close_sketch().unwrap().unwrap();
        assert!(!editor.sketch_interactor().is_editing());
        // the never-applied line was discarded before the hand-back
        assert!(sketch.is_empty());
        assert!(editor.scene.sketch.is_none());
    }

    #[test]
    fn test_close_sketch_reverts_half_edited_shape() {
        let mut editor = editor();
        let mut line = Sketchable::new_line();
        line.attrs_mut().set(
            AttrKey::Points,
            AttrValue::PointList(vec![DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0)]),
        );
        line.snapshot();
        let id = editor.scene.sketch.as_mut().unwrap().add(line);

        // drag a vertex but never reach an apply boundary
        editor.begin_edit(id).unwrap();
        let pos = over(&editor, DVec3::new(0.0, 2.0, 0.0));
        let mut press = InputEvent::button_press(pos, PointerButton::Primary);
        editor.handle_event(&mut press).unwrap();
        let mut motion = InputEvent::motion(over(&editor, DVec3::new(0.0, 3.0, 1.0)));
        editor.handle_event(&mut motion).unwrap();

        let sketch = editor.close_sketch().unwrap().unwrap();
        let shape = sketch.get(id).unwrap();
        // live attributes match the last momento again
        assert_eq!(shape.attrs().values(), shape.attrs().momentos().last().unwrap());
        let points = shape.attrs().points(AttrKey::Points).unwrap();
        assert!((points[1] - DVec3::new(0.0, 2.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_begin_without_sketch_errors() {
        let mut editor = Editor::new(VIEWPORT);
        assert_eq!(
            editor.begin(SketchTool::Rectangle),
            Err(InteractError::NoSketchContext)
        );
    }

    #[test]
    fn test_zoom_to_fit_frames_content() {
        let mut editor = editor();
        let mut line = Sketchable::new_line();
        line.attrs_mut().set(
            AttrKey::Points,
            AttrValue::PointList(vec![
                DVec3::new(0.0, 20.0, 10.0),
                DVec3::new(0.0, 24.0, 14.0),
            ]),
        );
        editor.scene.sketch.as_mut().unwrap().add(line);

        editor.zoom_to_fit().unwrap();
        let target = editor.scene.camera.target();
        assert!((target - DVec3::new(0.0, 22.0, 12.0)).length() < 1e-9);
    }

    #[test]
    fn test_render_without_sketch_is_empty() {
        let mut editor = Editor::new(VIEWPORT);
        let mut target = RecordingTarget::default();
        editor.render(&mut target).unwrap();
        assert!(target.polylines.is_empty());
    }
}

//! Event dispatch chain
//!
//! Interactors are ordered layers that take turns at each event; the
//! first one to consume it wins. The `SketchInteractor` owns the active
//! sketcher session and goes first so editing clicks never reach camera
//! navigation; the `ViewInteractor` picks up whatever is left.

use glam::DVec2;
use uuid::Uuid;

use sk_core::{ShapeKind, Sketch};
use sk_view::Camera;

use crate::config::InteractionConfig;
use crate::event::{EventKind, InputEvent, PointerButton};
use crate::sketcher::{
    ArcSketcher, BoxedSketcher, EditContext, LineSketcher, SketchTool, Sketcher, SketcherStatus,
};
use crate::InteractError;

/// Shared state every interactor sees: camera, viewport, settings and the
/// optionally-open sketch
pub struct SceneContext {
    pub camera: Camera,
    pub viewport: DVec2,
    pub config: InteractionConfig,
    pub sketch: Option<Sketch>,
}

impl SceneContext {
    pub fn new(camera: Camera, viewport: DVec2) -> Self {
        Self {
            camera,
            viewport,
            config: InteractionConfig::default(),
            sketch: None,
        }
    }

    pub fn open_sketch(&mut self, sketch: Sketch) {
        tracing::info!(name = %sketch.name, "sketch opened");
        self.sketch = Some(sketch);
    }

    pub fn close_sketch(&mut self) -> Option<Sketch> {
        self.sketch.take()
    }
}

/// One layer in the dispatch chain
pub trait Interactor {
    fn name(&self) -> &'static str;

    fn handle_event(
        &mut self,
        event: &mut InputEvent,
        scene: &mut SceneContext,
    ) -> Result<(), InteractError>;
}

/// Ordered, borrowed chain of interactors built per event batch
#[derive(Default)]
pub struct InteractorChain<'a> {
    layers: Vec<&'a mut dyn Interactor>,
}

impl<'a> InteractorChain<'a> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn push(&mut self, layer: &'a mut dyn Interactor) {
        self.layers.push(layer);
    }

    /// Offer the event to each layer in order until one consumes it
    pub fn dispatch(
        &mut self,
        event: &mut InputEvent,
        scene: &mut SceneContext,
    ) -> Result<(), InteractError> {
        for layer in &mut self.layers {
            if event.is_handled() {
                break;
            }
            tracing::trace!(layer = layer.name(), kind = ?event.kind, "dispatch");
            layer.handle_event(event, scene)?;
        }
        Ok(())
    }
}

/// Owns the active sketcher session and routes events into it
#[derive(Default)]
pub struct SketchInteractor {
    tool: SketchTool,
    active: Option<Box<dyn Sketcher>>,
}

impl SketchInteractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> SketchTool {
        self.tool
    }

    pub fn is_editing(&self) -> bool {
        self.active.is_some()
    }

    /// The shape being edited, if a session is active
    pub fn active_shape(&self) -> Option<Uuid> {
        self.active.as_ref().map(|s| s.shape_id())
    }

    /// Start drawing a new shape with the given tool
    ///
    /// Any session already in flight is cancelled first.
    pub fn begin(
        &mut self,
        scene: &mut SceneContext,
        tool: SketchTool,
    ) -> Result<Uuid, InteractError> {
        if !tool.is_drawing() {
            return Err(InteractError::NotADrawingTool(tool.name()));
        }
        self.cancel_active(scene)?;
        let mut ctx = edit_context(scene)?;
        let sketcher: Box<dyn Sketcher> = match tool {
            SketchTool::Line => Box::new(LineSketcher::add(&mut ctx)),
            SketchTool::Rectangle => Box::new(BoxedSketcher::add_rectangle(&mut ctx)),
            SketchTool::Ellipse => Box::new(BoxedSketcher::add_ellipse(&mut ctx)),
            SketchTool::Arc => Box::new(ArcSketcher::add(&mut ctx)),
            SketchTool::Select => unreachable!("rejected above"),
        };
        let id = sketcher.shape_id();
        self.tool = tool;
        self.active = Some(sketcher);
        Ok(id)
    }

    /// Start editing an existing shape
    pub fn begin_edit(
        &mut self,
        scene: &mut SceneContext,
        shape: Uuid,
    ) -> Result<(), InteractError> {
        self.cancel_active(scene)?;
        let sketch = scene.sketch.as_ref().ok_or(InteractError::NoSketchContext)?;
        let kind = sketch
            .get(shape)
            .ok_or(InteractError::ShapeNotFound(shape))?
            .kind();
        self.active = Some(match kind {
            ShapeKind::Line => Box::new(LineSketcher::edit(shape)),
            ShapeKind::Rectangle | ShapeKind::Ellipse => Box::new(BoxedSketcher::edit(shape)),
            ShapeKind::Arc => Box::new(ArcSketcher::edit(shape)),
        });
        self.tool = SketchTool::Select;
        Ok(())
    }

    /// Cancel the session in flight, if any
    pub fn cancel_active(&mut self, scene: &mut SceneContext) -> Result<(), InteractError> {
        let Some(mut sketcher) = self.active.take() else {
            return Ok(());
        };
        let mut ctx = edit_context(scene)?;
        sketcher.cancel(&mut ctx)
    }
}

impl Interactor for SketchInteractor {
    fn name(&self) -> &'static str {
        "sketch"
    }

    fn handle_event(
        &mut self,
        event: &mut InputEvent,
        scene: &mut SceneContext,
    ) -> Result<(), InteractError> {
        let Some(mut sketcher) = self.active.take() else {
            return Ok(());
        };
        let Some(sketch) = scene.sketch.as_mut() else {
            // closing the sketch with a session still live bypasses the
            // cancel path; surface the contract violation
            tracing::warn!("sketch closed while an edit was active");
            return Err(InteractError::NoSketchContext);
        };
        let mut ctx = EditContext {
            camera: &scene.camera,
            viewport: scene.viewport,
            config: &scene.config,
            sketch,
        };

        let result = match event.kind {
            EventKind::ButtonPress { .. } => sketcher.on_button_press(event, &mut ctx),
            EventKind::ButtonRelease { .. } => sketcher.on_button_release(event, &mut ctx),
            EventKind::Motion => sketcher.on_motion(event, &mut ctx),
            EventKind::Wheel { .. } => sketcher.on_wheel(event, &mut ctx),
            EventKind::KeyPress { .. } => sketcher.on_key_press(event, &mut ctx),
        };
        if let Err(err) = result {
            self.active = Some(sketcher);
            return Err(err);
        }

        match sketcher.status() {
            SketcherStatus::Active => self.active = Some(sketcher),
            SketcherStatus::Done => sketcher.apply(&mut ctx)?,
            SketcherStatus::Cancelled => sketcher.cancel(&mut ctx)?,
        }
        Ok(())
    }
}

fn edit_context<'a>(scene: &'a mut SceneContext) -> Result<EditContext<'a>, InteractError> {
    let sketch = scene.sketch.as_mut().ok_or(InteractError::NoSketchContext)?;
    Ok(EditContext {
        camera: &scene.camera,
        viewport: scene.viewport,
        config: &scene.config,
        sketch,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavMode {
    Orbit,
    Pan,
}

/// Camera navigation: middle-drag orbits, shift+middle-drag pans, the
/// wheel dollies
#[derive(Default)]
pub struct ViewInteractor {
    nav: Option<NavMode>,
    last: DVec2,
}

impl ViewInteractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Interactor for ViewInteractor {
    fn name(&self) -> &'static str {
        "view"
    }

    fn handle_event(
        &mut self,
        event: &mut InputEvent,
        scene: &mut SceneContext,
    ) -> Result<(), InteractError> {
        match event.kind {
            EventKind::ButtonPress {
                button: PointerButton::Middle,
                ..
            } => {
                self.nav = Some(if event.modifiers.shift {
                    NavMode::Pan
                } else {
                    NavMode::Orbit
                });
                self.last = event.pos;
                event.consume();
            }
            EventKind::ButtonRelease {
                button: PointerButton::Middle,
            } => {
                if self.nav.take().is_some() {
                    event.consume();
                }
            }
            EventKind::Motion => {
                if let Some(nav) = self.nav {
                    let delta = event.pos - self.last;
                    match nav {
                        NavMode::Orbit => scene.camera.orbit(
                            delta.x,
                            delta.y,
                            scene.config.orbit_sensitivity,
                        ),
                        NavMode::Pan => scene.camera.pan(delta.x, delta.y, scene.viewport),
                    }
                    self.last = event.pos;
                    event.consume();
                }
            }
            EventKind::Wheel { delta } => {
                scene.camera.dolly(delta);
                event.consume();
            }
            _ => {}
        }
        Ok(())
    }
}

//! Interactive editing layer
//!
//! Translates pointer/keyboard events into sketch edits. Events flow
//! through an ordered chain of interactors; the sketch interactor feeds
//! the active sketcher state machine, the view interactor handles camera
//! navigation with whatever the sketcher left unconsumed. Named actions
//! (tool activation, cancel, zoom-to-fit) are dispatched through the
//! `ActionRegistry`.

pub mod action;
pub mod config;
pub mod editor;
pub mod event;
pub mod interactor;
pub mod sketcher;

use thiserror::Error;
use uuid::Uuid;

pub use action::ActionRegistry;
pub use config::InteractionConfig;
pub use editor::Editor;
pub use event::{EventKind, InputEvent, Key, Modifiers, PointerButton};
pub use interactor::{Interactor, InteractorChain, SceneContext, SketchInteractor, ViewInteractor};
pub use sketcher::{EditContext, SketchTool, Sketcher, SketcherStatus};

/// Errors surfaced by the interaction layer
///
/// `NoSketchContext` and `ShapeNotFound` flag caller-contract violations;
/// degenerate geometric situations (parallel ray, collapsed viewport) are
/// not errors and simply produce no interaction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InteractError {
    #[error("no sketch is open for editing")]
    NoSketchContext,

    #[error("sketchable {0} not found in the active sketch")]
    ShapeNotFound(Uuid),

    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("tool {0} cannot start a sketch edit")]
    NotADrawingTool(&'static str),

    #[error(transparent)]
    Attr(#[from] sk_core::AttrError),
}

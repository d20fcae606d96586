//! Named actions
//!
//! Frontends bind menus and shortcuts to action names rather than calling
//! into the editor directly. Unknown names are an error so broken
//! bindings surface immediately.

use std::collections::HashMap;

use crate::editor::Editor;
use crate::sketcher::SketchTool;
use crate::InteractError;

pub type Action = Box<dyn Fn(&mut Editor) -> Result<(), InteractError>>;

/// Name-to-action table with the standard bindings preregistered
pub struct ActionRegistry {
    actions: HashMap<&'static str, Action>,
}

impl ActionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Registry preloaded with the standard editor actions
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("sketch.line", |e| e.begin(SketchTool::Line).map(|_| ()));
        registry.register("sketch.rectangle", |e| {
            e.begin(SketchTool::Rectangle).map(|_| ())
        });
        registry.register("sketch.ellipse", |e| {
            e.begin(SketchTool::Ellipse).map(|_| ())
        });
        registry.register("sketch.arc", |e| e.begin(SketchTool::Arc).map(|_| ()));
        registry.register("edit.cancel", Editor::cancel_edit);
        registry.register("view.fit", Editor::zoom_to_fit);
        registry
    }

    pub fn register(
        &mut self,
        name: &'static str,
        action: impl Fn(&mut Editor) -> Result<(), InteractError> + 'static,
    ) {
        self.actions.insert(name, Box::new(action));
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.actions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn invoke(&self, name: &str, editor: &mut Editor) -> Result<(), InteractError> {
        let action = self
            .actions
            .get(name)
            .ok_or_else(|| InteractError::UnknownAction(name.to_owned()))?;
        tracing::debug!(action = name, "invoking");
        action(editor)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn editor() -> Editor {
        Editor::new(DVec2::new(800.0, 600.0))
    }

    #[test]
    fn test_unknown_action_is_error() {
        let registry = ActionRegistry::with_builtins();
        let mut editor = editor();
        assert_eq!(
            registry.invoke("sketch.bezier", &mut editor),
            Err(InteractError::UnknownAction("sketch.bezier".into()))
        );
    }

    #[test]
    fn test_drawing_action_needs_sketch_context() {
        let registry = ActionRegistry::with_builtins();
        let mut editor = editor();
        assert_eq!(
            registry.invoke("sketch.line", &mut editor),
            Err(InteractError::NoSketchContext)
        );
    }

    #[test]
    fn test_drawing_action_starts_session() {
        let registry = ActionRegistry::with_builtins();
        let mut editor = editor();
        editor.scene.open_sketch(sk_core::Sketch::default());

        registry.invoke("sketch.line", &mut editor).unwrap();
        assert!(editor.sketch_interactor().is_editing());

        registry.invoke("edit.cancel", &mut editor).unwrap();
        assert!(!editor.sketch_interactor().is_editing());
        // the never-placed line is gone again
        assert!(editor.scene.sketch.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = ActionRegistry::new();
        registry.register("noop", |_| Ok(()));
        let mut editor = editor();
        registry.invoke("noop", &mut editor).unwrap();
        assert_eq!(registry.names(), vec!["noop"]);
    }

    #[test]
    fn test_view_fit_without_sketch_is_noop() {
        let registry = ActionRegistry::with_builtins();
        let mut editor = editor();
        registry.invoke("view.fit", &mut editor).unwrap();
    }
}

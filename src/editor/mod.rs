//! Text editor adapter.
//!
//! Page controllers talk to the editing widget only through [`TextEditor`].
//! Layout is computed lazily: [`TextEditor::refresh`] measures the content
//! only while the container is visible and yields [`Geometry::ZERO`]
//! otherwise, so callers must show the container before refreshing.

pub mod external;

pub use external::ExternalEditor;

/// Measured layout of the editor content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub lines: usize,
    pub columns: usize,
}

impl Geometry {
    pub const ZERO: Geometry = Geometry {
        lines: 0,
        columns: 0,
    };

    fn measure(text: &str) -> Self {
        Self {
            lines: text.lines().count().max(1),
            columns: text.lines().map(|l| l.chars().count()).max().unwrap_or(0),
        }
    }
}

pub trait TextEditor {
    /// Replace the content and reset undo history.
    fn set_value(&mut self, text: &str);

    /// Current content, verbatim.
    fn get_value(&self) -> String;

    /// Hand control to the operator.
    fn focus(&mut self) -> anyhow::Result<()>;

    /// Recompute layout. Zero-size while hidden.
    fn refresh(&mut self) -> Geometry;

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;
}

// ---------------------------------------------------------------------------
// BufferEditor
// ---------------------------------------------------------------------------

/// In-memory editor with linear undo history.
#[derive(Debug, Clone, Default)]
pub struct BufferEditor {
    content: String,
    undo: Vec<String>,
    visible: bool,
    geometry: Geometry,
    focused: bool,
}

impl BufferEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an operator edit; the previous content becomes undoable.
    pub fn edit(&mut self, text: &str) {
        if text == self.content {
            return;
        }
        let previous = std::mem::replace(&mut self.content, text.to_string());
        self.undo.push(previous);
    }

    /// Revert the most recent edit. Returns `false` when history is empty.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(previous) => {
                self.content = previous;
                true
            }
            None => false,
        }
    }

    pub fn history_len(&self) -> usize {
        self.undo.len()
    }

    /// Layout from the last [`TextEditor::refresh`].
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }
}

impl TextEditor for BufferEditor {
    fn set_value(&mut self, text: &str) {
        self.content = text.to_string();
        self.undo.clear();
    }

    fn get_value(&self) -> String {
        self.content.clone()
    }

    fn focus(&mut self) -> anyhow::Result<()> {
        self.focused = true;
        Ok(())
    }

    fn refresh(&mut self) -> Geometry {
        self.geometry = if self.visible {
            Geometry::measure(&self.content)
        } else {
            Geometry::ZERO
        };
        self.geometry
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.focused = false;
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

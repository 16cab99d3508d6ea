//! Local undo/redo history over the board's committed stroke list.
//!
//! The committed stack *is* the board's `strokes` vector, passed in by the
//! caller, so the two can never drift apart. `History` owns only the redo
//! stack. Each method returns whether the committed list changed, which the
//! engine uses to decide on a full base repaint and to mark the session dirty.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use frames::Stroke;

#[derive(Debug, Clone, Default)]
pub struct History {
    redo: Vec<Stroke>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized stroke. Any new edit discards the redo branch.
    pub fn commit(&mut self, strokes: &mut Vec<Stroke>, stroke: Stroke) {
        strokes.push(stroke);
        self.redo.clear();
    }

    /// Move the newest committed stroke onto the redo stack.
    pub fn undo(&mut self, strokes: &mut Vec<Stroke>) -> bool {
        let Some(stroke) = strokes.pop() else {
            return false;
        };
        self.redo.push(stroke);
        true
    }

    /// Move the newest undone stroke back onto the committed list.
    pub fn redo(&mut self, strokes: &mut Vec<Stroke>) -> bool {
        let Some(stroke) = self.redo.pop() else {
            return false;
        };
        strokes.push(stroke);
        true
    }

    /// Empty both stacks. Confirmation is the caller's concern.
    pub fn clear_all(&mut self, strokes: &mut Vec<Stroke>) {
        strokes.clear();
        self.redo.clear();
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

//! Command history (undo/redo) for one editor.

/// Undo and redo stacks of applied commands.
///
/// Linear model: pushing a new command drops everything that could have
/// been redone.
#[derive(Debug, Clone)]
pub struct History<C> {
    undo_stack: Vec<C>,
    redo_stack: Vec<C>,
    max_size: usize,
}

impl<C> Default for History<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> History<C> {
    /// Create a history with the default max size
    pub fn new() -> Self {
        Self::with_max_size(1000)
    }

    /// Create a history keeping at most `max_size` undo entries
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Record a newly executed command (clears the redo stack)
    pub fn push(&mut self, command: C) {
        self.redo_stack.clear();
        self.undo_stack.push(command);

        // Drop the oldest entries past the limit
        if self.undo_stack.len() > self.max_size {
            let excess = self.undo_stack.len() - self.max_size;
            self.undo_stack.drain(..excess);
        }
    }

    /// Take the most recent command to undo it
    pub fn pop_undo(&mut self) -> Option<C> {
        self.undo_stack.pop()
    }

    /// Store a command that was just undone
    pub fn push_undone(&mut self, command: C) {
        self.redo_stack.push(command);
    }

    /// Take the most recently undone command to redo it
    pub fn pop_redo(&mut self) -> Option<C> {
        self.redo_stack.pop()
    }

    /// Store a command that was just redone (keeps the redo stack)
    pub fn push_redone(&mut self, command: C) {
        self.undo_stack.push(command);
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

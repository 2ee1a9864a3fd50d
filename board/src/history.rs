use chess::Move;

/// Moves undone from the position but kept for forward navigation.
///
/// The applied half of the history is the position's own move stack; the
/// full game is that stack followed by this one in reverse.
#[derive(Debug, Clone, Default)]
pub struct RedoStack {
    pending: Vec<Move>,
}

impl RedoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mv: Move) {
        self.pending.push(mv);
    }

    /// The next move forward, removed from the stack.
    pub fn pop(&mut self) -> Option<Move> {
        self.pending.pop()
    }

    pub fn peek(&self) -> Option<Move> {
        self.pending.last().copied()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Pending moves in the order they would be replayed.
    pub fn forward(&self) -> impl Iterator<Item = &Move> {
        self.pending.iter().rev()
    }
}

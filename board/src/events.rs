//! Board notifications and synchronous subscriber delivery.

use chess::{PieceColor, Square};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A move was applied. Carries the move in UCI text.
    MoveMade(String),
    Checkmate { winner: PieceColor },
    Draw,
    GameOver,
    CellMarked { square: Square, marked: bool },
    HistoryNavigated { ply: usize, total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MoveMade,
    Checkmate,
    Draw,
    GameOver,
    CellMarked,
    HistoryNavigated,
}

impl BoardEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MoveMade(_) => EventKind::MoveMade,
            Self::Checkmate { .. } => EventKind::Checkmate,
            Self::Draw => EventKind::Draw,
            Self::GameOver => EventKind::GameOver,
            Self::CellMarked { .. } => EventKind::CellMarked,
            Self::HistoryNavigated { .. } => EventKind::HistoryNavigated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Callback = Box<dyn FnMut(&BoardEvent) + Send>;

struct Subscriber {
    id: SubscriptionId,
    filter: Option<EventKind>,
    callback: Callback,
}

/// Delivers events to subscribers in registration order.
#[derive(Default)]
pub struct Notifier {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive only events of `kind`.
    pub fn subscribe(&mut self, kind: EventKind, callback: Callback) -> SubscriptionId {
        self.add(Some(kind), callback)
    }

    pub fn subscribe_all(&mut self, callback: Callback) -> SubscriptionId {
        self.add(None, callback)
    }

    /// Returns false when the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: &BoardEvent) {
        let kind = event.kind();
        for sub in &mut self.subscribers {
            if sub.filter.map_or(true, |k| k == kind) {
                (sub.callback)(event);
            }
        }
    }

    fn add(&mut self, filter: Option<EventKind>, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            filter,
            callback,
        });
        id
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

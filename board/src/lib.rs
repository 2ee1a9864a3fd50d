//! Interactive chess board state: cells, gestures, move history.

pub mod access;
pub mod cell;
pub mod controller;
pub mod error;
pub mod events;
pub mod geometry;
pub mod history;

pub use access::AccessibleSides;
pub use cell::Cell;
pub use controller::{BoardConfig, BoardController, ClickOutcome};
pub use error::BoardError;
pub use events::{BoardEvent, Callback, EventKind, Notifier, SubscriptionId};
pub use geometry::{GridCoord, Orientation};
pub use history::RedoStack;

//! HiChess: an interactive chess board played locally, online or against a
//! UCI engine.

pub mod config;
pub mod input;
pub mod move_list;
pub mod render;
pub mod session;
pub mod settings;
pub mod setup;

pub use move_list::MoveList;
pub use session::{spawn_session, SessionConfig, SessionEvent, SessionHandle, SessionSnapshot};
pub use settings::{Settings, SettingsError};
pub use setup::{ColorChoice, GameSetup, PveGame, StartPosition};

//! Game simulation modules

pub mod arena;
pub mod combat;
pub mod engine;
pub mod entity;
pub mod input;
pub mod physics;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod tuning;

pub use arena::{ArenaHandle, ConnectionChannels};
pub use entity::ConnectionId;
pub use input::ControlScheme;
pub use tuning::Tuning;

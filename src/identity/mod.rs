//! Pilot roster: who may log in, and for which team

pub mod directory;

pub use directory::Directory;

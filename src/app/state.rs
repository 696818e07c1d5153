//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::{ArenaHandle, Tuning};
use crate::identity::Directory;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<Directory>,
    pub arena: ArenaHandle,
}

impl AppState {
    /// Build shared state and start the arena task. Must run inside a tokio runtime.
    pub fn new(config: Config, directory: Directory) -> Self {
        let config = Arc::new(config);
        let directory = Arc::new(directory);

        let seed = config.arena_seed.unwrap_or_else(rand::random);
        let arena = ArenaHandle::spawn(
            directory.clone(),
            Tuning::default(),
            config.control_scheme,
            seed,
        );

        Self {
            config,
            directory,
            arena,
        }
    }
}

//! Authoritative entity storage

use std::collections::HashMap;

use super::entity::{ConnectionId, Effect, Player, Projectile, ProjectileId};

/// Owns every live jet, bullet and explosion. Only the arena task holds one.
#[derive(Debug, Default)]
pub struct EntityStore {
    pub players: HashMap<ConnectionId, Player>,
    pub projectiles: HashMap<ProjectileId, Projectile>,
    pub effects: Vec<Effect>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(&self, id: &ConnectionId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &ConnectionId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Connection currently flying under `username`, if any
    pub fn find_by_username(&self, username: &str) -> Option<ConnectionId> {
        self.players
            .values()
            .find(|p| p.username == username)
            .map(|p| p.id)
    }

    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn remove_player(&mut self, id: &ConnectionId) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn insert_projectile(&mut self, projectile: Projectile) {
        self.projectiles.insert(projectile.id, projectile);
    }

    /// Drop every bullet whose owner is no longer in the arena
    pub fn prune_orphans(&mut self) -> usize {
        let before = self.projectiles.len();
        let players = &self.players;
        self.projectiles
            .retain(|_, b| players.contains_key(&b.owner));
        before - self.projectiles.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::protocol::Team;

    fn jet(id: ConnectionId, username: &str) -> Player {
        Player::new(
            id,
            username.to_string(),
            username.to_uppercase(),
            Team::Red,
            (50.0, 50.0),
            100,
        )
    }

    fn bullet(owner: ConnectionId) -> Projectile {
        Projectile {
            id: ProjectileId::new(),
            x: 10.0,
            y: 10.0,
            angle: 0.0,
            owner,
            owner_team: Team::Red,
        }
    }

    #[test]
    fn finds_players_by_username() {
        let mut store = EntityStore::new();
        let a = ConnectionId::new();
        store.insert_player(jet(a, "charlie"));

        assert_eq!(store.find_by_username("charlie"), Some(a));
        assert_eq!(store.find_by_username("delta"), None);
    }

    #[test]
    fn prune_orphans_keeps_owned_bullets() {
        let mut store = EntityStore::new();
        let alive = ConnectionId::new();
        let gone = ConnectionId::new();
        store.insert_player(jet(alive, "charlie"));
        store.insert_projectile(bullet(alive));
        store.insert_projectile(bullet(gone));
        store.insert_projectile(bullet(gone));

        assert_eq!(store.prune_orphans(), 2);
        assert_eq!(store.projectiles.len(), 1);
        assert!(store.projectiles.values().all(|b| b.owner == alive));
    }

    #[test]
    fn removing_absent_player_is_noop() {
        let mut store = EntityStore::new();
        assert!(store.remove_player(&ConnectionId::new()).is_none());
        assert_eq!(store.player_count(), 0);
    }
}

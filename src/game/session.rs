//! Login / logout lifecycle for jets
//!
//! Duplicate logins follow "last login wins": a login for an account that is
//! already flying on another connection evicts that connection's jet.

use rand::Rng;

use crate::identity::Directory;

use super::entity::{ConnectionId, Player};
use super::physics::PhysicsSystem;
use super::store::EntityStore;
use super::tuning::ArenaTuning;

/// Authentication failures surfaced to the requesting connection only
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Result of an accepted login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Session token; identical to the connection id
    pub player_id: ConnectionId,
    /// Connection whose jet was removed because it held the same account
    pub evicted: Option<ConnectionId>,
}

/// Session manager turning credentials into jets
pub struct SessionManager;

impl SessionManager {
    pub fn login<R: Rng + ?Sized>(
        store: &mut EntityStore,
        directory: &Directory,
        rng: &mut R,
        arena: &ArenaTuning,
        connection_id: ConnectionId,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let account = directory
            .lookup(username)
            .filter(|account| account.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        let evicted = store
            .find_by_username(username)
            .filter(|existing| *existing != connection_id);
        if let Some(prior) = evicted {
            store.remove_player(&prior);
        }

        let spawn = PhysicsSystem::random_spawn(rng, arena);
        store.insert_player(Player::new(
            connection_id,
            username.to_string(),
            account.name.clone(),
            account.team,
            spawn,
            arena.max_hp,
        ));

        Ok(LoginOutcome {
            player_id: connection_id,
            evicted,
        })
    }

    /// Remove the jet flown by this connection. Absent jets are not an error.
    pub fn logout(store: &mut EntityStore, connection_id: ConnectionId) -> Option<Player> {
        store.remove_player(&connection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::protocol::Team;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixture {
        store: EntityStore,
        directory: Directory,
        rng: ChaCha8Rng,
        arena: ArenaTuning,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: EntityStore::new(),
                directory: Directory::builtin(),
                rng: ChaCha8Rng::seed_from_u64(42),
                arena: ArenaTuning::default(),
            }
        }

        fn login(
            &mut self,
            conn: ConnectionId,
            username: &str,
            password: &str,
        ) -> Result<LoginOutcome, AuthError> {
            SessionManager::login(
                &mut self.store,
                &self.directory,
                &mut self.rng,
                &self.arena,
                conn,
                username,
                password,
            )
        }
    }

    #[test]
    fn login_creates_fresh_jet_from_roster() {
        let mut fx = Fixture::new();
        let conn = ConnectionId::new();
        let outcome = fx.login(conn, "charlie", "charlie123").unwrap();

        assert_eq!(outcome.player_id, conn);
        assert_eq!(outcome.evicted, None);
        assert_eq!(fx.store.player_count(), 1);

        let jet = fx.store.player(&conn).unwrap();
        assert_eq!(jet.name, "Charlie");
        assert_eq!(jet.team, Team::Red);
        assert_eq!(jet.hp, 100);
        assert_eq!(jet.score, 0);
        assert_eq!((jet.vx, jet.vy), (0.0, 0.0));
        assert!(jet.x >= fx.arena.radius && jet.x <= fx.arena.width - fx.arena.radius);
        assert!(jet.y >= fx.arena.radius && jet.y <= fx.arena.height - fx.arena.radius);
    }

    #[test]
    fn bad_credentials_share_one_error_and_spawn_nothing() {
        let mut fx = Fixture::new();
        let wrong_password = fx.login(ConnectionId::new(), "alpha", "nope").unwrap_err();
        let unknown_user = fx.login(ConnectionId::new(), "iceman", "alpha123").unwrap_err();

        assert_eq!(wrong_password, unknown_user);
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(fx.store.player_count(), 0);
    }

    #[test]
    fn last_login_wins() {
        let mut fx = Fixture::new();
        let first = ConnectionId::new();
        let second = ConnectionId::new();
        fx.login(first, "beta", "beta123").unwrap();

        let outcome = fx.login(second, "beta", "beta123").unwrap();
        assert_eq!(outcome.evicted, Some(first));
        assert!(fx.store.player(&first).is_none());
        assert!(fx.store.player(&second).is_some());
        assert_eq!(fx.store.player_count(), 1);
    }

    #[test]
    fn relogin_on_same_connection_replaces_jet() {
        let mut fx = Fixture::new();
        let conn = ConnectionId::new();
        fx.login(conn, "alpha", "alpha123").unwrap();
        fx.store.player_mut(&conn).unwrap().score = 9;

        let outcome = fx.login(conn, "alpha", "alpha123").unwrap();
        assert_eq!(outcome.evicted, None);
        assert_eq!(fx.store.player_count(), 1);
        assert_eq!(fx.store.player(&conn).unwrap().score, 0);
    }

    #[test]
    fn logout_is_idempotent_and_targets_one_jet() {
        let mut fx = Fixture::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        fx.login(a, "alpha", "alpha123").unwrap();
        fx.login(b, "delta", "delta123").unwrap();

        assert!(SessionManager::logout(&mut fx.store, a).is_some());
        assert!(SessionManager::logout(&mut fx.store, a).is_none());
        assert!(fx.store.player(&b).is_some());
    }
}

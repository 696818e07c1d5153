//! Input routing: apply a connection's intents to the jet it owns

use std::str::FromStr;

use super::combat::CombatSystem;
use super::entity::ConnectionId;
use super::physics::PhysicsSystem;
use super::store::EntityStore;
use super::tuning::Tuning;

/// Control scheme for a deployment. The two are never mixed in one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlScheme {
    /// Aim at the cursor, thrust along the smoothed heading
    #[default]
    Flight,
    /// Shift position directly, no momentum
    Direct,
}

impl FromStr for ControlScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flight" => Ok(Self::Flight),
            "direct" => Ok(Self::Direct),
            other => Err(other.to_string()),
        }
    }
}

/// A single player intent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Aim { x: f32, y: f32 },
    Thrust,
    Move { dx: f32, dy: f32 },
    Shoot,
}

/// Why an intent was dropped. Never reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Dropped {
    #[error("connection has no live jet")]
    NoPlayer,
    #[error("intent belongs to the other control scheme")]
    WrongScheme,
    #[error("non-finite payload")]
    Malformed,
}

/// Input router applying intents against the owning jet only
pub struct InputRouter;

impl InputRouter {
    pub fn apply(
        store: &mut EntityStore,
        scheme: ControlScheme,
        tuning: &Tuning,
        connection_id: ConnectionId,
        intent: Intent,
    ) -> Result<(), Dropped> {
        match (scheme, intent) {
            (ControlScheme::Direct, Intent::Aim { .. } | Intent::Thrust)
            | (ControlScheme::Flight, Intent::Move { .. }) => return Err(Dropped::WrongScheme),
            _ => {}
        }

        let player = store
            .player_mut(&connection_id)
            .ok_or(Dropped::NoPlayer)?;

        match intent {
            Intent::Aim { x, y } => {
                if !x.is_finite() || !y.is_finite() {
                    return Err(Dropped::Malformed);
                }
                player.target_angle = (y - player.y).atan2(x - player.x);
            }
            Intent::Thrust => PhysicsSystem::thrust(player, &tuning.arena),
            Intent::Move { dx, dy } => {
                if !dx.is_finite() || !dy.is_finite() {
                    return Err(Dropped::Malformed);
                }
                let step = tuning.arena.max_move_step;
                let dx = dx.clamp(-step, step);
                let dy = dy.clamp(-step, step);
                player.x += dx;
                player.y += dy;
                if dx != 0.0 || dy != 0.0 {
                    player.angle = dy.atan2(dx);
                    player.target_angle = player.angle;
                }
                PhysicsSystem::clamp_to_arena(player, &tuning.arena);
            }
            Intent::Shoot => {
                let bullet = CombatSystem::fire(player, &tuning.arena);
                store.insert_projectile(bullet);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Player;
    use crate::ws::protocol::Team;
    use std::f32::consts::FRAC_PI_2;

    fn store_with_jet(x: f32, y: f32) -> (EntityStore, ConnectionId) {
        let mut store = EntityStore::new();
        let id = ConnectionId::new();
        store.insert_player(Player::new(
            id,
            "alpha".to_string(),
            "Alpha".to_string(),
            Team::Blue,
            (x, y),
            100,
        ));
        (store, id)
    }

    #[test]
    fn aim_sets_target_not_facing() {
        let tuning = Tuning::default();
        let (mut store, id) = store_with_jet(100.0, 100.0);
        InputRouter::apply(
            &mut store,
            ControlScheme::Flight,
            &tuning,
            id,
            Intent::Aim { x: 100.0, y: 300.0 },
        )
        .unwrap();

        let jet = store.player(&id).unwrap();
        assert!((jet.target_angle - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(jet.angle, 0.0);
    }

    #[test]
    fn thrust_accumulates() {
        let tuning = Tuning::default();
        let (mut store, id) = store_with_jet(100.0, 100.0);
        for _ in 0..3 {
            InputRouter::apply(&mut store, ControlScheme::Flight, &tuning, id, Intent::Thrust)
                .unwrap();
        }
        let jet = store.player(&id).unwrap();
        assert!((jet.vx - 1.8).abs() < 1e-5);
    }

    #[test]
    fn shoot_spawns_owned_projectile() {
        let tuning = Tuning::default();
        let (mut store, id) = store_with_jet(100.0, 100.0);
        InputRouter::apply(&mut store, ControlScheme::Flight, &tuning, id, Intent::Shoot).unwrap();

        assert_eq!(store.projectiles.len(), 1);
        let bullet = store.projectiles.values().next().unwrap();
        assert_eq!(bullet.owner, id);
        assert_eq!(bullet.owner_team, Team::Blue);
        assert!((bullet.x - 118.0).abs() < 1e-4);
    }

    #[test]
    fn unowned_input_is_dropped() {
        let tuning = Tuning::default();
        let (mut store, _) = store_with_jet(100.0, 100.0);
        let stranger = ConnectionId::new();
        let result =
            InputRouter::apply(&mut store, ControlScheme::Flight, &tuning, stranger, Intent::Shoot);

        assert_eq!(result, Err(Dropped::NoPlayer));
        assert!(store.projectiles.is_empty());
    }

    #[test]
    fn schemes_do_not_mix() {
        let tuning = Tuning::default();
        let (mut store, id) = store_with_jet(100.0, 100.0);
        assert_eq!(
            InputRouter::apply(
                &mut store,
                ControlScheme::Flight,
                &tuning,
                id,
                Intent::Move { dx: 5.0, dy: 0.0 }
            ),
            Err(Dropped::WrongScheme)
        );
        assert_eq!(
            InputRouter::apply(&mut store, ControlScheme::Direct, &tuning, id, Intent::Thrust),
            Err(Dropped::WrongScheme)
        );
        assert_eq!(store.player(&id).unwrap().x, 100.0);
    }

    #[test]
    fn direct_move_shifts_and_faces() {
        let tuning = Tuning::default();
        let (mut store, id) = store_with_jet(100.0, 100.0);
        InputRouter::apply(
            &mut store,
            ControlScheme::Direct,
            &tuning,
            id,
            Intent::Move { dx: 0.0, dy: 4.0 },
        )
        .unwrap();

        let jet = store.player(&id).unwrap();
        assert_eq!((jet.x, jet.y), (100.0, 104.0));
        assert!((jet.angle - FRAC_PI_2).abs() < 1e-6);
        assert_eq!((jet.vx, jet.vy), (0.0, 0.0));
    }

    #[test]
    fn direct_move_is_clamped() {
        let tuning = Tuning::default();
        let (mut store, id) = store_with_jet(100.0, 100.0);
        InputRouter::apply(
            &mut store,
            ControlScheme::Direct,
            &tuning,
            id,
            Intent::Move { dx: -5000.0, dy: 0.0 },
        )
        .unwrap();
        assert_eq!(store.player(&id).unwrap().x, 90.0);

        let result = InputRouter::apply(
            &mut store,
            ControlScheme::Direct,
            &tuning,
            id,
            Intent::Move { dx: f32::NAN, dy: 1.0 },
        );
        assert_eq!(result, Err(Dropped::Malformed));
    }

    #[test]
    fn parses_control_scheme() {
        assert_eq!("flight".parse::<ControlScheme>(), Ok(ControlScheme::Flight));
        assert_eq!(" Direct ".parse::<ControlScheme>(), Ok(ControlScheme::Direct));
        assert!("hover".parse::<ControlScheme>().is_err());
    }
}

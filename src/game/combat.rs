//! Combat system - guns, hit detection, damage

use super::entity::{ConnectionId, Player, Projectile, ProjectileId};
use super::tuning::ArenaTuning;

/// Combat system for spawning bullets and resolving hits
pub struct CombatSystem;

impl CombatSystem {
    /// Create a bullet at the jet's nose, heading where the jet currently faces
    pub fn fire(player: &Player, arena: &ArenaTuning) -> Projectile {
        Projectile {
            id: ProjectileId::new(),
            x: player.x + player.angle.cos() * arena.radius,
            y: player.y + player.angle.sin() * arena.radius,
            angle: player.angle,
            owner: player.id,
            owner_team: player.team,
        }
    }

    /// Only jets of the other team can be hit, so a shooter never hits itself
    pub fn can_target(projectile: &Projectile, target: &Player) -> bool {
        projectile.owner_team != target.team
    }

    /// Disc test: strictly closer than the collision radius
    pub fn check_hit(projectile: &Projectile, target: &Player, radius: f32) -> bool {
        let dx = projectile.x - target.x;
        let dy = projectile.y - target.y;
        dx * dx + dy * dy < radius * radius
    }

    /// Apply damage to hit points, returns (new_hp, is_fatal)
    pub fn apply_damage(hp: i32, damage: i32) -> (i32, bool) {
        let new_hp = hp - damage;
        (new_hp, new_hp <= 0)
    }
}

/// Hit result from combat resolution
#[derive(Debug, Clone)]
pub struct HitResult {
    pub projectile_id: ProjectileId,
    pub shooter_id: ConnectionId,
    pub target_id: ConnectionId,
    pub x: f32,
    pub y: f32,
}

//! Arena entities: jets, bullets and explosions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ws::protocol::Team;

/// Opaque per-socket identity. Also the key of the player flown by that socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique projectile identity. Carries no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectileId(Uuid);

impl ProjectileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectileId {
    fn default() -> Self {
        Self::new()
    }
}

/// A logged-in pilot's jet (authoritative)
#[derive(Debug, Clone)]
pub struct Player {
    pub id: ConnectionId,
    pub username: String,
    pub name: String,
    pub team: Team,

    // Position and movement
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub angle: f32,
    pub target_angle: f32,
    pub bank: f32,

    // Combat
    pub hp: i32,
    pub score: u32,
}

impl Player {
    pub fn new(
        id: ConnectionId,
        username: String,
        name: String,
        team: Team,
        spawn: (f32, f32),
        max_hp: i32,
    ) -> Self {
        Self {
            id,
            username,
            name,
            team,
            x: spawn.0,
            y: spawn.1,
            vx: 0.0,
            vy: 0.0,
            angle: 0.0,
            target_angle: 0.0,
            bank: 0.0,
            hp: max_hp,
            score: 0,
        }
    }
}

/// A bullet in flight
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub x: f32,
    pub y: f32,
    /// Heading in radians, fixed at fire time
    pub angle: f32,
    /// Weak back-reference; the owner may already be gone
    pub owner: ConnectionId,
    /// Owner's team at fire time
    pub owner_team: Team,
}

impl Projectile {
    /// Advance one tick along the heading
    pub fn advance(&mut self, speed: f32) {
        self.x += self.angle.cos() * speed;
        self.y += self.angle.sin() * speed;
    }

    /// True once the bullet has left the arena rectangle
    pub fn is_outside(&self, width: f32, height: f32) -> bool {
        self.x < 0.0 || self.x > width || self.y < 0.0 || self.y > height
    }
}

/// An expanding explosion marker
#[derive(Debug, Clone)]
pub struct Effect {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Normalized age; the effect is dropped at 1
    pub life: f32,
}

impl Effect {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            radius,
            life: 0.0,
        }
    }

    /// Grow and age one tick; returns false once expired
    pub fn update(&mut self, growth: f32, aging: f32) -> bool {
        self.radius += growth;
        self.life += aging;
        self.life < 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet(x: f32, y: f32, angle: f32) -> Projectile {
        Projectile {
            id: ProjectileId::new(),
            x,
            y,
            angle,
            owner: ConnectionId::new(),
            owner_team: Team::Blue,
        }
    }

    #[test]
    fn projectile_advances_along_heading() {
        let mut b = bullet(100.0, 100.0, std::f32::consts::FRAC_PI_2);
        b.advance(6.0);
        assert!((b.x - 100.0).abs() < 1e-4);
        assert!((b.y - 106.0).abs() < 1e-4);
    }

    #[test]
    fn projectile_bounds_are_inclusive() {
        assert!(!bullet(0.0, 0.0, 0.0).is_outside(1200.0, 800.0));
        assert!(!bullet(1200.0, 800.0, 0.0).is_outside(1200.0, 800.0));
        assert!(bullet(-0.1, 10.0, 0.0).is_outside(1200.0, 800.0));
        assert!(bullet(10.0, 800.5, 0.0).is_outside(1200.0, 800.0));
    }

    #[test]
    fn effect_expires_when_age_reaches_one() {
        let mut e = Effect::new(0.0, 0.0, 4.0);
        let mut ticks = 0;
        while e.update(2.0, 0.25) {
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        assert!(e.life >= 1.0);
        assert_eq!(e.radius, 12.0);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
        assert_ne!(ProjectileId::new(), ProjectileId::new());
    }
}

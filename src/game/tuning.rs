//! Gameplay tuning for the arena
//!
//! All values are expressed per tick. Changing the tick period means
//! re-tuning every rate in here.

/// Fixed simulation period in milliseconds
pub const TICK_MILLIS: u64 = 30;

/// Arena and jet physics constants
#[derive(Debug, Clone, Copy)]
pub struct ArenaTuning {
    /// Arena width in world units
    pub width: f32,
    /// Arena height in world units
    pub height: f32,
    /// Jet collision radius, used for wall clamping and hit tests
    pub radius: f32,
    /// Fraction of the remaining angle closed each tick
    pub turn_smoothing: f32,
    /// Bank angle per radian of remaining turn
    pub bank_factor: f32,
    /// Velocity added per thrust input
    pub thrust_impulse: f32,
    /// Velocity multiplier applied every tick
    pub velocity_decay: f32,
    /// Largest per-axis displacement accepted from a direct move
    pub max_move_step: f32,
    /// Hit points after spawn or respawn
    pub max_hp: i32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            radius: 18.0,
            turn_smoothing: 0.15,
            bank_factor: 0.8,
            thrust_impulse: 0.6,
            velocity_decay: 0.98,
            max_move_step: 10.0,
            max_hp: 100,
        }
    }
}

/// Gun and explosion constants
#[derive(Debug, Clone, Copy)]
pub struct WeaponTuning {
    /// Projectile displacement per tick
    pub projectile_speed: f32,
    /// Hit points removed per hit
    pub damage: i32,
    /// Initial explosion radius
    pub effect_radius: f32,
    /// Explosion radius growth per tick
    pub effect_growth: f32,
    /// Explosion age advance per tick (age runs 0..1)
    pub effect_aging: f32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            projectile_speed: 6.0,
            damage: 25,
            effect_radius: 4.0,
            effect_growth: 2.0,
            effect_aging: 0.05,
        }
    }
}

/// Complete tuning set for one deployment
#[derive(Debug, Clone, Copy, Default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub weapon: WeaponTuning,
}

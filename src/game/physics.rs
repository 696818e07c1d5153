//! Jet physics: turning, integration, walls and drag

use rand::Rng;

use super::entity::Player;
use super::tuning::ArenaTuning;

/// Physics system for updating jet headings, positions and velocities
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Signed difference `target - current`, normalized into (-π, π]
    pub fn shortest_turn(current: f32, target: f32) -> f32 {
        let d = target - current;
        d.sin().atan2(d.cos())
    }

    /// Ease the facing angle toward the target angle.
    /// Returns (new_angle, bank).
    pub fn smooth_rotation(angle: f32, target_angle: f32, tuning: &ArenaTuning) -> (f32, f32) {
        let d = Self::shortest_turn(angle, target_angle);
        let new_angle = angle + d * tuning.turn_smoothing;
        let bank = -d * tuning.bank_factor;
        (new_angle, bank)
    }

    /// Clamp one axis into `[radius, extent - radius]`
    pub fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
        value.max(radius).min(extent - radius)
    }

    /// Move by velocity and stop at the walls. Velocity is left untouched.
    pub fn integrate(player: &mut Player, tuning: &ArenaTuning) {
        player.x += player.vx;
        player.y += player.vy;
        Self::clamp_to_arena(player, tuning);
    }

    pub fn clamp_to_arena(player: &mut Player, tuning: &ArenaTuning) {
        player.x = Self::clamp_axis(player.x, tuning.radius, tuning.width);
        player.y = Self::clamp_axis(player.y, tuning.radius, tuning.height);
    }

    /// Apply drag. There is no speed cap; thrust and decay settle at a terminal speed.
    pub fn damp(player: &mut Player, tuning: &ArenaTuning) {
        player.vx *= tuning.velocity_decay;
        player.vy *= tuning.velocity_decay;
    }

    /// Add one thrust impulse along the current facing (not the target)
    pub fn thrust(player: &mut Player, tuning: &ArenaTuning) {
        player.vx += player.angle.cos() * tuning.thrust_impulse;
        player.vy += player.angle.sin() * tuning.thrust_impulse;
    }

    /// Uniform random point inside the arena inset by the collision radius
    pub fn random_spawn<R: Rng + ?Sized>(rng: &mut R, tuning: &ArenaTuning) -> (f32, f32) {
        let x = rng.gen_range(tuning.radius..=tuning.width - tuning.radius);
        let y = rng.gen_range(tuning.radius..=tuning.height - tuning.radius);
        (x, y)
    }
}

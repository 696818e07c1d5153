//! Fixed-tick simulation step
//!
//! Order per tick: turn, move, drag, bullets (incl. orphan pruning), hits,
//! respawn, explosions. The snapshot is only built after all of it.

use rand::Rng;

use super::combat::{CombatSystem, HitResult};
use super::entity::{ConnectionId, Effect};
use super::input::ControlScheme;
use super::physics::PhysicsSystem;
use super::store::EntityStore;
use super::tuning::Tuning;

/// What happened during one tick, for logging
#[derive(Debug, Default)]
pub struct TickReport {
    pub hits: Vec<HitResult>,
    pub respawned: Vec<ConnectionId>,
    pub out_of_bounds: usize,
    pub orphaned: usize,
}

/// Simulation engine advancing the entity store by one tick
pub struct SimulationEngine;

impl SimulationEngine {
    pub fn step<R: Rng + ?Sized>(
        store: &mut EntityStore,
        tuning: &Tuning,
        scheme: ControlScheme,
        rng: &mut R,
    ) -> TickReport {
        let mut report = TickReport::default();

        Self::update_jets(store, tuning, scheme);
        Self::update_projectiles(store, tuning, &mut report);
        Self::resolve_hits(store, tuning, &mut report);
        Self::respawn_downed(store, tuning, rng, &mut report);
        Self::update_effects(store, tuning);

        report
    }

    /// Rotation smoothing, position integration with wall clamp, then drag
    fn update_jets(store: &mut EntityStore, tuning: &Tuning, scheme: ControlScheme) {
        let arena = &tuning.arena;
        for player in store.players.values_mut() {
            if scheme == ControlScheme::Flight {
                let (angle, bank) =
                    PhysicsSystem::smooth_rotation(player.angle, player.target_angle, arena);
                player.angle = angle;
                player.bank = bank;
            }

            PhysicsSystem::integrate(player, arena);
            PhysicsSystem::damp(player, arena);
        }
    }

    /// Move bullets, drop the ones that left the arena or lost their owner
    fn update_projectiles(store: &mut EntityStore, tuning: &Tuning, report: &mut TickReport) {
        let speed = tuning.weapon.projectile_speed;
        let (width, height) = (tuning.arena.width, tuning.arena.height);

        let before = store.projectiles.len();
        store.projectiles.retain(|_, bullet| {
            bullet.advance(speed);
            !bullet.is_outside(width, height)
        });
        report.out_of_bounds = before - store.projectiles.len();
        report.orphaned = store.prune_orphans();
    }

    /// Each bullet resolves against at most one enemy jet
    fn resolve_hits(store: &mut EntityStore, tuning: &Tuning, report: &mut TickReport) {
        let radius = tuning.arena.radius;

        let hits: Vec<HitResult> = store
            .projectiles
            .values()
            .filter_map(|bullet| {
                store
                    .players
                    .values()
                    .find(|target| {
                        CombatSystem::can_target(bullet, target)
                            && CombatSystem::check_hit(bullet, target, radius)
                    })
                    .map(|target| HitResult {
                        projectile_id: bullet.id,
                        shooter_id: bullet.owner,
                        target_id: target.id,
                        x: target.x,
                        y: target.y,
                    })
            })
            .collect();

        for hit in &hits {
            store.projectiles.remove(&hit.projectile_id);

            if let Some(target) = store.players.get_mut(&hit.target_id) {
                let (hp, _) = CombatSystem::apply_damage(target.hp, tuning.weapon.damage);
                target.hp = hp;
            }
            if let Some(shooter) = store.players.get_mut(&hit.shooter_id) {
                shooter.score += 1;
            }

            store
                .effects
                .push(Effect::new(hit.x, hit.y, tuning.weapon.effect_radius));
        }

        report.hits = hits;
    }

    /// Downed jets come back at full health somewhere else, same tick
    fn respawn_downed<R: Rng + ?Sized>(
        store: &mut EntityStore,
        tuning: &Tuning,
        rng: &mut R,
        report: &mut TickReport,
    ) {
        let arena = &tuning.arena;
        for player in store.players.values_mut().filter(|p| p.hp <= 0) {
            let (x, y) = PhysicsSystem::random_spawn(rng, arena);
            player.x = x;
            player.y = y;
            player.vx = 0.0;
            player.vy = 0.0;
            player.hp = arena.max_hp;
            report.respawned.push(player.id);
        }
    }

    fn update_effects(store: &mut EntityStore, tuning: &Tuning) {
        let weapon = &tuning.weapon;
        store
            .effects
            .retain_mut(|effect| effect.update(weapon.effect_growth, weapon.effect_aging));
    }
}

//! Snapshot building for network transmission

use std::sync::Arc;

use crate::ws::protocol::{EffectView, PlayerView, ProjectileView, ServerMsg, StateSnapshot};

use super::store::EntityStore;

/// Builds full-state snapshots. No deltas, no per-client filtering.
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    pub fn build(tick: u64, store: &EntityStore) -> StateSnapshot {
        let players = store
            .players
            .values()
            .map(|p| {
                (
                    p.id,
                    PlayerView {
                        username: p.username.clone(),
                        name: p.name.clone(),
                        team: p.team,
                        x: p.x,
                        y: p.y,
                        vx: p.vx,
                        vy: p.vy,
                        angle: p.angle,
                        target_angle: p.target_angle,
                        bank: p.bank,
                        hp: p.hp,
                        score: p.score,
                    },
                )
            })
            .collect();

        let bullets = store
            .projectiles
            .values()
            .map(|b| {
                (
                    b.id,
                    ProjectileView {
                        x: b.x,
                        y: b.y,
                        angle: b.angle,
                        owner: b.owner,
                        team: b.owner_team,
                    },
                )
            })
            .collect();

        let explosions = store
            .effects
            .iter()
            .map(|e| EffectView {
                x: e.x,
                y: e.y,
                r: e.radius,
                life: e.life,
            })
            .collect();

        StateSnapshot {
            tick,
            players,
            bullets,
            explosions,
        }
    }

    /// Serialize once; every connection gets the same shared text
    pub fn encode(snapshot: StateSnapshot) -> Result<Arc<str>, serde_json::Error> {
        serde_json::to_string(&ServerMsg::State(snapshot)).map(Arc::from)
    }
}

/// Snapshot volume stats for debugging
#[derive(Debug, Default)]
pub struct SnapshotStats {
    pub total_snapshots: u64,
    pub total_bytes: u64,
    pub avg_players_per_snapshot: f32,
}

impl SnapshotStats {
    pub fn record(&mut self, player_count: usize, bytes: usize) {
        self.total_snapshots += 1;
        self.total_bytes += bytes as u64;

        // Running average
        let n = self.total_snapshots as f32;
        self.avg_players_per_snapshot =
            self.avg_players_per_snapshot * ((n - 1.0) / n) + (player_count as f32 / n);
    }

    pub fn avg_bytes(&self) -> u64 {
        self.total_bytes.checked_div(self.total_snapshots).unwrap_or(0)
    }
}

//! Arena state and authoritative tick loop

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::identity::Directory;
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::engine::{SimulationEngine, TickReport};
use super::entity::ConnectionId;
use super::input::{ControlScheme, InputRouter, Intent};
use super::session::SessionManager;
use super::snapshot::{SnapshotBuilder, SnapshotStats};
use super::store::EntityStore;
use super::tuning::{Tuning, TICK_MILLIS};

const COMMAND_CAPACITY: usize = 1024;
const SNAPSHOT_CAPACITY: usize = 64;
const REPLY_CAPACITY: usize = 16;
/// Ticks between debug summaries (~10 s)
const SUMMARY_INTERVAL_TICKS: u64 = 10_000 / TICK_MILLIS;

/// Commands consumed by the arena task, one at a time
#[derive(Debug)]
pub enum ArenaCmd {
    Connect {
        connection_id: ConnectionId,
        reply_tx: mpsc::Sender<ServerMsg>,
    },
    Disconnect {
        connection_id: ConnectionId,
    },
    Login {
        connection_id: ConnectionId,
        username: String,
        password: String,
    },
    Logout {
        connection_id: ConnectionId,
    },
    Input {
        connection_id: ConnectionId,
        intent: Intent,
    },
}

/// Counters readable without going through the arena task
#[derive(Debug, Default)]
pub struct ArenaStats {
    pub tick: AtomicU64,
    pub connections: AtomicUsize,
    pub players: AtomicUsize,
}

/// Everything a new connection needs from the arena
pub struct ConnectionChannels {
    /// Replies addressed to this connection only
    pub reply_rx: mpsc::Receiver<ServerMsg>,
    /// Serialized state, shared by every connection
    pub snapshot_rx: broadcast::Receiver<Arc<str>>,
}

/// Handle to the running arena
#[derive(Clone)]
pub struct ArenaHandle {
    cmd_tx: mpsc::Sender<ArenaCmd>,
    snapshot_tx: broadcast::Sender<Arc<str>>,
    stats: Arc<ArenaStats>,
}

impl ArenaHandle {
    /// Spawn the arena task on the current runtime
    pub fn spawn(
        directory: Arc<Directory>,
        tuning: Tuning,
        scheme: ControlScheme,
        seed: u64,
    ) -> Self {
        let (arena, handle) = Arena::new(directory, tuning, scheme, seed);
        tokio::spawn(arena.run());
        handle
    }

    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    /// Register a connection. Subscribes before the arena learns about it,
    /// so no snapshot after the connect is missed.
    pub async fn connect(&self, connection_id: ConnectionId) -> Option<ConnectionChannels> {
        let (reply_tx, reply_rx) = mpsc::channel(REPLY_CAPACITY);
        let snapshot_rx = self.snapshot_tx.subscribe();
        self.cmd_tx
            .send(ArenaCmd::Connect {
                connection_id,
                reply_tx,
            })
            .await
            .ok()?;
        Some(ConnectionChannels {
            reply_rx,
            snapshot_rx,
        })
    }

    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let _ = self
            .cmd_tx
            .send(ArenaCmd::Disconnect { connection_id })
            .await;
    }

    /// Forward a parsed client message. Returns false once the arena is gone.
    pub async fn dispatch(&self, connection_id: ConnectionId, msg: ClientMsg) -> bool {
        let cmd = match msg {
            ClientMsg::Login { username, password } => ArenaCmd::Login {
                connection_id,
                username,
                password,
            },
            ClientMsg::Logout => ArenaCmd::Logout { connection_id },
            ClientMsg::Aim { mx, my } => ArenaCmd::Input {
                connection_id,
                intent: Intent::Aim { x: mx, y: my },
            },
            ClientMsg::Thrust => ArenaCmd::Input {
                connection_id,
                intent: Intent::Thrust,
            },
            ClientMsg::Move { dx, dy } => ArenaCmd::Input {
                connection_id,
                intent: Intent::Move { dx, dy },
            },
            ClientMsg::Shoot => ArenaCmd::Input {
                connection_id,
                intent: Intent::Shoot,
            },
        };
        self.cmd_tx.send(cmd).await.is_ok()
    }
}

/// The authoritative arena. Sole owner of the entity store.
pub struct Arena {
    store: EntityStore,
    directory: Arc<Directory>,
    tuning: Tuning,
    scheme: ControlScheme,
    rng: ChaCha8Rng,
    tick: u64,
    connections: HashMap<ConnectionId, mpsc::Sender<ServerMsg>>,
    cmd_rx: mpsc::Receiver<ArenaCmd>,
    snapshot_tx: broadcast::Sender<Arc<str>>,
    stats: Arc<ArenaStats>,
    snapshot_stats: SnapshotStats,
}

impl Arena {
    pub fn new(
        directory: Arc<Directory>,
        tuning: Tuning,
        scheme: ControlScheme,
        seed: u64,
    ) -> (Self, ArenaHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snapshot_tx, _) = broadcast::channel(SNAPSHOT_CAPACITY);
        let stats = Arc::new(ArenaStats::default());

        let handle = ArenaHandle {
            cmd_tx,
            snapshot_tx: snapshot_tx.clone(),
            stats: stats.clone(),
        };

        let arena = Self {
            store: EntityStore::new(),
            directory,
            tuning,
            scheme,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
            connections: HashMap::new(),
            cmd_rx,
            snapshot_tx,
            stats,
            snapshot_stats: SnapshotStats::default(),
        };

        (arena, handle)
    }

    /// Run until every handle is dropped
    pub async fn run(mut self) {
        info!(scheme = ?self.scheme, tick_ms = TICK_MILLIS, "Arena started");

        let mut tick_interval = interval(Duration::from_millis(TICK_MILLIS));
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_cmd = self.cmd_rx.recv() => {
                    let Some(cmd) = maybe_cmd else {
                        break;
                    };
                    self.handle_cmd(cmd);
                }
                _ = tick_interval.tick() => {
                    self.run_tick();
                }
            }
        }

        info!(ticks = self.tick, "Arena stopped");
    }

    fn handle_cmd(&mut self, cmd: ArenaCmd) {
        match cmd {
            ArenaCmd::Connect {
                connection_id,
                reply_tx,
            } => {
                self.connections.insert(connection_id, reply_tx);
                debug!(connection_id = %connection_id, "Connection registered");
            }
            ArenaCmd::Disconnect { connection_id } => {
                self.connections.remove(&connection_id);
                if let Some(player) = SessionManager::logout(&mut self.store, connection_id) {
                    info!(
                        connection_id = %connection_id,
                        username = %player.username,
                        "Pilot disconnected"
                    );
                }
            }
            ArenaCmd::Login {
                connection_id,
                username,
                password,
            } => self.handle_login(connection_id, &username, &password),
            ArenaCmd::Logout { connection_id } => {
                if let Some(player) = SessionManager::logout(&mut self.store, connection_id) {
                    info!(
                        connection_id = %connection_id,
                        username = %player.username,
                        "Pilot logged out"
                    );
                }
                self.reply(connection_id, ServerMsg::LoggedOut);
            }
            ArenaCmd::Input {
                connection_id,
                intent,
            } => {
                if let Err(reason) = InputRouter::apply(
                    &mut self.store,
                    self.scheme,
                    &self.tuning,
                    connection_id,
                    intent,
                ) {
                    debug!(connection_id = %connection_id, ?intent, %reason, "Input dropped");
                }
            }
        }

        self.publish_counts();
    }

    fn handle_login(&mut self, connection_id: ConnectionId, username: &str, password: &str) {
        let result = SessionManager::login(
            &mut self.store,
            &self.directory,
            &mut self.rng,
            &self.tuning.arena,
            connection_id,
            username,
            password,
        );

        match result {
            Ok(outcome) => {
                if let Some(prior) = outcome.evicted {
                    warn!(
                        connection_id = %prior,
                        username = %username,
                        "Session replaced by newer login"
                    );
                    self.reply(
                        prior,
                        ServerMsg::SessionEnded {
                            reason: "logged in elsewhere".to_string(),
                        },
                    );
                }

                if let Some(player) = self.store.player(&connection_id) {
                    info!(
                        connection_id = %connection_id,
                        username = %username,
                        team = %player.team,
                        "Pilot logged in"
                    );
                }
                self.reply(
                    connection_id,
                    ServerMsg::LoginSuccess {
                        connection_id: outcome.player_id,
                    },
                );
            }
            Err(e) => {
                warn!(connection_id = %connection_id, username = %username, "Login rejected");
                self.reply(
                    connection_id,
                    ServerMsg::LoginFail {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    /// Non-blocking; a full or closed reply queue drops the message
    fn reply(&self, connection_id: ConnectionId, msg: ServerMsg) {
        if let Some(tx) = self.connections.get(&connection_id) {
            if tx.try_send(msg).is_err() {
                debug!(connection_id = %connection_id, "Reply dropped");
            }
        }
    }

    /// Advance the simulation one tick and broadcast the result
    fn run_tick(&mut self) -> TickReport {
        self.tick += 1;

        let report =
            SimulationEngine::step(&mut self.store, &self.tuning, self.scheme, &mut self.rng);
        self.log_report(&report);

        let snapshot = SnapshotBuilder::build(self.tick, &self.store);
        match SnapshotBuilder::encode(snapshot) {
            Ok(text) => {
                self.snapshot_stats
                    .record(self.store.player_count(), text.len());
                // Err only means nobody is subscribed
                let _ = self.snapshot_tx.send(text);
            }
            Err(e) => warn!(tick = self.tick, error = %e, "Failed to encode snapshot"),
        }

        if self.tick % SUMMARY_INTERVAL_TICKS == 0 {
            debug!(
                tick = self.tick,
                players = self.store.player_count(),
                projectiles = self.store.projectiles.len(),
                effects = self.store.effects.len(),
                avg_snapshot_bytes = self.snapshot_stats.avg_bytes(),
                avg_players = self.snapshot_stats.avg_players_per_snapshot,
                "Arena summary"
            );
        }

        self.stats.tick.store(self.tick, Ordering::Relaxed);
        self.publish_counts();
        report
    }

    fn log_report(&self, report: &TickReport) {
        for hit in &report.hits {
            debug!(
                tick = self.tick,
                shooter = %hit.shooter_id,
                target = %hit.target_id,
                "Hit"
            );
        }
        for id in &report.respawned {
            debug!(tick = self.tick, connection_id = %id, "Respawned");
        }
    }

    fn publish_counts(&self) {
        self.stats
            .connections
            .store(self.connections.len(), Ordering::Relaxed);
        self.stats
            .players
            .store(self.store.player_count(), Ordering::Relaxed);
    }
}

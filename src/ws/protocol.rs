//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game::entity::{ConnectionId, ProjectileId};

/// The two factions a pilot can fly for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Blue,
    Red,
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Blue => f.write_str("BLUE"),
            Team::Red => f.write_str("RED"),
        }
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Authenticate against the roster and spawn a jet
    Login { username: String, password: String },

    /// Point the nose at an absolute arena position
    Aim { mx: f32, my: f32 },

    /// Push along the current heading
    Thrust,

    /// Shift directly by a delta (direct control scheme only)
    Move { dx: f32, dy: f32 },

    /// Fire the gun
    Shoot,

    /// Leave the arena without closing the socket
    Logout,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Login accepted; the connection id doubles as the player id
    LoginSuccess { connection_id: ConnectionId },

    /// Login rejected
    LoginFail { message: String },

    /// Another connection logged in with the same account
    SessionEnded { reason: String },

    /// Explicit logout processed
    LoggedOut,

    /// Full arena state, sent every tick
    State(StateSnapshot),
}

/// Full arena snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Server tick number
    pub tick: u64,
    pub players: HashMap<ConnectionId, PlayerView>,
    pub bullets: HashMap<ProjectileId, ProjectileView>,
    pub explosions: Vec<EffectView>,
}

/// Player state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub username: String,
    pub name: String,
    pub team: Team,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Facing angle in radians
    pub angle: f32,
    pub target_angle: f32,
    /// Visual lean derived from the turn rate
    pub bank: f32,
    pub hp: i32,
    pub score: u32,
}

/// Projectile state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub owner: ConnectionId,
    pub team: Team,
}

/// Explosion state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectView {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    /// Normalized age in [0, 1)
    pub life: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_events() {
        let login: ClientMsg =
            serde_json::from_str(r#"{"type":"login","username":"alpha","password":"alpha123"}"#)
                .unwrap();
        assert!(matches!(login, ClientMsg::Login { ref username, .. } if username == "alpha"));

        let aim: ClientMsg = serde_json::from_str(r#"{"type":"aim","mx":10.5,"my":-3}"#).unwrap();
        assert!(matches!(aim, ClientMsg::Aim { mx, my } if mx == 10.5 && my == -3.0));

        let thrust: ClientMsg = serde_json::from_str(r#"{"type":"thrust"}"#).unwrap();
        assert!(matches!(thrust, ClientMsg::Thrust));

        let shoot: ClientMsg = serde_json::from_str(r#"{"type":"shoot"}"#).unwrap();
        assert!(matches!(shoot, ClientMsg::Shoot));
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"aim","mx":"left"}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"warp"}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>("not json").is_err());
    }

    #[test]
    fn server_messages_are_tagged() {
        let msg = ServerMsg::LoginFail {
            message: "Invalid credentials".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "login_fail");
        assert_eq!(json["message"], "Invalid credentials");

        let json = serde_json::to_value(&ServerMsg::LoggedOut).unwrap();
        assert_eq!(json["type"], "logged_out");
    }

    #[test]
    fn team_uses_upper_case_names() {
        assert_eq!(serde_json::to_string(&Team::Blue).unwrap(), "\"BLUE\"");
        assert_eq!(serde_json::from_str::<Team>("\"RED\"").unwrap(), Team::Red);
        assert_eq!(Team::Red.to_string(), "RED");
    }
}

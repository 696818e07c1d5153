//! Static username -> account lookup, loaded once at startup

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::ws::protocol::Team;

/// One roster entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub password: String,
    /// Display name shown to other pilots
    pub name: String,
    pub team: Team,
}

/// Read-only roster. No mutation after construction.
#[derive(Debug, Clone)]
pub struct Directory {
    accounts: HashMap<String, Account>,
}

impl Directory {
    /// The default four-pilot roster, two per team
    pub fn builtin() -> Self {
        let entries = [
            ("alpha", "alpha123", "Alpha", Team::Blue),
            ("beta", "beta123", "Beta", Team::Blue),
            ("charlie", "charlie123", "Charlie", Team::Red),
            ("delta", "delta123", "Delta", Team::Red),
        ];

        let accounts = entries
            .into_iter()
            .map(|(username, password, name, team)| {
                (
                    username.to_string(),
                    Account {
                        password: password.to_string(),
                        name: name.to_string(),
                        team,
                    },
                )
            })
            .collect();

        Self { accounts }
    }

    /// Parse a JSON object of `username -> {password, name, team}`
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let accounts: HashMap<String, Account> = serde_json::from_str(json)?;
        if accounts.is_empty() {
            return Err(RosterError::Empty);
        }
        Ok(Self { accounts })
    }

    /// Load the roster from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        let json = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn lookup(&self, username: &str) -> Option<&Account> {
        self.accounts.get(username)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }
}

/// Roster loading errors
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Failed to read roster file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid roster JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Roster contains no accounts")]
    Empty,
}

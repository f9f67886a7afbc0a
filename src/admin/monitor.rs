//! What the admin gate can see of the WebSocket server it sits in front of.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServerState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl ServerState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connected mobile client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientSession {
    pub id: String,
    pub client_ip: String,
    pub message_count: u64,
    pub is_guest: bool,
}

#[derive(Clone, Debug)]
pub struct ServerSnapshot {
    pub state: ServerState,
    pub sessions: Vec<ClientSession>,
}

/// Read-only view of the WebSocket server.
pub trait ServerMonitor: Send + Sync {
    /// # Errors
    /// Returns an error when the server state cannot be read.
    fn snapshot(&self) -> Result<ServerSnapshot>;
}

/// Used when the admin gate runs without a WebSocket core attached.
#[derive(Clone, Debug, Default)]
pub struct StandaloneMonitor;

impl ServerMonitor for StandaloneMonitor {
    fn snapshot(&self) -> Result<ServerSnapshot> {
        Ok(ServerSnapshot {
            state: ServerState::Running,
            sessions: Vec::new(),
        })
    }
}

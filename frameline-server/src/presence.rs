//! Presence roster
//!
//! Who is in the room and what their transport is doing. Each connection
//! gets an id at join time; status updates come from the session's derived
//! presence state (seeking wins over playing/paused). Roster changes are
//! broadcast by the room so other reviewers' avatars stay current.

use frameline_common::events::ParticipantInfo;
use frameline_common::model::{PresenceStatus, UserInfo};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Join-ordered roster of connected reviewers
#[derive(Debug, Default)]
pub struct PresenceRoster {
    entries: RwLock<Vec<ParticipantInfo>>,
}

impl PresenceRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reviewer; returns their connection id.
    pub async fn join(&self, user: UserInfo) -> Uuid {
        let connection_id = Uuid::new_v4();
        self.entries.write().await.push(ParticipantInfo {
            connection_id,
            user,
            status: PresenceStatus::Paused,
        });
        connection_id
    }

    /// Remove a reviewer. Unknown ids are an error so stale clients surface
    /// instead of silently looping.
    pub async fn leave(&self, connection_id: Uuid) -> Result<()> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|p| p.connection_id != connection_id);
        if entries.len() == before {
            return Err(Error::NotFound(format!("Connection {}", connection_id)));
        }
        Ok(())
    }

    pub async fn update_status(
        &self,
        connection_id: Uuid,
        status: PresenceStatus,
    ) -> Result<()> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|p| p.connection_id == connection_id)
            .ok_or_else(|| Error::NotFound(format!("Connection {}", connection_id)))?;
        entry.status = status;
        Ok(())
    }

    pub async fn snapshot(&self) -> Vec<ParticipantInfo> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

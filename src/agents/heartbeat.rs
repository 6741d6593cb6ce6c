use std::time::Duration;

use super::errors::AgentResult;
use super::transport::Mailbox;
use crate::domain::AgentId;

/// One-shot lifecycle check: start, report alive, wait, stop
pub struct HeartbeatAgent {
    id: AgentId,
    _mailbox: Mailbox,
    lifetime: Duration,
}

impl HeartbeatAgent {
    pub fn new(mailbox: Mailbox, lifetime: Duration) -> Self {
        Self {
            id: mailbox.owner().clone(),
            _mailbox: mailbox,
            lifetime,
        }
    }

    pub async fn run(self) -> AgentResult<AgentId> {
        tracing::info!(agent = %self.id, "heartbeat: agent is alive");
        tokio::time::sleep(self.lifetime).await;
        tracing::info!(agent = %self.id, "heartbeat agent stopped");
        Ok(self.id)
    }
}

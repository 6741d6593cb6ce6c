use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::agents::errors::{AgentError, AgentResult};
use crate::agents::messages::AgentMessage;
use crate::agents::transport::{Mailbox, MessageTransport};
use crate::domain::AgentId;

/// In-process message transport
///
/// One unbounded channel of JSON frames per registered agent. Messages
/// are encoded on send and decoded by the receiving [`Mailbox`], the same
/// way they would cross a network.
#[derive(Debug, Clone, Default)]
pub struct InProcessTransport {
    mailboxes: Arc<RwLock<HashMap<AgentId, mpsc::UnboundedSender<String>>>>,
}

impl InProcessTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an arbitrary frame into `to`'s mailbox
    pub async fn send_raw(&self, to: &AgentId, frame: impl Into<String>) -> AgentResult<()> {
        let mailboxes = self.mailboxes.read().await;
        let tx = mailboxes
            .get(to)
            .ok_or_else(|| AgentError::AgentNotFound(to.to_string()))?;

        tx.send(frame.into())
            .map_err(|_| AgentError::MessageDeliveryFailed(format!("mailbox of {} is closed", to)))
    }

    #[cfg(test)]
    pub(crate) async fn is_registered(&self, id: &AgentId) -> bool {
        self.mailboxes.read().await.contains_key(id)
    }
}

#[async_trait]
impl MessageTransport for InProcessTransport {
    async fn register(&self, id: &AgentId) -> AgentResult<Mailbox> {
        let mut mailboxes = self.mailboxes.write().await;
        if mailboxes.contains_key(id) {
            return Err(AgentError::AlreadyRegistered(id.to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        mailboxes.insert(id.clone(), tx);
        tracing::debug!(agent = %id, "registered mailbox");

        Ok(Mailbox::new(id.clone(), rx))
    }

    async fn send(&self, message: AgentMessage) -> AgentResult<()> {
        let frame = message.to_json()?;
        self.send_raw(&message.to, frame)
            .await
            .map_err(|e| match e {
                AgentError::AgentNotFound(to) => {
                    AgentError::MessageDeliveryFailed(format!("unknown recipient {}", to))
                }
                other => other,
            })
    }

    fn name(&self) -> &str {
        "in_process"
    }
}

//! Message transport port
//!
//! Agents only see this interface: register once to obtain a [`Mailbox`],
//! then send envelopes fire-and-forget. How frames travel is up to the
//! implementation.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};

use super::errors::AgentResult;
use super::messages::AgentMessage;
use crate::domain::AgentId;

/// Transport layer for agent messages
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Creates the mailbox for `id`; an id can be registered only once
    async fn register(&self, id: &AgentId) -> AgentResult<Mailbox>;

    /// Delivers a message to `message.to`
    async fn send(&self, message: AgentMessage) -> AgentResult<()>;

    /// Sends and logs a failure instead of returning it; sends are never retried
    async fn send_or_log(&self, message: AgentMessage) {
        let to = message.to.clone();
        let body = message.body;
        if let Err(e) = self.send(message).await {
            tracing::warn!(to = %to, body = %body, "send failed: {}", e);
        }
    }

    /// Get transport name
    fn name(&self) -> &str;
}

/// Receiving end of one agent's private queue of wire frames
#[derive(Debug)]
pub struct Mailbox {
    owner: AgentId,
    frames: mpsc::UnboundedReceiver<String>,
}

impl Mailbox {
    pub fn new(owner: AgentId, frames: mpsc::UnboundedReceiver<String>) -> Self {
        Self { owner, frames }
    }

    pub fn owner(&self) -> &AgentId {
        &self.owner
    }

    /// Waits up to `wait` for the next well-formed message
    ///
    /// Returns `None` on timeout or once every sender is gone. Frames that
    /// fail to decode are logged and skipped without extending the deadline.
    pub async fn receive(&mut self, wait: Duration) -> Option<AgentMessage> {
        let deadline = Instant::now() + wait;

        loop {
            let frame = match timeout_at(deadline, self.frames.recv()).await {
                Ok(Some(frame)) => frame,
                Ok(None) | Err(_) => return None,
            };

            match AgentMessage::from_json(&frame) {
                Ok(message) => {
                    tracing::trace!(
                        agent = %self.owner,
                        from = %message.sender,
                        body = %message.body,
                        "message received"
                    );
                    return Some(message);
                }
                Err(e) => {
                    tracing::warn!(agent = %self.owner, "discarding malformed frame: {}", e);
                }
            }
        }
    }
}

use std::time::Duration;

use super::errors::AgentResult;
use super::messages::{AgentMessage, MessageBody};
use super::transport::Mailbox;
use super::types::IncidentReport;
use crate::domain::incident::{IncidentEffect, IncidentMachine, Transition};
use crate::domain::percept::EventTag;
use crate::domain::AgentId;

/// Hosts the incident state machine on a mailbox
///
/// In Idle the agent waits up to `receive_timeout` for a percept; a timeout
/// is fed to the machine as "no input". Every other state has its entry
/// effect applied, then the agent dwells for `state_dwell` and advances.
pub struct IncidentAgent {
    id: AgentId,
    mailbox: Mailbox,
    machine: IncidentMachine,
    receive_timeout: Duration,
    state_dwell: Duration,
}

impl IncidentAgent {
    pub fn new(mailbox: Mailbox, receive_timeout: Duration, state_dwell: Duration) -> Self {
        Self {
            id: mailbox.owner().clone(),
            mailbox,
            machine: IncidentMachine::new(),
            receive_timeout,
            state_dwell,
        }
    }

    /// Runs until SHUTDOWN is received in Idle
    ///
    /// A broken state machine invariant aborts the agent with the error.
    pub async fn run(mut self) -> AgentResult<IncidentReport> {
        tracing::info!(agent = %self.id, state = %self.machine.state(), "incident agent started");

        let mut report = IncidentReport {
            agent: self.id.clone(),
            path: vec![self.machine.state()],
            effects: Vec::new(),
            received: Vec::new(),
        };

        while !self.machine.is_stopped() {
            let input = if self.machine.state().awaits_input() {
                let input = self.next_percept().await;
                report.received.extend(input);
                input
            } else {
                tokio::time::sleep(self.state_dwell).await;
                None
            };

            let transition = match self.machine.step(input) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(
                        agent = %self.id,
                        state = %self.machine.state(),
                        "incident state machine failed: {}",
                        e
                    );
                    return Err(e.into());
                }
            };

            self.apply(&transition);
            report.path.push(transition.to);
            if !transition.effect.is_none() {
                report.effects.push(transition.effect);
            }
        }

        tracing::info!(agent = %self.id, "incident agent stopped");
        Ok(report)
    }

    /// Next event from the mailbox, `None` on timeout
    async fn next_percept(&mut self) -> Option<EventTag> {
        let msg = self.mailbox.receive(self.receive_timeout).await?;
        let event = Self::accept(&msg);
        if event.is_none() {
            tracing::warn!(
                agent = %self.id,
                from = %msg.sender,
                body = %msg.body,
                "unexpected message discarded"
            );
        }
        event
    }

    fn accept(msg: &AgentMessage) -> Option<EventTag> {
        match msg.body {
            MessageBody::Event(event) => Some(event),
            MessageBody::Handle(_) | MessageBody::Completed(_) => None,
        }
    }

    fn apply(&self, t: &Transition) {
        match t.effect {
            IncidentEffect::None => {
                if t.from != t.to {
                    tracing::info!(agent = %self.id, from = %t.from, to = %t.to, "state changed");
                } else {
                    tracing::debug!(agent = %self.id, state = %t.to, "monitoring");
                }
            }
            IncidentEffect::AlarmSounded { event } => {
                tracing::warn!(
                    agent = %self.id,
                    state = %t.to,
                    event = %event,
                    "hazard detected, sounding alarms"
                );
            }
            IncidentEffect::ProtocolExecuted { event, protocol } => {
                tracing::warn!(
                    agent = %self.id,
                    state = %t.to,
                    event = %event,
                    "executing emergency protocol: {}",
                    protocol.describe()
                );
            }
            IncidentEffect::ContextCleared => {
                tracing::info!(
                    agent = %self.id,
                    state = %t.to,
                    "incident handled, resetting context"
                );
            }
            IncidentEffect::Halted => {
                tracing::info!(agent = %self.id, "SHUTDOWN received");
            }
        }
    }
}

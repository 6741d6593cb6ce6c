use std::sync::Arc;
use std::time::{Duration, Instant};

use super::errors::AgentResult;
use super::events::DispatchEvent;
use super::messages::{AgentMessage, MessageBody, Performative};
use super::transport::{Mailbox, MessageTransport};
use super::types::CoordinatorReport;
use crate::domain::dispatch::{AckOutcome, DispatchLedger};
use crate::domain::percept::EventTag;
use crate::domain::{AgentId, IncidentId};

/// What the coordinator does in response to one message
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorAction {
    /// Send these messages and keep running
    Send(Vec<AgentMessage>),
    /// Send these messages, then stop
    Terminate(Vec<AgentMessage>),
    /// Nothing to do
    None,
}

/// Coordinator settings fixed at construction
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub sensor: AgentId,
    pub responders: Vec<AgentId>,
    pub suppress_normal_readings: bool,
    pub ack_timeout: Duration,
    pub receive_timeout: Duration,
}

/// Fans sensor events out to every responder and collects acks
///
/// Decision logic lives in [`CoordinatorAgent::on_message`], which does no
/// I/O; [`CoordinatorAgent::run`] wires it to a mailbox and a transport.
pub struct CoordinatorAgent {
    id: AgentId,
    settings: CoordinatorSettings,
    ledger: DispatchLedger,
    history: Vec<DispatchEvent>,
}

impl CoordinatorAgent {
    pub fn new(id: AgentId, settings: CoordinatorSettings) -> Self {
        Self {
            id,
            settings,
            ledger: DispatchLedger::new(),
            history: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &DispatchLedger {
        &self.ledger
    }

    pub fn history(&self) -> &[DispatchEvent] {
        &self.history
    }

    /// Decides what to do with one incoming message
    pub fn on_message(&mut self, msg: &AgentMessage, now: Instant) -> CoordinatorAction {
        if msg.body.is_shutdown() {
            return self.forward_shutdown(&msg.sender);
        }

        if msg.sender.same_agent(&self.settings.sensor) {
            if let (Performative::Inform, MessageBody::Event(event)) =
                (msg.performative, msg.body)
            {
                return self.dispatch(event, now);
            }
        } else if let Some(responder) = self.known_responder(&msg.sender) {
            if let (Performative::Inform, MessageBody::Completed(event)) =
                (msg.performative, msg.body)
            {
                self.acknowledge(responder, event, msg.incident_id);
                return CoordinatorAction::None;
            }
        }

        tracing::warn!(
            agent = %self.id,
            from = %msg.sender,
            performative = %msg.performative,
            body = %msg.body,
            "unexpected message discarded"
        );
        CoordinatorAction::None
    }

    /// Expires records whose responders did not all answer in time
    pub fn sweep(&mut self, now: Instant) {
        for record in self.ledger.expire(now, self.settings.ack_timeout) {
            let missing = record.missing();
            tracing::warn!(
                agent = %self.id,
                incident = %record.incident(),
                event = %record.event(),
                missing = ?missing.iter().map(AgentId::as_str).collect::<Vec<_>>(),
                "acknowledgements timed out, discarding incident"
            );
            self.history.push(DispatchEvent::Expired {
                incident: record.incident(),
                event: record.event(),
                missing,
            });
        }
    }

    fn forward_shutdown(&mut self, from: &AgentId) -> CoordinatorAction {
        tracing::info!(
            agent = %self.id,
            from = %from,
            "SHUTDOWN received, forwarding to responders"
        );

        let messages = self
            .settings
            .responders
            .iter()
            .map(|r| AgentMessage::shutdown(self.id.clone(), r.clone()))
            .collect();

        self.history.push(DispatchEvent::ShutdownForwarded {
            responders: self.settings.responders.clone(),
        });
        CoordinatorAction::Terminate(messages)
    }

    fn dispatch(&mut self, event: EventTag, now: Instant) -> CoordinatorAction {
        if event == EventTag::NormalCondition && self.settings.suppress_normal_readings {
            tracing::info!(agent = %self.id, event = %event, "normal condition suppressed");
            return CoordinatorAction::None;
        }
        if self.settings.responders.is_empty() {
            tracing::warn!(agent = %self.id, event = %event, "no responders configured");
            return CoordinatorAction::None;
        }

        let incident = self
            .ledger
            .open(event, self.settings.responders.iter().cloned(), now);

        tracing::info!(
            agent = %self.id,
            incident = %incident,
            event = %event,
            responders = self.settings.responders.len(),
            "dispatching REQUEST to responders"
        );

        let messages = self
            .settings
            .responders
            .iter()
            .map(|r| {
                AgentMessage::request(self.id.clone(), r.clone(), MessageBody::Handle(event))
                    .with_incident(incident)
            })
            .collect();

        self.history.push(DispatchEvent::Opened {
            incident,
            event,
            responders: self.settings.responders.clone(),
        });
        CoordinatorAction::Send(messages)
    }

    fn acknowledge(&mut self, responder: AgentId, event: EventTag, incident: Option<IncidentId>) {
        let Some(incident) = incident else {
            tracing::warn!(
                agent = %self.id,
                from = %responder,
                event = %event,
                "ack without incident id discarded"
            );
            return;
        };

        if let Some(record) = self.ledger.get(incident) {
            if record.event() != event {
                tracing::warn!(
                    agent = %self.id,
                    incident = %incident,
                    from = %responder,
                    expected = %record.event(),
                    got = %event,
                    "ack for a different event discarded"
                );
                return;
            }
        }

        match self.ledger.acknowledge(incident, &responder) {
            AckOutcome::Recorded { remaining } => {
                tracing::info!(
                    agent = %self.id,
                    incident = %incident,
                    from = %responder,
                    remaining,
                    "ack received"
                );
            }
            AckOutcome::Completed(record) => {
                tracing::info!(
                    agent = %self.id,
                    incident = %incident,
                    event = %record.event(),
                    "all responders completed, incident resolved"
                );
                self.history.push(DispatchEvent::Resolved {
                    incident,
                    event: record.event(),
                });
            }
            AckOutcome::UnknownIncident => {
                tracing::warn!(
                    agent = %self.id,
                    incident = %incident,
                    from = %responder,
                    "ack for unknown incident discarded"
                );
            }
            AckOutcome::Unexpected => {
                tracing::warn!(
                    agent = %self.id,
                    incident = %incident,
                    from = %responder,
                    "duplicate or unexpected ack discarded"
                );
            }
        }
    }

    /// Configured responder matching `sender`, ignoring resources
    fn known_responder(&self, sender: &AgentId) -> Option<AgentId> {
        self.settings
            .responders
            .iter()
            .find(|r| r.same_agent(sender))
            .cloned()
    }

    /// Receive loop; returns once SHUTDOWN has been forwarded
    pub async fn run(
        mut self,
        mut mailbox: Mailbox,
        transport: Arc<dyn MessageTransport>,
    ) -> AgentResult<CoordinatorReport> {
        tracing::info!(
            agent = %self.id,
            sensor = %self.settings.sensor,
            responders = self.settings.responders.len(),
            "coordinator started"
        );

        loop {
            let wait = self.next_wait();
            let received = mailbox.receive(wait).await;
            let now = tokio::time::Instant::now().into_std();

            let action = match received {
                Some(msg) => self.on_message(&msg, now),
                None => CoordinatorAction::None,
            };
            self.sweep(now);

            match action {
                CoordinatorAction::Send(messages) => {
                    for msg in messages {
                        transport.send_or_log(msg).await;
                    }
                }
                CoordinatorAction::Terminate(messages) => {
                    for msg in messages {
                        transport.send_or_log(msg).await;
                    }
                    break;
                }
                CoordinatorAction::None => {}
            }
        }

        if !self.ledger.is_empty() {
            tracing::warn!(
                agent = %self.id,
                pending = self.ledger.pending(),
                "stopping with unresolved incidents"
            );
        }
        tracing::info!(agent = %self.id, "coordinator stopped");

        Ok(CoordinatorReport {
            agent: self.id,
            pending: self.ledger.pending(),
            events: self.history,
        })
    }

    /// Receive timeout, shortened so the next ack deadline is not overshot
    fn next_wait(&self) -> Duration {
        let base = self.settings.receive_timeout;
        match self.ledger.next_deadline(self.settings.ack_timeout) {
            Some(deadline) => {
                let now = tokio::time::Instant::now().into_std();
                base.min(deadline.saturating_duration_since(now))
            }
            None => base,
        }
    }
}

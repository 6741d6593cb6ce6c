use std::sync::Arc;
use std::time::Duration;

use super::errors::AgentResult;
use super::messages::{AgentMessage, MessageBody, Performative};
use super::transport::{Mailbox, MessageTransport};
use super::types::{HandledRequest, ResponderReport};
use crate::domain::incident::ResponseProtocol;
use crate::domain::AgentId;

/// What a responder does with one incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderAction {
    /// Carry out the protocol, then acknowledge
    Work(HandledRequest),
    Stop,
    Ignore,
}

/// Field unit that executes a response protocol on request
///
/// Replies always go to the configured coordinator, whoever sent the
/// request. There is no retry; a lost ack is the coordinator's problem.
pub struct ResponderAgent {
    id: AgentId,
    coordinator: AgentId,
    mailbox: Mailbox,
    transport: Arc<dyn MessageTransport>,
    work: Duration,
    receive_timeout: Duration,
}

impl ResponderAgent {
    pub fn new(
        mailbox: Mailbox,
        coordinator: AgentId,
        transport: Arc<dyn MessageTransport>,
        work: Duration,
        receive_timeout: Duration,
    ) -> Self {
        Self {
            id: mailbox.owner().clone(),
            coordinator,
            mailbox,
            transport,
            work,
            receive_timeout,
        }
    }

    /// Classifies a message without side effects
    pub fn on_message(msg: &AgentMessage) -> ResponderAction {
        match (msg.performative, msg.body) {
            (_, body) if body.is_shutdown() => ResponderAction::Stop,
            (Performative::Request, MessageBody::Handle(event)) => {
                ResponderAction::Work(HandledRequest {
                    incident: msg.incident_id,
                    event,
                    protocol: ResponseProtocol::for_event(event),
                })
            }
            _ => ResponderAction::Ignore,
        }
    }

    pub async fn run(mut self) -> AgentResult<ResponderReport> {
        tracing::info!(agent = %self.id, coordinator = %self.coordinator, "responder started");
        let mut handled = Vec::new();

        loop {
            let Some(msg) = self.mailbox.receive(self.receive_timeout).await else {
                continue;
            };

            match Self::on_message(&msg) {
                ResponderAction::Work(request) => {
                    tracing::info!(
                        agent = %self.id,
                        from = %msg.sender,
                        incident = ?request.incident.map(|i| i.to_string()),
                        event = %request.event,
                        "REQUEST received: {}",
                        request.protocol.describe()
                    );
                    tokio::time::sleep(self.work).await;

                    let mut reply = AgentMessage::inform(
                        self.id.clone(),
                        self.coordinator.clone(),
                        MessageBody::Completed(request.event),
                    );
                    reply.incident_id = request.incident;
                    self.transport.send_or_log(reply).await;

                    tracing::info!(
                        agent = %self.id,
                        event = %request.event,
                        "INFORM sent back to coordinator"
                    );
                    handled.push(request);
                }
                ResponderAction::Stop => {
                    tracing::info!(
                        agent = %self.id,
                        from = %msg.sender,
                        "shutdown signal received, stopping"
                    );
                    break;
                }
                ResponderAction::Ignore => {
                    tracing::warn!(
                        agent = %self.id,
                        from = %msg.sender,
                        performative = %msg.performative,
                        body = %msg.body,
                        "unexpected message discarded"
                    );
                }
            }
        }

        Ok(ResponderReport {
            agent: self.id,
            handled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::percept::EventTag;
    use crate::domain::IncidentId;
    use crate::infrastructure::InProcessTransport;

    fn id(s: &str) -> AgentId {
        AgentId::new(s).unwrap()
    }

    #[test]
    fn request_handle_means_work() {
        let msg = AgentMessage::request(
            id("coord@localhost"),
            id("r@localhost"),
            MessageBody::Handle(EventTag::CriticalGasLevel),
        )
        .with_incident(IncidentId(4));

        assert_eq!(
            ResponderAgent::on_message(&msg),
            ResponderAction::Work(HandledRequest {
                incident: Some(IncidentId(4)),
                event: EventTag::CriticalGasLevel,
                protocol: ResponseProtocol::EvacuateAndCloseValves,
            }),
        );
    }

    #[test]
    fn handle_sent_as_inform_is_ignored() {
        let msg = AgentMessage::inform(
            id("coord@localhost"),
            id("r@localhost"),
            MessageBody::Handle(EventTag::GasLeakConfirmed),
        );
        assert_eq!(ResponderAgent::on_message(&msg), ResponderAction::Ignore);
    }

    #[test]
    fn plain_event_is_ignored() {
        let msg = AgentMessage::inform(
            id("sensor@localhost"),
            id("r@localhost"),
            MessageBody::Event(EventTag::GasLeakConfirmed),
        );
        assert_eq!(ResponderAgent::on_message(&msg), ResponderAction::Ignore);
    }

    #[test]
    fn shutdown_stops() {
        let msg = AgentMessage::shutdown(id("coord@localhost"), id("r@localhost"));
        assert_eq!(ResponderAgent::on_message(&msg), ResponderAction::Stop);
    }

    #[tokio::test(start_paused = true)]
    async fn replies_to_coordinator_after_work() {
        let transport = Arc::new(InProcessTransport::new());
        let mailbox = transport.register(&id("r@localhost")).await.unwrap();
        let mut coord = transport.register(&id("coord@localhost")).await.unwrap();

        let request = AgentMessage::request(
            id("someone@localhost"),
            id("r@localhost"),
            MessageBody::Handle(EventTag::GasLeakConfirmed),
        )
        .with_incident(IncidentId(2));
        transport.send(request).await.unwrap();
        transport
            .send(AgentMessage::shutdown(id("coord@localhost"), id("r@localhost")))
            .await
            .unwrap();

        let started = tokio::time::Instant::now();
        let report = ResponderAgent::new(
            mailbox,
            id("coord@localhost"),
            transport.clone(),
            Duration::from_secs(1),
            Duration::from_secs(3),
        )
        .run()
        .await
        .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(report.handled.len(), 1);

        let reply = coord.receive(Duration::from_millis(10)).await.unwrap();
        assert_eq!(reply.sender.as_str(), "r@localhost");
        assert_eq!(reply.performative, Performative::Inform);
        assert_eq!(reply.body.to_string(), "completed_GAS_LEAK_CONFIRMED");
        assert_eq!(reply.incident_id, Some(IncidentId(2)));
        assert!(coord.receive(Duration::from_millis(10)).await.is_none());
    }
}

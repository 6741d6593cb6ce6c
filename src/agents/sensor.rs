use std::sync::Arc;
use std::time::Duration;

use super::errors::AgentResult;
use super::messages::{AgentMessage, MessageBody};
use super::transport::{Mailbox, MessageTransport};
use super::types::{SensorReport, SensorSample};
use crate::domain::sources::ReadingSource;
use crate::domain::AgentId;

/// Polls a reading source, classifies each reading and informs a target
///
/// Without a target the agent only logs what it perceives. After
/// `max_cycles` polls it sends SHUTDOWN to the target and stops.
pub struct SensorAgent<S> {
    id: AgentId,
    source: S,
    target: Option<AgentId>,
    transport: Arc<dyn MessageTransport>,
    // held so the registration stays live for the agent's lifetime
    _mailbox: Mailbox,
    poll_interval: Duration,
    max_cycles: u32,
}

impl<S: ReadingSource> SensorAgent<S> {
    pub fn new(
        mailbox: Mailbox,
        source: S,
        transport: Arc<dyn MessageTransport>,
        poll_interval: Duration,
        max_cycles: u32,
    ) -> Self {
        Self {
            id: mailbox.owner().clone(),
            source,
            target: None,
            transport,
            _mailbox: mailbox,
            poll_interval,
            max_cycles,
        }
    }

    /// Forward every percept to `target`
    pub fn with_target(mut self, target: AgentId) -> Self {
        self.target = Some(target);
        self
    }

    pub async fn run(mut self) -> AgentResult<SensorReport> {
        tracing::info!(
            agent = %self.id,
            source = self.source.name(),
            target = ?self.target.as_ref().map(AgentId::as_str),
            "sensor agent started"
        );

        let mut samples = Vec::new();

        for cycle in 1..=self.max_cycles {
            if cycle > 1 {
                tokio::time::sleep(self.poll_interval).await;
            }

            let reading = self.source.next_reading();
            let percept = reading.percept();

            tracing::info!(
                agent = %self.id,
                cycle,
                ppm = reading.gas_concentration,
                pressure_kpa = reading.tank_pressure,
                pump = %reading.pump_state,
                level = %percept.level,
                event = %percept.event,
                "reading"
            );

            if let Some(target) = &self.target {
                let msg = AgentMessage::inform(
                    self.id.clone(),
                    target.clone(),
                    MessageBody::Event(percept.event),
                );
                self.transport.send_or_log(msg).await;
            }

            samples.push(SensorSample {
                cycle,
                reading,
                percept,
            });
        }

        let shutdown_sent = match &self.target {
            Some(target) => {
                tracing::info!(
                    agent = %self.id,
                    to = %target,
                    "simulation complete, sending SHUTDOWN"
                );
                self.transport
                    .send_or_log(AgentMessage::shutdown(self.id.clone(), target.clone()))
                    .await;
                true
            }
            None => {
                tracing::info!(agent = %self.id, "simulation complete");
                false
            }
        };

        Ok(SensorReport {
            agent: self.id,
            samples,
            shutdown_sent,
        })
    }
}

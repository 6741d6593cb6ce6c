use serde::{Deserialize, Serialize};

use super::events::DispatchEvent;
use crate::domain::incident::{IncidentEffect, IncidentState, ResponseProtocol};
use crate::domain::percept::{EventTag, Percept, Reading};
use crate::domain::{AgentId, IncidentId};

/// Role an agent plays in the station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Heartbeat,
    Sensor,
    Incident,
    Coordinator,
    Responder,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Heartbeat => write!(f, "Heartbeat"),
            AgentRole::Sensor => write!(f, "Sensor"),
            AgentRole::Incident => write!(f, "Incident"),
            AgentRole::Coordinator => write!(f, "Coordinator"),
            AgentRole::Responder => write!(f, "Responder"),
        }
    }
}

/// One poll of the sensor agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub cycle: u32,
    pub reading: Reading,
    pub percept: Percept,
}

/// What a sensor agent observed before it stopped
#[derive(Debug, Clone)]
pub struct SensorReport {
    pub agent: AgentId,
    pub samples: Vec<SensorSample>,
    pub shutdown_sent: bool,
}

impl SensorReport {
    pub fn events(&self) -> Vec<EventTag> {
        self.samples.iter().map(|s| s.percept.event).collect()
    }
}

/// Path taken by the incident state machine, starting at its initial state
#[derive(Debug, Clone)]
pub struct IncidentReport {
    pub agent: AgentId,
    pub path: Vec<IncidentState>,
    /// Non-trivial entry effects, in order
    pub effects: Vec<IncidentEffect>,
    /// Events consumed in Idle (timeouts are not listed)
    pub received: Vec<EventTag>,
}

impl IncidentReport {
    pub fn final_state(&self) -> Option<IncidentState> {
        self.path.last().copied()
    }
}

/// Ledger history of a coordinator run
#[derive(Debug, Clone)]
pub struct CoordinatorReport {
    pub agent: AgentId,
    pub events: Vec<DispatchEvent>,
    /// Records still open when the coordinator stopped
    pub pending: usize,
}

impl CoordinatorReport {
    pub fn opened(&self) -> Vec<IncidentId> {
        self.filter(|e| matches!(e, DispatchEvent::Opened { .. }))
    }

    pub fn resolved(&self) -> Vec<IncidentId> {
        self.filter(|e| matches!(e, DispatchEvent::Resolved { .. }))
    }

    pub fn expired(&self) -> Vec<IncidentId> {
        self.filter(|e| matches!(e, DispatchEvent::Expired { .. }))
    }

    fn filter(&self, pred: impl Fn(&DispatchEvent) -> bool) -> Vec<IncidentId> {
        self.events
            .iter()
            .filter(|e| pred(e))
            .filter_map(DispatchEvent::incident)
            .collect()
    }
}

/// A request a responder carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandledRequest {
    pub incident: Option<IncidentId>,
    pub event: EventTag,
    pub protocol: ResponseProtocol,
}

#[derive(Debug, Clone)]
pub struct ResponderReport {
    pub agent: AgentId,
    pub handled: Vec<HandledRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display() {
        assert_eq!(AgentRole::Coordinator.to_string(), "Coordinator");
        assert_eq!(AgentRole::Responder.to_string(), "Responder");
    }

    #[test]
    fn coordinator_report_filters_by_kind() {
        let report = CoordinatorReport {
            agent: AgentId::new("coordinator@localhost").unwrap(),
            events: vec![
                DispatchEvent::Opened {
                    incident: IncidentId(1),
                    event: EventTag::PossibleGasLeak,
                    responders: vec![],
                },
                DispatchEvent::Opened {
                    incident: IncidentId(2),
                    event: EventTag::GasLeakConfirmed,
                    responders: vec![],
                },
                DispatchEvent::Resolved {
                    incident: IncidentId(1),
                    event: EventTag::PossibleGasLeak,
                },
                DispatchEvent::Expired {
                    incident: IncidentId(2),
                    event: EventTag::GasLeakConfirmed,
                    missing: vec![],
                },
                DispatchEvent::ShutdownForwarded { responders: vec![] },
            ],
            pending: 0,
        };

        assert_eq!(report.opened(), vec![IncidentId(1), IncidentId(2)]);
        assert_eq!(report.resolved(), vec![IncidentId(1)]);
        assert_eq!(report.expired(), vec![IncidentId(2)]);
    }
}

// Coordinator dispatch events
//
// The coordinator records one of these for every change to its ledger so
// that a run can be inspected after the agents have stopped.

use serde::{Deserialize, Serialize};

use crate::domain::percept::EventTag;
use crate::domain::{AgentId, IncidentId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// REQUEST fanned out to every responder
    Opened {
        incident: IncidentId,
        event: EventTag,
        responders: Vec<AgentId>,
    },
    /// Every responder acknowledged
    Resolved { incident: IncidentId, event: EventTag },
    /// Ack timeout elapsed with responders still missing
    Expired {
        incident: IncidentId,
        event: EventTag,
        missing: Vec<AgentId>,
    },
    /// SHUTDOWN forwarded to the responders
    ShutdownForwarded { responders: Vec<AgentId> },
}

impl DispatchEvent {
    pub fn incident(&self) -> Option<IncidentId> {
        match self {
            DispatchEvent::Opened { incident, .. }
            | DispatchEvent::Resolved { incident, .. }
            | DispatchEvent::Expired { incident, .. } => Some(*incident),
            DispatchEvent::ShutdownForwarded { .. } => None,
        }
    }
}

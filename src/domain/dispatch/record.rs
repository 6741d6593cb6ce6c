use std::collections::BTreeSet;
use std::time::Instant;

use crate::domain::percept::EventTag;
use crate::domain::value_objects::{AgentId, IncidentId};

/// Outstanding fan-out of one incident to a set of responders
///
/// # Invariants
/// - `acks_received` is always a subset of `responders`
/// - The record is complete once every responder has acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRecord {
    incident: IncidentId,
    event: EventTag,
    responders: BTreeSet<AgentId>,
    acks_received: BTreeSet<AgentId>,
    opened_at: Instant,
}

impl DispatchRecord {
    pub fn new(
        incident: IncidentId,
        event: EventTag,
        responders: impl IntoIterator<Item = AgentId>,
        opened_at: Instant,
    ) -> Self {
        Self {
            incident,
            event,
            responders: responders.into_iter().collect(),
            acks_received: BTreeSet::new(),
            opened_at,
        }
    }

    pub fn incident(&self) -> IncidentId {
        self.incident
    }

    pub fn event(&self) -> EventTag {
        self.event
    }

    pub fn responders(&self) -> &BTreeSet<AgentId> {
        &self.responders
    }

    pub fn acks_received(&self) -> &BTreeSet<AgentId> {
        &self.acks_received
    }

    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    /// Whether `responder` was asked to handle this incident
    pub fn awaits(&self, responder: &AgentId) -> bool {
        self.responders.contains(responder) && !self.acks_received.contains(responder)
    }

    pub fn is_complete(&self) -> bool {
        self.acks_received.is_superset(&self.responders)
    }

    /// Responders that have not acknowledged yet
    pub fn missing(&self) -> Vec<AgentId> {
        self.responders
            .difference(&self.acks_received)
            .cloned()
            .collect()
    }

    /// Records an ack; returns false when the responder is unknown to this
    /// record or already acknowledged
    pub(crate) fn acknowledge(&mut self, responder: &AgentId) -> bool {
        if !self.awaits(responder) {
            return false;
        }
        self.acks_received.insert(responder.clone())
    }
}

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::record::DispatchRecord;
use crate::domain::percept::EventTag;
use crate::domain::value_objects::{AgentId, IncidentId};

/// Result of matching one acknowledgement against the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    /// Ack recorded; other responders are still outstanding
    Recorded { remaining: usize },
    /// Last ack arrived; the record has been removed from the ledger
    Completed(DispatchRecord),
    /// No pending record with this id (already resolved, expired or never opened)
    UnknownIncident,
    /// The record exists but was not waiting on this responder
    Unexpected,
}

/// Pending dispatch records of one coordinator, keyed by incident id
///
/// Ids are handed out in strictly increasing order starting at `#1` and
/// are never reused, even after the record is gone.
#[derive(Debug, Default)]
pub struct DispatchLedger {
    records: BTreeMap<IncidentId, DispatchRecord>,
    last_id: IncidentId,
}

impl DispatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a record for `event` fanned out to `responders`
    pub fn open(
        &mut self,
        event: EventTag,
        responders: impl IntoIterator<Item = AgentId>,
        now: Instant,
    ) -> IncidentId {
        self.last_id = self.last_id.next();
        let record = DispatchRecord::new(self.last_id, event, responders, now);
        self.records.insert(self.last_id, record);
        self.last_id
    }

    pub fn acknowledge(&mut self, incident: IncidentId, responder: &AgentId) -> AckOutcome {
        let Some(record) = self.records.get_mut(&incident) else {
            return AckOutcome::UnknownIncident;
        };

        if !record.acknowledge(responder) {
            return AckOutcome::Unexpected;
        }

        if record.is_complete() {
            match self.records.remove(&incident) {
                Some(done) => AckOutcome::Completed(done),
                None => AckOutcome::UnknownIncident,
            }
        } else {
            AckOutcome::Recorded {
                remaining: record.missing().len(),
            }
        }
    }

    /// Removes and returns every record opened more than `ack_timeout` ago
    pub fn expire(&mut self, now: Instant, ack_timeout: Duration) -> Vec<DispatchRecord> {
        let expired: Vec<IncidentId> = self
            .records
            .values()
            .filter(|r| now.saturating_duration_since(r.opened_at()) >= ack_timeout)
            .map(DispatchRecord::incident)
            .collect();

        expired
            .into_iter()
            .filter_map(|id| self.records.remove(&id))
            .collect()
    }

    pub fn get(&self, incident: IncidentId) -> Option<&DispatchRecord> {
        self.records.get(&incident)
    }

    pub fn pending(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest instant at which a pending record would expire
    pub fn next_deadline(&self, ack_timeout: Duration) -> Option<Instant> {
        self.records
            .values()
            .map(|r| r.opened_at() + ack_timeout)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AgentId {
        AgentId::new(s).unwrap()
    }

    fn responders() -> Vec<AgentId> {
        vec![id("r1@localhost"), id("r2@localhost")]
    }

    #[test]
    fn ids_are_monotonic_from_one() {
        let mut ledger = DispatchLedger::new();
        let now = Instant::now();

        let a = ledger.open(EventTag::PossibleGasLeak, responders(), now);
        let b = ledger.open(EventTag::GasLeakConfirmed, responders(), now);

        assert_eq!(a, IncidentId(1));
        assert_eq!(b, IncidentId(2));
        assert_eq!(ledger.pending(), 2);
    }

    #[test]
    fn resolves_after_every_ack() {
        let mut ledger = DispatchLedger::new();
        let incident = ledger.open(EventTag::CriticalGasLevel, responders(), Instant::now());

        assert_eq!(
            ledger.acknowledge(incident, &id("r1@localhost")),
            AckOutcome::Recorded { remaining: 1 },
        );

        match ledger.acknowledge(incident, &id("r2@localhost")) {
            AckOutcome::Completed(record) => {
                assert_eq!(record.incident(), incident);
                assert_eq!(record.event(), EventTag::CriticalGasLevel);
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn ids_not_reused_after_resolution() {
        let mut ledger = DispatchLedger::new();
        let now = Instant::now();
        let first = ledger.open(EventTag::PossibleGasLeak, vec![id("r1@localhost")], now);
        ledger.acknowledge(first, &id("r1@localhost"));

        let second = ledger.open(EventTag::PossibleGasLeak, vec![id("r1@localhost")], now);
        assert!(second > first);
    }

    #[test]
    fn unknown_incident_and_stranger_are_rejected() {
        let mut ledger = DispatchLedger::new();
        let incident = ledger.open(EventTag::GasLeakConfirmed, responders(), Instant::now());

        assert_eq!(
            ledger.acknowledge(IncidentId(42), &id("r1@localhost")),
            AckOutcome::UnknownIncident,
        );
        assert_eq!(
            ledger.acknowledge(incident, &id("intruder@localhost")),
            AckOutcome::Unexpected,
        );
        assert_eq!(ledger.pending(), 1);
    }

    #[test]
    fn duplicate_ack_does_not_complete() {
        let mut ledger = DispatchLedger::new();
        let incident = ledger.open(EventTag::GasLeakConfirmed, responders(), Instant::now());

        ledger.acknowledge(incident, &id("r1@localhost"));
        assert_eq!(
            ledger.acknowledge(incident, &id("r1@localhost")),
            AckOutcome::Unexpected,
        );
        assert_eq!(ledger.pending(), 1);
    }

    #[test]
    fn expire_removes_only_stale_records() {
        let mut ledger = DispatchLedger::new();
        let start = Instant::now();
        let timeout = Duration::from_secs(5);

        let old = ledger.open(EventTag::PossibleGasLeak, responders(), start);
        let fresh = ledger.open(
            EventTag::PossibleGasLeak,
            responders(),
            start + Duration::from_secs(4),
        );

        let expired = ledger.expire(start + Duration::from_secs(6), timeout);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].incident(), old);
        assert_eq!(expired[0].missing().len(), 2);
        assert!(ledger.get(fresh).is_some());
    }

    #[test]
    fn next_deadline_tracks_oldest_record() {
        let mut ledger = DispatchLedger::new();
        let start = Instant::now();
        let timeout = Duration::from_secs(5);
        assert_eq!(ledger.next_deadline(timeout), None);

        ledger.open(EventTag::PossibleGasLeak, responders(), start);
        ledger.open(
            EventTag::PossibleGasLeak,
            responders(),
            start + Duration::from_secs(2),
        );
        assert_eq!(ledger.next_deadline(timeout), Some(start + timeout));
    }
}

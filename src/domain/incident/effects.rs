use serde::{Deserialize, Serialize};

use crate::domain::percept::EventTag;

/// Emergency protocol executed for a confirmed hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseProtocol {
    /// Evacuate the station and shut the main valves
    EvacuateAndCloseValves,
    /// Alert staff and switch ventilation on
    AlertStaffAndVentilate,
}

impl ResponseProtocol {
    /// Protocol for a given event: evacuation is reserved for CRITICAL
    pub fn for_event(event: EventTag) -> Self {
        match event {
            EventTag::CriticalGasLevel => ResponseProtocol::EvacuateAndCloseValves,
            _ => ResponseProtocol::AlertStaffAndVentilate,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ResponseProtocol::EvacuateAndCloseValves => "evacuate station, shut down main valves",
            ResponseProtocol::AlertStaffAndVentilate => "alert staff, ventilation on",
        }
    }
}

/// Side effect produced when the machine enters a state
///
/// These are the domain events of one incident. The machine only reports
/// them; the hosting agent decides how to act on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncidentEffect {
    /// No side effect
    None,
    /// Alarms sounded for the stored event (on entering Alert)
    AlarmSounded { event: EventTag },
    /// Emergency protocol executed (on entering Response)
    ProtocolExecuted {
        event: EventTag,
        protocol: ResponseProtocol,
    },
    /// Context reset (on entering Completion)
    ContextCleared,
    /// Shutdown received; machine halted
    Halted,
}

impl IncidentEffect {
    pub fn is_none(&self) -> bool {
        matches!(self, IncidentEffect::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_evacuates() {
        assert_eq!(
            ResponseProtocol::for_event(EventTag::CriticalGasLevel),
            ResponseProtocol::EvacuateAndCloseValves,
        );
    }

    #[test]
    fn confirmed_leak_ventilates() {
        assert_eq!(
            ResponseProtocol::for_event(EventTag::GasLeakConfirmed),
            ResponseProtocol::AlertStaffAndVentilate,
        );
    }

    #[test]
    fn effect_serializes_with_kind_tag() {
        let effect = IncidentEffect::AlarmSounded {
            event: EventTag::PossibleGasLeak,
        };
        let json = serde_json::to_value(effect).unwrap();

        assert_eq!(json["kind"], "alarm_sounded");
        assert_eq!(json["event"], "POSSIBLE_GAS_LEAK");
    }
}

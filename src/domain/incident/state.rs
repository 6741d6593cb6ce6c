use serde::{Deserialize, Serialize};

/// Lifecycle state of the incident state machine
///
/// # State Transitions
/// ```text
/// Idle -> Alert -> Assessment -> Response -> Completion -> Idle
///                      └-------------------> Completion
/// Idle -> Idle
/// Idle -> Stopped
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentState {
    /// Monitoring; waiting for an abnormal percept
    #[default]
    Idle,
    /// Abnormal percept received; alarms sounding
    Alert,
    /// Deciding whether the hazard needs the response protocol
    Assessment,
    /// Executing the emergency protocol
    Response,
    /// Incident handled; resetting
    Completion,
    /// Terminal state after a shutdown signal
    Stopped,
}

impl IncidentState {
    /// Checks if a transition from current state to next state is valid
    ///
    /// # Valid Transitions
    /// - Idle -> Idle
    /// - Idle -> Alert
    /// - Idle -> Stopped
    /// - Alert -> Assessment
    /// - Assessment -> Response
    /// - Assessment -> Completion
    /// - Response -> Completion
    /// - Completion -> Idle
    ///
    /// # Example
    /// ```
    /// use lpg_response::domain::incident::IncidentState;
    ///
    /// assert!(IncidentState::Idle.can_transition_to(IncidentState::Alert));
    /// assert!(!IncidentState::Alert.can_transition_to(IncidentState::Response));
    /// ```
    pub fn can_transition_to(&self, next: IncidentState) -> bool {
        use IncidentState::*;
        matches!(
            (self, next),
            (Idle, Idle)
                | (Idle, Alert)
                | (Idle, Stopped)
                | (Alert, Assessment)
                | (Assessment, Response)
                | (Assessment, Completion)
                | (Response, Completion)
                | (Completion, Idle)
        )
    }

    /// Whether the machine waits on its mailbox in this state
    pub fn awaits_input(&self) -> bool {
        matches!(self, IncidentState::Idle)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IncidentState::Stopped)
    }
}

impl std::fmt::Display for IncidentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentState::Idle => write!(f, "idle"),
            IncidentState::Alert => write!(f, "alert"),
            IncidentState::Assessment => write!(f, "assessment"),
            IncidentState::Response => write!(f, "response"),
            IncidentState::Completion => write!(f, "completion"),
            IncidentState::Stopped => write!(f, "stopped"),
        }
    }
}

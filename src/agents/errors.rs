use thiserror::Error;

use super::messages::MessageError;
use crate::config::ConfigError;
use crate::domain::incident::IncidentError;

/// Errors that can occur in the agent system
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Message delivery failed: {0}")]
    MessageDeliveryFailed(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] MessageError),

    #[error("Incident state machine invariant violated: {0}")]
    Incident(#[from] IncidentError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Agent task failed: {0}")]
    TaskFailed(String),
}

impl AgentError {
    /// Registration failures abort a scenario before any agent is spawned
    pub fn is_registration_failure(&self) -> bool {
        matches!(self, AgentError::AlreadyRegistered(_))
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

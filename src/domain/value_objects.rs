use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque endpoint identifier of an agent (e.g. `coordinator@localhost`)
///
/// # Invariants
/// - Must not be empty
/// - Must not contain whitespace
/// - Is immutable after construction
///
/// An identifier may carry a resource suffix after `/`
/// (`sensor@localhost/probe-1`); [`AgentId::bare`] strips it so that
/// messages from any resource of an agent are attributed to that agent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    /// Creates a new AgentId value object
    ///
    /// # Example
    /// ```
    /// use lpg_response::domain::AgentId;
    ///
    /// let id = AgentId::new("sensor@localhost/probe").expect("valid id");
    /// assert_eq!(id.bare(), "sensor@localhost");
    /// assert!(AgentId::new("").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if Self::is_valid(&id) {
            Ok(AgentId(id))
        } else {
            Err(format!("Invalid agent id: {:?}", id))
        }
    }

    fn is_valid(id: &str) -> bool {
        !id.is_empty() && !id.chars().any(char::is_whitespace)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier without its resource suffix
    pub fn bare(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// True when both ids name the same agent, ignoring resources
    pub fn same_agent(&self, other: &AgentId) -> bool {
        self.bare() == other.bare()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AgentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AgentId::new(value)
    }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> Self {
        id.0
    }
}

/// Coordinator-assigned incident number, strictly increasing per coordinator
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IncidentId(pub u64);

impl IncidentId {
    pub fn next(self) -> Self {
        IncidentId(self.0 + 1)
    }
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Agent message envelope and wire bodies
//
// Every frame exchanged between agents is an `AgentMessage` serialised to
// JSON. The body is a closed enum; its wire form is the plain string used
// by the station agents (`GAS_LEAK_CONFIRMED`, `handle_...`, `completed_...`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::percept::EventTag;
use crate::domain::{AgentId, IncidentId};

const HANDLE_PREFIX: &str = "handle_";
const COMPLETED_PREFIX: &str = "completed_";

/// Errors raised while decoding a frame
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Unknown message body: {0:?}")]
    UnknownBody(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] serde_json::Error),
}

/// FIPA-ACL performative of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performative {
    Inform,
    Request,
}

impl fmt::Display for Performative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Performative::Inform => write!(f, "inform"),
            Performative::Request => write!(f, "request"),
        }
    }
}

/// Message body
///
/// `Handle` and `Completed` only ever carry hazard events; the parser
/// rejects `handle_SHUTDOWN` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MessageBody {
    /// A percept event, or the SHUTDOWN sentinel
    Event(EventTag),
    /// Coordinator asks a responder to handle an event
    Handle(EventTag),
    /// Responder reports the event handled
    Completed(EventTag),
}

impl MessageBody {
    pub fn shutdown() -> Self {
        MessageBody::Event(EventTag::Shutdown)
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, MessageBody::Event(EventTag::Shutdown))
    }

    /// The event this body refers to, whatever its role
    pub fn event(&self) -> EventTag {
        match *self {
            MessageBody::Event(e) | MessageBody::Handle(e) | MessageBody::Completed(e) => e,
        }
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageBody::Event(e) => write!(f, "{}", e),
            MessageBody::Handle(e) => write!(f, "{}{}", HANDLE_PREFIX, e),
            MessageBody::Completed(e) => write!(f, "{}{}", COMPLETED_PREFIX, e),
        }
    }
}

impl FromStr for MessageBody {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || MessageError::UnknownBody(s.to_string());

        let (wrap, rest): (fn(EventTag) -> MessageBody, &str) =
            if let Some(rest) = s.strip_prefix(HANDLE_PREFIX) {
                (MessageBody::Handle, rest)
            } else if let Some(rest) = s.strip_prefix(COMPLETED_PREFIX) {
                (MessageBody::Completed, rest)
            } else {
                (MessageBody::Event, s)
            };

        let event = EventTag::from_str(rest).map_err(|_| unknown())?;
        let body = wrap(event);

        if event == EventTag::Shutdown && !matches!(body, MessageBody::Event(_)) {
            return Err(unknown());
        }
        Ok(body)
    }
}

impl TryFrom<String> for MessageBody {
    type Error = MessageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MessageBody> for String {
    fn from(body: MessageBody) -> Self {
        body.to_string()
    }
}

/// Envelope exchanged between agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: Uuid,
    pub sender: AgentId,
    pub to: AgentId,
    pub performative: Performative,
    pub body: MessageBody,
    /// Correlation id set by the coordinator on REQUEST and echoed on INFORM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<IncidentId>,
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(
        sender: AgentId,
        to: AgentId,
        performative: Performative,
        body: MessageBody,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            to,
            performative,
            body,
            incident_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn inform(sender: AgentId, to: AgentId, body: MessageBody) -> Self {
        Self::new(sender, to, Performative::Inform, body)
    }

    pub fn request(sender: AgentId, to: AgentId, body: MessageBody) -> Self {
        Self::new(sender, to, Performative::Request, body)
    }

    /// SHUTDOWN is always sent as an INFORM
    pub fn shutdown(sender: AgentId, to: AgentId) -> Self {
        Self::inform(sender, to, MessageBody::shutdown())
    }

    pub fn with_incident(mut self, incident: IncidentId) -> Self {
        self.incident_id = Some(incident);
        self
    }

    pub fn to_json(&self) -> Result<String, MessageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(frame: &str) -> Result<Self, MessageError> {
        Ok(serde_json::from_str(frame)?)
    }
}

// Agent system modules
//
// Each agent runs as its own task with a private mailbox and talks to the
// others only through a `MessageTransport`.

pub mod coordinator;
pub mod errors;
pub mod events;
pub mod heartbeat;
pub mod incident;
pub mod messages;
pub mod responder;
pub mod sensor;
pub mod transport;
pub mod types;

// Re-export main types
pub use coordinator::{CoordinatorAction, CoordinatorAgent, CoordinatorSettings};
pub use errors::{AgentError, AgentResult};
pub use events::DispatchEvent;
pub use heartbeat::HeartbeatAgent;
pub use incident::IncidentAgent;
pub use messages::{AgentMessage, MessageBody, MessageError, Performative};
pub use responder::{ResponderAction, ResponderAgent};
pub use sensor::SensorAgent;
pub use transport::{Mailbox, MessageTransport};
pub use types::{
    AgentRole, CoordinatorReport, HandledRequest, IncidentReport, ResponderReport, SensorReport,
    SensorSample,
};

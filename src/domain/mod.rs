// Domain layer module exports
// Pure hazard classification, incident lifecycle and dispatch bookkeeping
// Domain is independent of transport and timing concerns

pub mod dispatch;
pub mod incident;
pub mod percept;
pub mod sources;
pub mod value_objects;

pub use value_objects::{AgentId, IncidentId};

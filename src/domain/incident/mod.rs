// Incident state machine
//
// Idle -> Alert -> Assessment -> (Response) -> Completion -> Idle, driven
// by classified percepts. Pure: timing and messaging live in the agent
// that hosts the machine.

pub mod context;
pub mod effects;
pub mod machine;
pub mod state;

pub use context::IncidentContext;
pub use effects::{IncidentEffect, ResponseProtocol};
pub use machine::{transition, IncidentError, IncidentMachine, Transition};
pub use state::IncidentState;

// Infrastructure layer module
// Contains the in-process transport and the reading sources
// Follows Hexagonal Architecture

pub mod in_process;
pub mod scripted;
pub mod station;

pub use in_process::InProcessTransport;
pub use scripted::ScriptedReadings;
pub use station::SimulatedStation;

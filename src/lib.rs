//! LPG Station Hazard Response
//!
//! Cooperating agents that watch a simulated LPG filling station: a sensor
//! classifies gas readings into hazard events, an incident state machine
//! reacts to them, and a coordinator fans sensor events out to
//! responders and collects their acknowledgements.

pub mod agents;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod simulation;

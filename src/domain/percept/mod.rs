// Percept classification
//
// Pure mapping from raw instrument readings to hazard levels and the
// event tags exchanged between agents.

pub mod hazard;
pub mod reading;

pub use hazard::{
    classify, event_for_level_name, to_event, EventTag, HazardLevel, PPM_CRITICAL, PPM_DANGER,
    PPM_WARNING,
};
pub use reading::{Percept, PumpState, Reading};

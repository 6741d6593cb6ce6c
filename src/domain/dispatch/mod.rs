//! Coordinator-side bookkeeping of incidents fanned out to responders

pub mod ledger;
pub mod record;

pub use ledger::{AckOutcome, DispatchLedger};
pub use record::DispatchRecord;

use serde::Serialize;
use thiserror::Error;

use super::context::IncidentContext;
use super::effects::{IncidentEffect, ResponseProtocol};
use super::state::IncidentState;
use crate::domain::percept::EventTag;

/// Errors raised by the incident state machine
///
/// All of these indicate a broken invariant rather than a recoverable
/// condition; callers are expected to stop the hosting agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IncidentError {
    #[error("Incident context missing on entering {state}")]
    MissingContext { state: IncidentState },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: IncidentState,
        to: IncidentState,
    },

    #[error("State machine already stopped")]
    AlreadyStopped,
}

/// One step of the machine: where it was, where it went, what it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: IncidentState,
    pub to: IncidentState,
    pub effect: IncidentEffect,
}

/// Computes the next state and its entry effect
///
/// `input` is the percept received this cycle. Only Idle consumes it; a
/// `None` in Idle is a receive timeout and is handled like
/// `NORMAL_CONDITION`. Every other state advances unconditionally once its
/// dwell time is over, ignoring `input`.
///
/// The context is threaded explicitly and is only written by entry
/// actions: entering Alert stores the event, entering Completion clears it.
pub fn transition(
    state: IncidentState,
    input: Option<EventTag>,
    ctx: &mut IncidentContext,
) -> Result<Transition, IncidentError> {
    let next = next_state(state, input, ctx)?;

    if !state.can_transition_to(next) {
        return Err(IncidentError::InvalidTransition {
            from: state,
            to: next,
        });
    }

    let effect = on_enter(next, input, ctx)?;

    Ok(Transition {
        from: state,
        to: next,
        effect,
    })
}

fn next_state(
    state: IncidentState,
    input: Option<EventTag>,
    ctx: &IncidentContext,
) -> Result<IncidentState, IncidentError> {
    let next = match state {
        IncidentState::Idle => match input {
            Some(EventTag::Shutdown) => IncidentState::Stopped,
            Some(event) if event.is_hazard() => IncidentState::Alert,
            _ => IncidentState::Idle,
        },
        IncidentState::Alert => IncidentState::Assessment,
        IncidentState::Assessment => {
            let event = ctx.current_event().ok_or(IncidentError::MissingContext {
                state: IncidentState::Assessment,
            })?;
            if event.requires_response() {
                IncidentState::Response
            } else {
                IncidentState::Completion
            }
        }
        IncidentState::Response => IncidentState::Completion,
        IncidentState::Completion => IncidentState::Idle,
        IncidentState::Stopped => return Err(IncidentError::AlreadyStopped),
    };

    Ok(next)
}

fn on_enter(
    next: IncidentState,
    input: Option<EventTag>,
    ctx: &mut IncidentContext,
) -> Result<IncidentEffect, IncidentError> {
    let effect = match next {
        IncidentState::Alert => {
            let event = input
                .filter(EventTag::is_hazard)
                .ok_or(IncidentError::MissingContext { state: next })?;
            ctx.open(event);
            IncidentEffect::AlarmSounded { event }
        }
        IncidentState::Response => {
            let event = ctx
                .current_event()
                .ok_or(IncidentError::MissingContext { state: next })?;
            IncidentEffect::ProtocolExecuted {
                event,
                protocol: ResponseProtocol::for_event(event),
            }
        }
        IncidentState::Completion => {
            ctx.clear();
            IncidentEffect::ContextCleared
        }
        IncidentState::Stopped => IncidentEffect::Halted,
        IncidentState::Idle | IncidentState::Assessment => IncidentEffect::None,
    };

    Ok(effect)
}

/// Incident state machine instance
///
/// Owns its state and its [`IncidentContext`] exclusively; nothing else
/// can reach either.
///
/// # Example
/// ```
/// use lpg_response::domain::incident::{IncidentMachine, IncidentState};
/// use lpg_response::domain::percept::EventTag;
///
/// let mut machine = IncidentMachine::new();
/// machine.step(Some(EventTag::PossibleGasLeak)).expect("valid step");
/// assert_eq!(machine.state(), IncidentState::Alert);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IncidentMachine {
    state: IncidentState,
    context: IncidentContext,
}

impl IncidentMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> IncidentState {
        self.state
    }

    pub fn context(&self) -> &IncidentContext {
        &self.context
    }

    pub fn is_stopped(&self) -> bool {
        self.state.is_terminal()
    }

    /// Advances the machine by one transition
    pub fn step(&mut self, input: Option<EventTag>) -> Result<Transition, IncidentError> {
        let t = transition(self.state, input, &mut self.context)?;
        self.state = t.to;
        Ok(t)
    }

    /// Feeds one percept from Idle and runs the machine until it is
    /// waiting for input again (or has stopped)
    pub fn run_incident(
        &mut self,
        input: Option<EventTag>,
    ) -> Result<Vec<Transition>, IncidentError> {
        let mut transitions = vec![self.step(input)?];
        while !self.state.awaits_input() && !self.state.is_terminal() {
            transitions.push(self.step(None)?);
        }
        Ok(transitions)
    }
}

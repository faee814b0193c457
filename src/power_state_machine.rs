//! Defines the state machine for the TV's inferred power state.
//!
//! The TV never announces its power state, so the state machine is driven by the outcomes of
//! commands sent by the controller:
//!
//! 1. A liveness check succeeds while powering on: the TV is on.
//! 2. A liveness check fails while powering on: the TV is unreachable and presumed off.
//! 3. A power off has been requested: the TV is off.
//! 4. No command has succeeded for a full activity countdown: the TV is presumed off.

use rust_fsm::*;

use crate::PowerState;

// ------------------------------------------------------------------------------------------------
// Inputs, Outputs

/// State machine transition inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Input {
    AliveConfirmed,
    Unreachable,
    TurnedOff,
    CountdownExpired,
}

/// State machine transition outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Output {
    AnnouncePowerState(PowerState),
}

// Mermaid format:
//
// ---
// title: Mi TV power state machine
// ---
// stateDiagram-v2
// [*] --> Unknown
// Unknown --> On: AliveConfirmed
// Unknown --> Off: Unreachable
// Unknown --> Off: TurnedOff
//
// Off --> On: AliveConfirmed
// Off --> Off: Unreachable
// Off --> Off: TurnedOff
//
// On --> On: AliveConfirmed
// On --> Off: Unreachable
// On --> Off: TurnedOff
// On --> Off: CountdownExpired

// ================================================================================================
// PowerStateMachine

#[derive(Debug)]
pub(crate) struct PowerStateMachine;

impl StateMachineImpl for PowerStateMachine {
    type Input = Input;
    type State = PowerState;
    type Output = Output;

    const INITIAL_STATE: Self::State = PowerState::Unknown;

    fn transition(state: &Self::State, input: &Self::Input) -> Option<Self::State> {
        match (state, input) {
            (_, Input::AliveConfirmed) => Some(PowerState::On),
            (_, Input::Unreachable) => Some(PowerState::Off),
            (_, Input::TurnedOff) => Some(PowerState::Off),
            (PowerState::On, Input::CountdownExpired) => Some(PowerState::Off),

            _ => None,
        }
    }

    fn output(state: &Self::State, input: &Self::Input) -> Option<Self::Output> {
        match Self::transition(state, input) {
            Some(next) if next != *state => Some(Output::AnnouncePowerState(next)),
            _ => None,
        }
    }
}

pub(crate) type PowerFsm = StateMachine<PowerStateMachine>;

// ================================================================================================
// Tests

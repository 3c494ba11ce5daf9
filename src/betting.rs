//! Betting round state machine: drives one street to a bet-equal or
//! one-survivor configuration.

use crate::agents::Agent;
use crate::game::{Action, GameState, StateError};

/// Default ceiling on actions taken in a single street.
pub const DEFAULT_MAX_STREET_ACTIONS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreetReport {
    /// Actions requested from agents.
    pub actions: usize,
    /// The ceiling was hit and the street was settled by calling everyone up.
    pub forced: bool,
}

/// Run betting on the current street with `start` first to act.
///
/// `agents` is indexed by seat. A raise size from the agent is clamped to
/// `[1, stack]` before the state applies its own floor and cap. After
/// `max_actions` decisions the street is force-settled and flagged in the
/// report.
pub fn run_street(
    state: &mut GameState,
    start: usize,
    agents: &mut [Box<dyn Agent>],
    max_actions: usize,
) -> Result<StreetReport, StateError> {
    let mut report = StreetReport::default();
    state.begin_street(start);

    while let Some(seat) = state.current() {
        if report.actions >= max_actions {
            let moved = state.force_settle();
            report.forced = true;
            tracing::warn!(
                target: "poker_arena::betting",
                street = %state.street(),
                actions = report.actions,
                moved,
                "action ceiling reached; force-settling street"
            );
            break;
        }

        let stack = state.player(seat)?.stack();
        let agent = agents.get_mut(seat).ok_or(StateError::SeatOutOfRange(seat))?;
        let action = agent.decide(state, seat);
        let amount = match action {
            Action::Raise => agent.size_raise(state, seat).clamp(1, stack.max(1)),
            Action::Fold | Action::Call => 0,
        };
        let applied = state.apply(seat, action, amount)?;
        report.actions += 1;

        tracing::debug!(
            target: "poker_arena::betting",
            seat,
            street = %state.street(),
            requested = %action,
            applied = applied.verb.label(),
            paid = applied.paid,
            pot = state.pot(),
            "action applied"
        );
    }

    Ok(report)
}

//! Simulation helpers shared by the search agents. Everything here works on
//! snapshots; the live state is never touched.

use super::pot_fraction_raise;
use crate::evaluator::EvalError;
use crate::game::{Action, GameState, StateError, Street};
use crate::settlement::rank_live;
use rand::Rng;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SearchError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("no seat is due to act")]
    NoActor,
}

/// Apply `action` for the seat to act, in place. Raises are sized as the call
/// plus `raise_fraction` of the pot.
pub(crate) fn act(state: &mut GameState, action: Action, raise_fraction: f64) -> Result<(), SearchError> {
    let actor = state.current().ok_or(SearchError::NoActor)?;
    let amount = match action {
        Action::Raise => pot_fraction_raise(state, actor, raise_fraction),
        Action::Fold | Action::Call => 0,
    };
    state.apply(actor, action, amount)?;
    Ok(())
}

/// [`act`] on a copy of `state`.
pub(crate) fn apply_action(
    state: &GameState,
    action: Action,
    raise_fraction: f64,
) -> Result<GameState, SearchError> {
    let mut next = state.snapshot();
    act(&mut next, action, raise_fraction)?;
    Ok(next)
}

/// [`act`] followed by [`close_streets`], in place.
pub(crate) fn step<R: Rng + ?Sized>(
    state: &mut GameState,
    action: Action,
    raise_fraction: f64,
    rng: &mut R,
) -> Result<(), SearchError> {
    act(state, action, raise_fraction)?;
    close_streets(state, rng)
}

/// Deal the next street at random and open its betting.
pub(crate) fn reveal<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Result<(), SearchError> {
    state.reveal_next_street(rng)?;
    if state.street() != Street::Showdown {
        let start = state.postflop_start();
        state.begin_street(start);
    }
    Ok(())
}

/// Keep revealing streets until someone is due to act or the hand is over.
pub(crate) fn close_streets<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Result<(), SearchError> {
    while !state.hand_over() && state.current().is_none() {
        reveal(state, rng)?;
    }
    Ok(())
}

/// Run out the board and report whether `seat` holds the best live hand.
/// A tie counts as a win.
pub(crate) fn wins_showdown(state: &mut GameState, seat: usize) -> Result<bool, SearchError> {
    state.run_out_board()?;
    let ranks = rank_live(state)?;
    let Some(mine) = ranks.get(seat).copied().flatten() else {
        return Ok(false);
    };
    Ok(ranks.iter().flatten().all(|r| mine <= *r))
}

/// `+1` for a win and `-1` for a loss from `seat`'s point of view, for a hand
/// that is over or about to be shown down.
pub(crate) fn terminal_reward(state: &mut GameState, seat: usize) -> Result<f64, SearchError> {
    let me = state.player(seat)?;
    if me.folded() {
        return Ok(-1.0);
    }
    if state.live_count() == 1 {
        return Ok(1.0);
    }
    Ok(if wins_showdown(state, seat)? { 1.0 } else { -1.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::HoleCards;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn stepping_a_snapshot_leaves_the_original_alone() {
        let mut state = GameState::new(&[100, 100], 5);
        state.post_blinds(0, 1).unwrap();
        state.begin_street(0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut next = state.snapshot();
        step(&mut next, Action::Raise, 0.5, &mut rng).unwrap();
        assert_eq!(state.pot(), 15);
        assert!(next.pot() > 15);
    }

    #[test]
    fn calling_down_reveals_the_flop() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = GameState::new(&[100, 100], 5);
        state.start_hand(1, &mut rng).unwrap();
        state.post_blinds(0, 1).unwrap();
        state.begin_street(0);
        step(&mut state, Action::Call, 0.5, &mut rng).unwrap();
        // big blind still has the option
        assert_eq!(state.board().len(), 0);
        step(&mut state, Action::Call, 0.5, &mut rng).unwrap();
        assert_eq!(state.board().len(), 3);
        assert_eq!(state.current(), Some(0));
    }

    #[test]
    fn folded_seat_scores_minus_one_and_survivor_plus_one() {
        let mut state = GameState::new(&[100, 100], 5);
        state.post_blinds(0, 1).unwrap();
        state.begin_street(0);
        state.apply(0, Action::Fold, 0).unwrap();
        assert_eq!(terminal_reward(&mut state.clone(), 0).unwrap(), -1.0);
        assert_eq!(terminal_reward(&mut state, 1).unwrap(), 1.0);
    }

    #[test]
    fn showdown_ties_count_as_wins() {
        let mut state = GameState::new(&[100, 100], 5);
        state.set_hole(0, "2c 3d".parse::<HoleCards>().unwrap()).unwrap();
        state.set_hole(1, "2d 3c".parse::<HoleCards>().unwrap()).unwrap();
        state.board = "As Ks Qh Jh Td".parse().unwrap();
        state.street = Street::River;
        assert!(wins_showdown(&mut state.clone(), 0).unwrap());
        assert!(wins_showdown(&mut state, 1).unwrap());
    }
}

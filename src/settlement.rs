use crate::evaluator::{rank_hand, EvalError, HandRank};
use crate::game::{GameState, HandHistoryVerb, StateError};

/// Chips paid out at the end of a hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    /// Chips awarded, indexed by seat.
    pub awards: Vec<u64>,
    /// Chips from pot layers no live player contributed to.
    pub unawarded: u64,
}

impl Settlement {
    fn new(seats: usize) -> Self {
        Self { awards: vec![0; seats], unawarded: 0 }
    }

    pub fn total_awarded(&self) -> u64 {
        self.awards.iter().sum()
    }

    /// Seats that received chips.
    pub fn winners(&self) -> Vec<usize> {
        self.awards.iter().enumerate().filter(|(_, &a)| a > 0).map(|(i, _)| i).collect()
    }
}

/// Rank every live player's hand against the board. Folded seats and seats
/// without cards get `None`.
pub fn rank_live(state: &GameState) -> Result<Vec<Option<HandRank>>, EvalError> {
    let board = state.board().as_slice();
    state
        .players()
        .iter()
        .map(|p| match p.hole() {
            Some(hole) if !p.folded() => rank_hand(&hole, board).map(Some),
            _ => Ok(None),
        })
        .collect()
}

/// Give the whole pot to the only live player.
pub fn award_uncontested(state: &mut GameState) -> Result<Settlement, StateError> {
    let mut out = Settlement::new(state.players().len());
    let pot = state.pot();
    let survivor = state.live_seats().next();
    match survivor {
        Some(seat) => {
            let paid = state.award(seat, pot)?;
            out.awards[seat] = paid;
            state.record(seat, HandHistoryVerb::Win, paid);
        }
        None => {
            out.unawarded = state.burn_pot(pot);
            tracing::warn!(target: "poker_arena::settlement", chips = out.unawarded, "no live player; pot unawarded");
        }
    }
    Ok(out)
}

/// Distribute the pot among live players. `ranks` is indexed by seat, lower
/// is stronger, and `None` loses to any ranked hand.
///
/// With nobody all-in the best hand takes the pot. Otherwise the pot is cut
/// into layers at every distinct hand commitment; each layer goes to the best
/// live hand among the players who committed at least that much. Ties split
/// evenly and odd chips go one at a time to the tied winners in ascending
/// (commitment, seat) order. A layer whose contributors have all folded is
/// left unawarded and reported.
pub fn settle(state: &mut GameState, ranks: &[Option<HandRank>]) -> Result<Settlement, StateError> {
    let n = state.players().len();
    let mut out = Settlement::new(n);
    let key = |seat: usize| ranks.get(seat).copied().flatten().map_or(u32::MAX, |r| u32::from(r.get()));

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&s| (state.players()[s].committed(), s));

    let anyone_all_in = state.players().iter().any(|p| p.is_all_in());
    if !anyone_all_in {
        let live: Vec<usize> = order.iter().copied().filter(|&s| !state.players()[s].folded()).collect();
        let pot = state.pot();
        distribute(state, &live, pot, &key, &mut out)?;
        return Ok(out);
    }

    let mut levels: Vec<u64> =
        state.players().iter().map(|p| p.committed()).filter(|&c| c > 0).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut prev = 0;
    for level in levels {
        let contributors = state.players().iter().filter(|p| p.committed() >= level).count() as u64;
        let slice = ((level - prev) * contributors).min(state.pot());
        prev = level;
        if slice == 0 {
            continue;
        }
        let eligible: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&s| {
                let p = &state.players()[s];
                !p.folded() && p.committed() >= level
            })
            .collect();
        if eligible.is_empty() {
            let burned = state.burn_pot(slice);
            out.unawarded += burned;
            tracing::warn!(
                target: "poker_arena::settlement",
                level,
                chips = burned,
                "side pot layer has no live contributor; left unawarded"
            );
            continue;
        }
        distribute(state, &eligible, slice, &key, &mut out)?;
    }

    // Chips not covered by commitments (none in a well-formed hand).
    let rest = state.pot();
    if rest > 0 {
        let live: Vec<usize> = order.iter().copied().filter(|&s| !state.players()[s].folded()).collect();
        distribute(state, &live, rest, &key, &mut out)?;
    }
    Ok(out)
}

fn distribute(
    state: &mut GameState,
    eligible: &[usize],
    amount: u64,
    key: &dyn Fn(usize) -> u32,
    out: &mut Settlement,
) -> Result<(), StateError> {
    let Some(best) = eligible.iter().map(|&s| key(s)).min() else {
        out.unawarded += state.burn_pot(amount);
        return Ok(());
    };
    let winners: Vec<usize> = eligible.iter().copied().filter(|&s| key(s) == best).collect();
    let count = winners.len() as u64;
    let share = amount / count;
    let mut remainder = amount % count;
    let verb = if winners.len() > 1 { HandHistoryVerb::Split } else { HandHistoryVerb::Win };
    for &seat in &winners {
        let extra = u64::from(remainder > 0);
        remainder -= extra;
        let paid = state.award(seat, share + extra)?;
        out.awards[seat] += paid;
        state.record(seat, verb, paid);
    }
    Ok(())
}

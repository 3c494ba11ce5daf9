use super::{pot_fraction_raise, seeded_rng, Agent, AgentKind};
use crate::evaluator::rank_hand;
use crate::game::{Action, GameState};
use rand::rngs::StdRng;
use rand::Rng;

/// Uniformly random play; raises by one big blind.
#[derive(Debug)]
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: seeded_rng(seed) }
    }
}

impl Agent for RandomAgent {
    fn decide(&mut self, _state: &GameState, _seat: usize) -> Action {
        Action::ALL[self.rng.random_range(0..Action::ALL.len())]
    }

    fn size_raise(&mut self, state: &GameState, _seat: usize) -> u64 {
        state.big_blind()
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Random
    }
}

/// Thresholds for a rule-based player.
///
/// Before the flop the agent looks at the sum of its hole card ranks (ace
/// counts 14); after it, at the hand rank against the board (lower is better).
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicProfile {
    pub name: &'static str,
    /// Chance of raising regardless of the cards.
    pub bluff: f64,
    pub raise_pot_fraction: f64,
    pub preflop_raise_at: u8,
    pub preflop_call_at: u8,
    /// Chance of calling anyway with a weak starting hand.
    pub preflop_loose_call: f64,
    pub postflop_raise_below: u16,
    pub postflop_call_below: u16,
    /// Chance of calling anyway with a weak made hand.
    pub postflop_loose_call: f64,
    pub seed: Option<u64>,
}

impl HeuristicProfile {
    pub fn basic() -> Self {
        Self {
            name: "basic_heuristic",
            bluff: 0.05,
            raise_pot_fraction: 0.5,
            preflop_raise_at: 20,
            preflop_call_at: 15,
            preflop_loose_call: 0.0,
            postflop_raise_below: 2000,
            postflop_call_below: 4000,
            postflop_loose_call: 0.0,
            seed: None,
        }
    }

    pub fn aggressive() -> Self {
        Self {
            name: "aggressive_heuristic",
            bluff: 0.15,
            raise_pot_fraction: 0.8,
            preflop_raise_at: 18,
            preflop_call_at: 12,
            preflop_loose_call: 0.2,
            postflop_raise_below: 3000,
            postflop_call_below: 5000,
            postflop_loose_call: 0.3,
            seed: None,
        }
    }

    /// Set a deterministic RNG seed for reproducible decisions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seeded(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for HeuristicProfile {
    fn default() -> Self {
        Self::basic()
    }
}

#[derive(Debug)]
pub struct HeuristicAgent {
    profile: HeuristicProfile,
    rng: StdRng,
}

impl HeuristicAgent {
    pub fn new(profile: HeuristicProfile) -> Self {
        let rng = seeded_rng(profile.seed);
        Self { profile, rng }
    }

    pub fn profile(&self) -> &HeuristicProfile {
        &self.profile
    }

    fn roll(&mut self, p: f64) -> bool {
        p > 0.0 && self.rng.random::<f64>() < p
    }
}

impl Agent for HeuristicAgent {
    fn decide(&mut self, state: &GameState, seat: usize) -> Action {
        if self.roll(self.profile.bluff) {
            return Action::Raise;
        }
        let Some(hole) = state.players().get(seat).and_then(|p| p.hole()) else {
            return Action::Call;
        };
        let p = &self.profile;

        if state.board().len() < 3 {
            let sum = hole.first().rank().value() + hole.second().rank().value();
            if sum >= p.preflop_raise_at {
                return Action::Raise;
            }
            if sum >= p.preflop_call_at {
                return Action::Call;
            }
            let loose = p.preflop_loose_call;
            return if self.roll(loose) { Action::Call } else { Action::Fold };
        }

        let rank = match rank_hand(&hole, state.board().as_slice()) {
            Ok(r) => r.get(),
            Err(err) => {
                tracing::warn!(target: "poker_arena::heuristic", seat, error = %err, "cannot rank hand; calling");
                return Action::Call;
            }
        };
        if rank < p.postflop_raise_below {
            Action::Raise
        } else if rank < p.postflop_call_below {
            Action::Call
        } else {
            let loose = p.postflop_loose_call;
            if state.to_call(seat) == 0 || self.roll(loose) {
                Action::Call
            } else {
                Action::Fold
            }
        }
    }

    fn size_raise(&mut self, state: &GameState, seat: usize) -> u64 {
        pot_fraction_raise(state, seat, self.profile.raise_pot_fraction)
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Heuristic
    }
}

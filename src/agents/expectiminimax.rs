use super::search::{self, SearchError};
use super::{pot_fraction_raise, seeded_rng, Agent, AgentKind};
use crate::evaluator::rank_hand;
use crate::game::{Action, GameState};
use rand::rngs::StdRng;

/// Tuning for [`ExpectiminimaxAgent`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectiminimaxConfig {
    pub max_depth: usize,
    /// Upper bound on sampled deals per chance node; the count used is
    /// `min(max_chance_samples, depth * 2)`.
    pub max_chance_samples: usize,
    pub raise_pot_fraction: f64,
    /// Once this many nodes have been visited, the rest are scored as leaves.
    pub node_budget: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for ExpectiminimaxConfig {
    fn default() -> Self {
        Self { max_depth: 3, max_chance_samples: 5, raise_pot_fraction: 0.6, node_budget: None, seed: None }
    }
}

impl ExpectiminimaxConfig {
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_chance_samples(mut self, samples: usize) -> Self {
        self.max_chance_samples = samples;
        self
    }

    pub fn with_raise_pot_fraction(mut self, fraction: f64) -> Self {
        self.raise_pot_fraction = fraction;
        self
    }

    pub fn with_node_budget(mut self, nodes: usize) -> Self {
        self.node_budget = Some(nodes);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seeded(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The searching seat decides.
    Max,
    /// An opponent decides.
    Min,
    /// The street is closed and community cards are pending.
    Chance,
}

impl NodeKind {
    /// Kind of the node for `state` searched on behalf of `seat`; `None` when
    /// the hand is over or only the showdown is left.
    pub fn of(state: &GameState, seat: usize) -> Option<NodeKind> {
        if state.hand_over() {
            return None;
        }
        match state.current() {
            Some(actor) if actor == seat => Some(NodeKind::Max),
            Some(_) => Some(NodeKind::Min),
            None if !state.board().is_complete() => Some(NodeKind::Chance),
            None => None,
        }
    }
}

/// Values of the three root actions, in `Action::ALL` order, and the pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootEvaluation {
    pub values: [f64; 3],
    pub chosen: Action,
    pub nodes: usize,
}

/// Depth-bounded expectiminimax over a determinized copy of the hand.
#[derive(Debug)]
pub struct ExpectiminimaxAgent {
    config: ExpectiminimaxConfig,
    rng: StdRng,
    nodes: usize,
}

impl ExpectiminimaxAgent {
    pub fn new(config: ExpectiminimaxConfig) -> Self {
        let rng = seeded_rng(config.seed);
        Self { config, rng, nodes: 0 }
    }

    pub fn config(&self) -> &ExpectiminimaxConfig {
        &self.config
    }

    /// Folding concedes the whole pot.
    pub fn fold_value(state: &GameState) -> f64 {
        -(state.pot() as f64)
    }

    /// Score fold, call and raise at the root. Fold is scored directly; the
    /// others recurse. Strict `>` keeps the earlier action on ties.
    pub fn evaluate_root(&mut self, state: &GameState, seat: usize) -> Result<RootEvaluation, SearchError> {
        let root = state.determinize_for(seat, &mut self.rng)?;
        self.nodes = 0;
        let depth = self.config.max_depth.saturating_sub(1);

        let mut values = [0.0; 3];
        let mut chosen = Action::Fold;
        let mut best = f64::NEG_INFINITY;
        for (i, action) in Action::ALL.into_iter().enumerate() {
            values[i] = match action {
                Action::Fold => Self::fold_value(&root),
                Action::Call | Action::Raise => {
                    let child = search::apply_action(&root, action, self.config.raise_pot_fraction)?;
                    self.value(&child, depth, seat)?
                }
            };
            if values[i] > best {
                best = values[i];
                chosen = action;
            }
        }
        Ok(RootEvaluation { values, chosen, nodes: self.nodes })
    }

    fn budget_spent(&self) -> bool {
        self.config.node_budget.is_some_and(|b| self.nodes > b)
    }

    fn value(&mut self, state: &GameState, depth: usize, seat: usize) -> Result<f64, SearchError> {
        self.nodes += 1;
        if depth == 0 || self.budget_spent() {
            return self.leaf_value(state, seat);
        }
        let Some(kind) = NodeKind::of(state, seat) else {
            return self.leaf_value(state, seat);
        };

        match kind {
            NodeKind::Chance => {
                let samples = self.config.max_chance_samples.min(depth * 2).max(1);
                let mut total = 0.0;
                for _ in 0..samples {
                    let mut dealt = state.snapshot();
                    search::reveal(&mut dealt, &mut self.rng)?;
                    total += self.value(&dealt, depth - 1, seat)?;
                }
                Ok(total / samples as f64)
            }
            NodeKind::Max => {
                let mut best = Self::fold_value(state);
                for action in [Action::Call, Action::Raise] {
                    let child = search::apply_action(state, action, self.config.raise_pot_fraction)?;
                    best = best.max(self.value(&child, depth - 1, seat)?);
                }
                Ok(best)
            }
            NodeKind::Min => {
                let mut worst = f64::INFINITY;
                for action in Action::ALL {
                    let child = search::apply_action(state, action, self.config.raise_pot_fraction)?;
                    worst = worst.min(self.value(&child, depth - 1, seat)?);
                }
                Ok(worst)
            }
        }
    }

    /// Folded: lose what was committed. Last one standing: win the pot.
    /// Otherwise the normalized strength of the hand, with the flop dealt at
    /// random if it is not out yet.
    fn leaf_value(&mut self, state: &GameState, seat: usize) -> Result<f64, SearchError> {
        let me = state.player(seat)?;
        if me.folded() {
            return Ok(-(me.committed() as f64));
        }
        if state.live_count() == 1 {
            return Ok(state.pot() as f64);
        }
        let Some(hole) = me.hole() else {
            return Ok(0.0);
        };
        if state.board().len() >= 3 {
            return Ok(rank_hand(&hole, state.board().as_slice())?.normalized());
        }
        let mut dealt = state.snapshot();
        while dealt.board().len() < 3 {
            dealt.reveal_next_street(&mut self.rng)?;
        }
        Ok(rank_hand(&hole, dealt.board().as_slice())?.normalized())
    }
}

impl Agent for ExpectiminimaxAgent {
    fn decide(&mut self, state: &GameState, seat: usize) -> Action {
        match self.evaluate_root(state, seat) {
            Ok(eval) => {
                tracing::debug!(
                    target: "poker_arena::expectiminimax",
                    seat,
                    chosen = %eval.chosen,
                    values = ?eval.values,
                    nodes = eval.nodes,
                    "search finished"
                );
                eval.chosen
            }
            Err(err) => {
                tracing::warn!(target: "poker_arena::expectiminimax", seat, error = %err, "search failed; calling");
                Action::Call
            }
        }
    }

    fn size_raise(&mut self, state: &GameState, seat: usize) -> u64 {
        pot_fraction_raise(state, seat, self.config.raise_pot_fraction)
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Expectiminimax
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::HoleCards;
    use rand::SeedableRng;

    fn leaf_agent() -> ExpectiminimaxAgent {
        ExpectiminimaxAgent::new(ExpectiminimaxConfig::default().with_seed(1))
    }

    #[test]
    fn folded_and_surviving_leaves() {
        let mut s = GameState::new(&[100, 100], 5);
        s.post_blinds(0, 1).unwrap();
        s.begin_street(0);
        s.apply(0, Action::Fold, 0).unwrap();
        let mut agent = leaf_agent();
        // the survivor takes the pot, the folder loses what it put in
        assert_eq!(agent.leaf_value(&s, 1).unwrap(), 15.0);
        assert_eq!(agent.leaf_value(&s, 0).unwrap(), -5.0);
    }

    #[test]
    fn contested_leaf_is_normalized_strength() {
        let mut s = GameState::new(&[100, 100], 5);
        let hole: HoleCards = "As Ah".parse().unwrap();
        s.set_hole(0, hole).unwrap();
        s.set_hole(1, "9c 8c".parse::<HoleCards>().unwrap()).unwrap();
        s.board = "Kd 7c 4s 3h 2d".parse().unwrap();
        let expected = rank_hand(&hole, s.board().as_slice()).unwrap().normalized();
        assert_eq!(leaf_agent().leaf_value(&s, 0).unwrap(), expected);
    }

    #[test]
    fn node_kinds_follow_the_actor() {
        let mut s = GameState::new(&[100, 100], 5);
        s.post_blinds(0, 1).unwrap();
        s.begin_street(0);
        assert_eq!(NodeKind::of(&s, 0), Some(NodeKind::Max));
        assert_eq!(NodeKind::of(&s, 1), Some(NodeKind::Min));
        s.apply(0, Action::Call, 0).unwrap();
        s.apply(1, Action::Call, 0).unwrap();
        assert_eq!(NodeKind::of(&s, 0), Some(NodeKind::Chance));
    }

    #[test]
    fn node_budget_limits_the_search() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut s = GameState::new(&[300, 300, 300], 5);
        s.start_hand(2, &mut rng).unwrap();
        s.post_blinds(0, 1).unwrap();
        s.begin_street(2);
        let config = ExpectiminimaxConfig::default().with_max_depth(6).with_seed(1);
        let full = ExpectiminimaxAgent::new(config.clone()).evaluate_root(&s, 2).unwrap();
        let capped =
            ExpectiminimaxAgent::new(config.with_node_budget(20)).evaluate_root(&s, 2).unwrap();
        // open sibling loops may each finish after the budget is spent
        assert!(capped.nodes <= 20 + 1 + 6 * 4);
        assert!(capped.nodes < full.nodes);
    }
}

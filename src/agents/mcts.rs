use super::search::{self, SearchError};
use super::{pot_fraction_raise, seeded_rng, Agent, AgentKind};
use crate::game::{Action, GameState};
use rand::rngs::StdRng;
use rand::Rng;
use std::time::{Duration, Instant};

/// Tuning for [`MctsAgent`].
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Rollouts per decision.
    pub simulations: usize,
    /// UCB1 exploration constant.
    pub exploration: f64,
    pub raise_pot_fraction: f64,
    /// Random actions allowed in one rollout before the board is run out.
    pub max_rollout_actions: usize,
    /// Stop early once this much wall-clock time has passed.
    pub time_budget: Option<Duration>,
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            simulations: 1000,
            exploration: std::f64::consts::SQRT_2,
            raise_pot_fraction: 0.75,
            max_rollout_actions: 400,
            time_budget: None,
            seed: None,
        }
    }
}

impl MctsConfig {
    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_raise_pot_fraction(mut self, fraction: f64) -> Self {
        self.raise_pot_fraction = fraction;
        self
    }

    pub fn with_max_rollout_actions(mut self, n: usize) -> Self {
        self.max_rollout_actions = n;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Set a deterministic RNG seed for reproducible searches.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seeded(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Root statistics of the last search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSummary {
    /// Rollouts actually run.
    pub simulations: usize,
    pub root_visits: u32,
    /// `(action, visits, mean reward)` per expanded root child.
    pub children: Vec<(Action, u32, f64)>,
    pub chosen: Action,
}

#[derive(Debug)]
struct Node {
    parent: Option<usize>,
    action: Option<Action>,
    children: Vec<usize>,
    untried: Vec<Action>,
    visits: u32,
    value: f64,
}

impl Node {
    /// `open` is false for a node where nobody is due to act.
    fn new(open: bool, parent: Option<usize>, action: Option<Action>) -> Self {
        let untried = if open { Action::ALL.to_vec() } else { Vec::new() };
        Self { parent, action, children: Vec::new(), untried, visits: 0, value: 0.0 }
    }

    fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value / f64::from(self.visits)
        }
    }
}

fn is_open(state: &GameState) -> bool {
    !state.hand_over() && state.current().is_some()
}

/// Monte-Carlo tree search over determinized copies of the hand.
///
/// Tree nodes hold statistics only and live in an arena, pointing at their
/// parent by index. Each simulation deals a fresh determinization, replays
/// the tree path on it in place, expands one action, then plays uniformly
/// random actions to the end of the hand and scores `+1`/`-1` for the
/// searching seat. The most visited root child is played; with no children
/// the agent calls.
#[derive(Debug)]
pub struct MctsAgent {
    config: MctsConfig,
    rng: StdRng,
    last: Option<SearchSummary>,
}

impl MctsAgent {
    pub fn new(config: MctsConfig) -> Self {
        let rng = seeded_rng(config.seed);
        Self { config, rng, last: None }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn last_search(&self) -> Option<&SearchSummary> {
        self.last.as_ref()
    }

    /// Run one full search for `seat` and report root statistics.
    pub fn search(&mut self, state: &GameState, seat: usize) -> Result<SearchSummary, SearchError> {
        let mut arena = vec![Node::new(is_open(state), None, None)];
        let started = Instant::now();
        let mut run = 0;

        while run < self.config.simulations {
            if self.config.time_budget.is_some_and(|b| started.elapsed() >= b) {
                break;
            }
            let mut sim = state.determinize_for(seat, &mut self.rng)?;
            let leaf = self.descend(&mut arena, &mut sim)?;
            let reward = self.rollout(&mut sim, seat)?;
            backpropagate(&mut arena, leaf, reward);
            run += 1;
        }

        let children: Vec<(Action, u32, f64)> = arena[0]
            .children
            .iter()
            .filter_map(|&c| arena[c].action.map(|a| (a, arena[c].visits, arena[c].mean())))
            .collect();
        // robust child: most visits, first expanded wins ties
        let chosen = children
            .iter()
            .fold(None::<(Action, u32)>, |best, &(a, v, _)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((a, v)),
            })
            .map_or(Action::Call, |(a, _)| a);

        Ok(SearchSummary { simulations: run, root_visits: arena[0].visits, children, chosen })
    }

    /// Walk from the root by UCB1, replaying each chosen action on `sim`, and
    /// expand one untried action where the walk stops. Returns the node the
    /// rollout starts from.
    fn descend(&mut self, arena: &mut Vec<Node>, sim: &mut GameState) -> Result<usize, SearchError> {
        let mut idx = 0;
        loop {
            if !arena[idx].untried.is_empty() {
                let pick = self.rng.random_range(0..arena[idx].untried.len());
                let action = arena[idx].untried.swap_remove(pick);
                search::step(sim, action, self.config.raise_pot_fraction, &mut self.rng)?;
                let child = arena.len();
                arena.push(Node::new(is_open(sim), Some(idx), Some(action)));
                arena[idx].children.push(child);
                return Ok(child);
            }
            let Some(next) = select_child(arena, idx, self.config.exploration) else {
                return Ok(idx);
            };
            if let Some(action) = arena[next].action {
                search::step(sim, action, self.config.raise_pot_fraction, &mut self.rng)?;
            }
            idx = next;
        }
    }

    fn rollout(&mut self, sim: &mut GameState, seat: usize) -> Result<f64, SearchError> {
        let mut steps = 0;
        while !sim.hand_over() {
            match sim.current() {
                Some(actor) if steps < self.config.max_rollout_actions => {
                    let action = Action::ALL[self.rng.random_range(0..Action::ALL.len())];
                    let amount = match action {
                        Action::Raise => pot_fraction_raise(sim, actor, self.config.raise_pot_fraction),
                        Action::Fold | Action::Call => 0,
                    };
                    sim.apply(actor, action, amount)?;
                    steps += 1;
                    if sim.player(seat)?.folded() {
                        return Ok(-1.0);
                    }
                }
                Some(_) => {
                    sim.force_settle();
                    sim.run_out_board()?;
                }
                None => search::close_streets(sim, &mut self.rng)?,
            }
        }
        search::terminal_reward(sim, seat)
    }
}

/// Child of `idx` with the highest UCB1 score; the first one wins ties.
fn select_child(arena: &[Node], idx: usize, c: f64) -> Option<usize> {
    let node = &arena[idx];
    let parent_visits = f64::from(node.visits.max(1));
    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;
    for &child in &node.children {
        let score = ucb1(&arena[child], parent_visits, c);
        if best.is_none() || score > best_score {
            best = Some(child);
            best_score = score;
        }
    }
    best
}

fn ucb1(child: &Node, parent_visits: f64, c: f64) -> f64 {
    if child.visits == 0 {
        return f64::INFINITY;
    }
    let n = f64::from(child.visits);
    child.mean() + c * (2.0 * parent_visits.ln() / n).sqrt()
}

fn backpropagate(arena: &mut [Node], leaf: usize, reward: f64) {
    let mut cursor = Some(leaf);
    while let Some(i) = cursor {
        arena[i].visits += 1;
        arena[i].value += reward;
        cursor = arena[i].parent;
    }
}

impl Agent for MctsAgent {
    fn decide(&mut self, state: &GameState, seat: usize) -> Action {
        match self.search(state, seat) {
            Ok(summary) => {
                tracing::debug!(
                    target: "poker_arena::mcts",
                    seat,
                    simulations = summary.simulations,
                    chosen = %summary.chosen,
                    children = ?summary.children,
                    "search finished"
                );
                let chosen = summary.chosen;
                self.last = Some(summary);
                chosen
            }
            Err(err) => {
                tracing::warn!(target: "poker_arena::mcts", seat, error = %err, "search failed; calling");
                self.last = None;
                Action::Call
            }
        }
    }

    fn size_raise(&mut self, state: &GameState, seat: usize) -> u64 {
        pot_fraction_raise(state, seat, self.config.raise_pot_fraction)
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Mcts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn heads_up() -> GameState {
        let mut rng = StdRng::seed_from_u64(11);
        let mut s = GameState::new(&[500, 500], 5);
        s.start_hand(1, &mut rng).unwrap();
        s.post_blinds(0, 1).unwrap();
        s.begin_street(0);
        s
    }

    #[test]
    fn default_exploration_is_root_two() {
        let config = MctsConfig::default();
        assert_eq!(config.exploration, std::f64::consts::SQRT_2);
        assert_eq!(config.simulations, 1000);
    }

    #[test]
    fn unvisited_children_are_preferred() {
        let mut fresh = Node::new(true, Some(0), Some(Action::Call));
        assert_eq!(ucb1(&fresh, 10.0, 1.0), f64::INFINITY);
        fresh.visits = 2;
        fresh.value = 1.0;
        let expected = 0.5 + (2.0 * 10f64.ln() / 2.0).sqrt();
        assert!((ucb1(&fresh, 10.0, 1.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn selection_takes_the_best_ucb_child() {
        let mut arena = vec![Node::new(true, None, None)];
        arena[0].visits = 10;
        for (action, visits, value) in [(Action::Fold, 5, -5.0), (Action::Call, 5, 3.0)] {
            let mut child = Node::new(true, Some(0), Some(action));
            child.visits = visits;
            child.value = value;
            arena.push(child);
            let i = arena.len() - 1;
            arena[0].children.push(i);
        }
        assert_eq!(select_child(&arena, 0, 1.0), Some(2));
        assert_eq!(select_child(&arena, 1, 1.0), None);
    }

    #[test]
    fn backpropagation_reaches_the_root() {
        let mut arena = vec![Node::new(true, None, None)];
        arena.push(Node::new(true, Some(0), Some(Action::Call)));
        arena.push(Node::new(false, Some(1), Some(Action::Raise)));
        backpropagate(&mut arena, 2, -1.0);
        assert!(arena.iter().all(|n| n.visits == 1 && n.value == -1.0));
    }

    #[test]
    fn closed_nodes_have_nothing_to_expand() {
        let mut s = heads_up();
        assert!(is_open(&s));
        s.apply(0, Action::Fold, 0).unwrap();
        assert!(!is_open(&s));
        assert!(Node::new(is_open(&s), None, None).untried.is_empty());
    }

    #[test]
    fn seeded_searches_agree() {
        let s = heads_up();
        let config = MctsConfig::default().with_simulations(60).with_seed(5);
        let a = MctsAgent::new(config.clone()).search(&s, 0).unwrap();
        let b = MctsAgent::new(config).search(&s, 0).unwrap();
        assert_eq!(a, b);
    }
}

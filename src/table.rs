//! Table driver: deals hands to a roster of agents and reports the results.

use crate::agents::Agent;
use crate::betting::{run_street, DEFAULT_MAX_STREET_ACTIONS};
use crate::evaluator::EvalError;
use crate::game::{GameState, HandHistoryEntry, StateError, Street};
use crate::settlement::{award_uncontested, rank_live, settle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub small_blind: u64,
    pub starting_stack: u64,
    pub max_hands: usize,
    pub max_street_actions: usize,
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            small_blind: 10,
            starting_stack: 1000,
            max_hands: 10,
            max_street_actions: DEFAULT_MAX_STREET_ACTIONS,
            seed: None,
        }
    }
}

impl TableConfig {
    pub fn with_small_blind(mut self, sb: u64) -> Self {
        self.small_blind = sb;
        self
    }

    pub fn with_starting_stack(mut self, stack: u64) -> Self {
        self.starting_stack = stack;
        self
    }

    pub fn with_max_hands(mut self, hands: usize) -> Self {
        self.max_hands = hands;
        self
    }

    pub fn with_max_street_actions(mut self, actions: usize) -> Self {
        self.max_street_actions = actions;
        self
    }

    /// Seed the shuffler for reproducible deals.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn big_blind(&self) -> u64 {
        self.small_blind.saturating_mul(2)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TableError {
    #[error("a table needs at least two agents, got {0}")]
    NotEnoughPlayers(usize),
    #[error("small blind must be positive")]
    ZeroBlind,
    #[error("starting stack must be positive")]
    ZeroStack,
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerStanding {
    pub id: usize,
    pub stack: u64,
}

/// Outcome of one hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandResult {
    /// Zero-based hand number.
    pub hand: usize,
    pub standings: Vec<PlayerStanding>,
    /// Seats that were paid from the pot.
    pub winners: Vec<usize>,
    pub showdown: bool,
    /// Streets closed by the action ceiling.
    pub forced_settlements: usize,
    /// Chips from side-pot layers nobody live contributed to.
    pub unawarded: u64,
    pub history: Vec<HandHistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub hands: Vec<HandResult>,
    pub final_stacks: Vec<PlayerStanding>,
    /// Largest stack; the lower seat wins ties.
    pub winner: usize,
}

/// A table of agents sharing one [`GameState`].
pub struct Table {
    config: TableConfig,
    state: GameState,
    agents: Vec<Box<dyn Agent>>,
    rng: ChaCha8Rng,
    hands_played: usize,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<_> = self.agents.iter().map(|a| a.kind()).collect();
        f.debug_struct("Table")
            .field("config", &self.config)
            .field("agents", &kinds)
            .field("hands_played", &self.hands_played)
            .finish()
    }
}

impl Table {
    pub fn new(config: TableConfig, agents: Vec<Box<dyn Agent>>) -> Result<Self, TableError> {
        if agents.len() < 2 {
            return Err(TableError::NotEnoughPlayers(agents.len()));
        }
        if config.small_blind == 0 {
            return Err(TableError::ZeroBlind);
        }
        if config.starting_stack == 0 {
            return Err(TableError::ZeroStack);
        }
        let stacks = vec![config.starting_stack; agents.len()];
        let state = GameState::new(&stacks, config.small_blind);
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Ok(Self { config, state, agents, rng, hands_played: 0 })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn hands_played(&self) -> usize {
        self.hands_played
    }

    pub fn standings(&self) -> Vec<PlayerStanding> {
        self.state.players().iter().map(|p| PlayerStanding { id: p.id(), stack: p.stack() }).collect()
    }

    /// Play one hand. `None` once fewer than two players hold chips.
    ///
    /// Positions rotate over the players still holding chips: the dealer is
    /// `hand % active`, blinds follow it, pre-flop action opens after the big
    /// blind and post-flop action after the dealer.
    pub fn play_hand(&mut self) -> Result<Option<HandResult>, TableError> {
        let active: Vec<usize> = self
            .state
            .players()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.stack() > 0)
            .map(|(i, _)| i)
            .collect();
        let n = active.len();
        if n < 2 {
            return Ok(None);
        }
        let hand = self.hands_played;
        let seat_at = |offset: usize| active[(hand + offset) % n];

        self.state.start_hand(seat_at(0), &mut self.rng)?;
        self.state.post_blinds(seat_at(1), seat_at(2))?;

        let mut forced = 0;
        let mut start = seat_at(3);
        loop {
            let report =
                run_street(&mut self.state, start, &mut self.agents, self.config.max_street_actions)?;
            forced += usize::from(report.forced);
            if self.state.live_count() <= 1 || self.state.street() == Street::River {
                break;
            }
            self.state.advance_street()?;
            start = self.state.postflop_start();
        }

        let showdown = self.state.live_count() > 1;
        let settlement = if showdown {
            self.state.run_out_board()?;
            let ranks = rank_live(&self.state)?;
            settle(&mut self.state, &ranks)?
        } else {
            award_uncontested(&mut self.state)?
        };

        self.hands_played += 1;
        let result = HandResult {
            hand,
            standings: self.standings(),
            winners: settlement.winners(),
            showdown,
            forced_settlements: forced,
            unawarded: settlement.unawarded,
            history: self.state.history().to_vec(),
        };
        tracing::info!(
            target: "poker_arena::table",
            hand,
            winners = ?result.winners,
            showdown,
            awarded = settlement.total_awarded(),
            stacks = ?result.standings.iter().map(|s| s.stack).collect::<Vec<_>>(),
            "hand complete"
        );
        Ok(Some(result))
    }

    /// Play up to `max_hands` hands, stopping early when one player has
    /// every chip.
    pub fn play_match(&mut self) -> Result<MatchResult, TableError> {
        let mut hands = Vec::new();
        while self.hands_played < self.config.max_hands {
            match self.play_hand()? {
                Some(result) => hands.push(result),
                None => break,
            }
        }
        let final_stacks = self.standings();
        let mut winner = 0;
        for (seat, s) in final_stacks.iter().enumerate() {
            if s.stack > final_stacks[winner].stack {
                winner = seat;
            }
        }
        Ok(MatchResult { hands, final_stacks, winner })
    }
}

//! poker-arena: no-limit hold'em hands played by search-based agents
//!
//! Goals:
//! - A betting state machine and side-pot settlement that never lose a chip
//! - MCTS and expectiminimax agents that search private snapshots of the hand
//! - Reproducible runs: every random source is an injected, seedable generator
//!
//! ## Quick start: a seeded match
//! ```
//! use poker_arena::agents::AgentSpec;
//! use poker_arena::table::{Table, TableConfig};
//!
//! let agents = vec![
//!     AgentSpec::BasicHeuristic.build(Some(1)),
//!     AgentSpec::Random.build(Some(2)),
//! ];
//! let config = TableConfig::default().with_max_hands(3).with_seed(7);
//! let mut table = Table::new(config, agents).unwrap();
//! let result = table.play_match().unwrap();
//!
//! let chips: u64 = result.final_stacks.iter().map(|s| s.stack).sum::<u64>()
//!     + result.hands.iter().map(|h| h.unawarded).sum::<u64>();
//! assert_eq!(chips, 2000);
//! ```
//!
//! ## CLI
//! ```sh
//! cargo run --release --bin arena -- --agents mcts,expectiminimax --games 5
//! ```

pub mod agents;
pub mod betting;
pub mod cards;
pub mod deck;
pub mod evaluator;
pub mod game;
pub mod hand;
pub mod settlement;
pub mod table;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use anyhow::{bail, Context};
use clap::Parser;
use poker_arena::agents::AgentSpec;
use poker_arena::table::{Table, TableConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// Pit poker agents against each other over a batch of matches.
#[derive(Debug, Parser)]
#[command(name = "arena", author, version, about = "No-limit hold'em agent arena")]
struct Cli {
    /// Comma-separated roster: random, basic_heuristic, aggressive_heuristic,
    /// mcts, expectiminimax.
    #[arg(long, value_name = "LIST", value_delimiter = ',', default_value = "mcts,expectiminimax")]
    agents: Vec<AgentSpec>,

    /// Matches to play.
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Hand limit per match.
    #[arg(long, value_name = "HANDS", default_value_t = 10)]
    max_hands: usize,

    #[arg(long, default_value_t = 1000)]
    stack: u64,

    #[arg(long, default_value_t = 10)]
    small_blind: u64,

    /// Seed for deals and agents; omitted means OS entropy.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    if cli.agents.len() < 2 {
        bail!("need at least two agents, got {}", cli.agents.len());
    }

    let mut wins = vec![0usize; cli.agents.len()];
    let mut chips = vec![0u64; cli.agents.len()];

    for game in 0..cli.games {
        let game_seed = cli.seed.map(|s| s.wrapping_add(game as u64 * 1_000_003));
        let agents = cli
            .agents
            .iter()
            .enumerate()
            .map(|(seat, spec)| spec.build(game_seed.map(|s| s.wrapping_add(seat as u64 + 1))))
            .collect();
        let mut config = TableConfig::default()
            .with_small_blind(cli.small_blind)
            .with_starting_stack(cli.stack)
            .with_max_hands(cli.max_hands);
        config.seed = game_seed;

        let mut table = Table::new(config, agents).with_context(|| format!("setting up game {game}"))?;
        let result = table.play_match().with_context(|| format!("playing game {game}"))?;

        wins[result.winner] += 1;
        for s in &result.final_stacks {
            chips[s.id] += s.stack;
        }
        let stacks: Vec<String> =
            result.final_stacks.iter().map(|s| format!("{}={}", cli.agents[s.id], s.stack)).collect();
        println!(
            "game {:>3}: {} hands, winner {} ({})",
            game + 1,
            result.hands.len(),
            cli.agents[result.winner],
            stacks.join(" ")
        );
    }

    println!();
    println!("{:<4}{:<24}{:>8}{:>10}{:>14}", "seat", "agent", "wins", "win %", "avg stack");
    for (seat, spec) in cli.agents.iter().enumerate() {
        let games = cli.games.max(1) as f64;
        println!(
            "{:<4}{:<24}{:>8}{:>9.1}%{:>14.1}",
            seat,
            spec.name(),
            wins[seat],
            100.0 * wins[seat] as f64 / games,
            chips[seat] as f64 / games
        );
    }
    Ok(())
}

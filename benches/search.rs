use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use poker_arena::agents::{Agent, ExpectiminimaxAgent, ExpectiminimaxConfig, MctsAgent, MctsConfig};
use poker_arena::cards::parse_cards;
use poker_arena::evaluator::{evaluate_five, rank_hand};
use poker_arena::game::GameState;
use poker_arena::hand::HoleCards;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn heads_up() -> GameState {
    let mut rng = StdRng::seed_from_u64(17);
    let mut state = GameState::new(&[1000, 1000], 10);
    state.start_hand(1, &mut rng).expect("deal");
    state.post_blinds(0, 1).expect("blinds");
    state.begin_street(0);
    state
}

fn bench_oracle(c: &mut Criterion) {
    let five = parse_cards("Ah Kd 7s 5c 2d").expect("cards");
    let five = [five[0], five[1], five[2], five[3], five[4]];
    let hole: HoleCards = "As Ah".parse().expect("hole");
    let board = parse_cards("Ks Qs Js 3d 2c").expect("board");

    let mut g = c.benchmark_group("oracle");
    g.bench_function("evaluate_five", |b| b.iter(|| evaluate_five(black_box(&five))));
    g.bench_function("rank_hand_seven", |b| b.iter(|| rank_hand(black_box(&hole), black_box(&board))));
    g.finish();
}

fn bench_agents(c: &mut Criterion) {
    let state = heads_up();
    let mut g = c.benchmark_group("decide");
    g.sample_size(10);
    for sims in [100usize, 1000] {
        g.bench_with_input(BenchmarkId::new("mcts", sims), &sims, |b, &sims| {
            let mut agent = MctsAgent::new(MctsConfig::default().with_simulations(sims).with_seed(1));
            b.iter(|| agent.decide(black_box(&state), 0))
        });
    }
    for depth in [2usize, 3] {
        g.bench_with_input(BenchmarkId::new("expectiminimax", depth), &depth, |b, &depth| {
            let mut agent =
                ExpectiminimaxAgent::new(ExpectiminimaxConfig::default().with_max_depth(depth).with_seed(1));
            b.iter(|| agent.decide(black_box(&state), 0))
        });
    }
    g.finish();
}

criterion_group!(benches, bench_oracle, bench_agents);
criterion_main!(benches);

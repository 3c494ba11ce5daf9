use poker_arena::agents::{Agent, HumanAgent};
use poker_arena::game::{Action, GameState};
use poker_arena::table::{Table, TableConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn callers(n: usize) -> Vec<Box<dyn Agent>> {
    (0..n).map(|_| Box::new(HumanAgent::new()) as Box<dyn Agent>).collect()
}

#[test]
fn zero_stack_players_sit_out() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut s = GameState::new(&[100, 0, 100], 5);
    s.start_hand(0, &mut rng).unwrap();

    let busted = &s.players()[1];
    assert!(busted.folded());
    assert!(busted.hole().is_none());
    assert_eq!(busted.committed(), 0);
    assert_eq!(s.deck().len(), 52 - 4);
}

#[test]
fn postflop_starts_left_of_dealer_skipping_folded() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut s = GameState::new(&[100, 100, 100, 100], 5);
    s.start_hand(3, &mut rng).unwrap();
    s.post_blinds(0, 1).unwrap();
    s.begin_street(2);
    s.apply(2, Action::Call, 0).unwrap();
    s.apply(3, Action::Call, 0).unwrap();
    s.apply(0, Action::Fold, 0).unwrap();
    s.apply(1, Action::Call, 0).unwrap();
    assert_eq!(s.current(), None);

    s.advance_street().unwrap();
    assert_eq!(s.postflop_start(), 0);
    s.begin_street(s.postflop_start());
    // seat 0 folded, so seat 1 opens the flop
    assert_eq!(s.current(), Some(1));
}

#[test]
fn calling_stations_see_every_street_and_split_evenly() {
    let config = TableConfig::default().with_seed(4);
    let mut table = Table::new(config, callers(3)).unwrap();
    let hand = table.play_hand().unwrap().unwrap();
    assert!(hand.showdown);
    assert_eq!(table.state().board().len(), 5);
    let total: u64 = hand.standings.iter().map(|s| s.stack).sum();
    assert_eq!(total + hand.unawarded, 3000);
}

#[test]
fn dealer_button_moves_each_hand() {
    let config = TableConfig::default().with_seed(5);
    let mut table = Table::new(config, callers(3)).unwrap();
    let mut dealers = Vec::new();
    for _ in 0..3 {
        table.play_hand().unwrap();
        dealers.push(table.state().dealer());
    }
    assert_eq!(dealers, vec![0, 1, 2]);
}

use poker_arena::agents::{Agent, HumanAgent};
use poker_arena::betting::run_street;
use poker_arena::game::{Action, GameState, HandHistoryVerb, Street};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn history_records_blinds_and_actions() {
    let mut s = GameState::new(&[1000, 1000], 5);
    s.post_blinds(0, 1).unwrap();

    let h = s.history();
    assert_eq!(h.len(), 2);
    assert_eq!((h[0].seat, h[0].verb, h[0].amount), (0, HandHistoryVerb::SmallBlind, 5));
    assert_eq!((h[1].seat, h[1].verb, h[1].amount), (1, HandHistoryVerb::BigBlind, 10));
    assert!(h.iter().all(|e| e.street == Street::Preflop));

    s.begin_street(0);
    s.apply(0, Action::Call, 0).unwrap();
    let last = s.history().last().unwrap();
    assert_eq!((last.verb, last.amount), (HandHistoryVerb::Call, 5));
}

#[test]
fn entries_carry_their_street() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut s = GameState::new(&[1000, 1000], 5);
    s.start_hand(1, &mut rng).unwrap();
    s.post_blinds(0, 1).unwrap();
    let mut agents: Vec<Box<dyn Agent>> = vec![Box::new(HumanAgent::new()), Box::new(HumanAgent::new())];
    run_street(&mut s, 0, &mut agents, 50).unwrap();
    s.advance_street().unwrap();
    let start = s.postflop_start();
    run_street(&mut s, start, &mut agents, 50).unwrap();

    let flop: Vec<_> = s.history().iter().filter(|e| e.street == Street::Flop).collect();
    assert_eq!(flop.len(), 2);
    assert!(flop.iter().all(|e| e.verb == HandHistoryVerb::Check && e.amount == 0));
}

#[test]
fn snapshots_do_not_record() {
    let mut s = GameState::new(&[1000, 1000], 5);
    s.post_blinds(0, 1).unwrap();
    s.begin_street(0);
    let mut snap = s.snapshot();
    assert!(snap.history().is_empty());
    snap.apply(0, Action::Raise, 50).unwrap();
    assert!(snap.history().is_empty());
    assert_eq!(s.history().len(), 2);
}

#[test]
fn verb_labels() {
    assert_eq!(HandHistoryVerb::SmallBlind.label(), "SB");
    assert_eq!(HandHistoryVerb::Raise.label(), "Raise");
    assert_eq!(HandHistoryVerb::Split.label(), "Split");
}

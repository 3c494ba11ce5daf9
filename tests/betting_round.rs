use poker_arena::agents::{Agent, HumanAgent};
use poker_arena::betting::run_street;
use poker_arena::game::{Action, GameState, HandHistoryVerb};
use proptest::prelude::*;

fn scripted(script: &[(Action, u64)]) -> Box<dyn Agent> {
    let mut h = HumanAgent::new();
    for &(a, amt) in script {
        h.receive(a, amt);
    }
    Box::new(h)
}

fn verbs(state: &GameState) -> Vec<(usize, HandHistoryVerb)> {
    state.history().iter().map(|e| (e.seat, e.verb)).collect()
}

#[test]
fn blinds_heads_up() {
    let mut s = GameState::new(&[1000, 1000], 10);
    s.post_blinds(0, 1).unwrap();
    assert_eq!(s.pot(), 30);
    assert_eq!(s.current_bet(), 20);
    assert_eq!(s.players()[0].bet(), 10);
    assert_eq!(s.players()[1].bet(), 20);
}

#[test]
fn short_stack_call_goes_all_in_and_is_exempt() {
    let mut s = GameState::new(&[1000, 50], 10);
    s.begin_street(0);
    s.apply(0, Action::Raise, 100).unwrap();
    assert_eq!(s.current_bet(), 100);
    let pot_before = s.pot();

    let applied = s.apply(1, Action::Call, 0).unwrap();
    assert_eq!(applied.paid, 50);
    let p = &s.players()[1];
    assert_eq!((p.stack(), p.bet()), (0, 50));
    assert!(p.is_all_in());
    assert_eq!(s.pot(), pot_before + 50);
    assert!(s.street_complete());
    assert_eq!(s.current(), None);
}

#[test]
fn raise_reopens_action() {
    let mut s = GameState::new(&[1000, 1000, 1000], 10);
    s.post_blinds(0, 1).unwrap();
    let mut agents = vec![
        scripted(&[(Action::Raise, 40)]),
        scripted(&[(Action::Call, 0)]),
        scripted(&[(Action::Call, 0), (Action::Call, 0)]),
    ];
    let report = run_street(&mut s, 2, &mut agents, 50).unwrap();
    assert!(!report.forced);
    assert_eq!(report.actions, 4);
    assert_eq!(
        verbs(&s)[2..],
        [
            (2, HandHistoryVerb::Call),
            (0, HandHistoryVerb::Raise),
            (1, HandHistoryVerb::Call),
            (2, HandHistoryVerb::Call),
        ]
    );
    assert!(s.players().iter().all(|p| p.bet() == 60));
    assert_eq!(s.pot(), 180);
}

#[test]
fn big_blind_gets_the_option() {
    let mut s = GameState::new(&[1000, 1000], 10);
    s.post_blinds(0, 1).unwrap();
    let mut agents = vec![scripted(&[(Action::Call, 0)]), scripted(&[(Action::Raise, 20)])];
    run_street(&mut s, 0, &mut agents, 50).unwrap();
    // big blind raised, small blind called again by default
    assert_eq!(
        verbs(&s)[2..],
        [(0, HandHistoryVerb::Call), (1, HandHistoryVerb::Raise), (0, HandHistoryVerb::Call)]
    );
    assert_eq!(s.pot(), 80);
}

#[test]
fn check_round_never_folds() {
    let mut s = GameState::new(&[500, 500], 5);
    let mut agents = vec![scripted(&[(Action::Fold, 0)]), scripted(&[(Action::Fold, 0)])];
    run_street(&mut s, 0, &mut agents, 50).unwrap();
    assert_eq!(s.live_count(), 2);
    assert_eq!(verbs(&s), vec![(0, HandHistoryVerb::Check), (1, HandHistoryVerb::Check)]);
    assert_eq!(s.pot(), 0);
}

#[test]
fn first_bet_ends_the_check_round() {
    let mut s = GameState::new(&[500, 500], 5);
    let mut agents = vec![scripted(&[(Action::Raise, 25)]), scripted(&[(Action::Fold, 0)])];
    run_street(&mut s, 0, &mut agents, 50).unwrap();
    assert!(s.players()[1].folded());
    assert_eq!(s.live_count(), 1);
}

#[test]
fn action_ceiling_force_settles() {
    let mut s = GameState::new(&[1_000_000, 1_000_000], 10);
    s.post_blinds(0, 1).unwrap();
    let raises: Vec<(Action, u64)> = vec![(Action::Raise, 10); 20];
    let mut agents = vec![scripted(&raises), scripted(&raises)];
    let report = run_street(&mut s, 0, &mut agents, 4).unwrap();
    assert!(report.forced);
    assert_eq!(report.actions, 4);
    let bets: Vec<u64> = s.players().iter().map(|p| p.bet()).collect();
    assert_eq!(bets[0], bets[1]);
    assert_eq!(s.current(), None);
    assert_eq!(s.total_chips(), 2_000_000);
}

fn any_action() -> impl Strategy<Value = (Action, u64)> {
    (prop_oneof![Just(Action::Fold), Just(Action::Call), Just(Action::Raise)], 0u64..400)
}

proptest! {
    #[test]
    fn streets_conserve_chips_and_end_settled(
        stacks in prop::collection::vec(1u64..2000, 2..6),
        scripts in prop::collection::vec(prop::collection::vec(any_action(), 0..12), 6),
        blinds in any::<bool>(),
    ) {
        let n = stacks.len();
        let mut s = GameState::new(&stacks, 10);
        if blinds {
            s.post_blinds(0, 1 % n).unwrap();
        }
        let chips = s.total_chips();
        let pot_before = s.pot();
        let stacks_before: u64 = s.players().iter().map(|p| p.stack()).sum();

        let mut agents: Vec<Box<dyn Agent>> = scripts.iter().take(n).map(|sc| scripted(sc)).collect();
        let report = run_street(&mut s, 2 % n, &mut agents, 50).unwrap();

        let stacks_after: u64 = s.players().iter().map(|p| p.stack()).sum();
        prop_assert_eq!(s.total_chips(), chips);
        prop_assert_eq!(s.pot(), pot_before + (stacks_before - stacks_after));
        prop_assert!(s.street_complete());
        if !report.forced && s.live_count() > 1 {
            let open: Vec<_> = s
                .players()
                .iter()
                .filter(|p| p.can_act() && (!p.has_acted() || p.bet() < s.current_bet()))
                .collect();
            prop_assert!(open.len() <= 1, "players still owe action: {:?}", open);
        }
    }
}

//! Hand-rank oracle.
//!
//! Five-card hands are packed into a comparable [`HandValue`]. The 7462 distinct
//! values a five-card hand can take are enumerated once into a class table, which
//! turns any value into a dense [`HandRank`] where 1 is a royal flush and 7462 is
//! 7-5-4-3-2 offsuit.

use crate::cards::{Card, Rank, Suit};
use crate::hand::{validate_deal, HandError, HoleCards};
use std::sync::OnceLock;

/// Number of distinct five-card hand classes.
pub const WORST_RANK: u16 = 7462;
pub const BEST_RANK: u16 = 1;

/// Compact, comparable hand strength. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandValue(u64);

impl HandValue {
    pub const fn raw(self) -> u64 {
        self.0
    }

    // [ category | r0 | r1 | r2 | r3 | r4 ], 6 bits per rank, r0 most significant.
    fn pack(category: Category, ranks_desc: &[u8]) -> Self {
        const CAT_SHIFT: u32 = 48;
        const STRIDE: u32 = 6;
        let mut v = (category as u64) << CAT_SHIFT;
        for (i, r) in ranks_desc.iter().take(5).enumerate() {
            v |= (*r as u64) << (CAT_SHIFT - STRIDE * (i as u32 + 1));
        }
        HandValue(v)
    }
}

/// Poker hand category from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Category {
    HighCard = 0,
    Pair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub category: Category,
    pub best_five: [Card; 5],
    pub value: HandValue,
}

/// Dense hand rank in `1..=7462`. Lower is stronger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandRank(u16);

impl HandRank {
    pub fn new(rank: u16) -> Option<Self> {
        (BEST_RANK..=WORST_RANK).contains(&rank).then_some(HandRank(rank))
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// Linear map of the rank onto `[-1.0, 1.0]`: rank 1 is `1.0`, rank 7462 is `-1.0`.
    ///
    /// ```
    /// use poker_arena::evaluator::HandRank;
    ///
    /// assert_eq!(HandRank::new(1).unwrap().normalized(), 1.0);
    /// assert_eq!(HandRank::new(7462).unwrap().normalized(), -1.0);
    /// ```
    pub fn normalized(self) -> f64 {
        let span = f64::from(WORST_RANK - BEST_RANK);
        1.0 - 2.0 * f64::from(self.0 - BEST_RANK) / span
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    #[error("invalid hand: {0}")]
    InvalidHand(#[from] HandError),
    #[error("expected 5 to 7 cards, got {0}")]
    CardCount(usize),
    #[error("expected 3 to 5 community cards, got {0}")]
    CommunityCount(usize),
    #[error("hand value {0:#x} is not in the class table")]
    UnknownValue(u64),
}

/// Evaluate exactly five cards.
pub fn evaluate_five(cards: &[Card; 5]) -> Evaluation {
    let mut sorted = *cards;
    sorted.sort_by(|a, b| b.cmp(a));

    let mut counts = [0u8; 15];
    for c in &sorted {
        counts[c.rank().value() as usize] += 1;
    }
    let flush = sorted.iter().all(|c| c.suit() == sorted[0].suit());
    let straight_top = straight_top(&counts);

    // (count, rank) groups, biggest group first, then higher rank
    let mut groups: Vec<(u8, u8)> =
        (2u8..=14).rev().filter(|&v| counts[v as usize] > 0).map(|v| (counts[v as usize], v)).collect();
    groups.sort_by(|a, b| b.cmp(a));
    let by_group: Vec<u8> = groups.iter().map(|&(_, r)| r).collect();

    let (category, tiebreak) = match (flush, straight_top, groups[0].0, groups.get(1).map(|g| g.0)) {
        (true, Some(top), _, _) => (Category::StraightFlush, vec![top]),
        (_, _, 4, _) => (Category::FourOfAKind, by_group),
        (_, _, 3, Some(2)) => (Category::FullHouse, by_group),
        (true, None, _, _) => (Category::Flush, by_group),
        (false, Some(top), _, _) => (Category::Straight, vec![top]),
        (_, _, 3, _) => (Category::ThreeOfAKind, by_group),
        (_, _, 2, Some(2)) => (Category::TwoPair, by_group),
        (_, _, 2, _) => (Category::Pair, by_group),
        _ => (Category::HighCard, by_group),
    };

    Evaluation { category, best_five: sorted, value: HandValue::pack(category, &tiebreak) }
}

fn straight_top(counts: &[u8; 15]) -> Option<u8> {
    if (10..=14).all(|v| counts[v] == 1) {
        return Some(14);
    }
    for top in (6..=13).rev() {
        if (top - 4..=top).all(|v| counts[v] == 1) {
            return Some(top as u8);
        }
    }
    // wheel: A-2-3-4-5 plays as five-high
    if counts[14] == 1 && (2..=5).all(|v| counts[v] == 1) {
        return Some(5);
    }
    None
}

/// Best five-card evaluation over 5 to 7 cards.
pub fn evaluate_best(cards: &[Card]) -> Result<Evaluation, EvalError> {
    let n = cards.len();
    if !(5..=7).contains(&n) {
        return Err(EvalError::CardCount(n));
    }
    let mut best: Option<Evaluation> = None;
    for mask in 0u32..(1 << n) {
        if mask.count_ones() != 5 {
            continue;
        }
        let mut five = [cards[0]; 5];
        let picked = (0..n).filter(|i| mask & (1 << i) != 0).map(|i| cards[i]);
        for (slot, card) in five.iter_mut().zip(picked) {
            *slot = card;
        }
        let eval = evaluate_five(&five);
        if best.map_or(true, |b| eval.value > b.value) {
            best = Some(eval);
        }
    }
    best.ok_or(EvalError::CardCount(n))
}

/// Dense rank for a packed value.
pub fn rank_of(value: HandValue) -> Result<HandRank, EvalError> {
    class_table()
        .binary_search_by(|probe| value.cmp(probe))
        .map(|i| HandRank(i as u16 + 1))
        .map_err(|_| EvalError::UnknownValue(value.raw()))
}

/// Rank 5 to 7 cards directly.
pub fn rank_cards(cards: &[Card]) -> Result<HandRank, EvalError> {
    rank_of(evaluate_best(cards)?.value)
}

/// Score hole cards against 3 to 5 community cards. Lower is stronger.
///
/// ```
/// use poker_arena::cards::parse_cards;
/// use poker_arena::evaluator::rank_hand;
/// use poker_arena::hand::HoleCards;
///
/// let hole: HoleCards = "As Ks".parse().unwrap();
/// let board = parse_cards("Qs Js Ts 2d 3c").unwrap();
/// assert_eq!(rank_hand(&hole, &board).unwrap().get(), 1);
/// ```
pub fn rank_hand(hole: &HoleCards, community: &[Card]) -> Result<HandRank, EvalError> {
    if !(3..=5).contains(&community.len()) {
        return Err(EvalError::CommunityCount(community.len()));
    }
    validate_deal(hole, community)?;
    let mut all = Vec::with_capacity(7);
    all.extend_from_slice(&hole.as_array());
    all.extend_from_slice(community);
    rank_cards(&all)
}

/// Every distinct five-card value, strongest first.
pub fn class_table() -> &'static [HandValue] {
    static TABLE: OnceLock<Vec<HandValue>> = OnceLock::new();
    TABLE.get_or_init(build_class_table)
}

fn build_class_table() -> Vec<HandValue> {
    let mut values = Vec::with_capacity(WORST_RANK as usize);
    let mut ranks = Vec::with_capacity(5);
    collect_multisets(0, &mut ranks, &mut |ranks: &[Rank]| {
        // position-cycled suits never make a flush and keep equal ranks distinct
        let mut off = [Card::new(Rank::Two, Suit::Spades); 5];
        for (i, r) in ranks.iter().enumerate() {
            off[i] = Card::new(*r, Suit::ALL[i % 4]);
        }
        values.push(evaluate_five(&off).value);

        let distinct = ranks.windows(2).all(|w| w[0] != w[1]);
        if distinct {
            let mut suited = off;
            for c in suited.iter_mut() {
                *c = Card::new(c.rank(), Suit::Spades);
            }
            values.push(evaluate_five(&suited).value);
        }
    });
    values.sort_unstable_by(|a, b| b.cmp(a));
    values.dedup();
    values
}

// Non-decreasing rank sequences of length 5 with at most four of any rank.
fn collect_multisets(from: usize, ranks: &mut Vec<Rank>, visit: &mut dyn FnMut(&[Rank])) {
    if ranks.len() == 5 {
        visit(ranks);
        return;
    }
    for i in from..Rank::ALL.len() {
        let r = Rank::ALL[i];
        if ranks.iter().filter(|&&x| x == r).count() == 4 {
            continue;
        }
        ranks.push(r);
        collect_multisets(i, ranks, visit);
        ranks.pop();
    }
}

use crate::cards::Card;
use crate::deck::Deck;
use crate::hand::{Board, HandError, HoleCards};
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    /// Community cards dealt when moving onto this street.
    pub const fn cards_dealt(self) -> usize {
        match self {
            Street::Flop => 3,
            Street::Turn | Street::River => 1,
            Street::Preflop | Street::Showdown => 0,
        }
    }

    pub const fn next(self) -> Street {
        match self {
            Street::Preflop => Street::Flop,
            Street::Flop => Street::Turn,
            Street::Turn => Street::River,
            Street::River | Street::Showdown => Street::Showdown,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
            Street::Showdown => "showdown",
        };
        f.write_str(s)
    }
}

/// The closed action set every agent chooses from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Fold,
    Call,
    Raise,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Fold, Action::Call, Action::Raise];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Fold => "fold",
            Action::Call => "call",
            Action::Raise => "raise",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HandHistoryVerb {
    SmallBlind,
    BigBlind,
    Fold,
    Check,
    Call,
    Raise,
    Win,
    Split,
}

impl HandHistoryVerb {
    pub fn label(self) -> &'static str {
        match self {
            HandHistoryVerb::SmallBlind => "SB",
            HandHistoryVerb::BigBlind => "BB",
            HandHistoryVerb::Fold => "Fold",
            HandHistoryVerb::Check => "Check",
            HandHistoryVerb::Call => "Call",
            HandHistoryVerb::Raise => "Raise",
            HandHistoryVerb::Win => "Win",
            HandHistoryVerb::Split => "Split",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandHistoryEntry {
    pub seat: usize,
    pub verb: HandHistoryVerb,
    pub amount: u64,
    pub street: Street,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StateError {
    #[error("deck exhausted: needed {needed} cards, {left} left")]
    DeckExhausted { needed: usize, left: usize },
    #[error("seat {0} is out of range")]
    SeatOutOfRange(usize),
    #[error("invalid hand: {0}")]
    Hand(#[from] HandError),
}

/// What [`GameState::apply`] actually did after clamping and reinterpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub verb: HandHistoryVerb,
    pub paid: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub(crate) id: usize,
    pub(crate) stack: u64,
    pub(crate) bet: u64,
    pub(crate) committed: u64,
    pub(crate) folded: bool,
    pub(crate) hole: Option<HoleCards>,
    pub(crate) acted: bool,
}

impl Player {
    fn new(id: usize, stack: u64) -> Self {
        Self { id, stack, bet: 0, committed: 0, folded: false, hole: None, acted: false }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Chips still behind.
    pub fn stack(&self) -> u64 {
        self.stack
    }

    /// Chips put in on the current street.
    pub fn bet(&self) -> u64 {
        self.bet
    }

    /// Chips put in over the whole hand.
    pub fn committed(&self) -> u64 {
        self.committed
    }

    pub fn folded(&self) -> bool {
        self.folded
    }

    pub fn hole(&self) -> Option<HoleCards> {
        self.hole
    }

    pub fn has_acted(&self) -> bool {
        self.acted
    }

    pub fn is_all_in(&self) -> bool {
        !self.folded && self.stack == 0
    }

    pub fn can_act(&self) -> bool {
        !self.folded && self.stack > 0
    }
}

/// One hand in progress.
///
/// Every chip that leaves a stack lands in `pot`, and every chip paid out of
/// `pot` lands in a stack; mutations saturate at zero.
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) deck: Deck,
    pub(crate) players: Vec<Player>,
    pub(crate) pot: u64,
    pub(crate) current_bet: u64,
    pub(crate) board: Board,
    pub(crate) street: Street,
    pub(crate) small_blind: u64,
    pub(crate) dealer: usize,
    pub(crate) current: Option<usize>,
    history: Vec<HandHistoryEntry>,
    record: bool,
}

impl GameState {
    /// A table with one player per stack, seat `i` having id `i`.
    ///
    /// ```
    /// use poker_arena::game::GameState;
    ///
    /// let mut state = GameState::new(&[1000, 1000], 10);
    /// state.post_blinds(0, 1).unwrap();
    /// assert_eq!(state.pot(), 30);
    /// assert_eq!(state.current_bet(), 20);
    /// ```
    pub fn new(stacks: &[u64], small_blind: u64) -> Self {
        let players = stacks.iter().enumerate().map(|(i, &s)| Player::new(i, s)).collect();
        Self {
            deck: Deck::standard(),
            players,
            pot: 0,
            current_bet: 0,
            board: Board::new(),
            street: Street::Preflop,
            small_blind,
            dealer: 0,
            current: None,
            history: Vec::new(),
            record: true,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> Result<&Player, StateError> {
        self.players.get(seat).ok_or(StateError::SeatOutOfRange(seat))
    }

    pub fn pot(&self) -> u64 {
        self.pot
    }

    pub fn current_bet(&self) -> u64 {
        self.current_bet
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn street(&self) -> Street {
        self.street
    }

    pub fn small_blind(&self) -> u64 {
        self.small_blind
    }

    pub fn big_blind(&self) -> u64 {
        self.small_blind.saturating_mul(2)
    }

    pub fn dealer(&self) -> usize {
        self.dealer
    }

    /// Seat whose turn it is, if anyone still owes an action this street.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn history(&self) -> &[HandHistoryEntry] {
        &self.history
    }

    pub fn to_call(&self, seat: usize) -> u64 {
        self.players.get(seat).map_or(0, |p| self.current_bet.saturating_sub(p.bet))
    }

    pub fn live_count(&self) -> usize {
        self.players.iter().filter(|p| !p.folded).count()
    }

    pub fn live_seats(&self) -> impl Iterator<Item = usize> + '_ {
        self.players.iter().enumerate().filter(|(_, p)| !p.folded).map(|(i, _)| i)
    }

    /// Total chips on the table: stacks plus pot.
    pub fn total_chips(&self) -> u64 {
        self.players.iter().map(|p| p.stack).sum::<u64>() + self.pot
    }

    pub fn hand_over(&self) -> bool {
        self.live_count() <= 1 || self.street == Street::Showdown
    }

    /// Clear per-hand state, shuffle a fresh deck and deal two cards to every
    /// player holding chips. Busted players sit the hand out as folded.
    pub fn start_hand<R: Rng + ?Sized>(&mut self, dealer: usize, rng: &mut R) -> Result<(), StateError> {
        self.deck = Deck::standard();
        self.deck.shuffle_with(rng);
        self.pot = 0;
        self.current_bet = 0;
        self.board.clear();
        self.street = Street::Preflop;
        self.dealer = dealer;
        self.current = None;
        self.history.clear();
        for p in &mut self.players {
            p.bet = 0;
            p.committed = 0;
            p.hole = None;
            p.acted = false;
            p.folded = p.stack == 0;
        }
        self.deal_hole_cards()
    }

    fn deal_hole_cards(&mut self) -> Result<(), StateError> {
        for seat in 0..self.players.len() {
            if self.players[seat].folded {
                continue;
            }
            let left = self.deck.len();
            let (a, b) = match (self.deck.draw(), self.deck.draw()) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(StateError::DeckExhausted { needed: 2, left }),
            };
            self.players[seat].hole = Some(HoleCards::try_new(a, b)?);
        }
        Ok(())
    }

    /// Put known hole cards in front of a seat.
    pub fn set_hole(&mut self, seat: usize, hole: HoleCards) -> Result<(), StateError> {
        let p = self.players.get_mut(seat).ok_or(StateError::SeatOutOfRange(seat))?;
        p.hole = Some(hole);
        Ok(())
    }

    /// Post blinds. A short stack posts what it has.
    pub fn post_blinds(&mut self, sb_seat: usize, bb_seat: usize) -> Result<(), StateError> {
        let sb = self.small_blind;
        let bb = self.big_blind();
        let paid_sb = self.pay(sb_seat, sb)?;
        self.record(sb_seat, HandHistoryVerb::SmallBlind, paid_sb);
        let paid_bb = self.pay(bb_seat, bb)?;
        self.record(bb_seat, HandHistoryVerb::BigBlind, paid_bb);
        self.current_bet = self.players.iter().map(|p| p.bet).max().unwrap_or(0);
        Ok(())
    }

    // Moves up to `amount` from a stack into the pot. Returns what was moved.
    fn pay(&mut self, seat: usize, amount: u64) -> Result<u64, StateError> {
        let p = self.players.get_mut(seat).ok_or(StateError::SeatOutOfRange(seat))?;
        let paid = amount.min(p.stack);
        p.stack -= paid;
        p.bet = p.bet.saturating_add(paid);
        p.committed = p.committed.saturating_add(paid);
        self.pot = self.pot.saturating_add(paid);
        Ok(paid)
    }

    /// Pay `amount` out of the pot to a seat, never more than the pot holds.
    pub(crate) fn award(&mut self, seat: usize, amount: u64) -> Result<u64, StateError> {
        let p = self.players.get_mut(seat).ok_or(StateError::SeatOutOfRange(seat))?;
        let amount = amount.min(self.pot);
        p.stack = p.stack.saturating_add(amount);
        self.pot -= amount;
        Ok(amount)
    }

    pub(crate) fn burn_pot(&mut self, amount: u64) -> u64 {
        let amount = amount.min(self.pot);
        self.pot -= amount;
        amount
    }

    pub(crate) fn record(&mut self, seat: usize, verb: HandHistoryVerb, amount: u64) {
        if self.record {
            self.history.push(HandHistoryEntry { seat, verb, amount, street: self.street });
        }
    }

    /// A seat that still owes an action: it can act and either has not acted
    /// since the last raise or sits below the current bet.
    fn owes_action(&self, seat: usize) -> bool {
        let p = &self.players[seat];
        p.can_act() && (!p.acted || p.bet < self.current_bet)
    }

    fn next_owing_from(&self, start: usize) -> Option<usize> {
        let n = self.players.len();
        (0..n).map(|k| (start + k) % n).find(|&s| self.owes_action(s))
    }

    /// Open betting on the current street with `start` first to act (or the
    /// next seat after it that can act).
    pub fn begin_street(&mut self, start: usize) {
        for p in &mut self.players {
            p.acted = false;
        }
        self.current = if self.players.is_empty() || self.street_complete() {
            None
        } else {
            self.next_owing_from(start % self.players.len())
        };
    }

    /// Apply an action for `seat`, clamping and reinterpreting it into a legal
    /// move.
    ///
    /// While the street's bet is zero, `Fold` and `Call` are checks. This
    /// reading lasts only until someone bets: after a bet on the same street a
    /// `Fold` folds and a `Call` pays, even for seats that checked earlier.
    /// `amount`
    /// for a raise is the increment on top of the call; it is floored at the
    /// larger of the small blind and the call, and the payment is capped at the
    /// stack. A raise that cannot exceed the call is recorded as a call.
    pub fn apply(&mut self, seat: usize, action: Action, amount: u64) -> Result<Applied, StateError> {
        let p = self.players.get(seat).ok_or(StateError::SeatOutOfRange(seat))?;
        if !p.can_act() {
            self.players[seat].acted = true;
            self.current = self.next_owing_from(seat);
            return Ok(Applied { verb: HandHistoryVerb::Check, paid: 0 });
        }
        let to_call = self.current_bet.saturating_sub(p.bet);
        let stack = p.stack;

        let applied = match action {
            Action::Fold if self.current_bet == 0 => Applied { verb: HandHistoryVerb::Check, paid: 0 },
            Action::Fold => {
                self.players[seat].folded = true;
                Applied { verb: HandHistoryVerb::Fold, paid: 0 }
            }
            Action::Raise if amount > 0 => {
                let increment = amount.max(self.small_blind).max(to_call);
                let target = to_call.saturating_add(increment).min(stack);
                if target <= to_call {
                    self.call(seat, to_call)?
                } else {
                    let paid = self.pay(seat, target)?;
                    self.current_bet = self.current_bet.max(self.players[seat].bet);
                    for (i, other) in self.players.iter_mut().enumerate() {
                        if i != seat && other.can_act() {
                            other.acted = false;
                        }
                    }
                    Applied { verb: HandHistoryVerb::Raise, paid }
                }
            }
            Action::Call | Action::Raise => self.call(seat, to_call)?,
        };

        self.players[seat].acted = true;
        self.record(seat, applied.verb, applied.paid);
        self.current = if self.street_complete() { None } else { self.next_owing_from(seat) };
        Ok(applied)
    }

    fn call(&mut self, seat: usize, to_call: u64) -> Result<Applied, StateError> {
        let paid = self.pay(seat, to_call)?;
        let verb = if paid == 0 { HandHistoryVerb::Check } else { HandHistoryVerb::Call };
        Ok(Applied { verb, paid })
    }

    /// True once at most one player is live, or nobody who can still act owes
    /// an action. A lone player able to act who already matches the highest
    /// bet has nobody left to bet against.
    pub fn street_complete(&self) -> bool {
        if self.live_count() <= 1 {
            return true;
        }
        let actors: Vec<&Player> = self.players.iter().filter(|p| p.can_act()).collect();
        match actors.as_slice() {
            [] => true,
            [only] if only.bet >= self.current_bet => true,
            _ => (0..self.players.len()).all(|s| !self.owes_action(s)),
        }
    }

    /// Call every live player up to the current bet and close the street.
    /// Returns the chips moved.
    pub fn force_settle(&mut self) -> u64 {
        let mut moved = 0;
        for seat in 0..self.players.len() {
            if self.players[seat].folded {
                continue;
            }
            let owed = self.current_bet.saturating_sub(self.players[seat].bet);
            // seat is in range
            moved += self.pay(seat, owed).unwrap_or(0);
            self.players[seat].acted = true;
        }
        self.current = None;
        moved
    }

    /// Close the current street: clear bets and deal the next street's cards.
    /// From the river this moves to showdown without dealing.
    pub fn advance_street(&mut self) -> Result<(), StateError> {
        for p in &mut self.players {
            p.bet = 0;
            p.acted = false;
        }
        self.current_bet = 0;
        self.current = None;
        let next = self.street.next();
        let needed = next.cards_dealt();
        if needed > 0 {
            if self.deck.len() < needed {
                return Err(StateError::DeckExhausted { needed, left: self.deck.len() });
            }
            let cards = self.deck.draw_n(needed);
            self.board.extend(cards);
        }
        self.street = next;
        Ok(())
    }

    /// Advance a street with the next cards drawn at random from the deck.
    pub fn reveal_next_street<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), StateError> {
        self.deck.shuffle_with(rng);
        self.advance_street()
    }

    /// Deal the rest of the board and move to showdown.
    pub fn run_out_board(&mut self) -> Result<(), StateError> {
        while self.street != Street::Showdown {
            self.advance_street()?;
        }
        Ok(())
    }

    /// First seat to act after the flop.
    pub fn postflop_start(&self) -> usize {
        match self.players.len() {
            0 => 0,
            n => (self.dealer + 1) % n,
        }
    }

    /// Cards `seat` cannot see: the deck plus every other player's hole cards.
    pub fn unseen_by(&self, seat: usize) -> Vec<Card> {
        let mut seen: Vec<Card> = self.board.as_slice().to_vec();
        if let Some(h) = self.players.get(seat).and_then(|p| p.hole) {
            seen.extend_from_slice(&h.as_array());
        }
        Deck::without(&seen).as_slice().to_vec()
    }

    /// A copy that does not write hand history.
    pub fn snapshot(&self) -> GameState {
        GameState {
            deck: self.deck.clone(),
            players: self.players.clone(),
            pot: self.pot,
            current_bet: self.current_bet,
            board: self.board.clone(),
            street: self.street,
            small_blind: self.small_blind,
            dealer: self.dealer,
            current: self.current,
            history: Vec::new(),
            record: false,
        }
    }

    /// A snapshot from `seat`'s point of view: every other player's hole cards
    /// and the undealt deck are resampled from the cards `seat` cannot see.
    pub fn determinize_for<R: Rng + ?Sized>(&self, seat: usize, rng: &mut R) -> Result<GameState, StateError> {
        let mut sim = self.snapshot();
        let mut unseen = Deck::from_cards(self.unseen_by(seat));
        unseen.shuffle_with(rng);
        for (i, p) in sim.players.iter_mut().enumerate() {
            if i == seat || p.hole.is_none() {
                continue;
            }
            let left = unseen.len();
            let (a, b) = match (unseen.draw(), unseen.draw()) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(StateError::DeckExhausted { needed: 2, left }),
            };
            p.hole = Some(HoleCards::try_new(a, b)?);
        }
        sim.deck = unseen;
        Ok(sim)
    }
}

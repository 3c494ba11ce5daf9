use crate::cards::{Card, Rank, Suit};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// An ordered pile of distinct cards. Dealing takes from the top (the back).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// All 52 cards in a fixed order.
    ///
    /// ```
    /// use poker_arena::deck::Deck;
    ///
    /// assert_eq!(Deck::standard().len(), 52);
    /// ```
    pub fn standard() -> Self {
        let cards = Suit::ALL
            .iter()
            .flat_map(|&s| Rank::ALL.iter().map(move |&r| Card::new(r, s)))
            .collect();
        Self { cards }
    }

    /// Every standard card except those in `seen`.
    pub fn without(seen: &[Card]) -> Self {
        let mut mask = [false; 52];
        for c in seen {
            mask[c.index()] = true;
        }
        let mut deck = Self::standard();
        deck.cards.retain(|c| !mask[c.index()]);
        deck
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    pub fn shuffle_seeded(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.cards.shuffle(&mut rng);
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Draw up to `n` cards; fewer come back when the deck runs dry.
    pub fn draw_n(&mut self, n: usize) -> Vec<Card> {
        (0..n).map_while(|_| self.draw()).collect()
    }
}

use crate::cards::{parse_cards, Card};
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HandError {
    #[error("duplicate cards in hole cards")]
    DuplicateHoleCards,
    #[error("a board holds 0, 3, 4 or 5 cards, got {0}")]
    BoardSize(usize),
    #[error("duplicate cards on board")]
    DuplicateBoardCards,
    #[error("hole cards overlap with board")]
    Overlap,
    #[error("expected exactly two hole cards, got {0}")]
    HoleCount(usize),
    #[error("card parse error: {0}")]
    CardParse(String),
}

/// A player's two private cards.
///
/// ```
/// use poker_arena::hand::HoleCards;
///
/// let hole: HoleCards = "As Kd".parse().unwrap();
/// assert_eq!(hole.as_array()[1].to_string(), "Kd");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoleCards(Card, Card);

impl HoleCards {
    pub fn try_new(a: Card, b: Card) -> Result<Self, HandError> {
        if a == b {
            return Err(HandError::DuplicateHoleCards);
        }
        Ok(Self(a, b))
    }

    pub fn from_slice(slice: &[Card]) -> Result<Self, HandError> {
        match slice {
            [a, b] => Self::try_new(*a, *b),
            _ => Err(HandError::HoleCount(slice.len())),
        }
    }

    pub fn first(&self) -> Card {
        self.0
    }

    pub fn second(&self) -> Card {
        self.1
    }

    pub fn as_array(&self) -> [Card; 2] {
        [self.0, self.1]
    }

    pub fn contains(&self, card: Card) -> bool {
        self.0 == card || self.1 == card
    }
}

impl FromStr for HoleCards {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = parse_cards(s).map_err(|e| HandError::CardParse(e.to_string()))?;
        Self::from_slice(&cards)
    }
}

/// Community cards. Grows 0 → 3 → 4 → 5 as streets are dealt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    pub fn new() -> Self {
        Self { cards: Vec::with_capacity(5) }
    }

    pub fn try_new(cards: Vec<Card>) -> Result<Self, HandError> {
        if !matches!(cards.len(), 0 | 3 | 4 | 5) {
            return Err(HandError::BoardSize(cards.len()));
        }
        for (i, c) in cards.iter().enumerate() {
            if cards[i + 1..].contains(c) {
                return Err(HandError::DuplicateBoardCards);
            }
        }
        Ok(Self { cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.cards.len() >= 5
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    pub(crate) fn extend<I>(&mut self, cards: I)
    where
        I: IntoIterator<Item = Card>,
    {
        self.cards.extend(cards);
    }

    pub(crate) fn clear(&mut self) {
        self.cards.clear();
    }
}

impl FromStr for Board {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = parse_cards(s).map_err(|e| HandError::CardParse(e.to_string()))?;
        Board::try_new(cards)
    }
}

/// Check that hole cards and community cards can coexist in one deal.
pub fn validate_deal(hole: &HoleCards, community: &[Card]) -> Result<(), HandError> {
    if hole.first() == hole.second() {
        return Err(HandError::DuplicateHoleCards);
    }
    for (i, c) in community.iter().enumerate() {
        if community[i + 1..].contains(c) {
            return Err(HandError::DuplicateBoardCards);
        }
        if hole.contains(*c) {
            return Err(HandError::Overlap);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn hole_cards_must_be_distinct() {
        let a = Card::new(Rank::Ace, Suit::Spades);
        assert!(matches!(HoleCards::try_new(a, a), Err(HandError::DuplicateHoleCards)));
        assert!(matches!(HoleCards::from_slice(&[a]), Err(HandError::HoleCount(1))));
    }

    #[test]
    fn board_sizes_follow_the_streets() {
        assert!("2c 3c".parse::<Board>().is_err());
        assert_eq!("2c 3c 4c".parse::<Board>().unwrap().len(), 3);
        assert!(matches!("2c 2c 4c".parse::<Board>(), Err(HandError::DuplicateBoardCards)));
        assert!(matches!(
            "2c 3c 4c 5c 6c 7c".parse::<Board>(),
            Err(HandError::BoardSize(6))
        ));
    }

    #[test]
    fn validate_deal_catches_overlap() {
        let hole: HoleCards = "As Ks".parse().unwrap();
        let board: Board = "As 2c 3c".parse().unwrap();
        assert!(matches!(validate_deal(&hole, board.as_slice()), Err(HandError::Overlap)));
    }
}

use std::fmt;
use std::str::FromStr;

/// Card ranks from Two (low) to Ace (high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Pip value, 2..=14 (ace high).
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Rank::value`]; `None` outside 2..=14.
    pub fn from_value(v: u8) -> Option<Rank> {
        v.checked_sub(2).and_then(|i| Rank::ALL.get(i as usize)).copied()
    }

    pub const fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RankParseError {
    #[error("invalid rank: '{0}'")]
    Invalid(String),
}

impl FromStr for Rank {
    type Err = RankParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        match t.to_ascii_lowercase().as_str() {
            "10" | "t" | "ten" => Ok(Rank::Ten),
            "j" | "jack" => Ok(Rank::Jack),
            "q" | "queen" => Ok(Rank::Queen),
            "k" | "king" => Ok(Rank::King),
            "a" | "ace" => Ok(Rank::Ace),
            other => other
                .parse::<u8>()
                .ok()
                .filter(|v| (2..=9).contains(v))
                .and_then(Rank::from_value)
                .ok_or_else(|| RankParseError::Invalid(s.to_string())),
        }
    }
}

/// The four suits. Suits carry no strength; the order only fixes card ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub const fn to_char(self) -> char {
        match self {
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
        }
    }

    const fn ordinal(self) -> u8 {
        match self {
            Suit::Spades => 0,
            Suit::Hearts => 1,
            Suit::Diamonds => 2,
            Suit::Clubs => 3,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SuitParseError {
    #[error("invalid suit: '{0}'")]
    Invalid(String),
}

impl FromStr for Suit {
    type Err = SuitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "spades" => Ok(Suit::Spades),
            "h" | "hearts" => Ok(Suit::Hearts),
            "d" | "diamonds" => Ok(Suit::Diamonds),
            "c" | "clubs" => Ok(Suit::Clubs),
            _ => Err(SuitParseError::Invalid(s.to_string())),
        }
    }
}

/// An immutable playing card.
///
/// ```
/// use poker_arena::cards::{Card, Rank, Suit};
///
/// let card = Card::new(Rank::Queen, Suit::Hearts);
/// assert_eq!(card.to_string(), "Qh");
/// assert_eq!(Card::from_index(card.index()), Some(card));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn rank(self) -> Rank {
        self.rank
    }

    pub const fn suit(self) -> Suit {
        self.suit
    }

    /// Dense index in `0..52`, rank-major.
    pub const fn index(self) -> usize {
        (self.rank as usize - 2) * 4 + self.suit.ordinal() as usize
    }

    pub fn from_index(index: usize) -> Option<Card> {
        let rank = *Rank::ALL.get(index / 4)?;
        let suit = Suit::ALL[index % 4];
        Some(Card::new(rank, suit))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardParseError {
    #[error("invalid card: '{0}'")]
    Invalid(String),
    #[error(transparent)]
    Rank(#[from] RankParseError),
    #[error(transparent)]
    Suit(#[from] SuitParseError),
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if !t.is_ascii() || t.len() < 2 {
            return Err(CardParseError::Invalid(s.to_string()));
        }
        // suit is always the last character
        let (rank_part, suit_part) = t.split_at(t.len() - 1);
        let rank = Rank::from_str(rank_part)?;
        let suit = Suit::from_str(suit_part)?;
        Ok(Card::new(rank, suit))
    }
}

/// Parse cards separated by whitespace or commas.
///
/// ```
/// use poker_arena::cards::{parse_cards, Card, Rank, Suit};
///
/// let cards = parse_cards("As, 10d 2c").unwrap();
/// assert_eq!(cards, vec![
///     Card::new(Rank::Ace, Suit::Spades),
///     Card::new(Rank::Ten, Suit::Diamonds),
///     Card::new(Rank::Two, Suit::Clubs),
/// ]);
/// ```
pub fn parse_cards(input: &str) -> Result<Vec<Card>, CardParseError> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(Card::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_parsing_accepts_symbols_and_names() {
        assert_eq!(Rank::from_str("T").unwrap(), Rank::Ten);
        assert_eq!(Rank::from_str("10").unwrap(), Rank::Ten);
        assert_eq!(Rank::from_str("queen").unwrap(), Rank::Queen);
        assert_eq!(Rank::from_str("7").unwrap(), Rank::Seven);
        assert!(Rank::from_str("1").is_err());
        assert!(Rank::from_str("11").is_err());
    }

    #[test]
    fn suit_parsing_accepts_letters_and_names() {
        assert_eq!(Suit::from_str("s").unwrap(), Suit::Spades);
        assert_eq!(Suit::from_str("Diamonds").unwrap(), Suit::Diamonds);
        assert!(Suit::from_str("x").is_err());
    }

    #[test]
    fn card_round_trips_through_display() {
        let c = Card::from_str("10c").unwrap();
        assert_eq!(c, Card::new(Rank::Ten, Suit::Clubs));
        assert_eq!(c.to_string(), "Tc");
        assert!(Card::from_str("Zz").is_err());
        assert!(Card::from_str("A").is_err());
    }

    #[test]
    fn indices_cover_the_deck_without_collisions() {
        let mut seen = [false; 52];
        for r in Rank::ALL {
            for s in Suit::ALL {
                let idx = Card::new(r, s).index();
                assert!(!seen[idx]);
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&b| b));
        assert_eq!(Card::from_index(52), None);
    }
}

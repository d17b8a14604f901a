use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ReplayError;

/// One of the four suits in a standard 52-card deck.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Suit {
    /// Clubs suit (♣)
    Clubs,
    /// Diamonds suit (♦)
    Diamonds,
    /// Hearts suit (♥)
    Hearts,
    /// Spades suit (♠)
    Spades,
}

impl Suit {
    pub fn symbol(self) -> char {
        match self {
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
            Suit::Hearts => '♥',
            Suit::Spades => '♠',
        }
    }

    pub fn from_symbol(c: char) -> Option<Suit> {
        match c {
            '♣' => Some(Suit::Clubs),
            '♦' => Some(Suit::Diamonds),
            '♥' => Some(Suit::Hearts),
            '♠' => Some(Suit::Spades),
            _ => None,
        }
    }
}

/// The rank claimed or held, ordered 2..10, J, Q, K, A.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// The rank's wire symbol, as used in card tokens and replay files.
    pub fn symbol(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Rank> {
        all_ranks().into_iter().find(|r| r.symbol() == s)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Rank {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::from_symbol(s).ok_or_else(|| ReplayError::IllegalRank(s.to_string()))
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rank::from_symbol(&s).ok_or_else(|| D::Error::custom(format!("invalid card rank: {s}")))
    }
}

/// A single playing card. The wire format is the rank symbol followed by the
/// suit symbol, e.g. `"10♥"` or `"A♠"`.
///
/// ```
/// use cheat_engine::cards::Card;
///
/// let card: Card = "10♥".parse().unwrap();
/// assert_eq!(card.to_string(), "10♥");
/// assert!("Z♣".parse::<Card>().is_err());
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

impl FromStr for Card {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let suit_char = chars.next_back();
        let rank_part: String = chars.collect();
        let (Some(suit_char), false) = (suit_char, rank_part.is_empty()) else {
            return Err(ReplayError::InvalidCardToken(s.to_string()));
        };
        let suit = Suit::from_symbol(suit_char)
            .ok_or_else(|| ReplayError::InvalidCardToken(s.to_string()))?;
        let rank = Rank::from_symbol(&rank_part)
            .ok_or_else(|| ReplayError::InvalidCardToken(s.to_string()))?;
        Ok(Card { rank, suit })
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| D::Error::custom(format!("invalid card token: {s}")))
    }
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
}

pub fn all_ranks() -> [Rank; 13] {
    [
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
    ]
}

pub fn full_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(52);
    for &r in &all_ranks() {
        for &s in &all_suits() {
            v.push(Card { rank: r, suit: s });
        }
    }
    v
}

/// A per-rank counter table with every rank present and zeroed, the shape
/// used for the known-discarded and known-revealed trackers.
pub fn empty_rank_counts() -> BTreeMap<Rank, u32> {
    all_ranks().into_iter().map(|r| (r, 0)).collect()
}

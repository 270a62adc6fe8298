//! Card types, deck constants, and the wire token format used by the external interface.

use alloc::format;
use alloc::string::String;

use crate::error::BadCardError;

/// Card suit. Cosmetic only — ignored by counting and strategy lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    /// Hearts.
    Hearts,
    /// Diamonds.
    Diamonds,
    /// Clubs.
    Clubs,
    /// Spades.
    Spades,
}

impl Suit {
    const fn from_token(c: char) -> Option<Self> {
        match c {
            'h' | 'H' | '♥' => Some(Self::Hearts),
            'd' | 'D' | '♦' => Some(Self::Diamonds),
            'c' | 'C' | '♣' => Some(Self::Clubs),
            's' | 'S' | '♠' => Some(Self::Spades),
            _ => None,
        }
    }

    const fn to_token(self) -> char {
        match self {
            Self::Hearts => 'h',
            Self::Diamonds => 'd',
            Self::Clubs => 'c',
            Self::Spades => 's',
        }
    }
}

/// A playing card.
///
/// `rank` runs 1 (Ace) through 13 (King). The four ten-valued ranks — 10, Jack,
/// Queen, King — are kept as four distinct values even though they share
/// [`blackjack_value`]; a prior defect that collapsed them into a single "ten"
/// identity produced wrong pair-splitting decisions, so no code in this crate
/// may treat them as interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    /// The suit of the card.
    pub suit: Suit,
    /// The rank of the card (1 = Ace, 11 = Jack, 12 = Queen, 13 = King).
    pub rank: u8,
}

impl Card {
    /// Creates a new card.
    ///
    /// Note: This function does not validate the rank. Values outside 1..=13
    /// are accepted but may yield non-standard results when evaluating a hand.
    #[must_use]
    pub const fn new(suit: Suit, rank: u8) -> Self {
        Self { suit, rank }
    }

    /// Parses a two-character wire token (e.g. `"Th"`, `"9♠"`, `"Ac"`) into a card.
    ///
    /// # Errors
    ///
    /// Returns [`BadCardError`] if the rank or suit character is not recognised.
    pub fn parse_token(token: &str) -> Result<Self, BadCardError> {
        let mut chars = token.chars();
        let rank_char = chars.next().ok_or(BadCardError::Empty)?;
        let suit_char = chars.next().ok_or(BadCardError::Truncated)?;
        if chars.next().is_some() {
            return Err(BadCardError::Truncated);
        }

        let rank = match rank_char {
            'A' | 'a' => 1,
            '2'..='9' => rank_char as u8 - b'0',
            'T' | 't' => 10,
            'J' | 'j' => 11,
            'Q' | 'q' => 12,
            'K' | 'k' => 13,
            _ => return Err(BadCardError::UnknownRank(rank_char)),
        };
        let suit = Suit::from_token(suit_char).ok_or(BadCardError::UnknownSuit(suit_char))?;

        Ok(Self::new(suit, rank))
    }

    /// Renders the card back to its two-character wire token.
    #[must_use]
    pub fn to_token(self) -> String {
        let rank_char = match self.rank {
            1 => 'A',
            2..=9 => (b'0' + self.rank) as char,
            10 => 'T',
            11 => 'J',
            12 => 'Q',
            13 => 'K',
            _ => '?',
        };
        format!("{rank_char}{}", self.suit.to_token())
    }

    /// The blackjack point value of this card's rank (Ace counted high, as 11).
    #[must_use]
    pub const fn blackjack_value(self) -> u8 {
        blackjack_value(self.rank)
    }

    /// The Hi-Lo running-count tag for this card's rank: +1, 0, or −1.
    #[must_use]
    pub const fn hi_lo_tag(self) -> i32 {
        hi_lo_tag(self.rank)
    }

    /// Whether this rank collapses to the dealer up-card value 10 (T, J, Q, K).
    #[must_use]
    pub const fn is_ten_valued(self) -> bool {
        self.rank >= 10
    }

    /// Whether this card is an Ace.
    #[must_use]
    pub const fn is_ace(self) -> bool {
        self.rank == 1
    }
}

/// The blackjack point value of a rank (Ace counted high, as 11).
#[must_use]
pub const fn blackjack_value(rank: u8) -> u8 {
    match rank {
        1 => 11,
        2..=10 => rank,
        11..=13 => 10,
        _ => 0,
    }
}

/// The Hi-Lo running-count tag for a rank: +1 for 2..6, 0 for 7..9, −1 for 10/J/Q/K/A.
#[must_use]
pub const fn hi_lo_tag(rank: u8) -> i32 {
    match rank {
        2..=6 => 1,
        7..=9 => 0,
        1 | 10..=13 => -1,
        _ => 0,
    }
}

/// The dealer up-card key used by strategy lookup: 2..=11, where Ace maps to 11
/// and T/J/Q/K all map to 10.
#[must_use]
pub const fn dealer_up_value(rank: u8) -> u8 {
    match rank {
        1 => 11,
        2..=10 => rank,
        11..=13 => 10,
        _ => 0,
    }
}

/// Number of cards per deck.
pub const DECK_SIZE: usize = 52;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_round_trips() {
        let card = Card::parse_token("Th").expect("valid token");
        assert_eq!(card.rank, 10);
        assert_eq!(card.suit, Suit::Hearts);
        assert_eq!(card.to_token(), "Th");
    }

    #[test]
    fn ten_valued_ranks_stay_distinct() {
        let ten = Card::new(Suit::Spades, 10);
        let jack = Card::new(Suit::Spades, 11);
        assert_eq!(ten.blackjack_value(), jack.blackjack_value());
        assert_ne!(ten.rank, jack.rank);
    }

    #[test]
    fn hi_lo_tags_match_table() {
        assert_eq!(hi_lo_tag(2), 1);
        assert_eq!(hi_lo_tag(6), 1);
        assert_eq!(hi_lo_tag(7), 0);
        assert_eq!(hi_lo_tag(9), 0);
        assert_eq!(hi_lo_tag(10), -1);
        assert_eq!(hi_lo_tag(13), -1);
        assert_eq!(hi_lo_tag(1), -1);
    }

    #[test]
    fn rejects_bad_tokens() {
        assert!(matches!(Card::parse_token(""), Err(BadCardError::Empty)));
        assert!(matches!(
            Card::parse_token("X"),
            Err(BadCardError::Truncated)
        ));
        assert!(matches!(
            Card::parse_token("Zs"),
            Err(BadCardError::UnknownRank('Z'))
        ));
        assert!(matches!(
            Card::parse_token("Tz"),
            Err(BadCardError::UnknownSuit('z'))
        ));
    }
}

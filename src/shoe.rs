//! The shoe state machine: Hi-Lo running count, true count, and penetration.
//!
//! A [`Shoe`] tracks only what has been *observed* — it never deals cards or
//! knows which physical cards remain. The session orchestrator is responsible
//! for deciding when a card is observed (in auto mode, at the moment it draws
//! from its virtual deck; in manual/shadow mode, when the caller reports a
//! card it saw at the table) and, critically, for deferring the dealer's hole
//! card until it is actually revealed.

use crate::card::Card;
use crate::error::{DealError, ObserveError};

/// A point-in-time view of the shoe's counting state.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CountSnapshot {
    /// The raw Hi-Lo running count.
    pub running_count: i32,
    /// The running count normalised by decks remaining.
    pub true_count: f64,
    /// Decks remaining, clamped to a minimum of 0.5 to avoid dividing by
    /// an unreasonably small denominator near the end of the shoe.
    pub decks_remaining: f64,
    /// Fraction of the shoe dealt so far, in `[0, 1]`.
    pub penetration: f64,
    /// Total cards observed since the last shuffle.
    pub cards_dealt: u32,
}

/// Tracks the Hi-Lo running count and shoe depletion for one physical shoe.
#[derive(Debug, Clone)]
pub struct Shoe {
    num_decks: u8,
    running_count: i32,
    cards_dealt: u32,
}

impl Shoe {
    /// Creates a new shoe of `num_decks` decks, freshly shuffled (zero count).
    #[must_use]
    pub const fn new(num_decks: u8) -> Self {
        Self {
            num_decks,
            running_count: 0,
            cards_dealt: 0,
        }
    }

    const fn total_cards(&self) -> u32 {
        self.num_decks as u32 * crate::card::DECK_SIZE as u32
    }

    /// Records that `card` has been seen, updating the running count.
    ///
    /// # Errors
    ///
    /// Returns [`ObserveError::ShoeExhausted`] if every card in the shoe has
    /// already been accounted for.
    pub fn observe(&mut self, card: Card) -> Result<(), ObserveError> {
        if self.cards_dealt >= self.total_cards() {
            return Err(ObserveError::ShoeExhausted);
        }
        self.running_count += card.hi_lo_tag();
        self.cards_dealt += 1;
        Ok(())
    }

    /// Records that `card` has been seen, for the auto-dealing path which
    /// reports shoe exhaustion as a [`DealError`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`DealError::ShoeExhausted`] if every card in the shoe has
    /// already been accounted for.
    pub fn observe_for_deal(&mut self, card: Card) -> Result<(), DealError> {
        if self.cards_dealt >= self.total_cards() {
            return Err(DealError::ShoeExhausted);
        }
        self.running_count += card.hi_lo_tag();
        self.cards_dealt += 1;
        Ok(())
    }

    /// Resets the running count and cards-dealt counter to a fresh shoe.
    /// Idempotent: shuffling an already-fresh shoe is a no-op.
    pub fn shuffle(&mut self) {
        self.running_count = 0;
        self.cards_dealt = 0;
    }

    /// Returns the number of cards that could still be drawn before the shoe
    /// is exhausted, assuming a full-deck composition (no card removal tracking
    /// beyond the running count).
    #[must_use]
    pub const fn cards_remaining(&self) -> u32 {
        self.total_cards() - self.cards_dealt
    }

    /// Whether the configured penetration threshold has been crossed and the
    /// shoe should be reshuffled before the next round.
    #[must_use]
    pub fn needs_reshuffle(&self, penetration: f64) -> bool {
        self.snapshot().penetration >= penetration
    }

    /// Computes the current count snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CountSnapshot {
        let total = f64::from(self.total_cards());
        let decks_remaining = (f64::from(self.cards_remaining())) / 52.0;
        let clamped_decks = if decks_remaining < 0.5 {
            0.5
        } else {
            decks_remaining
        };
        CountSnapshot {
            running_count: self.running_count,
            true_count: f64::from(self.running_count) / clamped_decks,
            decks_remaining,
            penetration: f64::from(self.cards_dealt) / total,
            cards_dealt: self.cards_dealt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    fn card(rank: u8) -> Card {
        Card::new(Suit::Spades, rank)
    }

    #[test]
    fn shuffle_resets_to_zero() {
        let mut shoe = Shoe::new(6);
        shoe.observe(card(2)).expect("card observed");
        shoe.shuffle();
        let snap = shoe.snapshot();
        assert_eq!(snap.running_count, 0);
        assert_eq!(snap.cards_dealt, 0);
    }

    #[test]
    fn true_count_divides_by_decks_remaining() {
        let mut shoe = Shoe::new(1);
        for _ in 0..10 {
            shoe.observe(card(2)).expect("card observed");
        }
        let snap = shoe.snapshot();
        assert_eq!(snap.running_count, 10);
        let expected_decks = (52.0 - 10.0) / 52.0;
        assert!((snap.decks_remaining - expected_decks).abs() < 1e-9);
    }

    #[test]
    fn true_count_never_divides_below_half_a_deck() {
        let mut shoe = Shoe::new(1);
        for _ in 0..48 {
            shoe.observe(card(2)).expect("card observed");
        }
        let snap = shoe.snapshot();
        // 4 cards remain: 4/52 decks, below the 0.5 floor.
        assert!((snap.true_count - f64::from(snap.running_count) / 0.5).abs() < 1e-9);
    }

    #[test]
    fn exhausted_shoe_rejects_further_observation() {
        let mut shoe = Shoe::new(1);
        for _ in 0..52 {
            shoe.observe(card(2)).expect("card observed");
        }
        assert_eq!(shoe.observe(card(3)), Err(ObserveError::ShoeExhausted));
    }
}

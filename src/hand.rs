//! Player and dealer hand representations.

extern crate alloc;

use alloc::vec::Vec;

use crate::card::{Card, blackjack_value};

const fn card_value(rank: u8) -> u8 {
    blackjack_value(rank)
}

fn evaluate_cards(cards: &[Card]) -> (u8, bool) {
    let mut value: u8 = 0;
    let mut aces: u8 = 0;

    for card in cards {
        if card.rank == 1 {
            aces += 1;
        }
        value = value.saturating_add(card_value(card.rank));
    }

    while value > 21 && aces > 0 {
        value -= 10;
        aces -= 1;
    }

    let is_soft = aces > 0 && value <= 21;
    (value, is_soft)
}

/// The category a hand falls under for strategy-table lookup.
///
/// Pair detection takes precedence over the hard/soft split: a pair of tens
/// is tested as `Pair(10)` for the split decision and separately as
/// `Hard(20)` for the no-split baseline, never conflated into one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandCategory {
    /// A hand with no ace counted as 11, at the given total.
    Hard(u8),
    /// A hand with an ace counted as 11, at the given total.
    Soft(u8),
    /// A two-card pair of the given rank (1 = Ace, 11-13 collapse to 10 for
    /// lookup purposes via [`crate::card::dealer_up_value`]).
    Pair(u8),
}

/// Hand status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandStatus {
    /// Hand is active and can take actions.
    Active,
    /// Player has stood.
    Stand,
    /// Hand has busted (over 21).
    Bust,
    /// Hand is a blackjack (natural 21).
    Blackjack,
    /// Player has surrendered.
    Surrendered,
}

/// A player's hand.
#[derive(Debug, Clone)]
pub struct Hand {
    /// Cards in the hand.
    cards: Vec<Card>,
    /// Current status of the hand.
    status: HandStatus,
    /// Bet amount for this hand.
    bet: u64,
    /// Whether this hand is from a split.
    from_split: bool,
}

impl Hand {
    /// Creates a new empty hand with the given bet.
    #[must_use]
    pub const fn new(bet: u64) -> Self {
        Self {
            cards: Vec::new(),
            status: HandStatus::Active,
            bet,
            from_split: false,
        }
    }

    /// Creates a new hand from a split with a single card.
    #[must_use]
    pub fn from_split(card: Card, bet: u64) -> Self {
        Self {
            cards: alloc::vec![card],
            status: HandStatus::Active,
            bet,
            from_split: true,
        }
    }

    /// Adds a card to the hand, updating bust/blackjack status.
    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);

        let (value, _) = evaluate_cards(&self.cards);

        if value > 21 {
            self.status = HandStatus::Bust;
        } else if self.cards.len() == 2 && value == 21 && !self.from_split {
            self.status = HandStatus::Blackjack;
        }
    }

    /// Returns the cards in the hand.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Returns the current status of the hand.
    #[must_use]
    pub const fn status(&self) -> HandStatus {
        self.status
    }

    /// Sets the hand status.
    pub const fn set_status(&mut self, status: HandStatus) {
        self.status = status;
    }

    /// Returns the bet amount for this hand.
    #[must_use]
    pub const fn bet(&self) -> u64 {
        self.bet
    }

    /// Doubles the bet amount.
    pub const fn double_bet(&mut self) {
        self.bet *= 2;
    }

    /// Returns whether this hand is from a split.
    #[must_use]
    pub const fn is_from_split(&self) -> bool {
        self.from_split
    }

    /// Calculates the value of the hand.
    ///
    /// Aces are counted as 11 if possible without busting, otherwise as 1.
    #[must_use]
    pub fn value(&self) -> u8 {
        evaluate_cards(&self.cards).0
    }

    /// Returns whether the hand is soft (contains an ace counted as 11).
    #[must_use]
    pub fn is_soft(&self) -> bool {
        evaluate_cards(&self.cards).1
    }

    /// Returns whether the hand can be split (two cards of equal rank).
    #[must_use]
    pub fn can_split(&self) -> bool {
        self.cards.len() == 2 && self.cards[0].rank == self.cards[1].rank
    }

    /// Returns the category used for strategy-table lookup.
    ///
    /// Returns the pair category when the hand is a splittable two-card pair;
    /// callers that also need the non-split baseline should fall back to
    /// [`Hand::hard_or_soft_category`].
    #[must_use]
    pub fn category(&self) -> HandCategory {
        if self.can_split() {
            HandCategory::Pair(self.cards[0].rank)
        } else {
            self.hard_or_soft_category()
        }
    }

    /// Returns the hard/soft category, ignoring pair-splitting eligibility.
    #[must_use]
    pub fn hard_or_soft_category(&self) -> HandCategory {
        let (total, is_soft) = evaluate_cards(&self.cards);
        if is_soft {
            HandCategory::Soft(total)
        } else {
            HandCategory::Hard(total)
        }
    }

    /// Returns the number of cards in the hand.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns whether the hand is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Removes and returns the second card (for splitting).
    pub fn take_split_card(&mut self) -> Option<Card> {
        if self.cards.len() == 2 {
            self.cards.pop()
        } else {
            None
        }
    }
}

/// The dealer's hand.
#[derive(Debug, Clone)]
pub struct DealerHand {
    /// Cards in the hand.
    cards: Vec<Card>,
    /// Whether the hole card is revealed.
    hole_revealed: bool,
}

impl DealerHand {
    /// Creates a new empty dealer hand.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cards: Vec::new(),
            hole_revealed: false,
        }
    }

    /// Adds a card to the hand.
    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Returns all cards in the hand.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Returns the visible card (first card, dealt face-up).
    #[must_use]
    pub fn up_card(&self) -> Option<&Card> {
        self.cards.first()
    }

    /// Returns whether the hole card is revealed.
    #[must_use]
    pub const fn is_hole_revealed(&self) -> bool {
        self.hole_revealed
    }

    /// Reveals the hole card. Idempotent.
    pub const fn reveal_hole(&mut self) {
        self.hole_revealed = true;
    }

    /// Calculates the visible value (only the up card if the hole is hidden).
    #[must_use]
    pub fn visible_value(&self) -> u8 {
        if self.hole_revealed {
            self.value()
        } else {
            self.cards.first().map_or(0, |c| card_value(c.rank))
        }
    }

    /// Calculates the full value of the hand.
    #[must_use]
    pub fn value(&self) -> u8 {
        evaluate_cards(&self.cards).0
    }

    /// Returns whether the hand is a blackjack.
    #[must_use]
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value() == 21
    }

    /// Returns whether the hand is bust.
    #[must_use]
    pub fn is_bust(&self) -> bool {
        self.value() > 21
    }

    /// Returns whether the hand is soft (contains an ace counted as 11).
    #[must_use]
    pub fn is_soft(&self) -> bool {
        evaluate_cards(&self.cards).1
    }

    /// Returns the number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns whether the hand is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Clears the hand for a new round.
    pub fn clear(&mut self) {
        self.cards.clear();
        self.hole_revealed = false;
    }
}

impl Default for DealerHand {
    fn default() -> Self {
        Self::new()
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
    fn soft_ace_downgrades_on_bust_risk() {
        let mut hand = Hand::new(10);
        hand.add_card(card(1));
        hand.add_card(card(9));
        hand.add_card(card(5));
        assert_eq!(hand.value(), 15);
        assert!(!hand.is_soft());
    }

    #[test]
    fn pair_of_tens_categorises_as_pair_and_hard_20() {
        let mut hand = Hand::new(10);
        hand.add_card(Card::new(Suit::Hearts, 10));
        hand.add_card(Card::new(Suit::Clubs, 13));
        assert!(!hand.can_split(), "10 and King are different ranks");
        assert_eq!(hand.hard_or_soft_category(), HandCategory::Hard(20));

        let mut same_rank = Hand::new(10);
        same_rank.add_card(Card::new(Suit::Hearts, 10));
        same_rank.add_card(Card::new(Suit::Clubs, 10));
        assert!(same_rank.can_split());
        assert_eq!(same_rank.category(), HandCategory::Pair(10));
        assert_eq!(same_rank.hard_or_soft_category(), HandCategory::Hard(20));
    }

    #[test]
    fn blackjack_detected_only_on_initial_two_cards() {
        let mut hand = Hand::new(10);
        hand.add_card(card(1));
        hand.add_card(card(13));
        assert_eq!(hand.status(), HandStatus::Blackjack);

        let mut from_split = Hand::from_split(card(1), 10);
        from_split.add_card(card(13));
        assert_ne!(from_split.status(), HandStatus::Blackjack);
    }

    #[test]
    fn dealer_hides_hole_card_value_until_revealed() {
        let mut dealer = DealerHand::new();
        dealer.add_card(card(6));
        dealer.add_card(card(13));
        assert_eq!(dealer.visible_value(), 6);
        dealer.reveal_hole();
        assert_eq!(dealer.visible_value(), 16);
    }
}

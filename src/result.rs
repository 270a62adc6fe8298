//! Round settlement types.

extern crate alloc;

use alloc::vec::Vec;

/// Outcome of a single settled hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum HandOutcome {
    /// Player wins (dealer busts or player has the higher total).
    Win,
    /// Player loses (dealer has the higher total).
    Lose,
    /// Player busted.
    Bust,
    /// Push (tie).
    Push,
    /// Player has a natural blackjack.
    Blackjack,
    /// Player surrendered.
    Surrendered,
}

/// Settlement result for a single hand (there may be more than one per
/// round if the player split).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct HandResult {
    /// Index of this hand among the round's hands (0 for the first hand,
    /// incrementing for each split).
    pub hand_index: usize,
    /// The outcome of the hand.
    pub outcome: HandOutcome,
    /// The bet amount for this hand (already doubled if doubled down).
    pub bet: u64,
    /// The payout amount (winnings credited to the bankroll, including the
    /// returned wager on a win or push; 0 on a loss).
    pub payout: u64,
    /// The player's final hand value.
    pub player_value: u8,
    /// The dealer's final hand value.
    pub dealer_value: u8,
}

/// Settlement result for an entire round (all of the player's hands, plus
/// the dealer's outcome).
#[derive(Debug, Clone, serde::Serialize)]
pub struct RoundResult {
    /// Per-hand results, in hand order.
    pub hands: Vec<HandResult>,
    /// Total payout across all hands plus insurance.
    pub total_payout: u64,
    /// Net result for the round (positive profit, negative loss).
    pub net: i64,
    /// The dealer's final hand value.
    pub dealer_value: u8,
    /// Whether the dealer busted.
    pub dealer_bust: bool,
    /// Whether the dealer had blackjack.
    pub dealer_blackjack: bool,
    /// Insurance bet amount (0 if insurance was not taken).
    pub insurance_bet: u64,
    /// Insurance payout (0 unless the dealer had blackjack and insurance was taken).
    pub insurance_payout: u64,
}

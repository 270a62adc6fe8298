//! Table rules configuration.

use crate::error::BadRulesError;

/// Conditions under which doubling down is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum DoubleOption {
    /// Double down allowed on any hand.
    #[default]
    Any,
    /// Double down allowed only on 9 or 10.
    NineOrTen,
    /// Double down allowed only on 9 through 11.
    NineThrough11,
    /// Double down allowed only on 9 through 15.
    NineThrough15,
    /// Double down not allowed.
    None,
}

/// Rounding mode for payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Round up.
    Up,
    /// Round down.
    Down,
    /// Round to nearest.
    Nearest,
}

/// Table rules and engine tunables.
///
/// Use the builder pattern to customize rules:
///
/// ```
/// use cardcount::rules::GameRules;
///
/// let rules = GameRules::default()
///     .with_decks(6)
///     .with_blackjack_pays(1.5)
///     .with_stand_on_soft_17(true);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    /// Number of decks.
    pub decks: u8,
    /// Blackjack payout ratio (typically 1.5, punitively 1.2 for 6:5).
    pub blackjack_pays: f64,
    /// Whether dealer stands on soft 17 (S17 vs H17).
    pub stand_on_soft_17: bool,
    /// Double down conditions.
    pub double: DoubleOption,
    /// Maximum number of splits allowed.
    pub split: u8,
    /// Whether double down is allowed after split (DAS).
    pub double_after_split: bool,
    /// Whether aces can only be split once.
    pub split_aces_only_once: bool,
    /// Whether split aces receive only one card.
    pub split_aces_receive_one_card: bool,
    /// Whether surrender is allowed.
    pub surrender: bool,
    /// Whether insurance is offered when the dealer shows an Ace.
    pub insurance: bool,
    /// Rounding mode for blackjack payouts.
    pub rounding_blackjack: RoundingMode,
    /// Rounding mode for surrender refunds.
    pub rounding_surrender: RoundingMode,
    /// Deck penetration (fraction of shoe dealt before a forced reshuffle).
    pub penetration: f64,
    /// Table minimum wager.
    pub table_min: u64,
    /// Table maximum wager.
    pub table_max: u64,
    /// Fraction of full Kelly to bet (0.5 = half-Kelly).
    pub kelly_fraction: f64,
    /// Extra true-count margin a deviation must clear before it fires.
    pub deviation_threshold_margin: f64,
    /// Penetration past which the bet-sizing engine forces the table minimum
    /// regardless of advantage, since Hi-Lo's edge model degrades deep in the shoe.
    pub max_betting_penetration: f64,
    /// True-count threshold below which the bet-sizing engine signals a Wong-out.
    pub wong_out_threshold: f64,
    /// Insurance is recommended when the true count is at or above this threshold.
    pub insurance_true_count_threshold: f64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            decks: 6,
            blackjack_pays: 1.5,
            stand_on_soft_17: true,
            double: DoubleOption::Any,
            split: 3,
            double_after_split: true,
            split_aces_only_once: true,
            split_aces_receive_one_card: true,
            surrender: true,
            insurance: true,
            rounding_blackjack: RoundingMode::Down,
            rounding_surrender: RoundingMode::Nearest,
            penetration: 0.75,
            table_min: 15,
            table_max: 500,
            kelly_fraction: 0.5,
            deviation_threshold_margin: 0.0,
            max_betting_penetration: 0.85,
            wong_out_threshold: -1.0,
            insurance_true_count_threshold: 3.0,
        }
    }
}

impl GameRules {
    /// Sets the number of decks.
    #[must_use]
    pub const fn with_decks(mut self, decks: u8) -> Self {
        self.decks = decks;
        self
    }

    /// Sets the blackjack payout ratio.
    #[must_use]
    pub const fn with_blackjack_pays(mut self, ratio: f64) -> Self {
        self.blackjack_pays = ratio;
        self
    }

    /// Sets whether dealer stands on soft 17.
    #[must_use]
    pub const fn with_stand_on_soft_17(mut self, stand: bool) -> Self {
        self.stand_on_soft_17 = stand;
        self
    }

    /// Sets the double down conditions.
    #[must_use]
    pub const fn with_double(mut self, double: DoubleOption) -> Self {
        self.double = double;
        self
    }

    /// Sets the maximum number of splits allowed.
    #[must_use]
    pub const fn with_split(mut self, split: u8) -> Self {
        self.split = split;
        self
    }

    /// Sets whether double down is allowed after split.
    #[must_use]
    pub const fn with_double_after_split(mut self, allowed: bool) -> Self {
        self.double_after_split = allowed;
        self
    }

    /// Sets whether aces can only be split once.
    #[must_use]
    pub const fn with_split_aces_only_once(mut self, only_once: bool) -> Self {
        self.split_aces_only_once = only_once;
        self
    }

    /// Sets whether split aces receive only one card.
    #[must_use]
    pub const fn with_split_aces_receive_one_card(mut self, one_card: bool) -> Self {
        self.split_aces_receive_one_card = one_card;
        self
    }

    /// Sets whether surrender is allowed.
    #[must_use]
    pub const fn with_surrender(mut self, allowed: bool) -> Self {
        self.surrender = allowed;
        self
    }

    /// Sets whether insurance is offered.
    #[must_use]
    pub const fn with_insurance(mut self, offered: bool) -> Self {
        self.insurance = offered;
        self
    }

    /// Sets the rounding mode for blackjack payouts.
    #[must_use]
    pub const fn with_rounding_blackjack(mut self, mode: RoundingMode) -> Self {
        self.rounding_blackjack = mode;
        self
    }

    /// Sets the rounding mode for surrender refunds.
    #[must_use]
    pub const fn with_rounding_surrender(mut self, mode: RoundingMode) -> Self {
        self.rounding_surrender = mode;
        self
    }

    /// Sets the deck penetration used to trigger a forced reshuffle.
    #[must_use]
    pub const fn with_penetration(mut self, penetration: f64) -> Self {
        self.penetration = penetration;
        self
    }

    /// Sets the table wager limits.
    #[must_use]
    pub const fn with_table_limits(mut self, min: u64, max: u64) -> Self {
        self.table_min = min;
        self.table_max = max;
        self
    }

    /// Sets the fraction of full Kelly to wager.
    #[must_use]
    pub const fn with_kelly_fraction(mut self, fraction: f64) -> Self {
        self.kelly_fraction = fraction;
        self
    }

    /// Sets the Wong-out true-count threshold.
    #[must_use]
    pub const fn with_wong_out_threshold(mut self, threshold: f64) -> Self {
        self.wong_out_threshold = threshold;
        self
    }

    /// Sets the maximum penetration the bet-sizing engine will bet above the table minimum at.
    #[must_use]
    pub const fn with_max_betting_penetration(mut self, penetration: f64) -> Self {
        self.max_betting_penetration = penetration;
        self
    }

    /// Validates the rules for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`BadRulesError`] if the table limits are inverted, the deck
    /// count is zero, or the penetration is outside `(0, 1]`.
    pub const fn validate(&self) -> Result<(), BadRulesError> {
        if self.decks == 0 {
            return Err(BadRulesError::ZeroDecks);
        }
        if self.table_min > self.table_max {
            return Err(BadRulesError::InvertedTableLimits);
        }
        if self.penetration <= 0.0 || self.penetration > 1.0 {
            return Err(BadRulesError::InvalidPenetration);
        }
        Ok(())
    }

    /// Checks whether double down is allowed for the given hand total.
    #[must_use]
    pub fn allows_double_on(&self, value: u8) -> bool {
        match self.double {
            DoubleOption::Any => true,
            DoubleOption::NineOrTen => value == 9 || value == 10,
            DoubleOption::NineThrough11 => (9..=11).contains(&value),
            DoubleOption::NineThrough15 => (9..=15).contains(&value),
            DoubleOption::None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_validate() {
        assert!(GameRules::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_table_limits() {
        let rules = GameRules::default().with_table_limits(100, 50);
        assert_eq!(rules.validate(), Err(BadRulesError::InvertedTableLimits));
    }

    #[test]
    fn rejects_zero_decks() {
        let rules = GameRules::default().with_decks(0);
        assert_eq!(rules.validate(), Err(BadRulesError::ZeroDecks));
    }
}

//! The bet-sizing engine: true count to advantage to a fractional-Kelly wager.

use crate::rules::GameRules;
use crate::shoe::CountSnapshot;

/// Hi-Lo's true-count-to-edge conversion factor: each point of true count is
/// worth about half a percentage point of player advantage.
const TRUE_COUNT_TO_EDGE: f64 = 0.005;

/// Approximate variance of a blackjack bet outcome, used to scale Kelly sizing.
const VARIANCE: f64 = 1.26;

/// The recommended wager for the next hand, plus the reasoning behind it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct BetRecommendation {
    /// The wager amount, already clamped to the table limits.
    pub amount: u64,
    /// The modelled player advantage (can be negative) before clamping.
    pub advantage: f64,
    /// Whether the deep-penetration defensive cutoff forced the table minimum.
    pub defensive_cutoff: bool,
}

/// The house's edge under flat betting for a given rule set, before any
/// count-based advantage is added. This is a small hard-coded adjustment
/// table rather than a closed-form model, mirroring how the original
/// engine's payout rounding is rule-dependent but table-driven rather than
/// derived.
#[must_use]
pub fn baseline_edge(rules: &GameRules) -> f64 {
    let mut edge = 0.004_f64; // 6-deck, S17, DAS, late surrender, 3:2 baseline.
    if !rules.stand_on_soft_17 {
        edge += 0.0022;
    }
    if (rules.blackjack_pays - 1.2).abs() < f64::EPSILON {
        edge += 0.0139;
    }
    if !rules.double_after_split {
        edge += 0.0014;
    }
    if !rules.surrender {
        edge += 0.0008;
    }
    edge
}

/// Computes the player's modelled advantage at the given true count.
#[must_use]
pub fn advantage(true_count: f64, rules: &GameRules) -> f64 {
    true_count * TRUE_COUNT_TO_EDGE - baseline_edge(rules)
}

/// Recommends a bet for the next hand.
///
/// Applies, in order: the advantage model, fractional-Kelly sizing, the
/// table-limit clamp, and finally the deep-penetration defensive cutoff
/// (which unconditionally forces the table minimum).
#[must_use]
pub fn recommend_bet(count: CountSnapshot, bankroll: u64, rules: &GameRules) -> BetRecommendation {
    let edge = advantage(count.true_count, rules);

    #[expect(
        clippy::cast_precision_loss,
        reason = "bankroll values fit comfortably in f64 precision"
    )]
    let bankroll_f = bankroll as f64;

    let raw_bet = if edge <= 0.0 {
        0.0
    } else {
        rules.kelly_fraction * edge / VARIANCE * bankroll_f
    };

    let mut amount = raw_bet.round() as u64;

    amount = amount.clamp(rules.table_min, rules.table_max);
    if edge <= 0.0 {
        amount = rules.table_min;
    }

    let defensive_cutoff = count.penetration > rules.max_betting_penetration;
    if defensive_cutoff {
        amount = rules.table_min;
    }

    BetRecommendation {
        amount,
        advantage: edge,
        defensive_cutoff,
    }
}

/// Whether the player should Wong out of the current shoe: the true count
/// has dropped below the configured threshold and at least one hand has
/// already been dealt this shoe (there's no point signalling an exit before
/// the first hand of a freshly shuffled shoe).
#[must_use]
pub fn should_wong_out(true_count: f64, hands_dealt_this_shoe: u32, rules: &GameRules) -> bool {
    hands_dealt_this_shoe > 0 && true_count < rules.wong_out_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(true_count: f64, penetration: f64) -> CountSnapshot {
        CountSnapshot {
            running_count: 0,
            true_count,
            decks_remaining: 3.0,
            penetration,
            cards_dealt: 100,
        }
    }

    #[test]
    fn negative_advantage_yields_table_minimum() {
        let rules = GameRules::default();
        let rec = recommend_bet(snapshot(-2.0, 0.3), 10_000, &rules);
        assert_eq!(rec.amount, rules.table_min);
    }

    #[test]
    fn bet_is_always_within_table_limits() {
        let rules = GameRules::default();
        let rec = recommend_bet(snapshot(20.0, 0.3), 1_000_000, &rules);
        assert!(rec.amount >= rules.table_min);
        assert!(rec.amount <= rules.table_max);
    }

    #[test]
    fn deep_penetration_forces_table_minimum_regardless_of_advantage() {
        let rules = GameRules::default();
        let rec = recommend_bet(snapshot(10.0, 0.9), 1_000_000, &rules);
        assert_eq!(rec.amount, rules.table_min);
        assert!(rec.defensive_cutoff);
    }

    #[test]
    fn wong_out_requires_at_least_one_hand_dealt() {
        let rules = GameRules::default();
        assert!(!should_wong_out(-5.0, 0, &rules));
        assert!(should_wong_out(-5.0, 1, &rules));
    }

    #[test]
    fn wong_out_is_monotone_in_true_count() {
        let rules = GameRules::default();
        assert!(should_wong_out(-1.6, 3, &rules));
        assert!(should_wong_out(-2.5, 3, &rules), "lower TC must still signal");
    }
}

//! The basic-strategy table, the Illustrious 18 + Fab 4 index-play deviations,
//! and the pure decision function that combines them.
//!
//! The baseline table is an associative map from `(HandCategory, dealer_up)`
//! to an [`Action`] — a flat key-value map rather than nested match arms —
//! so that table coverage can be validated mechanically at load time instead
//! of trusted to exhaustive pattern matching.

extern crate alloc;

use alloc::vec::Vec;
#[cfg(all(not(feature = "std"), feature = "alloc"))]
use hashbrown::HashMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::card::dealer_up_value;
use crate::error::BadRulesError;
use crate::hand::HandCategory;
use crate::rules::GameRules;
use crate::shoe::CountSnapshot;

/// A recommended (or taken) player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Action {
    /// Take no more cards.
    Stand,
    /// Draw one card.
    Hit,
    /// Double the wager, draw exactly one card, then stand.
    Double,
    /// Split a pair into two hands.
    Split,
    /// Forfeit half the wager and end the hand immediately.
    Surrender,
}

/// The legal actions available on the current hand, independent of what
/// basic strategy or a deviation would recommend. The decision engine uses
/// this to fall back from an illegal recommendation to the next-best legal
/// action, per the Double/Split/Surrender legality rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalActions {
    /// Whether DOUBLE is legal on this hand right now.
    pub can_double: bool,
    /// Whether SPLIT is legal on this hand right now.
    pub can_split: bool,
    /// Whether SURRENDER is legal on this hand right now.
    pub can_surrender: bool,
}

/// The direction a deviation's true-count comparison runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Fires when `true_count >= threshold`.
    AtOrAbove,
    /// Fires when `true_count < threshold`.
    Below,
}

/// A single count-indexed strategy deviation (an Illustrious 18, Fab 4, or
/// supplementary entry).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationEntry {
    /// The hand category this deviation applies to.
    pub category: HandCategory,
    /// The dealer up-card value (2..=11, Ace as 11) this deviation applies to.
    pub dealer_up: u8,
    /// The true-count threshold.
    pub threshold: f64,
    /// Which direction past the threshold this deviation fires.
    pub direction: Direction,
    /// The action taken when this deviation fires, overriding the baseline.
    pub action: Action,
}

impl DeviationEntry {
    /// Whether this deviation fires at the given true count, accounting for
    /// the rules' deviation margin: the margin always demands *more* evidence
    /// before departing from baseline, regardless of direction.
    #[must_use]
    pub fn fires(&self, true_count: f64, margin: f64) -> bool {
        match self.direction {
            Direction::AtOrAbove => true_count - margin >= self.threshold,
            Direction::Below => true_count + margin < self.threshold,
        }
    }
}

type BaselineKey = (HandCategory, u8);

/// The immutable basic-strategy table plus its ordered deviation list.
#[derive(Debug, Clone)]
pub struct StrategyTable {
    baseline: HashMap<BaselineKey, Action>,
    deviations: Vec<DeviationEntry>,
}

impl StrategyTable {
    /// Builds the canonical basic-strategy table (6-8 deck, dealer stands on
    /// soft 17, double after split) plus the Illustrious 18 and Fab 4
    /// deviations, and validates its coverage.
    ///
    /// # Errors
    ///
    /// Returns [`BadRulesError`] if the constructed table is missing a
    /// baseline entry or a deviation references an uncovered category —
    /// this should never happen for the canonical table built here, but the
    /// check runs unconditionally so a future edit to the table can never
    /// silently ship an incomplete one.
    pub fn canonical() -> Result<Self, BadRulesError> {
        let mut baseline = HashMap::new();
        build_hard_totals(&mut baseline);
        build_soft_totals(&mut baseline);
        build_pairs(&mut baseline);

        let deviations = canonical_deviations();

        let table = Self {
            baseline,
            deviations,
        };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), BadRulesError> {
        if self.baseline.is_empty() {
            return Err(BadRulesError::IncompleteStrategyTable);
        }
        for dev in &self.deviations {
            let key = (dev.category, dev.dealer_up);
            if !self.baseline.contains_key(&key) {
                return Err(BadRulesError::DeviationWithoutBaseline);
            }
        }
        Ok(())
    }

    /// Looks up the baseline action for a category and dealer up-card,
    /// without consulting deviations.
    #[must_use]
    pub fn baseline_action(&self, category: HandCategory, dealer_up: u8) -> Option<Action> {
        self.baseline.get(&(category, dealer_up)).copied()
    }

    /// Returns the deviation that fires for this category/dealer-up at the
    /// given true count, if any (first match wins; the list is ordered
    /// Illustrious 18 first, then Fab 4, then supplementary entries).
    #[must_use]
    pub fn matching_deviation(
        &self,
        category: HandCategory,
        dealer_up: u8,
        true_count: f64,
        margin: f64,
    ) -> Option<&DeviationEntry> {
        self.deviations.iter().find(|dev| {
            dev.category == category && dev.dealer_up == dealer_up && dev.fires(true_count, margin)
        })
    }
}

/// Recommends the optimal action for a hand against a dealer up-card, given
/// the current count and the current hand's legal actions.
///
/// `hard_or_soft` is the hand's category with pair detection ignored (always
/// `Hard`/`Soft`); it is consulted only when `category` is a `Pair` whose
/// SPLIT is illegal, to fall back to the hand's HARD/SOFT baseline entry
/// instead of the pair entry.
///
/// This is a pure function: identical inputs yield identical outputs and
/// nothing is mutated.
#[must_use]
pub fn recommend_action(
    category: HandCategory,
    hard_or_soft: HandCategory,
    dealer_up_rank: u8,
    count: CountSnapshot,
    rules: &GameRules,
    table: &StrategyTable,
    legal: LegalActions,
) -> Action {
    let dealer_up = dealer_up_value(dealer_up_rank);

    let action = table
        .matching_deviation(
            category,
            dealer_up,
            count.true_count,
            rules.deviation_threshold_margin,
        )
        .map_or_else(
            || {
                table
                    .baseline_action(category, dealer_up)
                    .unwrap_or(Action::Hit)
            },
            |dev| dev.action,
        );

    apply_legality(action, category, hard_or_soft, dealer_up, table, legal)
}

/// Whether insurance should be taken at the current count, per the
/// configured threshold. Evaluated independently of the primary action.
#[must_use]
pub fn should_take_insurance(count: CountSnapshot, rules: &GameRules) -> bool {
    rules.insurance && count.true_count >= rules.insurance_true_count_threshold
}

fn apply_legality(
    action: Action,
    category: HandCategory,
    hard_or_soft: HandCategory,
    dealer_up: u8,
    table: &StrategyTable,
    legal: LegalActions,
) -> Action {
    match action {
        Action::Double if !legal.can_double => Action::Hit,
        Action::Split if !legal.can_split => match category {
            HandCategory::Pair(_) => table
                .baseline_action(hard_or_soft, dealer_up)
                .unwrap_or(Action::Hit),
            _ => action,
        },
        Action::Surrender if !legal.can_surrender => Action::Hit,
        other => other,
    }
}

fn build_hard_totals(baseline: &mut HashMap<BaselineKey, Action>) {
    use Action::{Double, Hit, Stand, Surrender};
    use HandCategory::Hard;

    for total in 5..=8 {
        for dealer_up in 2..=11 {
            baseline.insert((Hard(total), dealer_up), Hit);
        }
    }
    for dealer_up in 2..=11 {
        let action = if (3..=6).contains(&dealer_up) {
            Double
        } else {
            Hit
        };
        baseline.insert((Hard(9), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        let action = if (2..=9).contains(&dealer_up) {
            Double
        } else {
            Hit
        };
        baseline.insert((Hard(10), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        let action = if dealer_up <= 10 { Double } else { Hit };
        baseline.insert((Hard(11), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        let action = if (4..=6).contains(&dealer_up) {
            Stand
        } else {
            Hit
        };
        baseline.insert((Hard(12), dealer_up), action);
    }
    for total in 13..=14 {
        for dealer_up in 2..=11 {
            let action = if (2..=6).contains(&dealer_up) {
                Stand
            } else {
                Hit
            };
            baseline.insert((Hard(total), dealer_up), action);
        }
    }
    for dealer_up in 2..=11 {
        let action = if dealer_up == 10 {
            Surrender
        } else if (2..=6).contains(&dealer_up) {
            Stand
        } else {
            Hit
        };
        baseline.insert((Hard(15), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        let action = if dealer_up == 10 || dealer_up == 11 {
            Surrender
        } else if dealer_up == 9 {
            Surrender
        } else if (2..=6).contains(&dealer_up) {
            Stand
        } else {
            Hit
        };
        baseline.insert((Hard(16), dealer_up), action);
    }
    for total in 17..=21 {
        for dealer_up in 2..=11 {
            baseline.insert((Hard(total), dealer_up), Stand);
        }
    }
}

fn build_soft_totals(baseline: &mut HashMap<BaselineKey, Action>) {
    use Action::{Double, Hit, Stand};
    use HandCategory::Soft;

    for total in 13..=14 {
        for dealer_up in 2..=11 {
            let action = if (5..=6).contains(&dealer_up) {
                Double
            } else {
                Hit
            };
            baseline.insert((Soft(total), dealer_up), action);
        }
    }
    for total in 15..=16 {
        for dealer_up in 2..=11 {
            let action = if (4..=6).contains(&dealer_up) {
                Double
            } else {
                Hit
            };
            baseline.insert((Soft(total), dealer_up), action);
        }
    }
    for dealer_up in 2..=11 {
        let action = if (3..=6).contains(&dealer_up) {
            Double
        } else {
            Hit
        };
        baseline.insert((Soft(17), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        let action = if (3..=6).contains(&dealer_up) {
            Double
        } else if dealer_up == 2 || dealer_up == 7 || dealer_up == 8 {
            Stand
        } else {
            Hit
        };
        baseline.insert((Soft(18), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        let action = if dealer_up == 6 { Double } else { Stand };
        baseline.insert((Soft(19), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        baseline.insert((Soft(20), dealer_up), Stand);
    }
    for dealer_up in 2..=11 {
        baseline.insert((Soft(21), dealer_up), Stand);
    }
}

fn build_pairs(baseline: &mut HashMap<BaselineKey, Action>) {
    use Action::{Double, Hit, Split, Stand};
    use HandCategory::Pair;

    for dealer_up in 2..=11 {
        let action = if (2..=7).contains(&dealer_up) {
            Split
        } else {
            Hit
        };
        baseline.insert((Pair(2), dealer_up), action);
        baseline.insert((Pair(3), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        let action = if (5..=6).contains(&dealer_up) {
            Split
        } else {
            Hit
        };
        baseline.insert((Pair(4), dealer_up), action);
    }
    // Pair of 5s is never split; treat as hard 10.
    for dealer_up in 2..=11 {
        let action = if (2..=9).contains(&dealer_up) {
            Double
        } else {
            Hit
        };
        baseline.insert((Pair(5), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        let action = if (2..=6).contains(&dealer_up) {
            Split
        } else {
            Hit
        };
        baseline.insert((Pair(6), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        let action = if (2..=7).contains(&dealer_up) {
            Split
        } else {
            Hit
        };
        baseline.insert((Pair(7), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        baseline.insert((Pair(8), dealer_up), Split);
    }
    for dealer_up in 2..=11 {
        let action = if dealer_up == 7 || dealer_up == 10 || dealer_up == 11 {
            Stand
        } else {
            Split
        };
        baseline.insert((Pair(9), dealer_up), action);
    }
    for dealer_up in 2..=11 {
        baseline.insert((Pair(10), dealer_up), Stand);
        baseline.insert((Pair(11), dealer_up), Stand);
        baseline.insert((Pair(12), dealer_up), Stand);
        baseline.insert((Pair(13), dealer_up), Stand);
    }
    for dealer_up in 2..=11 {
        baseline.insert((Pair(1), dealer_up), Split);
    }
}

fn canonical_deviations() -> Vec<DeviationEntry> {
    use Action::{Double, Stand, Surrender};
    use Direction::AtOrAbove;
    use HandCategory::Hard;

    alloc::vec![
        // Illustrious 18 core.
        DeviationEntry {
            category: Hard(16),
            dealer_up: 10,
            threshold: 0.0,
            direction: AtOrAbove,
            action: Stand,
        },
        DeviationEntry {
            category: Hard(15),
            dealer_up: 10,
            threshold: 4.0,
            direction: AtOrAbove,
            action: Stand,
        },
        DeviationEntry {
            category: Hard(12),
            dealer_up: 3,
            threshold: 2.0,
            direction: AtOrAbove,
            action: Stand,
        },
        DeviationEntry {
            category: Hard(12),
            dealer_up: 2,
            threshold: 3.0,
            direction: AtOrAbove,
            action: Stand,
        },
        DeviationEntry {
            category: Hard(11),
            dealer_up: 11,
            threshold: 1.0,
            direction: AtOrAbove,
            action: Double,
        },
        DeviationEntry {
            category: Hard(10),
            dealer_up: 10,
            threshold: 4.0,
            direction: AtOrAbove,
            action: Double,
        },
        DeviationEntry {
            category: Hard(10),
            dealer_up: 11,
            threshold: 4.0,
            direction: AtOrAbove,
            action: Double,
        },
        DeviationEntry {
            category: Hard(9),
            dealer_up: 2,
            threshold: 1.0,
            direction: AtOrAbove,
            action: Double,
        },
        DeviationEntry {
            category: Hard(9),
            dealer_up: 7,
            threshold: 3.0,
            direction: AtOrAbove,
            action: Double,
        },
        DeviationEntry {
            category: Hard(16),
            dealer_up: 9,
            threshold: 5.0,
            direction: AtOrAbove,
            action: Stand,
        },
        DeviationEntry {
            category: Hard(13),
            dealer_up: 2,
            threshold: -1.0,
            direction: AtOrAbove,
            action: Stand,
        },
        DeviationEntry {
            category: Hard(12),
            dealer_up: 4,
            threshold: -1.0,
            direction: AtOrAbove,
            action: Stand,
        },
        DeviationEntry {
            category: Hard(12),
            dealer_up: 5,
            threshold: -2.0,
            direction: AtOrAbove,
            action: Stand,
        },
        DeviationEntry {
            category: Hard(12),
            dealer_up: 6,
            threshold: -1.0,
            direction: AtOrAbove,
            action: Stand,
        },
        DeviationEntry {
            category: Hard(13),
            dealer_up: 3,
            threshold: -2.0,
            direction: AtOrAbove,
            action: Stand,
        },
        // Fab 4 late surrenders.
        DeviationEntry {
            category: Hard(15),
            dealer_up: 10,
            threshold: 0.0,
            direction: AtOrAbove,
            action: Surrender,
        },
        DeviationEntry {
            category: Hard(15),
            dealer_up: 11,
            threshold: 1.0,
            direction: AtOrAbove,
            action: Surrender,
        },
        DeviationEntry {
            category: Hard(15),
            dealer_up: 9,
            threshold: 2.0,
            direction: AtOrAbove,
            action: Surrender,
        },
        DeviationEntry {
            category: Hard(14),
            dealer_up: 10,
            threshold: 3.0,
            direction: AtOrAbove,
            action: Surrender,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(true_count: f64) -> CountSnapshot {
        CountSnapshot {
            running_count: 0,
            true_count,
            decks_remaining: 3.0,
            penetration: 0.3,
            cards_dealt: 100,
        }
    }

    fn full_legal() -> LegalActions {
        LegalActions {
            can_double: true,
            can_split: true,
            can_surrender: true,
        }
    }

    #[test]
    fn table_builds_and_validates() {
        let table = StrategyTable::canonical().expect("canonical table is valid");
        assert_eq!(
            table.baseline_action(HandCategory::Hard(16), 7),
            Some(Action::Hit)
        );
    }

    #[test]
    fn baseline_hard_16_vs_7_is_hit_at_neutral_count() {
        let table = StrategyTable::canonical().unwrap();
        let rules = GameRules::default();
        let action = recommend_action(
            HandCategory::Hard(16),
            HandCategory::Hard(16),
            7,
            snapshot(0.0),
            &rules,
            &table,
            full_legal(),
        );
        assert_eq!(action, Action::Hit);
    }

    #[test]
    fn illustrious_16_vs_10_stands_at_true_count_zero() {
        let table = StrategyTable::canonical().unwrap();
        let rules = GameRules::default();
        assert_eq!(
            table.baseline_action(HandCategory::Hard(16), 10),
            Some(Action::Hit)
        );
        let action = recommend_action(
            HandCategory::Hard(16),
            HandCategory::Hard(16),
            10,
            snapshot(0.0),
            &rules,
            &table,
            full_legal(),
        );
        assert_eq!(action, Action::Stand);
    }

    #[test]
    fn fab_four_surrender_15_vs_10_falls_back_to_hit_when_disallowed() {
        let table = StrategyTable::canonical().unwrap();
        let rules = GameRules::default();
        let legal = LegalActions {
            can_surrender: false,
            ..full_legal()
        };
        let action = recommend_action(
            HandCategory::Hard(15),
            HandCategory::Hard(15),
            10,
            snapshot(0.0),
            &rules,
            &table,
            legal,
        );
        assert_eq!(action, Action::Hit);
    }

    #[test]
    fn deviation_margin_demands_more_evidence_in_either_direction() {
        let table = StrategyTable::canonical().unwrap();
        let mut rules = GameRules::default();
        rules.deviation_threshold_margin = 1.0;
        // Threshold is >=4; with margin 1 it now requires true_count >= 5.
        let action = recommend_action(
            HandCategory::Hard(10),
            HandCategory::Hard(10),
            10,
            snapshot(4.0),
            &rules,
            &table,
            full_legal(),
        );
        assert_eq!(action, Action::Hit, "margin should suppress the deviation");
    }

    #[test]
    fn insurance_fires_at_configured_threshold() {
        let rules = GameRules::default();
        assert!(should_take_insurance(snapshot(3.0), &rules));
        assert!(!should_take_insurance(snapshot(2.9), &rules));
    }

    #[test]
    fn pair_category_falls_back_to_hard_total_when_split_illegal() {
        let table = StrategyTable::canonical().unwrap();
        let rules = GameRules::default();
        let legal = LegalActions {
            can_split: false,
            ..full_legal()
        };
        // 8,8 baseline is always split; with split disallowed it must fall
        // back to the hard-16 baseline (Stand), not silently become Hit.
        let action = recommend_action(
            HandCategory::Pair(8),
            HandCategory::Hard(16),
            6,
            snapshot(0.0),
            &rules,
            &table,
            legal,
        );
        assert_eq!(action, Action::Stand);
    }
}

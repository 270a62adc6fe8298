//! End-to-end scenarios exercising the session orchestrator, decision engine,
//! and bet-sizing engine together through the public API.

use std::sync::Arc;

use cardcount::error::SessionError;
use cardcount::hand::HandCategory;
use cardcount::rules::GameRules;
use cardcount::session::{Mode, SessionManager};
use cardcount::shoe::CountSnapshot;
use cardcount::strategy::{self, Action, LegalActions, StrategyTable};
use cardcount::Card;
use cardcount::card::Suit;

fn table() -> Arc<StrategyTable> {
    Arc::new(StrategyTable::canonical().unwrap())
}

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
fn scenario_basic_strategy_lookup_no_count_influence() {
    let rules = GameRules::default();
    let table = table();
    let action = strategy::recommend_action(
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
fn scenario_illustrious_eighteen_fires() {
    let rules = GameRules::default();
    let table = table();
    // Baseline 16 vs T is HIT; the Illustrious 18 entry fires at TC >= 0.
    let action = strategy::recommend_action(
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
fn scenario_fab_four_surrender() {
    let rules = GameRules::default().with_surrender(true);
    let table = table();
    let action = strategy::recommend_action(
        HandCategory::Hard(15),
        10,
        snapshot(0.0),
        &rules,
        &table,
        full_legal(),
    );
    assert_eq!(action, Action::Surrender);
}

#[test]
fn scenario_fab_four_falls_back_when_surrender_disallowed() {
    let rules = GameRules::default().with_surrender(false);
    let table = table();
    let legal = LegalActions {
        can_surrender: false,
        ..full_legal()
    };
    let action = strategy::recommend_action(
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
fn scenario_wong_out_signal_mentions_threshold_and_true_count() {
    let mgr = SessionManager::new(table());
    let session = mgr
        .start_session(Mode::Manual, GameRules::default(), 10_000, 7)
        .unwrap();

    // Drive the true count down with a run of high cards (Hi-Lo tag -1 each).
    let highs: Vec<Card> = (0..40).map(|_| Card::new(Suit::Spades, 13)).collect();
    let (_, _) = session.try_observe(&highs).unwrap().unwrap();

    let player = [Card::new(Suit::Hearts, 8), Card::new(Suit::Diamonds, 8)];
    let dealer_up = Card::new(Suit::Clubs, 6);
    let outcome = session.try_query_decision(&player, dealer_up).unwrap().unwrap();

    assert!(outcome.should_exit);
    let reason = outcome.exit_reason.expect("should_exit implies a reason");
    assert!(reason.contains(&format!("{:.2}", outcome.count_snapshot.true_count)));
    assert!(reason.contains("-1.00"));
}

#[test]
fn scenario_defensive_cutoff_forces_table_minimum() {
    let rules = GameRules::default()
        .with_decks(6)
        .with_max_betting_penetration(0.85);
    let mgr = SessionManager::new(table());
    let session = mgr.start_session(Mode::Manual, rules.clone(), 1_000_000, 1).unwrap();

    let burn: Vec<Card> = (0..266).map(|_| Card::new(Suit::Spades, 7)).collect();
    let (snap, _) = session.try_observe(&burn).unwrap().unwrap();
    assert!(snap.penetration > rules.max_betting_penetration);

    let player = [Card::new(Suit::Hearts, 8), Card::new(Suit::Diamonds, 8)];
    let dealer_up = Card::new(Suit::Clubs, 6);
    let outcome = session.try_query_decision(&player, dealer_up).unwrap().unwrap();

    assert_eq!(outcome.recommended_bet.amount, rules.table_min);
    assert!(outcome.recommended_bet.defensive_cutoff);
}

#[test]
fn auto_mode_deal_and_full_round_settles_with_a_payout() {
    let mgr = SessionManager::new(table());
    let session = mgr
        .start_session(Mode::Auto, GameRules::default(), 10_000, 99)
        .unwrap();

    let deal = session.try_deal().unwrap().unwrap();
    assert_eq!(deal.player_cards.len(), 2);

    if deal.is_blackjack {
        assert!(deal.round_result.is_some());
        return;
    }

    // Stand immediately; the dealer then plays out and the round settles.
    let outcome = session.try_action(Action::Stand).unwrap().unwrap();
    assert!(outcome.round_result.is_some());
    let round = outcome.round_result.unwrap();
    assert_eq!(round.hands.len(), 1);
}

#[test]
fn end_session_removes_it_and_further_operations_report_gone() {
    let mgr = SessionManager::new(table());
    let session = mgr
        .start_session(Mode::Auto, GameRules::default(), 10_000, 3)
        .unwrap();
    let id = session.id;
    drop(session);

    mgr.end_session(id).unwrap();
    assert_eq!(mgr.end_session(id), Err(SessionError::SessionGone));
    assert!(mgr.get(id).is_none());
}

#[test]
fn shuffle_is_idempotent() {
    let mgr = SessionManager::new(table());
    let session = mgr
        .start_session(Mode::Auto, GameRules::default(), 10_000, 5)
        .unwrap();
    let _ = session.try_deal().unwrap().unwrap();

    let once = session.try_shuffle().unwrap();
    let twice = session.try_shuffle().unwrap();
    assert_eq!(once, twice);
}

#[test]
fn query_decision_has_no_side_effects_on_the_shoe() {
    let mgr = SessionManager::new(table());
    let session = mgr
        .start_session(Mode::Manual, GameRules::default(), 10_000, 11)
        .unwrap();

    let player = [Card::new(Suit::Hearts, 10), Card::new(Suit::Diamonds, 6)];
    let dealer_up = Card::new(Suit::Clubs, 7);

    let first = session.try_query_decision(&player, dealer_up).unwrap().unwrap();
    let second = session.try_query_decision(&player, dealer_up).unwrap().unwrap();

    assert_eq!(first.recommended_action, second.recommended_action);
    assert_eq!(first.count_snapshot, second.count_snapshot);
}

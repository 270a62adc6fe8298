//! The session orchestrator: binds the shoe, decision engine, and bet-sizing
//! engine into the stateful per-session operations the external interface
//! exposes (§6). A single `Mutex`-guarded state machine scoped to one
//! session's one set of in-play hands.

extern crate alloc;

use core::sync::atomic::{AtomicU64, Ordering};

use alloc::sync::Arc;
use alloc::vec::Vec;
#[cfg(all(not(feature = "std"), feature = "alloc"))]
use hashbrown::HashMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::betting::{self, BetRecommendation};
use crate::card::{Card, DECK_SIZE, Suit, dealer_up_value};
use crate::error::{
    ActionError, DealError, DecisionError, IllegalActionReason, ObserveError, SessionError,
    StartSessionError,
};
use crate::hand::{DealerHand, Hand, HandStatus};
use crate::rules::{GameRules, RoundingMode};
use crate::shoe::{CountSnapshot, Shoe};
use crate::strategy::{self, Action, LegalActions, StrategyTable};
use crate::sync::Mutex;
use crate::result::{HandOutcome, HandResult, RoundResult};

/// Whether a session deals its own cards from a virtual shoe (`Auto`) or
/// only tracks cards the caller reports seeing at a physical table (`Manual`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The orchestrator deals, draws, and plays the dealer itself.
    Auto,
    /// The orchestrator never draws a card; it only observes and answers queries.
    Manual,
}

/// The orchestrator's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No round in progress.
    Idle,
    /// Awaiting a player action on `hands[active_hand_index]`.
    PlayerTurn {
        /// Index into the session's current hands.
        active_hand_index: usize,
    },
    /// The dealer is playing out its hand (auto mode only; transient —
    /// sessions never observe this state directly since [`Session::action`]
    /// drives the dealer to completion synchronously when the last player
    /// hand resolves).
    DealerTurn,
    /// All hands for the round are settled.
    Settled,
}

fn trace_transition(session_id: u64, event: &str) {
    #[cfg(feature = "std")]
    tracing::debug!(session_id = session_id, event = event, "session state transition");
    #[cfg(not(feature = "std"))]
    let _ = (session_id, event);
}

/// Outcome of a successful `deal`.
#[derive(Debug, Clone)]
pub struct DealOutcome {
    /// The player's initial two cards.
    pub player_cards: Vec<Card>,
    /// The player's initial total.
    pub player_total: u8,
    /// The dealer's up-card.
    pub dealer_up: Card,
    /// Whether the player was dealt a natural blackjack.
    pub is_blackjack: bool,
    /// The count snapshot after the round's visible cards (not the dealer's
    /// hole card) have been observed.
    pub count_snapshot: CountSnapshot,
    /// The bet placed for this hand, chosen by the bet-sizing engine before
    /// any of this round's cards were observed.
    pub recommended_bet: u64,
    /// Whether insurance should be taken, if the dealer's up-card is an Ace.
    pub insurance_recommended: Option<bool>,
    /// The round result, present when the player was dealt a natural
    /// blackjack and the round resolved immediately without any action.
    pub round_result: Option<RoundResult>,
}

/// Outcome of a successful `action`.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    /// The action actually applied (after legality fallback).
    pub action_taken: Action,
    /// What the decision engine would have recommended before this action.
    pub correct_action: Action,
    /// Whether `action_taken` matches `correct_action`.
    pub is_correct: bool,
    /// The card drawn by this action, if any (HIT, DOUBLE, or the two cards
    /// dealt by a SPLIT are reported via `round_result` instead).
    pub new_card: Option<Card>,
    /// The acted-on hand's new total.
    pub new_total: u8,
    /// The round result, present once this action resolved the last hand
    /// and the dealer has played out.
    pub round_result: Option<RoundResult>,
    /// Whether the bet-sizing engine signals a Wong-out at the current count.
    pub should_exit: bool,
    /// A human-readable reason for `should_exit`, when true.
    pub exit_reason: Option<alloc::string::String>,
    /// The count snapshot after this action.
    pub count_snapshot: CountSnapshot,
}

/// Outcome of a shadow-mode `query_decision`.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// The recommended action.
    pub recommended_action: Action,
    /// The count snapshot at the time of the query (unchanged by the query).
    pub count_snapshot: CountSnapshot,
    /// The recommended bet for the *next* hand.
    pub recommended_bet: BetRecommendation,
    /// Whether the bet-sizing engine signals a Wong-out at the current count.
    pub should_exit: bool,
    /// A human-readable reason for `should_exit`, when true.
    pub exit_reason: Option<alloc::string::String>,
}

/// A snapshot of session status for `session_status`.
#[derive(Debug, Clone, Copy)]
pub struct SessionStatus {
    /// The session's mode.
    pub mode: Mode,
    /// The current orchestrator state.
    pub state: SessionState,
    /// The current count snapshot.
    pub count_snapshot: CountSnapshot,
    /// The current bankroll.
    pub bankroll: u64,
    /// Hands dealt since the shoe was last shuffled.
    pub hands_dealt_this_shoe: u32,
}

struct SessionInner {
    deck: Vec<Card>,
    shoe: Shoe,
    hands: Vec<Hand>,
    dealer_hand: DealerHand,
    state: SessionState,
    hands_dealt_this_shoe: u32,
    bankroll: u64,
    rng: ChaCha8Rng,
}

fn build_deck(num_decks: u8, rng: &mut ChaCha8Rng) -> Vec<Card> {
    let mut cards = Vec::with_capacity(num_decks as usize * DECK_SIZE);
    for _ in 0..num_decks {
        for suit in [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades] {
            for rank in 1..=13 {
                cards.push(Card::new(suit, rank));
            }
        }
    }
    cards.shuffle(rng);
    cards
}

#[cfg(feature = "std")]
fn round_amount(amount: f64, mode: RoundingMode) -> u64 {
    match mode {
        RoundingMode::Up => amount.ceil() as u64,
        RoundingMode::Down => amount.floor() as u64,
        RoundingMode::Nearest => amount.round() as u64,
    }
}

#[cfg(all(not(feature = "std"), feature = "alloc"))]
fn round_amount(amount: f64, mode: RoundingMode) -> u64 {
    match mode {
        RoundingMode::Up => libm::ceil(amount) as u64,
        RoundingMode::Down => libm::floor(amount) as u64,
        RoundingMode::Nearest => libm::round(amount) as u64,
    }
}

/// One blackjack decision-engine session: owns one shoe and the in-play
/// hands of the current round. Each operation acquires the session's single
/// internal lock for its duration; a concurrent caller that cannot acquire
/// it is told `SESSION_BUSY` rather than queued.
pub struct Session {
    /// The session's id, as returned from `start_session`.
    pub id: u64,
    /// Auto vs. manual (shadow) mode.
    pub mode: Mode,
    /// The table rules this session plays under.
    pub rules: GameRules,
    strategy: Arc<StrategyTable>,
    inner: Mutex<SessionInner>,
}

impl Session {
    /// Starts a new session.
    ///
    /// # Errors
    ///
    /// Returns [`StartSessionError`] if the rules fail validation.
    pub fn new(
        id: u64,
        mode: Mode,
        rules: GameRules,
        strategy: Arc<StrategyTable>,
        bankroll: u64,
        seed: u64,
    ) -> Result<Self, StartSessionError> {
        rules.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let deck = build_deck(rules.decks, &mut rng);

        Ok(Self {
            id,
            mode,
            rules,
            strategy,
            inner: Mutex::new(SessionInner {
                deck,
                shoe: Shoe::new(rules.decks),
                hands: Vec::new(),
                dealer_hand: DealerHand::new(),
                state: SessionState::Idle,
                hands_dealt_this_shoe: 0,
                bankroll,
                rng,
            }),
        })
    }

    fn lock(&self) -> Option<impl core::ops::DerefMut<Target = SessionInner> + '_> {
        self.inner.try_lock()
    }

    /// Returns a snapshot of the session's current status.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SessionError::SessionBusy`] via the caller's
    /// wrapping if a concurrent operation holds the lock; callers that use
    /// [`crate::error::SessionError`] directly should prefer
    /// [`crate::session::Session::try_status`].
    #[must_use]
    pub fn try_status(&self) -> Option<SessionStatus> {
        let inner = self.lock()?;
        Some(SessionStatus {
            mode: self.mode,
            state: inner.state,
            count_snapshot: inner.shoe.snapshot(),
            bankroll: inner.bankroll,
            hands_dealt_this_shoe: inner.hands_dealt_this_shoe,
        })
    }

    /// Forces a reshuffle: resets the count and, in auto mode, rebuilds and
    /// reshuffles the virtual deck.
    #[must_use]
    pub fn try_shuffle(&self) -> Option<CountSnapshot> {
        let mut inner = self.lock()?;
        shuffle_inner(&mut inner, &self.rules);
        Some(inner.shoe.snapshot())
    }

    /// Deals a new round in auto mode.
    ///
    /// # Errors
    ///
    /// Returns `None` if the session is busy (translated by the caller to
    /// `SESSION_BUSY`); otherwise returns `Some(Err(_))` for a [`DealError`].
    #[must_use]
    pub fn try_deal(&self) -> Option<Result<DealOutcome, DealError>> {
        if self.mode != Mode::Auto {
            return Some(Err(DealError::WrongMode));
        }
        let mut inner = self.lock()?;
        Some(self.deal_locked(&mut inner))
    }

    fn deal_locked(&self, inner: &mut SessionInner) -> Result<DealOutcome, DealError> {
        if inner.state != SessionState::Idle {
            return Err(DealError::WrongState);
        }

        if inner.shoe.needs_reshuffle(self.rules.penetration) {
            shuffle_inner(inner, &self.rules);
        }
        if inner.deck.len() < 4 {
            return Err(DealError::ShoeExhausted);
        }

        let pre_round_bet = betting::recommend_bet(
            inner.shoe.snapshot(),
            inner.bankroll,
            &self.rules,
        )
        .amount;

        inner.dealer_hand.clear();
        let mut hand = Hand::new(pre_round_bet);

        let card1 = inner.deck.pop().expect("checked len >= 4 above");
        inner.shoe.observe_for_deal(card1)?;
        hand.add_card(card1);

        let dealer_up = inner.deck.pop().expect("checked len >= 4 above");
        inner.shoe.observe_for_deal(dealer_up)?;
        inner.dealer_hand.add_card(dealer_up);

        let card2 = inner.deck.pop().expect("checked len >= 4 above");
        inner.shoe.observe_for_deal(card2)?;
        hand.add_card(card2);

        // Hole card: drawn now so it can't be dealt to anyone else, but not
        // observed into the count until `reveal_hole` runs at dealer-turn
        // time, so it can't leak into the true count before it's visible.
        let hole_card = inner.deck.pop().expect("checked len >= 4 above");
        inner.dealer_hand.add_card(hole_card);

        inner.bankroll = inner.bankroll.saturating_sub(pre_round_bet);
        inner.hands_dealt_this_shoe += 1;

        let is_blackjack = hand.status() == HandStatus::Blackjack;
        let player_cards = hand.cards().to_vec();
        let player_total = hand.value();
        inner.hands = alloc::vec![hand];

        let insurance_recommended = if dealer_up.is_ace() && self.rules.insurance {
            Some(strategy::should_take_insurance(
                inner.shoe.snapshot(),
                &self.rules,
            ))
        } else {
            None
        };

        inner.state = SessionState::PlayerTurn {
            active_hand_index: 0,
        };
        // A player blackjack can't take any further action; resolve it by
        // moving straight to dealer play within this same call.
        let round_result = is_blackjack.then(|| {
            let result = self.resolve_dealer_and_settle(inner);
            inner.state = SessionState::Settled;
            result
        });

        trace_transition(self.id, "deal");

        Ok(DealOutcome {
            player_cards,
            player_total,
            dealer_up,
            is_blackjack,
            count_snapshot: inner.shoe.snapshot(),
            recommended_bet: pre_round_bet,
            insurance_recommended,
            round_result,
        })
    }

    /// Applies a player action in auto mode.
    ///
    /// # Errors
    ///
    /// Returns `None` if the session is busy; otherwise `Some(Err(_))` for
    /// an [`ActionError`].
    #[must_use]
    pub fn try_action(&self, requested: Action) -> Option<Result<ActionOutcome, ActionError>> {
        if self.mode != Mode::Auto {
            return Some(Err(ActionError::WrongMode));
        }
        let mut inner = self.lock()?;
        Some(self.action_locked(&mut inner, requested))
    }

    fn action_locked(
        &self,
        inner: &mut SessionInner,
        requested: Action,
    ) -> Result<ActionOutcome, ActionError> {
        let SessionState::PlayerTurn { active_hand_index } = inner.state else {
            return Err(ActionError::WrongState);
        };

        if inner
            .hands
            .get(active_hand_index)
            .is_none_or(|h| h.status() != HandStatus::Active)
        {
            return Err(ActionError::Illegal(IllegalActionReason::HandNotActive));
        }

        let dealer_up_rank = inner
            .dealer_hand
            .up_card()
            .expect("dealer is always dealt an up-card before PlayerTurn")
            .rank;
        let snapshot = inner.shoe.snapshot();
        let legal = self.legal_actions(inner, active_hand_index);
        let category = inner.hands[active_hand_index].category();
        let hard_or_soft = inner.hands[active_hand_index].hard_or_soft_category();
        let correct_action = strategy::recommend_action(
            category,
            hard_or_soft,
            dealer_up_rank,
            snapshot,
            &self.rules,
            &self.strategy,
            legal,
        );

        let action_taken = self.apply_action(inner, active_hand_index, requested, legal)?;

        let new_total = inner.hands[active_hand_index].value();
        let new_card = match action_taken {
            Action::Hit | Action::Double => inner.hands[active_hand_index].cards().last().copied(),
            _ => None,
        };

        self.advance_after_hand(inner);

        let round_result = if inner.state == SessionState::DealerTurn {
            let result = self.resolve_dealer_and_settle(inner);
            inner.state = SessionState::Settled;
            Some(result)
        } else {
            None
        };

        let post_snapshot = inner.shoe.snapshot();
        let should_exit = betting::should_wong_out(
            post_snapshot.true_count,
            inner.hands_dealt_this_shoe,
            &self.rules,
        );

        trace_transition(self.id, "action");

        Ok(ActionOutcome {
            action_taken,
            correct_action,
            is_correct: action_taken == correct_action,
            new_card,
            new_total,
            round_result,
            should_exit,
            exit_reason: should_exit.then(|| {
                alloc::format!(
                    "true count {:.2} is below the wong-out threshold {:.2}",
                    post_snapshot.true_count,
                    self.rules.wong_out_threshold
                )
            }),
            count_snapshot: post_snapshot,
        })
    }

    fn legal_actions(&self, inner: &SessionInner, hand_index: usize) -> LegalActions {
        let hand = &inner.hands[hand_index];
        let is_ace_hand = hand.cards().first().is_some_and(|c| c.is_ace());

        let can_double = hand.len() == 2
            && (!hand.is_from_split() || self.rules.double_after_split)
            && self.rules.allows_double_on(hand.value());

        let can_split = hand.can_split()
            && inner.hands.len() <= self.rules.split as usize
            && !(is_ace_hand && hand.is_from_split() && self.rules.split_aces_only_once);

        let can_surrender = hand.len() == 2 && !hand.is_from_split() && self.rules.surrender;

        LegalActions {
            can_double,
            can_split,
            can_surrender,
        }
    }

    fn apply_action(
        &self,
        inner: &mut SessionInner,
        hand_index: usize,
        requested: Action,
        legal: LegalActions,
    ) -> Result<Action, ActionError> {
        match requested {
            Action::Hit => {
                let card = inner.deck.pop().ok_or(ActionError::ShoeExhausted)?;
                inner.shoe.observe(card).map_err(|_| ActionError::ShoeExhausted)?;
                inner.hands[hand_index].add_card(card);
                Ok(Action::Hit)
            }
            Action::Stand => {
                inner.hands[hand_index].set_status(HandStatus::Stand);
                Ok(Action::Stand)
            }
            Action::Double => {
                if !legal.can_double {
                    return Err(ActionError::Illegal(
                        if inner.hands[hand_index].len() != 2 {
                            IllegalActionReason::DoubleRequiresTwoCards
                        } else if inner.hands[hand_index].is_from_split()
                            && !self.rules.double_after_split
                        {
                            IllegalActionReason::DoubleAfterSplitDisabled
                        } else {
                            IllegalActionReason::DoubleNotAllowedOnTotal
                        },
                    ));
                }
                let bet = inner.hands[hand_index].bet();
                if inner.bankroll < bet {
                    return Err(ActionError::Illegal(
                        IllegalActionReason::InsufficientBankroll,
                    ));
                }
                let card = inner.deck.pop().ok_or(ActionError::ShoeExhausted)?;
                inner.shoe.observe(card).map_err(|_| ActionError::ShoeExhausted)?;
                inner.bankroll -= bet;
                let hand = &mut inner.hands[hand_index];
                hand.double_bet();
                hand.add_card(card);
                if hand.status() == HandStatus::Active {
                    hand.set_status(HandStatus::Stand);
                }
                Ok(Action::Double)
            }
            Action::Split => {
                if !legal.can_split {
                    return Err(ActionError::Illegal(
                        if !inner.hands[hand_index].can_split() {
                            IllegalActionReason::SplitRequiresPair
                        } else if inner.hands.len() > self.rules.split as usize {
                            IllegalActionReason::MaxSplitsReached
                        } else {
                            IllegalActionReason::AcesSplitOnceOnly
                        },
                    ));
                }
                let bet = inner.hands[hand_index].bet();
                if inner.bankroll < bet {
                    return Err(ActionError::Illegal(
                        IllegalActionReason::InsufficientBankroll,
                    ));
                }
                let is_ace = inner.hands[hand_index]
                    .cards()
                    .first()
                    .is_some_and(|c| c.is_ace());
                let split_card = inner.hands[hand_index]
                    .take_split_card()
                    .expect("can_split verified above");
                let mut new_hand = Hand::from_split(split_card, bet);

                let card1 = inner.deck.pop().ok_or(ActionError::ShoeExhausted)?;
                inner.shoe.observe(card1).map_err(|_| ActionError::ShoeExhausted)?;
                let card2 = inner.deck.pop().ok_or(ActionError::ShoeExhausted)?;
                inner.shoe.observe(card2).map_err(|_| ActionError::ShoeExhausted)?;

                inner.bankroll -= bet;

                let hand = &mut inner.hands[hand_index];
                hand.add_card(card1);
                if is_ace && self.rules.split_aces_receive_one_card && hand.status() == HandStatus::Active {
                    hand.set_status(HandStatus::Stand);
                }

                new_hand.add_card(card2);
                if is_ace
                    && self.rules.split_aces_receive_one_card
                    && new_hand.status() == HandStatus::Active
                {
                    new_hand.set_status(HandStatus::Stand);
                }

                inner.hands.insert(hand_index + 1, new_hand);
                Ok(Action::Split)
            }
            Action::Surrender => {
                if !legal.can_surrender {
                    return Err(ActionError::Illegal(
                        if !self.rules.surrender {
                            IllegalActionReason::SurrenderDisabled
                        } else {
                            IllegalActionReason::SurrenderRequiresTwoCards
                        },
                    ));
                }
                let bet = inner.hands[hand_index].bet();
                inner.hands[hand_index].set_status(HandStatus::Surrendered);
                let refund = round_amount(bet as f64 * 0.5, self.rules.rounding_surrender);
                inner.bankroll += refund;
                Ok(Action::Surrender)
            }
        }
    }

    fn advance_after_hand(&self, inner: &mut SessionInner) {
        let SessionState::PlayerTurn { active_hand_index } = inner.state else {
            return;
        };

        let mut next = active_hand_index;
        loop {
            if inner.hands[next].status() == HandStatus::Active {
                inner.state = SessionState::PlayerTurn {
                    active_hand_index: next,
                };
                return;
            }
            next += 1;
            if next >= inner.hands.len() {
                inner.state = SessionState::DealerTurn;
                return;
            }
        }
    }

    fn resolve_dealer_and_settle(&self, inner: &mut SessionInner) -> RoundResult {
        let any_active_hand = inner
            .hands
            .iter()
            .any(|h| matches!(h.status(), HandStatus::Stand | HandStatus::Blackjack));

        if any_active_hand {
            inner.dealer_hand.reveal_hole();
            // The hole card was drawn at deal time but withheld from the
            // count; observe it now that it's revealed.
            if let Some(&hole) = inner.dealer_hand.cards().get(1) {
                let _ = inner.shoe.observe(hole);
            }
            loop {
                let value = inner.dealer_hand.value();
                let soft = inner.dealer_hand.is_soft();
                if value > 17 || (value == 17 && (!soft || self.rules.stand_on_soft_17)) {
                    break;
                }
                let Some(card) = inner.deck.pop() else {
                    break;
                };
                let _ = inner.shoe.observe(card);
                inner.dealer_hand.add_card(card);
            }
        } else {
            // Every player hand is already resolved (bust/surrender); reveal
            // for reporting purposes but the dealer doesn't need to draw.
            inner.dealer_hand.reveal_hole();
            if let Some(&hole) = inner.dealer_hand.cards().get(1) {
                let _ = inner.shoe.observe(hole);
            }
        }

        self.settle(inner)
    }

    fn settle(&self, inner: &SessionInner) -> RoundResult {
        let dealer_value = inner.dealer_hand.value();
        let dealer_bust = inner.dealer_hand.is_bust();
        let dealer_blackjack = inner.dealer_hand.is_blackjack();

        let mut hand_results = Vec::with_capacity(inner.hands.len());
        let mut total_payout: u64 = 0;
        let mut total_staked: u64 = 0;

        for (hand_index, hand) in inner.hands.iter().enumerate() {
            let bet = hand.bet();
            let player_value = hand.value();

            let (outcome, payout) = match hand.status() {
                HandStatus::Surrendered => {
                    total_staked += bet / 2;
                    (HandOutcome::Surrendered, 0)
                }
                HandStatus::Bust => {
                    total_staked += bet;
                    (HandOutcome::Bust, 0)
                }
                HandStatus::Blackjack => {
                    total_staked += bet;
                    if dealer_blackjack {
                        (HandOutcome::Push, bet)
                    } else {
                        let winnings =
                            round_amount(bet as f64 * self.rules.blackjack_pays, self.rules.rounding_blackjack);
                        (HandOutcome::Blackjack, bet + winnings)
                    }
                }
                HandStatus::Stand | HandStatus::Active => {
                    total_staked += bet;
                    if dealer_bust {
                        (HandOutcome::Win, bet * 2)
                    } else if dealer_blackjack && !hand.is_from_split() && hand.len() == 2 {
                        (HandOutcome::Lose, 0)
                    } else if player_value > dealer_value {
                        (HandOutcome::Win, bet * 2)
                    } else if player_value < dealer_value {
                        (HandOutcome::Lose, 0)
                    } else {
                        (HandOutcome::Push, bet)
                    }
                }
            };

            total_payout += payout;
            hand_results.push(HandResult {
                hand_index,
                outcome,
                bet,
                payout,
                player_value,
                dealer_value,
            });
        }

        #[expect(clippy::cast_possible_wrap, reason = "payout totals fit in i64 at table-limit scale")]
        let net = total_payout as i64 - total_staked as i64;

        RoundResult {
            hands: hand_results,
            total_payout,
            net,
            dealer_value,
            dealer_bust,
            dealer_blackjack,
            insurance_bet: 0,
            insurance_payout: 0,
        }
    }

    /// Observes caller-reported cards into the shoe (manual mode only), and
    /// returns the updated count plus a fresh bet recommendation.
    ///
    /// # Errors
    ///
    /// Returns `None` if the session is busy; otherwise `Some(Err(_))` for
    /// an [`ObserveError`].
    #[must_use]
    pub fn try_observe(
        &self,
        cards: &[Card],
    ) -> Option<Result<(CountSnapshot, BetRecommendation), ObserveError>> {
        if self.mode != Mode::Manual {
            return Some(Err(ObserveError::WrongMode));
        }
        let mut inner = self.lock()?;
        for &card in cards {
            if let Err(err) = inner.shoe.observe(card) {
                return Some(Err(err));
            }
        }
        let snapshot = inner.shoe.snapshot();
        let rec = betting::recommend_bet(snapshot, inner.bankroll, &self.rules);
        Some(Ok((snapshot, rec)))
    }

    /// Answers a shadow-mode decision query without mutating the shoe.
    ///
    /// # Errors
    ///
    /// Returns `None` if the session is busy; otherwise `Some(Err(_))` for a
    /// [`DecisionError`].
    #[must_use]
    pub fn try_query_decision(
        &self,
        player_cards: &[Card],
        dealer_up: Card,
    ) -> Option<Result<DecisionOutcome, DecisionError>> {
        if self.mode != Mode::Manual {
            return Some(Err(DecisionError::WrongMode));
        }
        let inner = self.lock()?;

        let mut transient = Hand::new(0);
        for &card in player_cards {
            transient.add_card(card);
        }
        let category = transient.category();
        let hard_or_soft = transient.hard_or_soft_category();
        let snapshot = inner.shoe.snapshot();

        let legal = LegalActions {
            can_double: transient.len() == 2 && self.rules.allows_double_on(transient.value()),
            can_split: transient.can_split(),
            can_surrender: transient.len() == 2 && self.rules.surrender,
        };

        let recommended_action = strategy::recommend_action(
            category,
            hard_or_soft,
            dealer_up.rank,
            snapshot,
            &self.rules,
            &self.strategy,
            legal,
        );

        let recommended_bet = betting::recommend_bet(snapshot, inner.bankroll, &self.rules);
        let should_exit = betting::should_wong_out(snapshot.true_count, 1, &self.rules);
        let exit_reason = should_exit.then(|| {
            alloc::format!(
                "true count {:.2} is below the wong-out threshold {:.2}",
                snapshot.true_count,
                self.rules.wong_out_threshold
            )
        });

        Some(Ok(DecisionOutcome {
            recommended_action,
            count_snapshot: snapshot,
            recommended_bet,
            should_exit,
            exit_reason,
        }))
    }

    /// Returns the dealer up-card's rank collapsed to the lookup key (2..=11).
    #[must_use]
    pub const fn dealer_up_lookup_value(rank: u8) -> u8 {
        dealer_up_value(rank)
    }
}

fn shuffle_inner(inner: &mut SessionInner, rules: &GameRules) {
    inner.shoe.shuffle();
    inner.deck = build_deck(rules.decks, &mut inner.rng);
    inner.hands_dealt_this_shoe = 0;
}

/// Owns the table-wide strategy table and the registry of live sessions, and
/// assigns session ids. One manager is shared across every request a
/// transport layer serves; individual sessions serialise their own mutation
/// through their own lock, so the manager's own registry lock is only ever
/// held for the brief insert/remove/lookup, never for a full operation.
pub struct SessionManager {
    strategy: Arc<StrategyTable>,
    next_id: AtomicU64,
    sessions: Mutex<HashMap<u64, Arc<Session>>>,
}

impl SessionManager {
    /// Creates a new, empty manager using the given strategy table.
    #[must_use]
    pub fn new(strategy: Arc<StrategyTable>) -> Self {
        Self {
            strategy,
            next_id: AtomicU64::new(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Starts and registers a new session, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`StartSessionError`] if the rules fail validation.
    pub fn start_session(
        &self,
        mode: Mode,
        rules: GameRules,
        bankroll: u64,
        seed: u64,
    ) -> Result<Arc<Session>, StartSessionError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(Session::new(
            id,
            mode,
            rules,
            Arc::clone(&self.strategy),
            bankroll,
            seed,
        )?);
        let mut sessions = self.sessions.lock();
        sessions.insert(id, Arc::clone(&session));
        Ok(session)
    }

    /// Looks up a live session by id.
    #[must_use]
    pub fn get(&self, session_id: u64) -> Option<Arc<Session>> {
        self.sessions.lock().get(&session_id).map(Arc::clone)
    }

    /// Ends a session, removing it from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionGone`] if no session exists with this id.
    pub fn end_session(&self, session_id: u64) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock();
        sessions
            .remove(&session_id)
            .map(|_| ())
            .ok_or(SessionError::SessionGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyTable;

    fn session(mode: Mode) -> Session {
        let rules = GameRules::default();
        let table = Arc::new(StrategyTable::canonical().unwrap());
        Session::new(1, mode, rules, table, 10_000, 42).unwrap()
    }

    #[test]
    fn deal_draws_four_cards_and_withholds_hole_from_count() {
        let s = session(Mode::Auto);
        let outcome = s.try_deal().unwrap().unwrap();
        assert_eq!(outcome.player_cards.len(), 2);
        // Exactly 3 cards (2 player + dealer up) should be reflected in the count.
        assert_eq!(outcome.count_snapshot.cards_dealt, 3);
    }

    #[test]
    fn manual_mode_rejects_deal() {
        let s = session(Mode::Manual);
        assert!(matches!(s.try_deal().unwrap(), Err(DealError::WrongMode)));
    }

    #[test]
    fn shuffle_resets_hands_dealt_counter() {
        let s = session(Mode::Auto);
        let _ = s.try_deal().unwrap().unwrap();
        let status_before = s.try_status().unwrap();
        assert_eq!(status_before.hands_dealt_this_shoe, 1);
        s.try_shuffle().unwrap();
        let status_after = s.try_status().unwrap();
        assert_eq!(status_after.hands_dealt_this_shoe, 0);
    }

    fn manager() -> SessionManager {
        let table = Arc::new(StrategyTable::canonical().unwrap());
        SessionManager::new(table)
    }

    #[test]
    fn manager_assigns_increasing_ids() {
        let mgr = manager();
        let a = mgr
            .start_session(Mode::Auto, GameRules::default(), 10_000, 1)
            .unwrap();
        let b = mgr
            .start_session(Mode::Auto, GameRules::default(), 10_000, 2)
            .unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn manager_end_session_removes_it_from_the_registry() {
        let mgr = manager();
        let session = mgr
            .start_session(Mode::Auto, GameRules::default(), 10_000, 1)
            .unwrap();
        assert!(mgr.get(session.id).is_some());
        mgr.end_session(session.id).unwrap();
        assert!(mgr.get(session.id).is_none());
    }

    #[test]
    fn manager_end_session_rejects_unknown_id() {
        let mgr = manager();
        assert_eq!(mgr.end_session(9999), Err(SessionError::SessionGone));
    }
}

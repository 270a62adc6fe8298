//! Wire-level request/response schemas for the external interface (§6).
//!
//! Every type here is `serde`-derived so a transport layer (HTTP, a message
//! queue, an RPC framework) can frame it without this crate depending on
//! one. Cards cross the wire as two-character tokens (`Card::to_token`);
//! everything else is a thin, flat DTO over the domain types in
//! [`crate::session`].

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::betting::BetRecommendation;
use crate::card::Card;
use crate::error::{BadCardError, BadInputError, SessionError};
use crate::rules::GameRules;
use crate::session::{Mode, SessionState, SessionStatus};
use crate::shoe::CountSnapshot;
use crate::strategy::Action;

/// The table-rules fields a caller may override at `start_session`. Any
/// field omitted from the wire request takes the documented default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Number of decks.
    pub num_decks: u8,
    /// Whether the dealer stands on soft 17.
    pub dealer_stands_soft_17: bool,
    /// Whether double down is allowed after split.
    pub double_after_split: bool,
    /// Whether surrender is allowed.
    pub surrender_allowed: bool,
    /// Blackjack payout ratio.
    pub blackjack_payout: f64,
    /// Deck penetration that triggers a forced reshuffle.
    pub penetration: f64,
    /// Table minimum wager.
    pub table_min: u64,
    /// Table maximum wager.
    pub table_max: u64,
    /// Fraction of full Kelly to wager.
    pub kelly_fraction: f64,
    /// Extra true-count margin a deviation must clear before it fires.
    pub deviation_threshold_margin: f64,
    /// Penetration past which the bet-sizing engine forces the table minimum.
    pub max_betting_penetration: f64,
    /// True-count threshold below which the bet-sizing engine signals a Wong-out.
    pub wong_out_threshold: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        let rules = GameRules::default();
        Self {
            num_decks: rules.decks,
            dealer_stands_soft_17: rules.stand_on_soft_17,
            double_after_split: rules.double_after_split,
            surrender_allowed: rules.surrender,
            blackjack_payout: rules.blackjack_pays,
            penetration: rules.penetration,
            table_min: rules.table_min,
            table_max: rules.table_max,
            kelly_fraction: rules.kelly_fraction,
            deviation_threshold_margin: rules.deviation_threshold_margin,
            max_betting_penetration: rules.max_betting_penetration,
            wong_out_threshold: rules.wong_out_threshold,
        }
    }
}

impl RulesConfig {
    /// Converts this wire config into a [`GameRules`], leaving every field
    /// not named on the wire (double option, split limits, insurance, ...)
    /// at the engine default.
    #[must_use]
    pub fn into_rules(self) -> GameRules {
        GameRules::default()
            .with_decks(self.num_decks)
            .with_stand_on_soft_17(self.dealer_stands_soft_17)
            .with_double_after_split(self.double_after_split)
            .with_surrender(self.surrender_allowed)
            .with_blackjack_pays(self.blackjack_payout)
            .with_penetration(self.penetration)
            .with_table_limits(self.table_min, self.table_max)
            .with_kelly_fraction(self.kelly_fraction)
            .with_wong_out_threshold(self.wong_out_threshold)
            .with_max_betting_penetration(self.max_betting_penetration)
    }
}

fn parse_mode(mode: &str) -> Result<Mode, BadInputError> {
    match mode {
        "auto" => Ok(Mode::Auto),
        "manual" => Ok(Mode::Manual),
        _ => Err(BadInputError::InvalidMode),
    }
}

fn mode_token(mode: Mode) -> &'static str {
    match mode {
        Mode::Auto => "auto",
        Mode::Manual => "manual",
    }
}

fn state_token(state: SessionState) -> String {
    match state {
        SessionState::Idle => "idle".to_string(),
        SessionState::PlayerTurn { active_hand_index } => {
            alloc::format!("player_turn:{active_hand_index}")
        }
        SessionState::DealerTurn => "dealer_turn".to_string(),
        SessionState::Settled => "settled".to_string(),
    }
}

fn parse_cards(tokens: &[String]) -> Result<Vec<Card>, BadCardError> {
    tokens.iter().map(|t| Card::parse_token(t)).collect()
}

/// Request body for `start_session`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    /// `"auto"` or `"manual"`.
    pub mode: String,
    /// Starting bankroll.
    pub bankroll: u64,
    /// Table-rules overrides; omitted fields take documented defaults.
    #[serde(default)]
    pub rules: Option<RulesConfig>,
    /// Deterministic RNG seed for auto-mode shoe shuffling.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Response body for `start_session`.
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResponse {
    /// The newly assigned session id.
    pub session_id: u64,
    /// Echoes the validated mode.
    pub mode: String,
    /// Echoes the starting bankroll.
    pub bankroll: u64,
    /// The session's initial status token (always `"idle"`).
    pub status: String,
}

impl StartSessionRequest {
    /// Validates and converts this request into the pieces [`crate::session::Session::new`] needs.
    ///
    /// # Errors
    ///
    /// Returns [`BadInputError`] if `mode` or `bankroll` is invalid.
    pub fn validate(&self) -> Result<(Mode, GameRules), BadInputError> {
        let mode = parse_mode(&self.mode)?;
        if self.bankroll == 0 {
            return Err(BadInputError::InvalidBankroll);
        }
        let rules = self
            .rules
            .clone()
            .map_or_else(GameRules::default, RulesConfig::into_rules);
        Ok((mode, rules))
    }
}

/// Request body for `end_session` and `session_status` and `shuffle`
/// (identical shape: just a session id).
#[derive(Debug, Clone, Deserialize)]
pub struct SessionIdRequest {
    /// The session id.
    pub session_id: u64,
}

/// Response body for `session_status`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusResponse {
    /// `"auto"` or `"manual"`.
    pub mode: String,
    /// A token describing the orchestrator's current state.
    pub state: String,
    /// The current count snapshot.
    pub count_snapshot: CountSnapshot,
    /// The current bankroll.
    pub bankroll: u64,
    /// Hands dealt since the shoe was last shuffled.
    pub hands_played: u32,
}

impl From<SessionStatus> for SessionStatusResponse {
    fn from(status: SessionStatus) -> Self {
        Self {
            mode: mode_token(status.mode).to_string(),
            state: state_token(status.state),
            count_snapshot: status.count_snapshot,
            bankroll: status.bankroll,
            hands_played: status.hands_dealt_this_shoe,
        }
    }
}

/// Response body for `shuffle`.
#[derive(Debug, Clone, Serialize)]
pub struct ShuffleResponse {
    /// The count snapshot after the reset.
    pub count_snapshot: CountSnapshot,
}

/// Response body for `deal`.
#[derive(Debug, Clone, Serialize)]
pub struct DealResponse {
    /// The player's initial two cards, as wire tokens.
    pub player_cards: Vec<String>,
    /// The player's initial total.
    pub player_total: u8,
    /// The dealer's up-card, as a wire token.
    pub dealer_up: String,
    /// Whether the player was dealt a natural blackjack.
    pub is_blackjack: bool,
    /// The count snapshot after the round's visible cards were observed.
    pub count_snapshot: CountSnapshot,
    /// The bet placed for this hand.
    pub recommended_bet: u64,
    /// Whether insurance should be taken, if the dealer shows an Ace.
    pub insurance_recommended: Option<bool>,
    /// Present when the player's natural blackjack resolved the round immediately.
    pub outcome: Option<crate::result::RoundResult>,
}

impl From<crate::session::DealOutcome> for DealResponse {
    fn from(outcome: crate::session::DealOutcome) -> Self {
        Self {
            player_cards: outcome.player_cards.iter().map(|c| c.to_token()).collect(),
            player_total: outcome.player_total,
            dealer_up: outcome.dealer_up.to_token(),
            is_blackjack: outcome.is_blackjack,
            count_snapshot: outcome.count_snapshot,
            recommended_bet: outcome.recommended_bet,
            insurance_recommended: outcome.insurance_recommended,
            outcome: outcome.round_result,
        }
    }
}

/// Request body for `action`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    /// The session id.
    pub session_id: u64,
    /// The requested action.
    pub action: Action,
}

/// Response body for `action`.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    /// The action actually applied.
    pub action_taken: Action,
    /// What the decision engine would have recommended.
    pub correct_action: Action,
    /// Whether `action_taken` matches `correct_action`.
    pub is_correct: bool,
    /// The card drawn by this action, if any.
    pub new_card: Option<String>,
    /// The acted-on hand's new total, if this action drew a card.
    pub new_total: Option<u8>,
    /// The round result, present once this action resolved the round.
    pub outcome: Option<crate::result::RoundResult>,
    /// The dealer's final total, present alongside `outcome`.
    pub dealer_total: Option<u8>,
    /// Whether the bet-sizing engine signals a Wong-out at the current count.
    pub should_exit: bool,
    /// A human-readable reason for `should_exit`, when true.
    pub exit_reason: Option<String>,
    /// The count snapshot after this action.
    pub count_snapshot: CountSnapshot,
}

impl From<crate::session::ActionOutcome> for ActionResponse {
    fn from(outcome: crate::session::ActionOutcome) -> Self {
        let dealer_total = outcome.round_result.as_ref().map(|r| r.dealer_value);
        Self {
            action_taken: outcome.action_taken,
            correct_action: outcome.correct_action,
            is_correct: outcome.is_correct,
            new_card: outcome.new_card.map(|c| c.to_token()),
            new_total: matches!(outcome.action_taken, Action::Hit | Action::Double)
                .then_some(outcome.new_total),
            outcome: outcome.round_result,
            dealer_total,
            should_exit: outcome.should_exit,
            exit_reason: outcome.exit_reason.map(|s| s.to_string()),
            count_snapshot: outcome.count_snapshot,
        }
    }
}

/// Request body for `observe`.
#[derive(Debug, Clone, Deserialize)]
pub struct ObserveRequest {
    /// The session id.
    pub session_id: u64,
    /// Cards observed at the table, as wire tokens.
    pub cards: Vec<String>,
}

impl ObserveRequest {
    /// Parses the wire card tokens.
    ///
    /// # Errors
    ///
    /// Returns [`BadCardError`] if a token is malformed, and
    /// [`BadInputError::EmptyCardList`] if the list is empty.
    pub fn parse_cards(&self) -> Result<Vec<Card>, BadCardTokenOrEmpty> {
        if self.cards.is_empty() {
            return Err(BadCardTokenOrEmpty::Empty(BadInputError::EmptyCardList));
        }
        parse_cards(&self.cards).map_err(BadCardTokenOrEmpty::Card)
    }
}

/// Either a malformed card token or an empty card list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadCardTokenOrEmpty {
    /// A card token was malformed.
    Card(BadCardError),
    /// The card list was empty.
    Empty(BadInputError),
}

/// Response body for `observe`.
#[derive(Debug, Clone, Serialize)]
pub struct ObserveResponse {
    /// The updated count snapshot.
    pub count_snapshot: CountSnapshot,
    /// A fresh bet recommendation at the updated count.
    pub recommended_bet: BetRecommendation,
}

/// Request body for `query_decision`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryDecisionRequest {
    /// The session id.
    pub session_id: u64,
    /// The player's current cards, as wire tokens.
    pub player_cards: Vec<String>,
    /// The dealer's up-card, as a wire token.
    pub dealer_up: String,
}

impl QueryDecisionRequest {
    /// Parses the wire card tokens.
    ///
    /// # Errors
    ///
    /// Returns [`BadCardError`] if any token is malformed.
    pub fn parse_cards(&self) -> Result<(Vec<Card>, Card), BadCardError> {
        let player_cards = parse_cards(&self.player_cards)?;
        let dealer_up = Card::parse_token(&self.dealer_up)?;
        Ok((player_cards, dealer_up))
    }
}

/// Response body for `query_decision`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryDecisionResponse {
    /// The recommended action.
    pub recommended_action: Action,
    /// The count snapshot at the time of the query.
    pub count_snapshot: CountSnapshot,
    /// The recommended bet for the next hand.
    pub recommended_bet: BetRecommendation,
    /// Whether the bet-sizing engine signals a Wong-out at the current count.
    pub should_exit: bool,
    /// A human-readable reason for `should_exit`, when true.
    pub exit_reason: Option<String>,
}

impl From<crate::session::DecisionOutcome> for QueryDecisionResponse {
    fn from(outcome: crate::session::DecisionOutcome) -> Self {
        Self {
            recommended_action: outcome.recommended_action,
            count_snapshot: outcome.count_snapshot,
            recommended_bet: outcome.recommended_bet,
            should_exit: outcome.should_exit,
            exit_reason: outcome.exit_reason.map(|s| s.to_string()),
        }
    }
}

/// The wire shape of any operation's error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// The stable error code, e.g. `WRONG_STATE`.
    pub error_code: &'static str,
    /// A human-readable description.
    pub message: String,
}

impl From<SessionError> for ErrorResponse {
    fn from(error: SessionError) -> Self {
        Self {
            error_code: error.code(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_config_defaults_round_trip_engine_defaults() {
        let config = RulesConfig::default();
        let rules = config.into_rules();
        assert_eq!(rules, GameRules::default());
    }

    #[test]
    fn start_session_rejects_unknown_mode() {
        let req = StartSessionRequest {
            mode: "bogus".to_string(),
            bankroll: 1000,
            rules: None,
            seed: None,
        };
        assert_eq!(req.validate(), Err(BadInputError::InvalidMode));
    }

    #[test]
    fn start_session_rejects_zero_bankroll() {
        let req = StartSessionRequest {
            mode: "auto".to_string(),
            bankroll: 0,
            rules: None,
            seed: None,
        };
        assert_eq!(req.validate(), Err(BadInputError::InvalidBankroll));
    }

    #[test]
    fn observe_request_rejects_empty_card_list() {
        let req = ObserveRequest {
            session_id: 1,
            cards: Vec::new(),
        };
        assert!(matches!(
            req.parse_cards(),
            Err(BadCardTokenOrEmpty::Empty(BadInputError::EmptyCardList))
        ));
    }
}

//! Error types for shoe, decision, and session operations.
//!
//! Each phase of the external interface (§6/§7 of the design notes) gets its
//! own small `thiserror`-derived enum rather than one catch-all type.
//! [`SessionError`] is the top-level
//! type that wraps every phase error plus the session-lifecycle failures, for
//! callers that want a single type to match on; [`SessionError::code`] maps
//! any variant to the stable error code a transport layer would put on the
//! wire (`BAD_INPUT`, `WRONG_STATE`, ...).

use thiserror::Error;

/// A card token was syntactically invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BadCardError {
    /// The token was empty.
    #[error("card token is empty")]
    Empty,
    /// The token was missing its suit character.
    #[error("card token is missing a suit character")]
    Truncated,
    /// The rank character is not one of 2-9, T, J, Q, K, A.
    #[error("unrecognised rank character {0:?}")]
    UnknownRank(char),
    /// The suit character is not one of s, h, d, c (or a suit glyph).
    #[error("unrecognised suit character {0:?}")]
    UnknownSuit(char),
}

/// A request carried a malformed or out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BadInputError {
    /// The requested bankroll was zero or negative.
    #[error("bankroll must be positive")]
    InvalidBankroll,
    /// The requested mode string did not match `auto` or `manual`.
    #[error("mode must be `auto` or `manual`")]
    InvalidMode,
    /// An empty card list was supplied where at least one card is required.
    #[error("at least one card is required")]
    EmptyCardList,
}

/// The rules table failed validation at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BadRulesError {
    /// `table_min` exceeds `table_max`.
    #[error("table_min must not exceed table_max")]
    InvertedTableLimits,
    /// `num_decks` was zero.
    #[error("num_decks must be at least 1")]
    ZeroDecks,
    /// `penetration` was outside (0, 1].
    #[error("penetration must be in (0, 1]")]
    InvalidPenetration,
    /// The basic-strategy table is missing a baseline entry for a
    /// `(category, dealer_up)` pair that must be covered.
    #[error("strategy table has no baseline entry for this hand category and dealer up-card")]
    IncompleteStrategyTable,
    /// A deviation entry referenced a `(category, dealer_up)` pair that has
    /// no baseline entry to deviate from.
    #[error("deviation entry references an uncovered hand category")]
    DeviationWithoutBaseline,
}

/// Errors raised while observing cards into the shoe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ObserveError {
    /// The session is not in shadow (manual) mode.
    #[error("observe is only valid in manual mode")]
    WrongMode,
    /// A card token in the request could not be parsed.
    #[error(transparent)]
    BadCard(#[from] BadCardError),
    /// The shoe has no cards left to account for this observation.
    #[error("shoe is exhausted; call shuffle before observing more cards")]
    ShoeExhausted,
}

/// Errors raised while dealing a new round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DealError {
    /// The session is not in auto-play mode.
    #[error("deal is only valid in auto mode")]
    WrongMode,
    /// The session is not idle (a round is already in progress).
    #[error("a round is already in progress")]
    WrongState,
    /// Fewer than four cards remain in the shoe.
    #[error("shoe is exhausted; call shuffle before dealing")]
    ShoeExhausted,
}

/// The specific reason an action was rejected as illegal for the current hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalActionReason {
    /// DOUBLE requested on a hand with other than two cards.
    #[error("double down requires exactly two cards")]
    DoubleRequiresTwoCards,
    /// DOUBLE requested on a hand created by a split when DAS is disabled.
    #[error("double after split is disabled by the table rules")]
    DoubleAfterSplitDisabled,
    /// DOUBLE requested on a total not covered by the configured double option.
    #[error("double down is not allowed on this total under the table rules")]
    DoubleNotAllowedOnTotal,
    /// SPLIT requested on a hand that is not a pair.
    #[error("split requires a pair")]
    SplitRequiresPair,
    /// SPLIT requested after the configured split limit was reached.
    #[error("maximum number of splits reached")]
    MaxSplitsReached,
    /// SPLIT requested on a hand of split aces when only one split is allowed.
    #[error("aces may only be split once under the table rules")]
    AcesSplitOnceOnly,
    /// SURRENDER requested when the table rules disallow it.
    #[error("surrender is disabled by the table rules")]
    SurrenderDisabled,
    /// SURRENDER requested on other than the initial two cards.
    #[error("surrender requires the initial two cards")]
    SurrenderRequiresTwoCards,
    /// An action was requested on a hand that has already been resolved.
    #[error("hand is no longer active")]
    HandNotActive,
    /// The bankroll cannot cover the additional wager this action requires.
    #[error("bankroll cannot cover this wager")]
    InsufficientBankroll,
}

/// Errors raised while applying a player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The session is not in auto-play mode.
    #[error("action is only valid in auto mode")]
    WrongMode,
    /// There is no hand currently awaiting a player action.
    #[error("no hand is awaiting an action")]
    WrongState,
    /// The requested action is not legal for the current hand.
    #[error(transparent)]
    Illegal(#[from] IllegalActionReason),
    /// The shoe ran out of cards mid-action.
    #[error("shoe is exhausted mid-action; call shuffle and redeal")]
    ShoeExhausted,
}

/// Errors raised while answering a shadow-mode decision or bet query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecisionError {
    /// The session is not in shadow (manual) mode.
    #[error("query_decision is only valid in manual mode")]
    WrongMode,
    /// A card token in the request could not be parsed.
    #[error(transparent)]
    BadCard(#[from] BadCardError),
}

/// Errors raised at `start_session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartSessionError {
    /// The request itself was malformed.
    #[error(transparent)]
    BadInput(#[from] BadInputError),
    /// The supplied rules failed validation.
    #[error(transparent)]
    BadRules(#[from] BadRulesError),
}

/// The top-level error surface for session operations. Every phase error is
/// reachable through this type via `From`/`?`, plus the session-lifecycle
/// failures that are not scoped to any single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No session exists with the given id (never created, or already ended).
    #[error("session not found")]
    SessionGone,
    /// A concurrent operation on this session was rejected.
    #[error("session is busy with another operation")]
    SessionBusy,
    /// See [`StartSessionError`].
    #[error(transparent)]
    Start(#[from] StartSessionError),
    /// See [`ObserveError`].
    #[error(transparent)]
    Observe(#[from] ObserveError),
    /// See [`DealError`].
    #[error(transparent)]
    Deal(#[from] DealError),
    /// See [`ActionError`].
    #[error(transparent)]
    Action(#[from] ActionError),
    /// See [`DecisionError`].
    #[error(transparent)]
    Decision(#[from] DecisionError),
}

impl SessionError {
    /// Maps this error to the stable error code named in the interface
    /// contract (`BAD_INPUT`, `WRONG_STATE`, ...).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SessionGone => "SESSION_GONE",
            Self::SessionBusy => "SESSION_BUSY",
            Self::Start(StartSessionError::BadInput(_)) => "BAD_INPUT",
            Self::Start(StartSessionError::BadRules(_)) => "BAD_RULES",
            Self::Observe(ObserveError::WrongMode)
            | Self::Deal(DealError::WrongMode)
            | Self::Action(ActionError::WrongMode)
            | Self::Decision(DecisionError::WrongMode) => "WRONG_MODE",
            Self::Observe(ObserveError::BadCard(_)) | Self::Decision(DecisionError::BadCard(_)) => {
                "BAD_CARD"
            }
            Self::Observe(ObserveError::ShoeExhausted)
            | Self::Deal(DealError::ShoeExhausted)
            | Self::Action(ActionError::ShoeExhausted) => "SHOE_EXHAUSTED",
            Self::Deal(DealError::WrongState) => "WRONG_STATE",
            Self::Action(ActionError::WrongState) => "WRONG_STATE",
            Self::Action(ActionError::Illegal(_)) => "ILLEGAL_ACTION",
        }
    }
}

//! A real-time blackjack decision engine with optional `no_std` support.
//!
//! The crate tracks a shoe's Hi-Lo count, recommends basic-strategy and
//! Illustrious-18/Fab-4 index-play actions, sizes bets with a fractional-Kelly
//! model, and orchestrates a session's state machine (auto-dealt or
//! shadow/manual) behind a session-oriented, transport-agnostic interface.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cardcount::rules::GameRules;
//! use cardcount::session::{Mode, SessionManager};
//! use cardcount::strategy::StrategyTable;
//!
//! let strategy = Arc::new(StrategyTable::canonical().unwrap());
//! let manager = SessionManager::new(strategy);
//! let session = manager
//!     .start_session(Mode::Auto, GameRules::default(), 10_000, 42)
//!     .unwrap();
//! let _ = session.try_status();
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(all(not(feature = "std"), not(feature = "alloc")))]
compile_error!(
    "`std` is disabled but `alloc` feature is not enabled. Enable `alloc` or keep `std` enabled."
);

extern crate alloc;

pub mod api;
pub mod betting;
pub mod card;
pub mod error;
pub mod hand;
pub mod result;
pub mod rules;
pub mod session;
pub mod shoe;
pub mod strategy;
mod sync;

// Re-export the most commonly used types.
pub use betting::BetRecommendation;
pub use card::{Card, DECK_SIZE, Suit};
pub use error::SessionError;
pub use hand::{DealerHand, Hand, HandStatus};
pub use result::{HandOutcome, HandResult, RoundResult};
pub use rules::GameRules;
pub use session::{Mode, Session, SessionManager, SessionState};
pub use shoe::{CountSnapshot, Shoe};
pub use strategy::{Action, StrategyTable};

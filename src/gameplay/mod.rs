//! Betting-round state machine, side-pot accounting, and action legality
//! (C5) — deal, stream streets, validate actions, settle at showdown.
//!
//! # Submodules
//!
//! - `action`: the tagged `Action` variant players apply to a `HandState`.
//! - `player`: one seat's mutable per-hand state.
//! - `pot`: contribution tracking and side-pot construction.
//! - `state`: `HandState`, the per-hand state machine itself.

pub mod action;
pub mod player;
pub mod pot;
pub mod state;

pub use action::Action;
pub use player::PlayerState;
pub use pot::{PotManager, SidePot};
pub use state::{HandState, Payout};

//! Deterministic mapping from hole cards, board, pot, and to-call into
//! discrete info-set buckets (C6).
//!
//! # Submodules
//!
//! - `config`: `AbstractionConfig`, validated at construction.
//! - `key`: `InfoSetKey`, the six-tuple regret-table key.
//! - `buckets`: the four bucket functions the key is built from.

pub mod buckets;
pub mod config;
pub mod key;

pub use buckets::{board_bucket, hole_bucket, pot_bucket, to_call_bucket};
pub use config::AbstractionConfig;
pub use key::InfoSetKey;

//! Sharded regret storage and the MCCFR trainer built on top of it (C7-C8).
//!
//! # Submodules
//!
//! - `regret`: `RegretEntry`/`RegretTable`, regret matching and the
//!   regret-sum/strategy-sum update rule.
//! - `config`: `TrainingConfig`, validated at construction.
//! - `stats`: per-iteration counters and the progress-callback payload.
//! - `timestamp`: a hand-rolled RFC-3339 UTC formatter for blueprint
//!   metadata.
//! - `blueprint`: the averaged-strategy artefact a trainer run emits.
//! - `checkpoint`: a full trainer snapshot, enough to resume training.
//! - `trainer`: `Trainer`, the traversal and training-loop driver.

pub mod blueprint;
pub mod checkpoint;
pub mod config;
pub mod regret;
pub mod stats;
pub mod timestamp;
pub mod trainer;

pub use blueprint::Blueprint;
pub use checkpoint::Checkpoint;
pub use config::{Sampling, TrainingConfig};
pub use regret::{DiscountParams, RegretEntry, RegretTable, RegretUpdateOpts};
pub use stats::{Progress, Stats};
pub use trainer::{CancellationToken, Trainer};

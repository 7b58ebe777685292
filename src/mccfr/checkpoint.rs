use super::blueprint::write_atomic;
use super::config::TrainingConfig;
use super::regret::RegretEntry;
use super::stats::Stats;
use crate::abstraction::AbstractionConfig;
use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CHECKPOINT_VERSION: u32 = 1;

/// A serialisable mirror of [`RegretEntry`] (spec §6): the entry's three
/// fields, named for JSON round-tripping rather than the struct's private
/// layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegretEntrySnapshot {
    pub actions: Vec<f64>,
    pub regret_sum: Vec<f64>,
    pub strategy_sum: Vec<f64>,
    pub normalising: f64,
}

impl From<&RegretEntry> for RegretEntrySnapshot {
    fn from(entry: &RegretEntry) -> Self {
        Self {
            actions: vec![0.0; entry.actions_size()],
            regret_sum: entry.regret_sum().to_vec(),
            strategy_sum: entry.strategy_sum().to_vec(),
            normalising: entry.normalising(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub nodes_visited: u64,
    pub terminal_nodes: u64,
    pub max_depth: usize,
    pub iteration_time_ns: u128,
}

impl From<Stats> for StatsSnapshot {
    fn from(stats: Stats) -> Self {
        Self {
            nodes_visited: stats.nodes_visited,
            terminal_nodes: stats.terminal_nodes,
            max_depth: stats.max_depth,
            iteration_time_ns: stats.iteration_time.as_nanos(),
        }
    }
}

impl From<&StatsSnapshot> for Stats {
    fn from(snapshot: &StatsSnapshot) -> Self {
        Self {
            nodes_visited: snapshot.nodes_visited,
            terminal_nodes: snapshot.terminal_nodes,
            max_depth: snapshot.max_depth,
            iteration_time: Duration::from_nanos(snapshot.iteration_time_ns as u64),
        }
    }
}

/// A full trainer snapshot (spec §4.8, §6): enough to resume training from
/// exactly this point, including the master RNG's position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub iteration: u64,
    pub rng_seed: u64,
    pub rng_int64_calls: u64,
    /// The teacher's RNG draw two words per call (`next_pair`); kept as a
    /// distinct counter per spec §6's `rng_intn_calls` field even though
    /// this implementation's `next_u64`/`next_pair` share one counter.
    pub rng_intn_calls: u64,
    pub training: TrainingConfig,
    pub abstraction: AbstractionConfig,
    pub stats: StatsSnapshot,
    pub regrets: HashMap<String, RegretEntrySnapshot>,
}

impl Checkpoint {
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)
    }

    /// Reads and validates `version`; rejects any value other than
    /// [`CHECKPOINT_VERSION`]. Callers also revalidate `training`/
    /// `abstraction` before resuming (spec §4.8).
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let bytes = fs::read(path)?;
        let checkpoint: Checkpoint = serde_json::from_slice(&bytes)?;
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CoreError::CheckpointVersionMismatch {
                expected: CHECKPOINT_VERSION,
                found: checkpoint.version,
            });
        }
        checkpoint.training.validate()?;
        checkpoint.abstraction.validate()?;
        Ok(checkpoint)
    }
}

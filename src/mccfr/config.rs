use crate::Chips;
use crate::CoreError;
use serde::{Deserialize, Serialize};

/// MCCFR variant for non-target players and chance nodes (spec §4.8,
/// glossary). `External` samples one branch; `FullTraversal` expands every
/// branch and is strictly more expensive per traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sampling {
    External,
    FullTraversal,
}

/// Parameters for one trainer run (spec §4.8). `seed` is the single master
/// seed every table's deck/sampler/button draws derive from, so two
/// trainers built with identical configs produce identical stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub iterations: u64,
    pub players: usize,
    pub parallel_tables: usize,
    pub seed: u64,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub starting_stack: Chips,
    pub sampling: Sampling,
    pub enable_raises: bool,
    pub max_raises_per_bucket: usize,
    /// Visit threshold below which a node's raise options are pruned
    /// (spec §4.8's adaptive raise expansion). Zero disables the feature.
    pub adaptive_raise_visits: u64,
    pub use_cfr_plus: bool,
    pub checkpoint_every: u64,
    pub progress_every: u64,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.iterations == 0 {
            return Err(CoreError::TrainingConfigInvalid("iterations must be > 0".into()));
        }
        if !(2..=9).contains(&self.players) {
            return Err(CoreError::TrainingConfigInvalid("players must be in 2..=9".into()));
        }
        if self.parallel_tables == 0 {
            return Err(CoreError::TrainingConfigInvalid("parallel_tables must be > 0".into()));
        }
        if self.small_blind <= 0 || self.big_blind <= 0 || self.big_blind < self.small_blind {
            return Err(CoreError::TrainingConfigInvalid(
                "blinds must be positive with big_blind >= small_blind".into(),
            ));
        }
        if self.starting_stack <= 0 {
            return Err(CoreError::TrainingConfigInvalid("starting_stack must be > 0".into()));
        }
        if self.enable_raises && self.max_raises_per_bucket == 0 {
            return Err(CoreError::TrainingConfigInvalid(
                "max_raises_per_bucket must be > 0 when raises are enabled".into(),
            ));
        }
        Ok(())
    }

    /// `max(1, iterations/100)`, the default progress-callback cadence.
    pub fn default_progress_every(iterations: u64) -> u64 {
        (iterations / 100).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> TrainingConfig {
        TrainingConfig {
            iterations: 1000,
            players: 6,
            parallel_tables: 4,
            seed: 1,
            small_blind: 1,
            big_blind: 2,
            starting_stack: 200,
            sampling: Sampling::External,
            enable_raises: true,
            max_raises_per_bucket: 3,
            adaptive_raise_visits: 50,
            use_cfr_plus: false,
            checkpoint_every: 100,
            progress_every: 10,
        }
    }

    #[test]
    fn a_well_formed_config_validates() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn player_count_outside_two_to_nine_is_rejected() {
        let mut config = valid();
        config.players = 1;
        assert!(config.validate().is_err());
        config.players = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn big_blind_below_small_blind_is_rejected() {
        let mut config = valid();
        config.big_blind = 1;
        config.small_blind = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_progress_every_has_a_floor_of_one() {
        assert_eq!(TrainingConfig::default_progress_every(50), 1);
        assert_eq!(TrainingConfig::default_progress_every(1000), 10);
    }
}

use crate::CoreError;
use serde::{Deserialize, Serialize};

/// Parameters governing how the trainer collapses full game states into
/// info-set buckets and discretises raise sizes (spec §4.6, §4.8).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractionConfig {
    pub preflop_bucket_count: usize,
    pub postflop_bucket_count: usize,
    /// Pot fractions (e.g. 0.5, 1.0) used to propose raise sizes.
    pub bet_sizing: Vec<f64>,
    pub max_actions_per_node: usize,
    pub max_raises_per_bucket: usize,
    pub enable_raises: bool,
}

impl AbstractionConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.preflop_bucket_count == 0 {
            return Err(CoreError::AbstractionInvalid("preflop_bucket_count must be > 0".into()));
        }
        if self.postflop_bucket_count == 0 {
            return Err(CoreError::AbstractionInvalid("postflop_bucket_count must be > 0".into()));
        }
        if self.max_actions_per_node == 0 {
            return Err(CoreError::AbstractionInvalid("max_actions_per_node must be > 0".into()));
        }
        if self.enable_raises {
            if self.bet_sizing.is_empty() {
                return Err(CoreError::AbstractionInvalid(
                    "bet_sizing must be non-empty when raises are enabled".into(),
                ));
            }
            if self.bet_sizing.iter().any(|&f| f <= 0.0) {
                return Err(CoreError::AbstractionInvalid("bet_sizing entries must be > 0".into()));
            }
            if self.max_raises_per_bucket == 0 {
                return Err(CoreError::AbstractionInvalid("max_raises_per_bucket must be > 0".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AbstractionConfig {
        AbstractionConfig {
            preflop_bucket_count: 20,
            postflop_bucket_count: 10,
            bet_sizing: vec![0.5, 1.0],
            max_actions_per_node: 6,
            max_raises_per_bucket: 3,
            enable_raises: true,
        }
    }

    #[test]
    fn a_well_formed_config_validates() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn zero_bucket_counts_are_rejected() {
        let mut config = valid();
        config.preflop_bucket_count = 0;
        assert!(matches!(config.validate(), Err(CoreError::AbstractionInvalid(_))));
    }

    #[test]
    fn empty_bet_sizing_with_raises_enabled_is_rejected() {
        let mut config = valid();
        config.bet_sizing.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_bet_sizing_is_fine_when_raises_are_disabled() {
        let mut config = valid();
        config.bet_sizing.clear();
        config.enable_raises = false;
        assert!(config.validate().is_ok());
    }
}

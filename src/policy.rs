//! Runtime lookup of a trained blueprint's average strategy (C9). A
//! `Policy` is deliberately dumb: no traversal, no abstraction buckets of
//! its own, just a key-string -> weights map loaded once from disk.

use crate::mccfr::Blueprint;
use crate::CoreError;
use std::collections::HashMap;
use std::path::Path;

/// A loaded blueprint's strategies, ready for lookup by info-set key
/// string (spec §4.9).
#[derive(Debug, Clone)]
pub struct Policy {
    strategies: HashMap<String, Vec<f64>>,
}

impl Policy {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        Ok(Self::from_blueprint(Blueprint::load(path)?))
    }

    pub fn from_blueprint(blueprint: Blueprint) -> Self {
        Self { strategies: blueprint.strategies }
    }

    /// The action-weight vector for `key`, reshaped to exactly
    /// `action_count` entries (spec §4.9):
    ///
    /// - unknown key: uniform over `action_count` actions.
    /// - stored length >= `action_count`: the first `action_count` weights.
    /// - stored length < `action_count`: the stored weights, padded with
    ///   `1/action_count` each (not renormalised).
    pub fn action_weights(&self, key: &str, action_count: usize) -> Result<Vec<f64>, CoreError> {
        if action_count == 0 {
            return Err(CoreError::InternalError("action_count must be > 0".into()));
        }
        let uniform_weight = 1.0 / action_count as f64;
        let Some(stored) = self.strategies.get(key) else {
            return Ok(vec![uniform_weight; action_count]);
        };
        if stored.len() >= action_count {
            return Ok(stored[..action_count].to_vec());
        }
        let mut weights = stored.clone();
        weights.resize(action_count, uniform_weight);
        Ok(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstraction::AbstractionConfig;

    fn abstraction() -> AbstractionConfig {
        AbstractionConfig {
            preflop_bucket_count: 10,
            postflop_bucket_count: 5,
            bet_sizing: vec![0.5, 1.0],
            max_actions_per_node: 6,
            max_raises_per_bucket: 3,
            enable_raises: true,
        }
    }

    fn policy_with(strategies: HashMap<String, Vec<f64>>) -> Policy {
        Policy::from_blueprint(Blueprint::new(1, abstraction(), strategies))
    }

    #[test]
    fn an_unknown_key_returns_uniform_weights() {
        let policy = policy_with(HashMap::new());
        let weights = policy.action_weights("0/0/0/0/0/0", 4).unwrap();
        assert_eq!(weights, vec![0.25; 4]);
    }

    #[test]
    fn a_shorter_stored_strategy_is_padded_uniformly_without_renormalising() {
        let mut strategies = HashMap::new();
        strategies.insert("1/0/2/0/0/0".to_string(), vec![0.7]);
        let policy = policy_with(strategies);
        let weights = policy.action_weights("1/0/2/0/0/0", 3).unwrap();
        assert_eq!(weights, vec![0.7, 1.0 / 3.0, 1.0 / 3.0]);
    }

    #[test]
    fn a_longer_stored_strategy_is_truncated() {
        let mut strategies = HashMap::new();
        strategies.insert("1/0/2/0/0/0".to_string(), vec![0.5, 0.3, 0.2]);
        let policy = policy_with(strategies);
        let weights = policy.action_weights("1/0/2/0/0/0", 2).unwrap();
        assert_eq!(weights, vec![0.5, 0.3]);
    }

    #[test]
    fn zero_action_count_is_an_error() {
        let policy = policy_with(HashMap::new());
        assert!(policy.action_weights("k", 0).is_err());
    }
}

use super::timestamp::now_rfc3339;
use crate::abstraction::AbstractionConfig;
use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const BLUEPRINT_VERSION: u32 = 1;

/// The averaged-strategy artefact a trainer run emits (spec §3, §6). The
/// only artefact a runtime [`crate::policy::Policy`] needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub version: u32,
    pub generated_at: String,
    pub iterations: u64,
    pub abstraction: AbstractionConfig,
    /// `key_string -> average strategy`, one normalised probability
    /// distribution per info set.
    pub strategies: HashMap<String, Vec<f64>>,
}

impl Blueprint {
    pub fn new(iterations: u64, abstraction: AbstractionConfig, strategies: HashMap<String, Vec<f64>>) -> Self {
        Self { version: BLUEPRINT_VERSION, generated_at: now_rfc3339(), iterations, abstraction, strategies }
    }

    /// Writes atomically: serialise to a sibling temp file, then rename
    /// over `path` (spec §6). Readers never observe a partial write.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)?;
        log::info!(
            "exported blueprint to {} ({} info sets, {} iterations)",
            path.display(),
            self.strategies.len(),
            self.iterations
        );
        Ok(())
    }

    /// Reads and validates `version`; rejects any value other than
    /// [`BLUEPRINT_VERSION`].
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let bytes = fs::read(path)?;
        let blueprint: Blueprint = serde_json::from_slice(&bytes)?;
        if blueprint.version != BLUEPRINT_VERSION {
            return Err(CoreError::BlueprintVersionMismatch { expected: BLUEPRINT_VERSION, found: blueprint.version });
        }
        Ok(blueprint)
    }
}

/// Write-to-temp-then-rename so a reader never sees a half-written file.
pub(super) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, bytes)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn save_then_load_round_trips_byte_for_byte_strategies() {
        let dir = std::env::temp_dir().join(format!("robopoker-blueprint-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blueprint.json");

        let mut strategies = HashMap::new();
        strategies.insert("1/1/2/0/0/0".to_string(), vec![0.7, 0.3]);
        let blueprint = Blueprint::new(42, abstraction(), strategies);
        blueprint.save(&path).unwrap();

        let loaded = Blueprint::load(&path).unwrap();
        assert_eq!(loaded.strategies, blueprint.strategies);
        assert_eq!(loaded.iterations, 42);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn a_mismatched_version_is_rejected() {
        let dir = std::env::temp_dir().join(format!("robopoker-blueprint-vtest-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blueprint.json");
        let mut blueprint = Blueprint::new(1, abstraction(), HashMap::new());
        blueprint.version = 99;
        blueprint.save(&path).unwrap();

        let err = Blueprint::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::BlueprintVersionMismatch { .. }));
        fs::remove_dir_all(&dir).ok();
    }
}

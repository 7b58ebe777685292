use crate::gameplay::action::Action;

/// The core surfaces failures as values, never as panics or exceptions.
///
/// Two operations are documented exceptions to this: [`crate::cards::evaluator::evaluate`]
/// and [`crate::equity::calculate_equity`] degrade to a sentinel/empty result on invalid
/// input rather than returning `Err`, since callers rely on that contract (spec §6).
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    #[error("invalid card string {0:?}")]
    InvalidCard(String),

    #[error("duplicate card in hand: {0}")]
    DuplicateCard(String),

    #[error("illegal action {action:?}: {reason}")]
    InvalidAction { action: Action, reason: String },

    #[error("invalid abstraction config: {0}")]
    AbstractionInvalid(String),

    #[error("invalid training config: {0}")]
    TrainingConfigInvalid(String),

    #[error("checkpoint version mismatch: expected {expected}, found {found}")]
    CheckpointVersionMismatch { expected: u32, found: u32 },

    #[error("blueprint version mismatch: expected {expected}, found {found}")]
    BlueprintVersionMismatch { expected: u32, found: u32 },

    #[error("io error: {0}")]
    IoError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

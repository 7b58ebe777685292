use crate::Chips;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A player action. `Raise(total)` names the player's total bet for the
/// street after the raise, not the increment over the current bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise(Chips),
    AllIn,
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Action::Fold => write!(f, "fold"),
            Action::Check => write!(f, "check"),
            Action::Call => write!(f, "call"),
            Action::Raise(total) => write!(f, "raise to {total}"),
            Action::AllIn => write!(f, "all-in"),
        }
    }
}

//! Monte Carlo equity simulation (C4): win/tie/equity of a hero hand against
//! uniform-random opponents on a partial board.

pub mod engine;
pub mod preflop;

pub use engine::{calculate_equity, EquityResult};
pub use preflop::{canonical_classes, PreflopTable};

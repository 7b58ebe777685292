use crate::cards::Street;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A six-tuple info-set key: fully determined by the observable abstraction,
/// no chance information beyond the buckets themselves (spec §3). Its
/// string encoding `"S/P/H/B/Pt/Tc"` is the literal regret-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoSetKey {
    pub street: Street,
    pub seat: usize,
    pub hole_bucket: usize,
    pub board_bucket: usize,
    pub pot_bucket: usize,
    pub to_call_bucket: usize,
}

impl InfoSetKey {
    fn street_index(&self) -> usize {
        Street::ALL.iter().position(|&s| s == self.street).expect("street is one of Street::ALL")
    }

    pub fn to_key_string(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}",
            self.street_index(),
            self.seat,
            self.hole_bucket,
            self.board_bucket,
            self.pot_bucket,
            self.to_call_bucket
        )
    }
}

impl Display for InfoSetKey {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.to_key_string())
    }
}

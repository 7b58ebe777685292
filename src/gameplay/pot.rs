use super::player::PlayerState;
use crate::Chips;

/// One side pot: an amount eligible only to the seats that contributed at
/// least the pot's level and have not folded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidePot {
    pub amount: Chips,
    pub eligible: Vec<usize>,
    pub max_per_player: Chips,
}

/// Accumulates each seat's total contribution across the whole hand (not
/// just the current street) so side pots can be rebuilt at any point.
#[derive(Debug, Clone)]
pub struct PotManager {
    contributions: Vec<Chips>,
}

impl PotManager {
    pub fn new(seats: usize) -> Self {
        Self { contributions: vec![0; seats] }
    }

    /// Folds every seat's current-street `bet` into its running
    /// contribution and zeroes `bet`. Called once per street termination.
    pub fn collect(&mut self, players: &mut [PlayerState]) {
        for (seat, player) in players.iter_mut().enumerate() {
            self.contributions[seat] += player.bet;
            player.bet = 0;
        }
    }

    pub fn total(&self) -> Chips {
        self.contributions.iter().sum()
    }

    /// Partitions the accumulated contributions into side pots, ascending
    /// by level. Folded seats still contribute chips to every pot their
    /// money funded but are never eligible to win one.
    pub fn build_pots(&self, folded: &[bool]) -> Vec<SidePot> {
        let mut levels: Vec<Chips> = self.contributions.iter().copied().filter(|&c| c > 0).collect();
        levels.sort_unstable();
        levels.dedup();

        let mut pots = Vec::with_capacity(levels.len());
        let mut prior = 0;
        for level in levels {
            let mut amount = 0;
            let mut eligible = Vec::new();
            for (seat, &contributed) in self.contributions.iter().enumerate() {
                amount += contributed.min(level) - contributed.min(prior);
                if contributed >= level && !folded[seat] {
                    eligible.push(seat);
                }
            }
            pots.push(SidePot { amount, eligible, max_per_player: level });
            prior = level;
        }
        pots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(chips_committed: &[Chips], folded: &[bool]) -> (PotManager, Vec<bool>) {
        let mut manager = PotManager::new(chips_committed.len());
        let mut states: Vec<PlayerState> = chips_committed
            .iter()
            .map(|&bet| {
                let mut p = PlayerState::new("p".into(), 0);
                p.bet = bet;
                p
            })
            .collect();
        manager.collect(&mut states);
        (manager, folded.to_vec())
    }

    #[test]
    fn even_contributions_form_a_single_pot() {
        let (manager, folded) = players(&[100, 100, 100], &[false, false, false]);
        let pots = manager.build_pots(&folded);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible, vec![0, 1, 2]);
        assert_eq!(pots[0].max_per_player, 100);
    }

    #[test]
    fn a_short_all_in_creates_a_side_pot() {
        // seat 0 is all-in for 50, seats 1 and 2 put in 150 each.
        let (manager, folded) = players(&[50, 150, 150], &[false, false, false]);
        let pots = manager.build_pots(&folded);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 150); // 50 * 3
        assert_eq!(pots[0].eligible, vec![0, 1, 2]);
        assert_eq!(pots[0].max_per_player, 50);
        assert_eq!(pots[1].amount, 200); // (150-50) * 2
        assert_eq!(pots[1].eligible, vec![1, 2]);
        assert_eq!(pots[1].max_per_player, 150);
    }

    #[test]
    fn a_folded_contributor_funds_pots_but_is_never_eligible() {
        let (manager, folded) = players(&[100, 100, 100], &[false, true, false]);
        let pots = manager.build_pots(&folded);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible, vec![0, 2]);
        assert_eq!(pots[0].max_per_player, 100);
    }
}

//! Board-texture primitives (C10). Kept public rather than solver-private:
//! spec §1 names bot-side strategies as a consumer of exactly this kind of
//! read on a board, not just the bucket abstraction that also builds on it.

use crate::cards::{Hand, Rank, Suit};

/// Per-suit card counts on a board, plus the two named textures spec §4.10
/// calls out by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPotential {
    pub suit_counts: [u32; 4],
    /// One suit, >= 3 cards of it.
    pub monotone: bool,
    /// Every card a distinct suit, >= 3 cards total.
    pub rainbow: bool,
    pub dominant_suit: Option<Suit>,
}

pub fn flush_potential(board: Hand) -> FlushPotential {
    let mut suit_counts = [0u32; 4];
    for &suit in &Suit::ALL {
        suit_counts[suit as usize] = board.suit_mask(suit).count_ones();
    }
    let total = board.count_cards();
    let monotone = total >= 3 && suit_counts.iter().any(|&c| c == total);
    let rainbow = total >= 3 && suit_counts.iter().all(|&c| c <= 1);
    let dominant_suit = suit_counts
        .iter()
        .enumerate()
        .max_by_key(|&(_, &c)| c)
        .filter(|&(_, &c)| c > 0)
        .map(|(i, _)| Suit::from(i as u8));
    FlushPotential { suit_counts, monotone, rainbow, dominant_suit }
}

/// How connected a board's ranks are, independent of suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StraightPotential {
    /// Longest run of consecutive ranks present, ace counted both high and
    /// (when low ranks are present) low.
    pub longest_run: u32,
    /// `(highest - lowest + 1) - distinct_ranks` over the present ranks;
    /// zero means the present ranks are already consecutive.
    pub gap_count: u32,
    pub broadway_count: u32,
    /// Ace and at least one of 2-5 are both present, so a backdoor wheel
    /// draw exists.
    pub wheel_connected: bool,
}

fn longest_consecutive_run(mask: u32, width: u32) -> u32 {
    let mut best = 0;
    let mut current = 0;
    for i in 0..width {
        if mask & (1 << i) != 0 {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

pub fn straight_potential(board: Hand) -> StraightPotential {
    let mask = board.rank_mask();
    let ace_high_run = longest_consecutive_run(mask as u32, 13);

    // Ace-low window: [ace, two, three, four, five] as consecutive bits.
    let ace_bit = (mask >> 12) & 1;
    let low_bits = mask & 0x000F;
    let wheel_window = (ace_bit as u32) | ((low_bits as u32) << 1);
    let wheel_run = longest_consecutive_run(wheel_window, 5);

    let longest_run = ace_high_run.max(wheel_run);
    let wheel_connected = ace_bit == 1 && low_bits != 0;

    let distinct = mask.count_ones();
    let gap_count = if distinct >= 2 {
        let lowest = mask.trailing_zeros();
        let highest = 15 - mask.leading_zeros();
        (highest - lowest + 1).saturating_sub(distinct)
    } else {
        0
    };

    let broadway_count = (mask & 0x1F00).count_ones();

    StraightPotential { longest_run, gap_count, broadway_count, wheel_connected }
}

/// Number of ranks appearing at least twice on the board.
pub fn pair_count(board: Hand) -> u32 {
    let cards = board.cards();
    Rank::ALL
        .iter()
        .filter(|&&rank| cards.iter().filter(|c| c.rank() == rank).count() >= 2)
        .count() as u32
}

/// Number of Ten-or-higher cards on the board.
pub fn high_card_count(board: Hand) -> u32 {
    (board.rank_mask() & 0x1F00).count_ones()
}

/// Coarse wetness bucket, weakest to strongest: 0 = dry, 3 = very wet.
/// The weights are a free parameter (spec §4.10); this implementation only
/// needs to preserve the ordering spec §8 tests against (a monotone,
/// connected board strictly above a dry, disconnected one).
pub fn texture_index(board: Hand) -> u8 {
    if board.count_cards() < 3 {
        return 0;
    }
    let flush = flush_potential(board);
    let straight = straight_potential(board);
    let pairs = pair_count(board) as i32;
    let highs = high_card_count(board) as i32;

    let flush_score = match flush.suit_counts.iter().copied().max().unwrap_or(0) {
        0..=2 => 0,
        3 => 2,
        _ => 4,
    };
    let straight_score = match straight.longest_run {
        0..=1 => 0,
        2 => 1,
        3 => 2,
        _ => 3,
    };
    let score = flush_score + straight_score - pairs + highs.min(2);
    match score {
        i32::MIN..=1 => 0,
        2..=3 => 1,
        4..=5 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Hand;

    #[test]
    fn monotone_board_is_flagged() {
        let board = Hand::parse(&["Th", "Jh", "Qh"]).unwrap();
        let potential = flush_potential(board);
        assert!(potential.monotone);
        assert!(!potential.rainbow);
        assert_eq!(potential.dominant_suit, Some(Suit::Hearts));
    }

    #[test]
    fn rainbow_board_is_flagged() {
        let board = Hand::parse(&["2c", "7d", "Kc"]).unwrap();
        assert!(!flush_potential(board).rainbow); // two clubs, not all distinct
        let board = Hand::parse(&["2c", "7d", "Kh"]).unwrap();
        assert!(flush_potential(board).rainbow);
    }

    #[test]
    fn three_consecutive_ranks_run_to_three() {
        let board = Hand::parse(&["Th", "Jc", "Qd"]).unwrap();
        assert_eq!(straight_potential(board).longest_run, 3);
    }

    #[test]
    fn wheel_connectivity_detects_ace_with_a_low_card() {
        let board = Hand::parse(&["Ah", "2c", "9d"]).unwrap();
        assert!(straight_potential(board).wheel_connected);
        let board = Hand::parse(&["Ah", "Tc", "9d"]).unwrap();
        assert!(!straight_potential(board).wheel_connected);
    }

    #[test]
    fn pair_count_counts_paired_ranks_only() {
        let board = Hand::parse(&["2c", "2d", "7h", "Ks", "Kc"]).unwrap();
        assert_eq!(pair_count(board), 2);
    }

    #[test]
    fn wet_board_outranks_dry_board() {
        let wet = Hand::parse(&["Th", "Jh", "Qh"]).unwrap();
        let dry = Hand::parse(&["2c", "7d", "Kc"]).unwrap();
        assert!(texture_index(wet) > texture_index(dry));
    }
}

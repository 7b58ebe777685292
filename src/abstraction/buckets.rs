use crate::cards::Hand;
use crate::texture::{high_card_count, pair_count, texture_index};
use crate::Chips;

/// Maps a two-card hole hand to a preflop bucket. `score` folds pairedness
/// and suitedness into the raw `rank_hi*13 + rank_lo` scalar so that pairs
/// (and to a lesser extent suited hands) sort above unpaired/offsuit hands
/// of similar rank, then maps linearly into `[0, bucket_count)`.
///
/// Requires `hole` to hold exactly two cards; callers only ever reach this
/// with dealt hole cards, so a malformed hand degrades to bucket 0 rather
/// than panicking.
pub fn hole_bucket(hole: Hand, bucket_count: usize) -> usize {
    let cards = hole.cards();
    if cards.len() != 2 {
        return 0;
    }
    let (hi, lo) = if cards[0].rank() >= cards[1].rank() { (cards[0], cards[1]) } else { (cards[1], cards[0]) };
    let pair = hi.rank() == lo.rank();
    let suited = hi.suit() == lo.suit();
    let r_hi = u8::from(hi.rank()) as f64;
    let r_lo = u8::from(lo.rank()) as f64;
    let score = r_hi * 13.0 + r_lo + 200.0 * (pair as u8 as f64) + 13.0 * (suited as u8 as f64);

    let n = bucket_count.max(1);
    let width = 312.0 / n as f64;
    let bucket = (score / width).floor() as i64;
    bucket.clamp(0, n as i64 - 1) as usize
}

/// Maps a 0-5 card board to a coarse postflop bucket combining wetness,
/// pairedness, and high-card density. An empty or 1-2 card board always
/// maps to bucket 0 (no texture is observable yet).
pub fn board_bucket(board: Hand, bucket_count: usize) -> usize {
    if board.count_cards() < 3 {
        return 0;
    }
    let texture = texture_index(board) as f64;
    let pairs = pair_count(board) as f64;
    let highs = high_card_count(board) as f64;
    let score = 2.0 * texture + pairs + 0.5 * highs;

    // Observed max: texture in [0,3], pairs up to 2 on a 5-card board, and
    // 0.5 per high card up to 5 cards -> 6 + 2 + 2.5.
    const MAX_SCORE: f64 = 10.5;
    let n = bucket_count.max(1);
    let bucket = ((score / MAX_SCORE) * n as f64).floor() as i64;
    bucket.clamp(0, n as i64 - 1) as usize
}

fn threshold_bucket(amount: Chips, thresholds: &[Chips]) -> usize {
    thresholds.iter().position(|&t| amount <= t).unwrap_or(thresholds.len())
}

/// Discretises a pot size against `{bb, 3bb, 6bb, 12bb}`.
pub fn pot_bucket(pot: Chips, big_blind: Chips) -> usize {
    threshold_bucket(pot, &[big_blind, 3 * big_blind, 6 * big_blind, 12 * big_blind])
}

/// Discretises a to-call amount against `{0, bb, 2bb, 4bb}`.
pub fn to_call_bucket(to_call: Chips, big_blind: Chips) -> usize {
    threshold_bucket(to_call, &[0, big_blind, 2 * big_blind, 4 * big_blind])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Hand;

    #[test]
    fn pocket_aces_claim_the_top_bucket() {
        let aa = Hand::parse(&["As", "Ad"]).unwrap();
        assert_eq!(hole_bucket(aa, 20), 19);
    }

    #[test]
    fn suited_broadway_outranks_the_same_cards_offsuit() {
        let suited = Hand::parse(&["Ks", "Qs"]).unwrap();
        let offsuit = Hand::parse(&["Ks", "Qd"]).unwrap();
        assert!(hole_bucket(suited, 20) >= hole_bucket(offsuit, 20));
    }

    #[test]
    fn an_empty_board_is_always_bucket_zero() {
        assert_eq!(board_bucket(Hand::new(), 10), 0);
    }

    #[test]
    fn a_wet_connected_board_outranks_a_dry_disconnected_one() {
        let wet = Hand::parse(&["Th", "Jh", "Qh"]).unwrap();
        let dry = Hand::parse(&["2c", "7d", "Kc"]).unwrap();
        assert!(board_bucket(wet, 10) > board_bucket(dry, 10));
    }

    #[test]
    fn pot_and_to_call_buckets_are_monotone_in_their_input() {
        let bb = 2;
        let pots: Vec<usize> = [0, 2, 6, 13, 24, 100].iter().map(|&p| pot_bucket(p, bb)).collect();
        let mut sorted = pots.clone();
        sorted.sort_unstable();
        assert_eq!(pots, sorted);

        let calls: Vec<usize> = [0, 1, 2, 4, 8, 50].iter().map(|&c| to_call_bucket(c, bb)).collect();
        let mut sorted_calls = calls.clone();
        sorted_calls.sort_unstable();
        assert_eq!(calls, sorted_calls);
    }
}

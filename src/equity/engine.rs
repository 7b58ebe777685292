use crate::cards::{compare, evaluate_batch, Card, Deck, Hand, HandRank};
use rand::Rng;

/// Outcome of a batch of Monte Carlo trials. `total` may be smaller than the
/// number of simulations requested: an iteration that exhausts the deck
/// before it can complete a deal is skipped and does not advance `total`
/// ("skip-and-count" — see [`calculate_equity`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityResult {
    pub wins: u64,
    pub ties: u64,
    pub total: u64,
}

impl EquityResult {
    pub const EMPTY: EquityResult = EquityResult { wins: 0, ties: 0, total: 0 };

    pub fn win_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.wins as f64 / self.total as f64
        }
    }

    pub fn tie_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.ties as f64 / self.total as f64
        }
    }

    pub fn equity(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.wins as f64 + 0.5 * self.ties as f64) / self.total as f64
        }
    }

    /// Normal-approximation 95% confidence interval around `equity()`,
    /// clamped to `[0, 1]`.
    pub fn confidence_interval(&self) -> (f64, f64) {
        if self.total == 0 {
            return (0.0, 0.0);
        }
        let p = self.equity();
        let margin = 1.96 * (p * (1.0 - p) / self.total as f64).sqrt();
        ((p - margin).max(0.0), (p + margin).min(1.0))
    }
}

/// Monte Carlo win/tie/equity for `hero_hand` against `opponents` uniformly
/// random hands, given a (possibly partial) `board`. Invalid input degrades
/// to [`EquityResult::EMPTY`] rather than panicking; see the precondition
/// list below.
pub fn calculate_equity(
    hero_hand: Hand,
    board: Hand,
    opponents: usize,
    simulations: usize,
    rng: &mut impl Rng,
) -> EquityResult {
    let opponents = opponents.max(1);
    if !preconditions_hold(hero_hand, board, opponents, simulations) {
        return EquityResult::EMPTY;
    }

    let mut deck = Deck::new();
    let mut wins = 0u64;
    let mut ties = 0u64;
    let mut total = 0u64;
    let mut hands = Vec::with_capacity(opponents + 1);
    let mut ranks = vec![HandRank::default(); opponents + 1];

    for _ in 0..simulations {
        let Some((final_board, opponent_hands)) = deal_showdown(&mut deck, rng, hero_hand, board, opponents) else {
            continue;
        };

        hands.clear();
        hands.push(hero_hand.union(final_board));
        for opponent in &opponent_hands {
            hands.push(opponent.union(final_board));
        }
        evaluate_batch(&hands, &mut ranks[..hands.len()]);

        let hero_rank = ranks[0];
        let mut beaten_by_someone = false;
        let mut tied_someone = false;
        for &rank in &ranks[1..hands.len()] {
            match compare(hero_rank, rank) {
                n if n < 0 => beaten_by_someone = true,
                0 => tied_someone = true,
                _ => {}
            }
        }

        total += 1;
        if !beaten_by_someone && !tied_someone {
            wins += 1;
        } else if !beaten_by_someone && tied_someone {
            ties += 1;
        }
    }

    EquityResult { wins, ties, total }
}

fn preconditions_hold(hero: Hand, board: Hand, opponents: usize, simulations: usize) -> bool {
    if hero.count_cards() != 2 {
        return false;
    }
    if board.count_cards() > 5 {
        return false;
    }
    if hero.intersects(board) {
        return false;
    }
    if simulations == 0 {
        return false;
    }
    let cards_needed = 2 + board.count_cards() as usize + (5 - board.count_cards() as usize) + 2 * opponents;
    cards_needed <= 52
}

/// Deals out the remaining board and each opponent's hole cards by
/// rejection sampling against `used`: reshuffle, then walk the shuffled
/// deck accepting the first card not already seen. Returns `None` if the
/// deck runs out before every slot is filled.
fn deal_showdown(
    deck: &mut Deck,
    rng: &mut impl Rng,
    hero: Hand,
    board: Hand,
    opponents: usize,
) -> Option<(Hand, Vec<Hand>)> {
    deck.shuffle(rng);
    let mut used = hero.union(board);
    let mut final_board = board;
    while final_board.count_cards() < 5 {
        let card = deal_unused(deck, &mut used)?;
        final_board.add(card);
    }

    let mut opponent_hands = Vec::with_capacity(opponents);
    for _ in 0..opponents {
        let mut hand = Hand::new();
        for _ in 0..2 {
            let card = deal_unused(deck, &mut used)?;
            hand.add(card);
        }
        opponent_hands.push(hand);
    }
    Some((final_board, opponent_hands))
}

fn deal_unused(deck: &mut Deck, used: &mut Hand) -> Option<Card> {
    loop {
        let card = deck.deal_one()?;
        if !used.has(card) {
            used.add(card);
            return Some(card);
        }
    }
}

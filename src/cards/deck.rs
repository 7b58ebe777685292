use super::card::Card;
use rand::Rng;

/// The 52 distinct cards with a cursor. Shuffling is Fisher-Yates driven
/// exclusively by an injected RNG; there is no ambient randomness anywhere
/// in this type.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: [Card; 52],
    cursor: usize,
}

impl Deck {
    /// Canonical, unshuffled order: bit indices 0..52 ascending.
    pub fn new() -> Self {
        let mut cards = [Card::from(0u8); 52];
        for (i, slot) in cards.iter_mut().enumerate() {
            *slot = Card::from(i as u8);
        }
        Self { cards, cursor: 0 }
    }

    /// Fisher-Yates shuffle driven by `rng`. Two decks seeded identically
    /// produce byte-identical shuffle sequences.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        for i in (1..self.cards.len()).rev() {
            let j = rng.random_range(0..=i);
            self.cards.swap(i, j);
        }
        self.cursor = 0;
    }

    /// Restores the cursor to the start without reshuffling.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Returns `n` cards starting at the cursor and advances it, or `None`
    /// if fewer than `n` cards remain (the cursor is left unchanged).
    pub fn deal(&mut self, n: usize) -> Option<&[Card]> {
        if self.cursor + n > self.cards.len() {
            return None;
        }
        let slice = &self.cards[self.cursor..self.cursor + n];
        self.cursor += n;
        Some(slice)
    }

    pub fn deal_one(&mut self) -> Option<Card> {
        self.deal(1).map(|s| s[0])
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn identical_seeds_shuffle_identically() {
        let mut a = Deck::new();
        let mut b = Deck::new();
        let mut rng_a = SmallRng::seed_from_u64(42);
        let mut rng_b = SmallRng::seed_from_u64(42);
        a.shuffle(&mut rng_a);
        b.shuffle(&mut rng_b);
        assert_eq!(a.cards, b.cards);
    }

    #[test]
    fn deal_advances_cursor_and_reset_rewinds_without_reshuffling() {
        let mut deck = Deck::new();
        let mut rng = SmallRng::seed_from_u64(7);
        deck.shuffle(&mut rng);
        let first_deal: Vec<Card> = deck.deal(3).unwrap().to_vec();
        assert_eq!(deck.remaining(), 49);
        deck.reset();
        assert_eq!(deck.remaining(), 52);
        let second_deal: Vec<Card> = deck.deal(3).unwrap().to_vec();
        assert_eq!(first_deal, second_deal);
    }

    #[test]
    fn deal_signals_exhaustion_without_advancing_cursor() {
        let mut deck = Deck::new();
        assert!(deck.deal(53).is_none());
        assert_eq!(deck.remaining(), 52);
    }
}

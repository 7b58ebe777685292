use super::action::Action;
use super::player::PlayerState;
use super::pot::PotManager;
use crate::cards::evaluator::evaluate;
use crate::cards::{Card, Deck, Hand, HandRank, Street};
use crate::{Chips, CoreError};
use std::collections::HashMap;

/// One pot's award to one seat, after [`HandState::settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub seat: usize,
    pub amount: Chips,
}

/// A single hand of No-Limit Hold'em from blinds through showdown.
/// Two distinct `HandState`s never share mutable state; each owns its deck.
#[derive(Debug, Clone)]
pub struct HandState {
    players: Vec<PlayerState>,
    button: usize,
    small_blind_seat: usize,
    small_blind: Chips,
    big_blind: Chips,
    street: Street,
    board: Hand,
    deck: Deck,
    current_bet: Chips,
    min_raise: Chips,
    active: usize,
    pot: PotManager,
}

impl HandState {
    pub fn new(
        names: Vec<String>,
        stacks: Vec<Chips>,
        button: usize,
        small_blind: Chips,
        big_blind: Chips,
        mut deck: Deck,
    ) -> Result<Self, CoreError> {
        validate_construction(&names, &stacks, button, small_blind, big_blind)?;
        let n = names.len();

        let mut players: Vec<PlayerState> = names
            .into_iter()
            .zip(stacks)
            .map(|(name, chips)| PlayerState::new(name, chips))
            .collect();

        let small_blind_seat = if n == 2 { button } else { (button + 1) % n };
        let big_blind_seat = if n == 2 { (button + 1) % n } else { (button + 2) % n };

        for step in 0..2 {
            for offset in 0..n {
                let seat = (small_blind_seat + offset) % n;
                let card = deck
                    .deal_one()
                    .ok_or_else(|| CoreError::InternalError("deck exhausted while dealing hole cards".into()))?;
                players[seat].hole.add(card);
            }
            let _ = step;
        }

        post_blind(&mut players[small_blind_seat], small_blind);
        post_blind(&mut players[big_blind_seat], big_blind);

        let mut state = Self {
            players,
            button,
            small_blind_seat,
            small_blind,
            big_blind,
            street: Street::Preflop,
            board: Hand::EMPTY,
            deck,
            current_bet: big_blind,
            min_raise: big_blind,
            active: 0,
            pot: PotManager::new(n),
        };
        state.active = if n == 2 {
            button
        } else {
            state
                .next_to_act(big_blind_seat)
                .ok_or_else(|| CoreError::InternalError("no player left to act preflop".into()))?
        };
        Ok(state)
    }

    /// Resets this hand in place for the next deal: each seat keeps its
    /// chip stack, but cards, bets, and per-round flags are cleared and
    /// blinds are reposted around the new `button` (spec §9: `HandState`
    /// is value-typed and reusable across hands without per-hand heap
    /// churn). Seats that busted (zero chips) are left in the lineup;
    /// callers that want to remove them should filter `players()` first
    /// and rebuild a fresh `HandState` instead.
    pub fn start_hand(&mut self, button: usize, mut deck: Deck) -> Result<(), CoreError> {
        let stacks: Vec<Chips> = self.players.iter().map(|p| p.chips).collect();
        let names: Vec<String> = self.players.iter().map(|p| p.name.clone()).collect();
        validate_construction(&names, &stacks, button, self.small_blind, self.big_blind)?;
        let n = self.players.len();

        for player in &mut self.players {
            player.starting_chips = player.chips;
            player.bet = 0;
            player.total_bet = 0;
            player.folded = false;
            player.all_in = false;
            player.acted_this_round = false;
            player.hole = Hand::EMPTY;
        }
        self.pot = PotManager::new(n);
        self.board = Hand::EMPTY;
        self.street = Street::Preflop;

        let small_blind_seat = if n == 2 { button } else { (button + 1) % n };
        let big_blind_seat = if n == 2 { (button + 1) % n } else { (button + 2) % n };

        for _ in 0..2 {
            for offset in 0..n {
                let seat = (small_blind_seat + offset) % n;
                let card = deck
                    .deal_one()
                    .ok_or_else(|| CoreError::InternalError("deck exhausted while dealing hole cards".into()))?;
                self.players[seat].hole.add(card);
            }
        }

        post_blind(&mut self.players[small_blind_seat], self.small_blind);
        post_blind(&mut self.players[big_blind_seat], self.big_blind);

        self.button = button;
        self.small_blind_seat = small_blind_seat;
        self.deck = deck;
        self.current_bet = self.big_blind;
        self.min_raise = self.big_blind;
        self.active = if n == 2 {
            button
        } else {
            self.next_to_act(big_blind_seat)
                .ok_or_else(|| CoreError::InternalError("no player left to act preflop".into()))?
        };
        Ok(())
    }

    pub fn street(&self) -> Street {
        self.street
    }

    pub fn board(&self) -> Hand {
        self.board
    }

    pub fn active_seat(&self) -> usize {
        self.active
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn button(&self) -> usize {
        self.button
    }

    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }

    /// Chips already committed this hand, including the current street's
    /// unsettled bets. The canonical pot size a raise-sizing rule proposes
    /// fractions of (spec §4.8).
    pub fn pot_size(&self) -> Chips {
        self.pot.total() + self.players.iter().map(|p| p.bet).sum::<Chips>()
    }

    pub fn to_call(&self, seat: usize) -> Chips {
        (self.current_bet - self.players[seat].bet).max(0)
    }

    pub fn can_check(&self, seat: usize) -> bool {
        self.players[seat].is_live() && self.to_call(seat) == 0
    }

    pub fn can_call(&self, seat: usize) -> bool {
        self.players[seat].is_live() && self.to_call(seat) > 0
    }

    pub fn can_raise(&self, seat: usize, total: Chips) -> bool {
        let p = &self.players[seat];
        p.is_live() && total >= self.current_bet + self.min_raise && total <= p.bet + p.chips
    }

    pub fn can_all_in(&self, seat: usize) -> bool {
        self.players[seat].is_live() && self.players[seat].chips > 0
    }

    /// Applies `action` for the active seat, mutating state atomically and
    /// advancing the street (or settling) if every other player has
    /// matched. Returns `InvalidAction` with no state change on illegal
    /// input.
    pub fn process_action(&mut self, seat: usize, action: Action) -> Result<(), CoreError> {
        if seat != self.active {
            return Err(CoreError::InvalidAction { action, reason: "it is not this seat's turn".into() });
        }
        if !self.players[seat].is_live() {
            return Err(CoreError::InvalidAction { action, reason: "seat is folded or all-in".into() });
        }

        match action {
            Action::Fold => {
                self.players[seat].folded = true;
            }
            Action::Check => {
                if self.to_call(seat) != 0 {
                    return Err(CoreError::InvalidAction { action, reason: "cannot check facing a bet".into() });
                }
            }
            Action::Call => {
                if self.to_call(seat) == 0 {
                    return Err(CoreError::InvalidAction { action, reason: "nothing to call".into() });
                }
                self.apply_call(seat);
            }
            Action::Raise(total) => {
                if !self.can_raise(seat, total) {
                    return Err(CoreError::InvalidAction { action, reason: "raise size is out of bounds".into() });
                }
                self.apply_raise(seat, total);
            }
            Action::AllIn => {
                if self.players[seat].chips == 0 {
                    return Err(CoreError::InvalidAction { action, reason: "seat has no chips left to push".into() });
                }
                self.apply_all_in(seat);
            }
        }

        self.players[seat].acted_this_round = true;
        if self.round_complete() {
            self.finish_street()?;
        } else {
            self.active = self
                .next_to_act(seat)
                .ok_or_else(|| CoreError::InternalError("no player left to act this round".into()))?;
        }
        Ok(())
    }

    fn apply_call(&mut self, seat: usize) {
        let to_call = self.to_call(seat);
        let player = &mut self.players[seat];
        let amount = to_call.min(player.chips);
        player.chips -= amount;
        player.bet += amount;
        player.total_bet += amount;
        if player.chips == 0 {
            player.all_in = true;
        }
    }

    fn apply_raise(&mut self, seat: usize, total: Chips) {
        let increment = total - self.current_bet;
        let delta = total - self.players[seat].bet;
        {
            let player = &mut self.players[seat];
            player.chips -= delta;
            player.bet = total;
            player.total_bet += delta;
            if player.chips == 0 {
                player.all_in = true;
            }
        }
        self.min_raise = self.min_raise.max(increment);
        self.current_bet = total;
        self.reopen_action(seat);
    }

    fn apply_all_in(&mut self, seat: usize) {
        let delta = self.players[seat].chips;
        {
            let player = &mut self.players[seat];
            player.bet += delta;
            player.total_bet += delta;
            player.chips = 0;
            player.all_in = true;
        }
        let new_bet = self.players[seat].bet;
        if new_bet > self.current_bet {
            let jump = new_bet - self.current_bet;
            if jump >= self.min_raise {
                self.min_raise = jump;
                self.reopen_action(seat);
            }
            self.current_bet = new_bet;
        }
    }

    /// Un-marks every other contesting seat as having acted this round, since
    /// a raise reopens action around the table.
    fn reopen_action(&mut self, raiser: usize) {
        for (seat, player) in self.players.iter_mut().enumerate() {
            if seat != raiser && !player.folded && !player.all_in {
                player.acted_this_round = false;
            }
        }
    }

    fn round_complete(&self) -> bool {
        let live: Vec<&PlayerState> = self.players.iter().filter(|p| !p.folded).collect();
        if live.len() <= 1 {
            return true;
        }
        live.iter().all(|p| p.all_in || (p.acted_this_round && p.bet == self.current_bet))
    }

    fn next_to_act(&self, from: usize) -> Option<usize> {
        let n = self.players.len();
        (1..=n).map(|step| (from + step) % n).find(|&seat| self.players[seat].is_live())
    }

    fn finish_street(&mut self) -> Result<(), CoreError> {
        self.pot.collect(&mut self.players);
        for player in &mut self.players {
            player.bet = 0;
            player.acted_this_round = false;
        }
        self.current_bet = 0;
        self.min_raise = self.big_blind;

        let non_folded = self.players.iter().filter(|p| !p.folded).count();
        if non_folded <= 1 {
            self.street = Street::Showdown;
            return Ok(());
        }

        let live = self.players.iter().filter(|p| p.is_live()).count();
        if live == 0 {
            while self.street != Street::River {
                self.street = self.street.next();
                self.deal_community()?;
            }
            self.street = Street::Showdown;
            return Ok(());
        }

        self.street = self.street.next();
        self.deal_community()?;
        self.active = self
            .next_to_act(self.button)
            .ok_or_else(|| CoreError::InternalError("no player left to act after street change".into()))?;
        Ok(())
    }

    fn deal_community(&mut self) -> Result<(), CoreError> {
        let n = self.street.n_revealed();
        if n == 0 {
            return Ok(());
        }
        let dealt: Vec<Card> = self
            .deck
            .deal(n)
            .ok_or_else(|| CoreError::InternalError("deck exhausted while dealing community cards".into()))?
            .to_vec();
        for card in dealt {
            self.board.add(card);
        }
        Ok(())
    }

    /// Awards every pot to its winner(s) and credits their stacks. Safe to
    /// call once `street() == Street::Showdown`; folds the final street's
    /// bets into the pot manager first if that hasn't happened yet.
    pub fn settle(&mut self) -> Result<Vec<Payout>, CoreError> {
        self.pot.collect(&mut self.players);
        let folded: Vec<bool> = self.players.iter().map(|p| p.folded).collect();
        let pots = self.pot.build_pots(&folded);
        let n = self.players.len();

        let mut totals: HashMap<usize, Chips> = HashMap::new();
        for side_pot in &pots {
            if side_pot.amount == 0 || side_pot.eligible.is_empty() {
                continue;
            }
            let winners = if side_pot.eligible.len() == 1 {
                vec![side_pot.eligible[0]]
            } else {
                self.showdown_winners(&side_pot.eligible)?
            };
            let ordered = order_from_small_blind(&winners, self.small_blind_seat, n);
            let share = side_pot.amount / ordered.len() as Chips;
            let remainder = side_pot.amount % ordered.len() as Chips;
            for (i, &seat) in ordered.iter().enumerate() {
                let amount = share + if (i as Chips) < remainder { 1 } else { 0 };
                *totals.entry(seat).or_insert(0) += amount;
            }
        }

        let mut payouts: Vec<Payout> =
            totals.into_iter().map(|(seat, amount)| Payout { seat, amount }).collect();
        payouts.sort_by_key(|p| p.seat);
        for payout in &payouts {
            self.players[payout.seat].chips += payout.amount;
        }
        Ok(payouts)
    }

    fn showdown_winners(&self, eligible: &[usize]) -> Result<Vec<usize>, CoreError> {
        let mut ranked: Vec<(usize, HandRank)> = Vec::with_capacity(eligible.len());
        for &seat in eligible {
            let hand = self.players[seat].hole.union(self.board);
            let rank = evaluate(hand)
                .ok_or_else(|| CoreError::InternalError(format!("seat {seat} lacked a complete hand at showdown")))?;
            ranked.push((seat, rank));
        }
        let best = ranked.iter().map(|&(_, r)| r).max().expect("eligible is non-empty");
        Ok(ranked.into_iter().filter(|&(_, r)| r == best).map(|(s, _)| s).collect())
    }
}

fn post_blind(player: &mut PlayerState, blind: Chips) {
    let amount = blind.min(player.chips);
    player.chips -= amount;
    player.bet = amount;
    player.total_bet = amount;
    if player.chips == 0 {
        player.all_in = true;
    }
}

/// Orders `winners` by clockwise distance from the small blind, so odd
/// chips from an indivisible split go to whoever acts earliest.
fn order_from_small_blind(winners: &[usize], small_blind_seat: usize, n: usize) -> Vec<usize> {
    let mut ordered = winners.to_vec();
    ordered.sort_by_key(|&seat| (seat + n - small_blind_seat) % n);
    ordered
}

fn validate_construction(
    names: &[String],
    stacks: &[Chips],
    button: usize,
    small_blind: Chips,
    big_blind: Chips,
) -> Result<(), CoreError> {
    if names.len() != stacks.len() {
        return Err(CoreError::InternalError("names and stacks length mismatch".into()));
    }
    if names.len() < 2 {
        return Err(CoreError::InternalError("a hand needs at least two players".into()));
    }
    if button >= names.len() {
        return Err(CoreError::InternalError("button seat out of range".into()));
    }
    if small_blind <= 0 || big_blind <= 0 || big_blind < small_blind {
        return Err(CoreError::InternalError("blinds must be positive with big >= small".into()));
    }
    if stacks.iter().any(|&c| c <= 0) {
        return Err(CoreError::InternalError("every player must start with a positive stack".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_state(stacks: [Chips; 2]) -> HandState {
        let mut deck = Deck::new();
        let mut rng = crate::rng::seeded_rng(1);
        deck.shuffle(&mut rng);
        HandState::new(vec!["a".into(), "b".into()], stacks.to_vec(), 0, 1, 2, deck).unwrap()
    }

    #[test]
    fn heads_up_button_posts_small_blind_and_acts_first() {
        let state = two_player_state([200, 200]);
        assert_eq!(state.players()[0].bet, 1);
        assert_eq!(state.players()[1].bet, 2);
        assert_eq!(state.active_seat(), 0);
    }

    #[test]
    fn checking_facing_a_bet_is_illegal() {
        let mut state = two_player_state([200, 200]);
        let err = state.process_action(0, Action::Check).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAction { .. }));
    }

    #[test]
    fn call_then_check_advances_to_the_flop() {
        let mut state = two_player_state([200, 200]);
        state.process_action(0, Action::Call).unwrap();
        state.process_action(1, Action::Check).unwrap();
        assert_eq!(state.street(), Street::Flop);
        assert_eq!(state.board().count_cards(), 3);
    }

    #[test]
    fn a_raise_reopens_action_for_the_caller() {
        let mut state = two_player_state([200, 200]);
        state.process_action(0, Action::Raise(6)).unwrap();
        assert!(!state.players()[1].acted_this_round);
        state.process_action(1, Action::Raise(20)).unwrap();
        assert!(!state.players()[0].acted_this_round);
    }

    #[test]
    fn folding_ends_the_hand_and_awards_the_pot() {
        let mut state = two_player_state([200, 200]);
        state.process_action(0, Action::Fold).unwrap();
        assert_eq!(state.street(), Street::Showdown);
        let payouts = state.settle().unwrap();
        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].seat, 1);
        assert_eq!(payouts[0].amount, 3);
    }

    #[test]
    fn short_stack_all_in_runs_the_board_out() {
        let mut state = two_player_state([10, 200]);
        state.process_action(0, Action::AllIn).unwrap();
        state.process_action(1, Action::Call).unwrap();
        assert_eq!(state.street(), Street::Showdown);
        assert_eq!(state.board().count_cards(), 5);
    }

    #[test]
    fn start_hand_keeps_stacks_but_clears_cards_and_bets() {
        let mut state = two_player_state([200, 200]);
        state.process_action(0, Action::Fold).unwrap();
        state.settle().unwrap();
        let stacks_before: Vec<Chips> = state.players().iter().map(|p| p.chips).collect();

        let mut deck = Deck::new();
        let mut rng = crate::rng::seeded_rng(2);
        deck.shuffle(&mut rng);
        state.start_hand(1, deck).unwrap();

        let stacks_after: Vec<Chips> = state.players().iter().map(|p| p.chips).collect();
        assert_eq!(stacks_before, stacks_after);
        assert_eq!(state.street(), Street::Preflop);
        assert_eq!(state.board().count_cards(), 0);
        assert_eq!(state.button(), 1);
        assert!(state.players().iter().all(|p| !p.folded && !p.all_in));
    }

    #[test]
    fn chips_plus_total_bet_always_equals_starting_chips() {
        let mut state = two_player_state([200, 200]);
        state.process_action(0, Action::Raise(6)).unwrap();
        state.process_action(1, Action::Call).unwrap();
        for player in state.players() {
            assert_eq!(player.chips + player.total_bet, player.starting_chips);
        }
    }

    #[test]
    fn settle_is_a_zero_sum_split_of_every_chip_in_play() {
        let mut state = two_player_state([10, 200]);
        state.process_action(0, Action::AllIn).unwrap();
        state.process_action(1, Action::Call).unwrap();
        let payouts = state.settle().unwrap();
        let total_paid: Chips = payouts.iter().map(|p| p.amount).sum();
        assert_eq!(total_paid, 20);
    }
}

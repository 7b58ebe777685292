use super::blueprint::Blueprint;
use super::checkpoint::{Checkpoint, RegretEntrySnapshot, StatsSnapshot, CHECKPOINT_VERSION};
use super::config::{Sampling, TrainingConfig};
use super::regret::{fnv1a, RegretEntry, RegretTable, RegretUpdateOpts};
use super::stats::{Progress, Stats};
use crate::abstraction::{board_bucket, hole_bucket, pot_bucket, to_call_bucket, AbstractionConfig, InfoSetKey};
use crate::cards::{Deck, Street};
use crate::gameplay::{Action, HandState};
use crate::rng::{seeded_rng, SeedSequence};
use crate::{Chips, CoreError, Utility};
use rand::Rng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Cooperative cancellation, checked only between iterations (spec §5): a
/// signal raised mid-iteration is honoured at the next iteration boundary,
/// never inside a traversal.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Sharded visit counters keyed by info-set string, used only to drive
/// adaptive raise expansion (spec §4.8). Kept separate from [`RegretTable`]
/// because a [`RegretEntry`]'s three fields (spec §3) have no room for a
/// visit counter of their own.
struct VisitCounts {
    shards: Vec<RwLock<HashMap<String, u64>>>,
}

impl VisitCounts {
    fn new(shard_count: usize) -> Self {
        Self { shards: (0..shard_count.max(1)).map(|_| RwLock::new(HashMap::new())).collect() }
    }

    fn shard_index(&self, key: &str) -> usize {
        (fnv1a(key) as usize) % self.shards.len()
    }

    /// Returns the visit count observed *before* this call, then records
    /// one more visit.
    fn record_and_get(&self, key: &str) -> u64 {
        let idx = self.shard_index(key);
        let mut shard = self.shards[idx].write().expect("visit shard lock poisoned");
        let counter = shard.entry(key.to_string()).or_insert(0);
        let before = *counter;
        *counter += 1;
        before
    }
}

/// Builds raise totals from the abstraction's pot-fraction bet sizes,
/// clamped to a legal range (spec §4.8). Each candidate raises to
/// `current_bet + max(min_raise, fraction * pot)`, so small fractions never
/// propose an under-sized raise.
fn raise_totals(state: &HandState, seat: usize, config: &AbstractionConfig) -> Vec<Chips> {
    let pot = state.pot_size();
    let current_bet = state.current_bet();
    let min_raise = state.min_raise();
    let player = &state.players()[seat];
    let max_total = player.bet + player.chips;

    let mut totals: Vec<Chips> = config
        .bet_sizing
        .iter()
        .filter(|&&fraction| fraction > 0.0)
        .map(|&fraction| {
            let raw = (fraction * pot as f64).round() as Chips;
            current_bet + min_raise.max(raw)
        })
        .filter(|&total| total > current_bet && total < max_total)
        .collect();
    totals.sort_unstable();
    totals.dedup();
    totals
}

/// Keeps `keep` candidates out of `totals`: always `totals[0]` and
/// `totals.last()`, then the `keep - 2` remaining candidates nearest to
/// `target` (a pot-sized raise, spec §4.8's adaptive raise expansion).
fn prune_raises(totals: Vec<Chips>, keep: usize, target: Chips) -> Vec<Chips> {
    let keep = keep.max(1);
    if totals.len() <= keep {
        return totals;
    }
    if keep == 1 {
        return vec![totals[0]];
    }
    let last = totals.len() - 1;
    let mut indices: Vec<usize> = vec![0, last];
    if keep > 2 {
        let mut middle: Vec<usize> = (1..last).collect();
        middle.sort_by_key(|&i| (totals[i] - target).abs());
        indices.extend(middle.into_iter().take(keep - 2));
    }
    indices.sort_unstable();
    indices.dedup();
    indices.into_iter().map(|i| totals[i]).collect()
}

/// Every legal action for `seat` in `state`, capped at
/// `config.max_actions_per_node`. Raises are pruned to `max_raises_per_bucket`
/// representatives while this info set has fewer than `adaptive_raise_visits`
/// recorded visits; zero disables pruning entirely.
fn legal_actions(
    state: &HandState,
    seat: usize,
    config: &AbstractionConfig,
    visits_so_far: u64,
    adaptive_raise_visits: u64,
) -> Vec<Action> {
    let mut actions = vec![Action::Fold];
    if state.can_check(seat) {
        actions.push(Action::Check);
    }
    if state.can_call(seat) {
        actions.push(Action::Call);
    }
    if config.enable_raises {
        let totals = raise_totals(state, seat, config);
        let totals = if adaptive_raise_visits > 0 && visits_so_far < adaptive_raise_visits {
            let target = state.current_bet() + state.pot_size();
            prune_raises(totals, config.max_raises_per_bucket, target)
        } else {
            totals
        };
        actions.extend(totals.into_iter().map(Action::Raise));
    }
    if state.can_all_in(seat) {
        actions.push(Action::AllIn);
    }
    actions.truncate(config.max_actions_per_node.max(1));
    actions
}

/// Samples an index from a (not necessarily renormalised) probability
/// vector; falls back to the last index if rounding leaves `roll` past the
/// cumulative sum.
fn sample_index(probs: &[f64], rng: &mut impl Rng) -> usize {
    let roll: f64 = rng.random::<f64>();
    let mut cumulative = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p;
        if roll < cumulative {
            return i;
        }
    }
    probs.len().saturating_sub(1)
}

/// The read-only state one table's traversal needs; borrowed across the
/// `rayon` fan-out in [`Trainer::run_iteration`].
struct TraverseCtx<'a> {
    config: &'a TrainingConfig,
    abstraction: &'a AbstractionConfig,
    regret_table: &'a RegretTable,
    visits: &'a VisitCounts,
    iteration: u64,
}

impl<'a> TraverseCtx<'a> {
    fn regret_opts(&self) -> RegretUpdateOpts {
        RegretUpdateOpts {
            clamp_negative: self.config.use_cfr_plus,
            linear_averaging: false,
            iteration: self.iteration.max(1),
            discount: None,
        }
    }

    fn info_set_key(&self, state: &HandState, seat: usize) -> InfoSetKey {
        let player = &state.players()[seat];
        InfoSetKey {
            street: state.street(),
            seat,
            hole_bucket: hole_bucket(player.hole, self.abstraction.preflop_bucket_count),
            board_bucket: board_bucket(state.board(), self.abstraction.postflop_bucket_count),
            pot_bucket: pot_bucket(state.pot_size(), self.config.big_blind),
            to_call_bucket: to_call_bucket(state.to_call(seat), self.config.big_blind),
        }
    }

    /// `target`'s net chip result at showdown: what it won minus what it
    /// put in, i.e. the terminal utility CFR regret is measured against.
    fn terminal_utility(&self, state: &mut HandState, target: usize) -> Result<Utility, CoreError> {
        let contributed = state.players()[target].total_bet as f64;
        let payouts = state.settle()?;
        let awarded = payouts.iter().find(|p| p.seat == target).map(|p| p.amount).unwrap_or(0);
        Ok(awarded as f64 - contributed)
    }

    /// The six-step MCCFR traversal (spec §4.8): terminal check, info-set
    /// lookup, then either a full regret update (at `target`'s own nodes) or
    /// a sampled/expanded continuation (everyone else's nodes).
    #[allow(clippy::too_many_arguments)]
    fn traverse(
        &self,
        state: &mut HandState,
        target: usize,
        reach_target: f64,
        reach_others: f64,
        depth: usize,
        stats: &mut Stats,
        rng: &mut impl Rng,
    ) -> Result<Utility, CoreError> {
        stats.nodes_visited += 1;
        stats.max_depth = stats.max_depth.max(depth);

        if state.street() == Street::Showdown {
            stats.terminal_nodes += 1;
            return self.terminal_utility(state, target);
        }

        let seat = state.active_seat();
        let key_string = self.info_set_key(state, seat).to_key_string();
        let visits_so_far = self.visits.record_and_get(&key_string);
        let actions = legal_actions(state, seat, self.abstraction, visits_so_far, self.config.adaptive_raise_visits);
        let strategy = self.regret_table.get_or_init(&key_string, actions.len()).strategy();

        if seat == target {
            let mut utilities = Vec::with_capacity(actions.len());
            for (i, &action) in actions.iter().enumerate() {
                let mut next = state.clone();
                next.process_action(seat, action)?;
                utilities.push(self.traverse(
                    &mut next,
                    target,
                    reach_target * strategy[i],
                    reach_others,
                    depth + 1,
                    stats,
                    rng,
                )?);
            }
            let node_value: f64 = utilities.iter().zip(&strategy).map(|(u, s)| u * s).sum();
            let regrets: Vec<f64> = utilities.iter().map(|&u| (u - node_value) * reach_others).collect();
            let opts = self.regret_opts();
            self.regret_table
                .with_entry(&key_string, actions.len(), |e| e.update(&regrets, &strategy, reach_target, &opts));
            return Ok(node_value);
        }

        if self.config.sampling == Sampling::FullTraversal {
            let sum_prob: f64 = strategy.iter().sum();
            let mut total = 0.0;
            if sum_prob <= 0.0 {
                let n = actions.len().max(1) as f64;
                for &action in &actions {
                    let mut next = state.clone();
                    next.process_action(seat, action)?;
                    total += self.traverse(&mut next, target, reach_target, reach_others / n, depth + 1, stats, rng)? / n;
                }
            } else {
                for (&action, &prob) in actions.iter().zip(&strategy) {
                    let mut next = state.clone();
                    next.process_action(seat, action)?;
                    total +=
                        prob * self.traverse(&mut next, target, reach_target, reach_others * prob, depth + 1, stats, rng)?;
                }
            }
            return Ok(total);
        }

        let chosen = sample_index(&strategy, rng);
        let mut next = state.clone();
        next.process_action(seat, actions[chosen])?;
        self.traverse(&mut next, target, reach_target, reach_others * strategy[chosen], depth + 1, stats, rng)
    }
}

/// Deals one table, then runs one traversal per target player against the
/// same initial deal (spec §4.8's "deal once, traverse per seat" ordering).
fn run_table(ctx: &TraverseCtx, deck_seed: u64, sampler_seed: u64, button_seed: u64) -> Result<Stats, CoreError> {
    let mut deck = Deck::new();
    let mut deck_rng = seeded_rng(deck_seed);
    deck.shuffle(&mut deck_rng);
    let mut sampler_rng = seeded_rng(sampler_seed);

    let players = ctx.config.players;
    let button = (button_seed as usize) % players;
    let names: Vec<String> = (0..players).map(|seat| format!("p{seat}")).collect();
    let stacks = vec![ctx.config.starting_stack; players];
    let initial = HandState::new(names, stacks, button, ctx.config.small_blind, ctx.config.big_blind, deck)?;

    let mut total = Stats::default();
    for target in 0..players {
        let mut state = initial.clone();
        let mut stats = Stats::default();
        ctx.traverse(&mut state, target, 1.0, 1.0, 0, &mut stats, &mut sampler_rng)?;
        total = total.merge(stats);
    }
    Ok(total)
}

/// Drives MCCFR training: owns the regret table, the adaptive-raise visit
/// counters, and the master RNG every table's seeds derive from (spec
/// §4.8, §5).
pub struct Trainer {
    config: TrainingConfig,
    abstraction: AbstractionConfig,
    regret_table: RegretTable,
    visits: VisitCounts,
    master: SeedSequence,
    iteration: u64,
}

impl Trainer {
    pub fn new(config: TrainingConfig, abstraction: AbstractionConfig) -> Result<Self, CoreError> {
        config.validate()?;
        abstraction.validate()?;
        Ok(Self {
            master: SeedSequence::new(config.seed),
            visits: VisitCounts::new(crate::REGRET_SHARDS),
            regret_table: RegretTable::new(),
            config,
            abstraction,
            iteration: 0,
        })
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn regret_table_size(&self) -> usize {
        self.regret_table.size()
    }

    /// Draws this iteration's per-table seeds from the master sequence on
    /// the calling thread, in table order (spec §5: every RNG draw that
    /// determines reproducibility happens here, never inside a table's
    /// parallel closure), then runs `parallel_tables` tables concurrently.
    pub fn run_iteration(&mut self) -> Result<Stats, CoreError> {
        self.iteration += 1;
        let iteration = self.iteration;
        log::debug!("iteration {iteration}: dispatching {} tables", self.config.parallel_tables);

        let seeds: Vec<(u64, u64, u64)> = (0..self.config.parallel_tables)
            .map(|_| {
                let (deck_seed, sampler_seed) = self.master.next_pair();
                let button_seed = self.master.next_u64();
                (deck_seed, sampler_seed, button_seed)
            })
            .collect();

        let ctx = TraverseCtx {
            config: &self.config,
            abstraction: &self.abstraction,
            regret_table: &self.regret_table,
            visits: &self.visits,
            iteration,
        };

        let results: Vec<Result<Stats, CoreError>> = seeds
            .into_par_iter()
            .map(|(deck_seed, sampler_seed, button_seed)| run_table(&ctx, deck_seed, sampler_seed, button_seed))
            .collect();

        let mut total = Stats::default();
        for result in results {
            total = total.merge(result?);
        }
        log::info!(
            "iteration {iteration}: {} nodes visited, regret table at {} entries",
            total.nodes_visited,
            self.regret_table.size()
        );
        Ok(total)
    }

    /// Runs iterations until `config.iterations` is reached or `cancel` is
    /// raised, calling `on_progress` every `progress_every` iterations and
    /// writing a checkpoint to `checkpoint_dir` every `checkpoint_every`
    /// iterations (and once more at the end, if any iterations ran).
    pub fn train(
        &mut self,
        cancel: &CancellationToken,
        checkpoint_dir: Option<&Path>,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<Stats, CoreError> {
        let mut last = Stats::default();
        while self.iteration < self.config.iterations {
            if cancel.is_cancelled() {
                break;
            }
            let started = Instant::now();
            let mut stats = self.run_iteration()?;
            stats.iteration_time = started.elapsed();
            last = stats;

            if self.config.progress_every > 0 && self.iteration % self.config.progress_every == 0 {
                on_progress(Progress { iteration: self.iteration, table_size: self.config.parallel_tables, stats });
            }
            if let Some(dir) = checkpoint_dir {
                if self.config.checkpoint_every > 0 && self.iteration % self.config.checkpoint_every == 0 {
                    let path = dir.join("checkpoint.json");
                    self.checkpoint(stats).save(&path)?;
                    log::info!("wrote checkpoint at iteration {} to {}", self.iteration, path.display());
                }
            }
        }
        if let Some(dir) = checkpoint_dir {
            let path = dir.join("checkpoint.json");
            self.checkpoint(last).save(&path)?;
            log::info!("wrote final checkpoint at iteration {} to {}", self.iteration, path.display());
        }
        Ok(last)
    }

    pub fn checkpoint(&self, stats: Stats) -> Checkpoint {
        let regrets: HashMap<String, RegretEntrySnapshot> =
            self.regret_table.entries().iter().map(|(k, v)| (k.clone(), RegretEntrySnapshot::from(v))).collect();
        Checkpoint {
            version: CHECKPOINT_VERSION,
            iteration: self.iteration,
            rng_seed: self.config.seed,
            rng_int64_calls: self.master.draws_consumed(),
            rng_intn_calls: self.master.draws_consumed(),
            training: self.config.clone(),
            abstraction: self.abstraction.clone(),
            stats: StatsSnapshot::from(stats),
            regrets,
        }
    }

    /// Restores a trainer from a checkpoint: the master RNG is rebuilt by
    /// replaying its recorded draw count (spec §4.8) rather than
    /// persisting RNG internal state directly.
    pub fn restore(checkpoint: Checkpoint) -> Result<Self, CoreError> {
        checkpoint.training.validate()?;
        checkpoint.abstraction.validate()?;
        let entries: HashMap<String, RegretEntry> = checkpoint
            .regrets
            .into_iter()
            .map(|(k, s)| (k, RegretEntry::from_parts(s.regret_sum, s.strategy_sum, s.normalising)))
            .collect();
        Ok(Self {
            master: SeedSequence::resume(checkpoint.rng_seed, checkpoint.rng_int64_calls),
            visits: VisitCounts::new(crate::REGRET_SHARDS),
            regret_table: RegretTable::from_entries(entries, crate::REGRET_SHARDS),
            iteration: checkpoint.iteration,
            config: checkpoint.training,
            abstraction: checkpoint.abstraction,
        })
    }

    /// Averages every visited info set's strategy into a [`Blueprint`]
    /// (spec §4.8's final step, the artefact a runtime policy consumes).
    pub fn export_blueprint(&self) -> Blueprint {
        let strategies: HashMap<String, Vec<f64>> =
            self.regret_table.entries().iter().map(|(k, v)| (k.clone(), v.average_strategy())).collect();
        Blueprint::new(self.iteration, self.abstraction.clone(), strategies)
    }
}

use std::collections::HashMap;
use std::sync::RwLock;

/// Controls how [`RegretEntry::update`] folds a new sample into the running
/// sums (spec §4.7). `discount` carries the optional DCFR weighting (spec
/// §9 open question 5); leave it `None` for plain/CFR+ behaviour.
#[derive(Debug, Clone, Copy)]
pub struct RegretUpdateOpts {
    /// CFR+: floor accumulated regret at zero after every update.
    pub clamp_negative: bool,
    /// Weight the strategy-sum contribution by the iteration number
    /// instead of uniformly.
    pub linear_averaging: bool,
    pub iteration: u64,
    pub discount: Option<DiscountParams>,
}

impl RegretUpdateOpts {
    pub const PLAIN: RegretUpdateOpts =
        RegretUpdateOpts { clamp_negative: false, linear_averaging: false, iteration: 1, discount: None };
}

/// Discounted-CFR weighting exponents (spec §4.8, §9 open question 5):
/// `t^alpha/(t^alpha+1)` discounts positive regret, `t^beta/(t^beta+1)`
/// discounts negative regret, `(t/(t+1))^gamma` discounts the strategy sum.
/// Grounded on the teacher's `mccfr` discounted-regret schedule, which uses
/// the same three exponents (there named alpha=1.5, beta=0.5, gamma=1.0).
#[derive(Debug, Clone, Copy)]
pub struct DiscountParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// `{actions_size, regret_sum[], strategy_sum[], normalising}` for one
/// info-set key (spec §3). Grows via [`ensure_size`](Self::ensure_size)
/// without disturbing existing slots when a node is revisited with more
/// actions than before.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegretEntry {
    regret_sum: Vec<f64>,
    strategy_sum: Vec<f64>,
    normalising: f64,
}

impl RegretEntry {
    /// Rebuilds an entry from its three raw fields, for checkpoint restore
    /// where `update` would double-count history that was already folded
    /// into the snapshot.
    pub fn from_parts(regret_sum: Vec<f64>, strategy_sum: Vec<f64>, normalising: f64) -> Self {
        Self { regret_sum, strategy_sum, normalising }
    }

    pub fn actions_size(&self) -> usize {
        self.regret_sum.len()
    }

    pub fn regret_sum(&self) -> &[f64] {
        &self.regret_sum
    }

    pub fn strategy_sum(&self) -> &[f64] {
        &self.strategy_sum
    }

    pub fn normalising(&self) -> f64 {
        self.normalising
    }

    /// Grows to `n` actions, preserving every existing slot. Shrinking
    /// never happens; a node's action count only ever grows across visits.
    pub fn ensure_size(&mut self, n: usize) {
        if self.regret_sum.len() < n {
            self.regret_sum.resize(n, 0.0);
            self.strategy_sum.resize(n, 0.0);
        }
    }

    /// Regret matching: `max(0, regret_sum_i)` normalised to sum to one,
    /// uniform if every regret is non-positive.
    pub fn strategy(&self) -> Vec<f64> {
        let n = self.regret_sum.len();
        if n == 0 {
            return Vec::new();
        }
        let positive: Vec<f64> = self.regret_sum.iter().map(|&r| r.max(0.0)).collect();
        let total: f64 = positive.iter().sum();
        if total <= 0.0 {
            vec![1.0 / n as f64; n]
        } else {
            positive.into_iter().map(|p| p / total).collect()
        }
    }

    /// Folds one traversal's sampled regret and strategy into the running
    /// sums (spec §4.7). `regret` and `strategy` must be the same length as
    /// (or shorter than) the entry's current action count.
    pub fn update(&mut self, regret: &[f64], strategy: &[f64], reach_weight: f64, opts: &RegretUpdateOpts) {
        self.ensure_size(regret.len().max(strategy.len()));

        if let Some(d) = opts.discount {
            let t = opts.iteration.max(1) as f64;
            for r in self.regret_sum.iter_mut() {
                let discount = if *r > 0.0 {
                    let x = t.powf(d.alpha);
                    x / (x + 1.0)
                } else if *r < 0.0 {
                    let x = t.powf(d.beta);
                    x / (x + 1.0)
                } else {
                    1.0
                };
                *r *= discount;
            }
            let strategy_discount = (t / (t + 1.0)).powf(d.gamma);
            for s in self.strategy_sum.iter_mut() {
                *s *= strategy_discount;
            }
        }

        for (i, &r) in regret.iter().enumerate() {
            self.regret_sum[i] =
                if opts.clamp_negative { (self.regret_sum[i] + r).max(0.0) } else { self.regret_sum[i] + r };
        }

        let iter_weight = if opts.linear_averaging { opts.iteration as f64 } else { 1.0 };
        let weight = reach_weight * iter_weight;
        for (i, &s) in strategy.iter().enumerate() {
            self.strategy_sum[i] += weight * s;
        }
        self.normalising += weight;
    }

    /// The averaged strategy the blueprint exports: `strategy_sum`
    /// normalised by `normalising`, uniform if `normalising <= 0`.
    pub fn average_strategy(&self) -> Vec<f64> {
        let n = self.strategy_sum.len();
        if n == 0 {
            return Vec::new();
        }
        if self.normalising <= 0.0 {
            return vec![1.0 / n as f64; n];
        }
        self.strategy_sum.iter().map(|&s| s / self.normalising).collect()
    }
}

/// FNV-1a: stable across process runs and platforms, which a `hash(key)
/// mod shard_count` shard assignment needs. No PCG/hash crate appears in
/// the teacher's dependency stack for this, so it's hand-rolled the same
/// way `rng::split_mix64_step` is.
pub(crate) fn fnv1a(s: &str) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for byte in s.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Sharded concurrent map of info-set key -> [`RegretEntry`] (spec §4.7,
/// §5). Each shard owns its own `RwLock`; there is no table-wide lock, so
/// writers to different shards never contend.
pub struct RegretTable {
    shards: Vec<RwLock<HashMap<String, RegretEntry>>>,
}

impl RegretTable {
    pub fn new() -> Self {
        Self::with_shards(crate::REGRET_SHARDS)
    }

    pub fn with_shards(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        Self { shards: (0..shard_count).map(|_| RwLock::new(HashMap::new())).collect() }
    }

    fn shard_index(&self, key: &str) -> usize {
        (fnv1a(key) as usize) % self.shards.len()
    }

    /// Reads the entry for `key` (creating a zero-sized one on first visit)
    /// and grows it to at least `action_count` actions. Double-checks under
    /// a read lock first so the common "already large enough" case never
    /// takes the write lock.
    pub fn get_or_init(&self, key: &str, action_count: usize) -> RegretEntry {
        let idx = self.shard_index(key);
        {
            let shard = self.shards[idx].read().expect("regret shard lock poisoned");
            if let Some(entry) = shard.get(key) {
                if entry.actions_size() >= action_count {
                    return entry.clone();
                }
            }
        }
        let mut shard = self.shards[idx].write().expect("regret shard lock poisoned");
        log::trace!("shard {idx} write lock for {key} (read path fell through)");
        let entry = shard.entry(key.to_string()).or_default();
        entry.ensure_size(action_count);
        entry.clone()
    }

    /// Runs `f` against the entry for `key` under the shard's write lock,
    /// growing it to `action_count` actions first. This is the only path
    /// that mutates an entry in place.
    pub fn with_entry<R>(&self, key: &str, action_count: usize, f: impl FnOnce(&mut RegretEntry) -> R) -> R {
        let idx = self.shard_index(key);
        let mut shard = self.shards[idx].write().expect("regret shard lock poisoned");
        let entry = shard.entry(key.to_string()).or_default();
        entry.ensure_size(action_count);
        f(entry)
    }

    /// Sum of every shard's entry count.
    pub fn size(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().expect("regret shard lock poisoned").len()).sum()
    }

    /// A snapshot union of every shard, for blueprint/checkpoint export.
    pub fn entries(&self) -> HashMap<String, RegretEntry> {
        let mut out = HashMap::with_capacity(self.size());
        for shard in &self.shards {
            let shard = shard.read().expect("regret shard lock poisoned");
            out.extend(shard.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        out
    }

    /// Rebuilds a table from a checkpoint's entry map.
    pub fn from_entries(entries: HashMap<String, RegretEntry>, shard_count: usize) -> Self {
        let table = Self::with_shards(shard_count);
        for (key, entry) in entries {
            let idx = table.shard_index(&key);
            table.shards[idx].write().expect("regret shard lock poisoned").insert(key, entry);
        }
        table
    }
}

impl Default for RegretTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_nonpositive_regret_is_uniform() {
        let mut entry = RegretEntry::default();
        entry.ensure_size(3);
        entry.update(&[-1.0, -2.0, 0.0], &[0.0, 0.0, 0.0], 0.0, &RegretUpdateOpts::PLAIN);
        assert_eq!(entry.strategy(), vec![1.0 / 3.0; 3]);
    }

    #[test]
    fn regret_matching_is_proportional_to_positive_regret() {
        let mut entry = RegretEntry::default();
        entry.ensure_size(3);
        entry.update(&[1.0, 2.0, -5.0], &[0.0, 0.0, 0.0], 0.0, &RegretUpdateOpts::PLAIN);
        let strategy = entry.strategy();
        assert!((strategy[0] - 1.0 / 3.0).abs() < 1e-9);
        assert!((strategy[1] - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(strategy[2], 0.0);
    }

    #[test]
    fn plain_update_tracks_reach_weighted_average() {
        let mut entry = RegretEntry::default();
        entry.update(&[1.0, -1.0], &[0.6, 0.4], 2.0, &RegretUpdateOpts::PLAIN);
        let average = entry.average_strategy();
        assert!((average[0] - 0.6).abs() < 1e-9);
        assert!((average[1] - 0.4).abs() < 1e-9);
        assert_eq!(entry.normalising(), 2.0);
    }

    #[test]
    fn cfr_plus_clamps_accumulated_regret_at_zero() {
        let mut entry = RegretEntry::default();
        entry.ensure_size(1);
        let opts = RegretUpdateOpts { clamp_negative: true, ..RegretUpdateOpts::PLAIN };
        for _ in 0..5 {
            entry.update(&[-3.0], &[1.0], 1.0, &opts);
        }
        assert_eq!(entry.regret_sum()[0], 0.0);
    }

    #[test]
    fn ensure_size_preserves_existing_slots_when_growing() {
        let mut entry = RegretEntry::default();
        entry.update(&[5.0], &[1.0], 1.0, &RegretUpdateOpts::PLAIN);
        entry.ensure_size(3);
        assert_eq!(entry.regret_sum()[0], 5.0);
        assert_eq!(entry.actions_size(), 3);
    }

    #[test]
    fn table_size_sums_every_shard() {
        let table = RegretTable::with_shards(4);
        table.get_or_init("a", 2);
        table.get_or_init("b", 2);
        table.get_or_init("c", 2);
        assert_eq!(table.size(), 3);
    }

    #[test]
    fn with_entry_mutates_the_same_entry_across_calls() {
        let table = RegretTable::with_shards(8);
        table.with_entry("k", 2, |e| e.update(&[1.0, 0.0], &[1.0, 0.0], 1.0, &RegretUpdateOpts::PLAIN));
        table.with_entry("k", 2, |e| e.update(&[1.0, 0.0], &[1.0, 0.0], 1.0, &RegretUpdateOpts::PLAIN));
        let entry = table.get_or_init("k", 2);
        assert_eq!(entry.regret_sum()[0], 2.0);
    }

    #[test]
    fn entries_snapshot_round_trips_through_from_entries() {
        let table = RegretTable::with_shards(4);
        table.get_or_init("x", 2);
        let snapshot = table.entries();
        let rebuilt = RegretTable::from_entries(snapshot, 4);
        assert_eq!(rebuilt.size(), 1);
    }
}

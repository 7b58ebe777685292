use std::time::Duration;

/// Per-iteration traversal counters (spec §4.8), reported through the
/// progress callback and persisted in checkpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub nodes_visited: u64,
    pub terminal_nodes: u64,
    pub max_depth: usize,
    pub iteration_time: Duration,
}

impl Stats {
    /// Folds another table's stats from the same iteration into this one.
    /// Counters add; `max_depth` and `iteration_time` take the larger.
    pub fn merge(self, other: Stats) -> Stats {
        Stats {
            nodes_visited: self.nodes_visited + other.nodes_visited,
            terminal_nodes: self.terminal_nodes + other.terminal_nodes,
            max_depth: self.max_depth.max(other.max_depth),
            iteration_time: self.iteration_time.max(other.iteration_time),
        }
    }
}

/// What the progress callback (spec §4.8) receives every `progress_every`
/// iterations.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub iteration: u64,
    pub table_size: usize,
    pub stats: Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_counters_and_takes_the_max_depth() {
        let a = Stats { nodes_visited: 10, terminal_nodes: 2, max_depth: 5, iteration_time: Duration::from_millis(3) };
        let b = Stats { nodes_visited: 7, terminal_nodes: 1, max_depth: 8, iteration_time: Duration::from_millis(9) };
        let merged = a.merge(b);
        assert_eq!(merged.nodes_visited, 17);
        assert_eq!(merged.terminal_nodes, 3);
        assert_eq!(merged.max_depth, 8);
        assert_eq!(merged.iteration_time, Duration::from_millis(9));
    }
}

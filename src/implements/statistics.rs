//! Search statistics
//!
//! Counters bumped by the group finder while it walks a decomposition
//! tree. One set is kept per finder and reported per archetype.

use std::fmt;
use strum::EnumCount;
use strum_macros::EnumCount as EnumCountMacro;

#[derive(EnumCountMacro, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Counters {
    /// Recursive calls entered.
    Nodes,
    /// Proto-groups produced by the enumerators.
    Candidates,
    /// Subtrees skipped because their group set was already explored.
    MemoHits,
    /// Subtrees skipped because they could not reach the best leftover.
    BoundPrunes,
    /// Empty groups inserted for constraints nothing satisfied.
    Placeholders,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStatistics {
    stats: [u64; Counters::COUNT],
}

impl SearchStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, counter: Counters) {
        self.stats[counter as usize] += 1;
    }

    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }

    pub fn merge(&mut self, other: &SearchStatistics) {
        for (total, value) in self.stats.iter_mut().zip(other.stats) {
            *total += value;
        }
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes={} candidates={} memo_hits={} pruned={} placeholders={}",
            self.get(Counters::Nodes),
            self.get(Counters::Candidates),
            self.get(Counters::MemoHits),
            self.get(Counters::BoundPrunes),
            self.get(Counters::Placeholders),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn merge_adds_counters() {
        let mut a = SearchStatistics::new();
        a.increment(Counters::Nodes);
        a.increment(Counters::MemoHits);
        let mut b = SearchStatistics::new();
        b.increment(Counters::Nodes);
        a.merge(&b);
        assert_eq!(a.get(Counters::Nodes), 2);
        assert_eq!(a.get(Counters::MemoHits), 1);
        assert_eq!(a.get(Counters::Placeholders), 0);
    }
}

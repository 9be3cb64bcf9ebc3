//! # Group Finder
//!
//! Recursive search for every decomposition of a tile multiset into a
//! requested number of runs, triplets and pairs that leaves the fewest
//! tiles unused. A search can run under several constraints at once; the
//! best decompositions are then reported per constraint.
//!
//! Two devices keep the search tractable:
//! * a per-call memo of explored group sets, so reordering the same
//!   groups is only walked once;
//! * branch-and-bound against the best leftover known per constraint,
//!   which never cuts a branch that could still tie the best.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use ahash::AHashSet;
use strum::EnumCount;

use super::proto_groups::{MeldKind, ProtoGroup};
use super::statistics::{Counters, SearchStatistics};
use super::types::constraint::{Constraint, ConstraintSet};
use super::types::errors::AnalysisError;
use super::types::group::{Combination, Group};
use super::types::tiles::Tile;

/// Best decompositions found for each constraint searched.
pub type ConstraintCombinations = BTreeMap<Constraint, Vec<Combination>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// How many groups of each kind a decomposition must contain.
pub struct Requirements {
    pub runs: u8,
    pub triplets: u8,
    pub pairs: u8,
}

impl Requirements {
    pub const fn new(runs: u8, triplets: u8, pairs: u8) -> Self {
        Requirements { runs, triplets, pairs }
    }

    /// Tiles needed to complete every requested group.
    pub fn needed_tiles(&self) -> usize {
        3 * (self.runs as usize + self.triplets as usize) + 2 * self.pairs as usize
    }

    pub fn is_empty(&self) -> bool {
        self.runs == 0 && self.triplets == 0 && self.pairs == 0
    }

    /// Next group kind to place and what is left after it.
    /// Pairs go first, then runs, then triplets.
    fn split_next(self) -> Option<(MeldKind, Requirements)> {
        if self.pairs > 0 {
            Some((MeldKind::Pair, Requirements { pairs: self.pairs - 1, ..self }))
        } else if self.runs > 0 {
            Some((MeldKind::Run, Requirements { runs: self.runs - 1, ..self }))
        } else if self.triplets > 0 {
            Some((MeldKind::Triplet, Requirements { triplets: self.triplets - 1, ..self }))
        } else {
            None
        }
    }
}

#[derive(Debug)]
struct Bucket {
    best_leftover: usize,
    combinations: Vec<Combination>,
}

#[derive(Debug, Default)]
/// Minimal-leftover combinations per constraint, ties kept, duplicates dropped.
struct Buckets(BTreeMap<Constraint, Bucket>);

impl Buckets {
    fn leaf(tiles: &[Tile], scope: ConstraintSet) -> Self {
        let mut buckets = Buckets::default();
        let combination = Combination::new(vec![], tiles.to_vec());
        for constraint in scope.iter() {
            buckets.offer(constraint, combination.clone());
        }
        buckets
    }

    fn offer(&mut self, constraint: Constraint, combination: Combination) {
        let leftover = combination.leftover.len();
        match self.0.entry(constraint) {
            Entry::Vacant(entry) => {
                entry.insert(Bucket { best_leftover: leftover, combinations: vec![combination] });
            }
            Entry::Occupied(mut entry) => {
                let bucket = entry.get_mut();
                if leftover < bucket.best_leftover {
                    bucket.best_leftover = leftover;
                    bucket.combinations.clear();
                    bucket.combinations.push(combination);
                } else if leftover == bucket.best_leftover && !bucket.combinations.contains(&combination) {
                    bucket.combinations.push(combination);
                }
            }
        }
    }

    fn into_entries(self) -> impl Iterator<Item = (Constraint, Combination)> {
        self.0
            .into_iter()
            .flat_map(|(constraint, bucket)| bucket.combinations.into_iter().map(move |c| (constraint, c)))
    }
}

/// State shared by one top-level search.
struct SearchContext {
    memo: Option<AHashSet<(Vec<Group>, ConstraintSet)>>,
    /// `None` when branch-and-bound is off.
    best_known: Option<[usize; Constraint::COUNT]>,
    statistics: SearchStatistics,
}

impl SearchContext {
    fn new(shortcuts: bool) -> Self {
        SearchContext {
            memo: shortcuts.then(AHashSet::new),
            best_known: shortcuts.then_some([usize::MAX; Constraint::COUNT]),
            statistics: SearchStatistics::new(),
        }
    }

    fn search(
        &mut self,
        tiles: &[Tile],
        requirements: Requirements,
        scope: ConstraintSet,
        chosen: &[Group],
    ) -> Result<Buckets, AnalysisError> {
        // A decomposition may lack exactly one tile: that tile is the one to draw.
        let needed = requirements.needed_tiles();
        if tiles.len() + 1 < needed {
            return Err(AnalysisError::InsufficientTiles { needed: needed - 1, available: tiles.len() });
        }
        self.statistics.increment(Counters::Nodes);

        let Some((kind, remaining)) = requirements.split_next() else {
            if let Some(best_known) = &mut self.best_known {
                for constraint in scope.iter() {
                    let best = &mut best_known[constraint as usize];
                    *best = (*best).min(tiles.len());
                }
            }
            return Ok(Buckets::leaf(tiles, scope));
        };

        let mut buckets = Buckets::default();
        let mut covered = ConstraintSet::EMPTY;
        for candidate in kind.proto_groups(tiles, scope) {
            self.statistics.increment(Counters::Candidates);
            covered = covered.union(candidate.constraints);
            self.explore(candidate, remaining, chosen, &mut buckets)?;
        }

        // Constraints nothing satisfied still need an answer at this level.
        let uncovered = scope.difference(covered);
        if !uncovered.is_empty() {
            self.statistics.increment(Counters::Placeholders);
            self.explore(ProtoGroup::placeholder(tiles, uncovered), remaining, chosen, &mut buckets)?;
        }
        Ok(buckets)
    }

    fn explore(
        &mut self,
        candidate: ProtoGroup,
        remaining: Requirements,
        chosen: &[Group],
        buckets: &mut Buckets,
    ) -> Result<(), AnalysisError> {
        if self.cannot_improve(&candidate, remaining) {
            self.statistics.increment(Counters::BoundPrunes);
            return Ok(());
        }

        let mut combined = Vec::with_capacity(chosen.len() + 1);
        combined.extend_from_slice(chosen);
        combined.push(candidate.group.clone());
        combined.sort();

        if let Some(memo) = &mut self.memo {
            if !memo.insert((combined.clone(), candidate.constraints)) {
                self.statistics.increment(Counters::MemoHits);
                return Ok(());
            }
        }

        let found = self.search(&candidate.residue, remaining, candidate.constraints, &combined)?;
        for (constraint, combination) in found.into_entries() {
            buckets.offer(constraint, combination.with_group(candidate.group.clone()));
        }
        Ok(())
    }

    /// True when even a perfect completion leaves more tiles than the
    /// best decomposition already found for every constraint in play.
    fn cannot_improve(&self, candidate: &ProtoGroup, remaining: Requirements) -> bool {
        let Some(best_known) = &self.best_known else {
            return false;
        };
        let lower_bound = candidate.residue.len().saturating_sub(remaining.needed_tiles());
        candidate
            .constraints
            .iter()
            .all(|constraint| lower_bound > best_known[constraint as usize])
    }
}

#[derive(Debug, Clone)]
/// Runs decomposition searches and accumulates their statistics.
pub struct GroupFinder {
    /// Memo and branch-and-bound on.
    shortcuts: bool,
    statistics: SearchStatistics,
}

impl Default for GroupFinder {
    fn default() -> Self {
        GroupFinder::new()
    }
}

impl GroupFinder {
    pub fn new() -> Self {
        GroupFinder { shortcuts: true, statistics: SearchStatistics::new() }
    }

    /// A finder that walks every branch: no memo, no bound. Same results,
    /// more work.
    pub fn exhaustive() -> Self {
        GroupFinder { shortcuts: false, statistics: SearchStatistics::new() }
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Searches `tiles` under every constraint of `constraints` at once.
    ///
    /// Every constraint of the set gets an entry in the result.
    ///
    /// # Errors
    /// [`AnalysisError::InsufficientTiles`] when even one missing tile
    /// would not be enough to satisfy `requirements`.
    pub fn find(
        &mut self,
        tiles: &[Tile],
        requirements: Requirements,
        constraints: ConstraintSet,
    ) -> Result<ConstraintCombinations, AnalysisError> {
        let mut context = SearchContext::new(self.shortcuts);
        let result = context.search(tiles, requirements, constraints, &[]);
        self.statistics.merge(&context.statistics);

        let mut found = ConstraintCombinations::new();
        for (constraint, combination) in result?.into_entries() {
            found.entry(constraint).or_default().push(combination);
        }
        for constraint in constraints.iter() {
            found.entry(constraint).or_default().sort();
        }
        Ok(found)
    }

    pub fn all_groups_for(&mut self, tiles: &[Tile], requirements: Requirements) -> Result<Vec<Combination>, AnalysisError> {
        let mut found = self.find(tiles, requirements, ConstraintSet::unconstrained())?;
        Ok(found.remove(&Constraint::None).unwrap_or_default())
    }

    pub fn all_groups_for_with_constraints(
        &mut self,
        tiles: &[Tile],
        requirements: Requirements,
        constraints: &[Constraint],
    ) -> Result<ConstraintCombinations, AnalysisError> {
        if constraints.is_empty() {
            return Err(AnalysisError::EmptyConstraintList);
        }
        self.find(tiles, requirements, constraints.iter().copied().collect())
    }
}

/// Every decomposition of `tiles` into the given groups with minimal leftover.
pub fn all_groups_for(tiles: &[Tile], runs: u8, triplets: u8, pairs: u8) -> Result<Vec<Combination>, AnalysisError> {
    GroupFinder::new().all_groups_for(tiles, Requirements::new(runs, triplets, pairs))
}

/// Like [`all_groups_for`], with the best decompositions reported per constraint.
pub fn all_groups_for_with_constraints(
    tiles: &[Tile],
    runs: u8,
    triplets: u8,
    pairs: u8,
    constraints: &[Constraint],
) -> Result<ConstraintCombinations, AnalysisError> {
    GroupFinder::new().all_groups_for_with_constraints(tiles, Requirements::new(runs, triplets, pairs), constraints)
}

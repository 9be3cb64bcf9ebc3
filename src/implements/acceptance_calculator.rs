//! # Acceptance Calculator
//!
//! Per-archetype shanten and tile acceptance. Template archetypes expand
//! their wildcard template and search what the template leaves; the others
//! either run a constrained search or a dedicated rule.

use std::collections::BTreeSet;

use super::group_finder::{GroupFinder, Requirements};
use super::pattern_generator::pattern_generator;
use super::proto_groups::{ProtoGroup, find_runs, find_triplets};
use super::tile_parser::parse_tiles;
use super::types::analysis::ArchetypeResult;
use super::types::archetype::Archetype;
use super::types::constraint::{Constraint, ConstraintSet};
use super::types::errors::AnalysisError;
use super::types::group::{Combination, Group};
use super::types::hand::{Hand, remove_tile, residue_after};
use super::types::tiles::{Family, Tile};
use wait_analyzer::{group_acceptance, pung_acceptance};

/// 組合龍: one suit per knitted column.
const KNITTED_TEMPLATE: &str = "147a258b369c";

/// How an archetype is searched.
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// Wildcard templates covering three groups, completed by one group and a pair.
    Templates(&'static [&'static str]),
    SevenPairs,
    AllPungs,
    AllTypes,
    Knitted,
    /// Four groups and a pair under one of `constraints`, with at most
    /// `max_runs` runs.
    Constrained { constraints: &'static [Constraint], max_runs: u8 },
}

fn shape_of(archetype: Archetype) -> Shape {
    match archetype {
        Archetype::MixedStraight => Shape::Templates(&["123a456b789c"]),
        Archetype::MixedShifted => Shape::Templates(&["ABCaBCDbCDEc"]),
        Archetype::PureStraight => Shape::Templates(&["123456789a"]),
        Archetype::PureShifted => Shape::Templates(&["ABCCDEEFGa", "ABCBCDCDEa"]),
        Archetype::TripleChows => Shape::Templates(&["ABCaABCbABCc"]),
        Archetype::AllPungs => Shape::AllPungs,
        Archetype::SevenPairs => Shape::SevenPairs,
        Archetype::AllTypes => Shape::AllTypes,
        Archetype::Knitted => Shape::Knitted,
        Archetype::HalfFlush => Shape::Constrained {
            constraints: &[Constraint::FlushManzu, Constraint::FlushPinzu, Constraint::FlushSouzu],
            max_runs: 4,
        },
        Archetype::FirstOrLastFour => Shape::Constrained {
            constraints: &[Constraint::FirstFour, Constraint::LastFour],
            max_runs: 4,
        },
        Archetype::Reversible => Shape::Constrained { constraints: &[Constraint::Symmetric], max_runs: 4 },
        Archetype::UpperMiddleLower => Shape::Constrained {
            constraints: &[Constraint::FirstThree, Constraint::MiddleThree, Constraint::LastThree],
            max_runs: 4,
        },
        Archetype::AllGreen => Shape::Constrained { constraints: &[Constraint::Green], max_runs: 4 },
        Archetype::AllSimples => Shape::Constrained { constraints: &[Constraint::Ordinary], max_runs: 4 },
        Archetype::AllEvenPungs => Shape::Constrained { constraints: &[Constraint::Even], max_runs: 0 },
        Archetype::AllTerminalsAndHonors => Shape::Constrained {
            constraints: &[Constraint::TerminalOrHonor],
            max_runs: 0,
        },
        Archetype::AllHonors => Shape::Constrained { constraints: &[Constraint::HonorOnly], max_runs: 0 },
        Archetype::AllTerminals => Shape::Constrained { constraints: &[Constraint::TerminalOnly], max_runs: 0 },
    }
}

// --- Wait Analysis ---

/// Which draws complete or improve a group.
pub mod wait_analyzer {
    use std::collections::BTreeSet;

    use crate::implements::types::group::{Combination, Group};
    use crate::implements::types::tiles::Tile;

    /// Tiles that complete a two-tile group.
    ///
    /// Identical tiles wait on themselves, neighbours on both open ends
    /// (clipped to 1-9), and a gap of two on the middle tile. Any other
    /// group waits on nothing.
    pub fn two_tile_waits(group: &Group) -> BTreeSet<Tile> {
        let mut waits = BTreeSet::new();
        let [first, second] = group.tiles() else {
            return waits;
        };
        let (low, high) = if first <= second { (*first, *second) } else { (*second, *first) };
        if low == high {
            waits.insert(low);
            return waits;
        }
        if low.family != high.family || low.is_honor() {
            return waits;
        }
        match high.number - low.number {
            1 => {
                if low.number > 1 {
                    waits.insert(Tile::new(low.number - 1, low.family));
                }
                if high.number < 9 {
                    waits.insert(Tile::new(high.number + 1, low.family));
                }
            }
            2 => {
                waits.insert(Tile::new(low.number + 1, low.family));
            }
            _ => (),
        }
        waits
    }

    /// Acceptance of a set of partial groups.
    ///
    /// Complete groups and empty placeholders accept nothing. The only pair
    /// of the set is the hand's pair and accepts nothing either. Once a pair
    /// exists, a lone suited tile accepts everything within two of it.
    pub fn group_acceptance(groups: &[Group]) -> BTreeSet<Tile> {
        let pairs = groups.iter().filter(|g| g.is_pair()).count();
        let mut acceptance = BTreeSet::new();
        for group in groups {
            match group.tiles() {
                [tile] if pairs > 0 && !tile.is_honor() => {
                    let low = tile.number.saturating_sub(2).max(1);
                    let high = (tile.number + 2).min(9);
                    acceptance.extend((low..=high).map(|n| Tile::new(n, tile.family)));
                }
                [tile] => {
                    acceptance.insert(*tile);
                }
                [_, _] if group.is_pair() && pairs == 1 => (),
                [_, _] => acceptance.extend(two_tile_waits(group)),
                _ => (),
            }
        }
        acceptance
    }

    /// Acceptance of a decomposition made of triplets and a pair only.
    ///
    /// Every incomplete group waits on its own tile. With a lone group in
    /// the hand, pairing up a leftover tile helps as well.
    pub fn pung_acceptance(combination: &Combination) -> BTreeSet<Tile> {
        let mut acceptance = BTreeSet::new();
        let mut has_lone_group = false;
        for group in &combination.groups {
            match group.tiles() {
                [tile] => {
                    has_lone_group = true;
                    acceptance.insert(*tile);
                }
                [tile, _] => {
                    acceptance.insert(*tile);
                }
                _ => (),
            }
        }
        if has_lone_group {
            acceptance.extend(combination.leftover.iter().copied());
        }
        acceptance
    }
}

/// Best combinations seen so far, with the acceptance they add up to.
#[derive(Debug, Default)]
struct Best {
    leftover: Option<usize>,
    combinations: Vec<Combination>,
    acceptance: BTreeSet<Tile>,
}

impl Best {
    /// False when `leftover` is worse than the best. A strictly better
    /// leftover forgets everything collected so far.
    fn admits(&mut self, leftover: usize) -> bool {
        match self.leftover {
            Some(best) if leftover > best => false,
            Some(best) if leftover == best => true,
            _ => {
                self.leftover = Some(leftover);
                self.combinations.clear();
                self.acceptance.clear();
                true
            }
        }
    }

    fn push(&mut self, combination: Combination) {
        if !self.combinations.contains(&combination) {
            self.combinations.push(combination);
        }
    }

    fn into_outcome(mut self) -> (Vec<Combination>, BTreeSet<Tile>) {
        self.combinations.sort();
        (self.combinations, self.acceptance)
    }
}

/// The pattern tiles the hand holds, cut into the template's groups of three.
fn read_groups(hand: &Hand, pattern: &[Tile]) -> Vec<Group> {
    let mut available = hand.tiles().to_vec();
    pattern
        .chunks(3)
        .map(|chunk| {
            let held = chunk.iter().filter(|tile| remove_tile(&mut available, tile)).copied().collect();
            Group::new(held)
        })
        .collect()
}

/// Best single run or triplet inside one All Types category.
fn category_options(tiles: &[Tile], belongs: fn(&Tile) -> bool, acceptance: &mut BTreeSet<Tile>) -> Vec<Combination> {
    if tiles.is_empty() {
        acceptance.extend(Tile::all().filter(belongs));
        return vec![Combination::new(vec![Group::empty()], vec![])];
    }

    let scope = ConstraintSet::unconstrained();
    let candidates: Vec<ProtoGroup> = find_runs(tiles, scope).chain(find_triplets(tiles, scope)).collect();
    let Some(best) = candidates.iter().map(|p| p.residue.len()).min() else {
        return vec![];
    };
    candidates
        .into_iter()
        .filter(|p| p.residue.len() == best)
        .map(|p| {
            acceptance.extend(group_acceptance(std::slice::from_ref(&p.group)));
            Combination::new(vec![p.group], p.residue)
        })
        .collect()
}

/// Computes one archetype's result for a hand.
pub struct AcceptanceCalculator<'h> {
    hand: &'h Hand,
    finder: GroupFinder,
}

impl<'h> AcceptanceCalculator<'h> {
    pub fn new(hand: &'h Hand) -> Self {
        AcceptanceCalculator { hand, finder: GroupFinder::new() }
    }

    /// `None` when the archetype yields no decomposition at all.
    pub fn calculate(mut self, archetype: Archetype) -> Result<Option<ArchetypeResult>, AnalysisError> {
        let (combinations, acceptance) = match shape_of(archetype) {
            Shape::Templates(templates) => self.templates(templates)?,
            Shape::SevenPairs => self.seven_pairs()?,
            Shape::AllPungs => self.all_pungs()?,
            Shape::AllTypes => self.all_types(),
            Shape::Knitted => self.knitted()?,
            Shape::Constrained { constraints, max_runs } => self.constrained(constraints, max_runs)?,
        };

        let Some(leftover) = combinations.iter().map(|c| c.leftover.len()).min() else {
            return Ok(None);
        };
        Ok(Some(ArchetypeResult {
            archetype,
            combinations,
            acceptance,
            shanten: leftover as i32 - self.hand.tiles_to_discard() as i32,
            statistics: *self.finder.statistics(),
        }))
    }

    // --- Template archetypes ---

    fn templates(&mut self, templates: &[&str]) -> Result<(Vec<Combination>, BTreeSet<Tile>), AnalysisError> {
        let mut best = Best::default();
        for template in templates {
            for pattern in pattern_generator(template)? {
                let pattern_tiles = parse_tiles(&pattern)?;
                let residue = self.hand.residue_after(&pattern_tiles);
                let found = self.group_and_pair(&residue)?;
                let Some(leftover) = found.first().map(|c| c.leftover.len()) else {
                    continue;
                };
                if !best.admits(leftover) {
                    continue;
                }

                let read = read_groups(self.hand, &pattern_tiles);
                best.acceptance.extend(self.hand.missing_tiles(&pattern_tiles));
                for combination in found {
                    best.acceptance.extend(group_acceptance(&combination.groups));
                    let groups = read.iter().cloned().chain(combination.groups).collect();
                    best.push(Combination::new(groups, combination.leftover));
                }
            }
        }
        Ok(best.into_outcome())
    }

    /// Best ways to finish what a template leaves: one run or triplet plus a pair.
    fn group_and_pair(&mut self, tiles: &[Tile]) -> Result<Vec<Combination>, AnalysisError> {
        let mut found = self.finder.all_groups_for(tiles, Requirements::new(0, 1, 1))?;
        found.extend(self.finder.all_groups_for(tiles, Requirements::new(1, 0, 1))?);
        if let Some(best) = found.iter().map(|c| c.leftover.len()).min() {
            found.retain(|c| c.leftover.len() == best);
        }
        found.sort();
        found.dedup();
        Ok(found)
    }

    fn knitted(&mut self) -> Result<(Vec<Combination>, BTreeSet<Tile>), AnalysisError> {
        let mut best = Best::default();
        for pattern in pattern_generator(KNITTED_TEMPLATE)? {
            let pattern_tiles = parse_tiles(&pattern)?;
            let residue = self.hand.residue_after(&pattern_tiles);
            let honors: Vec<Tile> = residue
                .iter()
                .filter(|t| t.is_honor())
                .copied()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let leftover = residue_after(&residue, &honors);
            if !best.admits(leftover.len()) {
                continue;
            }

            best.acceptance.extend(self.hand.missing_tiles(&pattern_tiles));
            best.acceptance.extend(Tile::all().filter(|t| t.is_honor() && !honors.contains(t)));
            let mut groups = read_groups(self.hand, &pattern_tiles);
            groups.push(Group::new(honors));
            best.push(Combination::new(groups, leftover));
        }
        Ok(best.into_outcome())
    }

    // --- Bespoke archetypes ---

    fn seven_pairs(&mut self) -> Result<(Vec<Combination>, BTreeSet<Tile>), AnalysisError> {
        let found = self.finder.all_groups_for(self.hand.tiles(), Requirements::new(0, 0, 7))?;
        let mut acceptance = BTreeSet::new();
        for combination in &found {
            acceptance.extend(combination.leftover.iter().copied());
            acceptance.extend(combination.groups.iter().filter_map(|g| match g.tiles() {
                [tile] => Some(*tile),
                _ => None,
            }));
        }
        Ok((found, acceptance))
    }

    fn all_pungs(&mut self) -> Result<(Vec<Combination>, BTreeSet<Tile>), AnalysisError> {
        let found = self.finder.all_groups_for(self.hand.tiles(), Requirements::new(0, 4, 1))?;
        let acceptance = found.iter().flat_map(pung_acceptance).collect();
        Ok((found, acceptance))
    }

    /// One group from each suit, one from the winds and one from the dragons.
    fn all_types(&self) -> (Vec<Combination>, BTreeSet<Tile>) {
        let categories: [fn(&Tile) -> bool; 5] = [
            |t: &Tile| t.family == Family::Manzu,
            |t: &Tile| t.family == Family::Pinzu,
            |t: &Tile| t.family == Family::Souzu,
            Tile::is_wind,
            Tile::is_dragon,
        ];

        let mut acceptance = BTreeSet::new();
        let mut combinations = vec![Combination::new(vec![], vec![])];
        for belongs in categories {
            let tiles: Vec<Tile> = self.hand.tiles().iter().filter(|t| belongs(t)).copied().collect();
            let options = category_options(&tiles, belongs, &mut acceptance);
            combinations = combinations
                .iter()
                .flat_map(|c| options.iter().map(move |o| c.merge(o)))
                .collect();
        }
        combinations.sort();
        combinations.dedup();
        (combinations, acceptance)
    }

    // --- Constrained archetypes ---

    fn constrained(
        &mut self,
        constraints: &[Constraint],
        max_runs: u8,
    ) -> Result<(Vec<Combination>, BTreeSet<Tile>), AnalysisError> {
        let mut best = Best::default();
        for runs in 0..=max_runs {
            let requirements = Requirements::new(runs, 4 - runs, 1);
            let found = self.finder.all_groups_for_with_constraints(self.hand.tiles(), requirements, constraints)?;
            for (constraint, combinations) in found {
                for combination in combinations {
                    if !best.admits(combination.leftover.len()) {
                        continue;
                    }
                    let waits = if max_runs == 0 {
                        pung_acceptance(&combination)
                    } else {
                        group_acceptance(&combination.groups)
                    };
                    best.acceptance.extend(waits.into_iter().filter(|t| constraint.allows(t)));
                    if combination.has_empty_group() {
                        best.acceptance.extend(self.open_tiles(constraint));
                    }
                    best.push(combination);
                }
            }
        }
        Ok(best.into_outcome())
    }

    /// Tiles a constrained shape may still draw, given the copies in hand.
    fn open_tiles(&self, constraint: Constraint) -> impl Iterator<Item = Tile> + '_ {
        constraint
            .legal_tiles()
            .filter(move |tile| self.hand.count(tile) < constraint.copies_cap(tile))
    }
}

/// Shanten and acceptance of `hand` for one archetype.
pub fn calculate_archetype(hand: &Hand, archetype: Archetype) -> Result<Option<ArchetypeResult>, AnalysisError> {
    AcceptanceCalculator::new(hand).calculate(archetype)
}

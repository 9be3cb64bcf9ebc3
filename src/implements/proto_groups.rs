//! Lazy enumerators of candidate groups ("proto-groups").
//!
//! Each enumerator looks at the distinct tiles of a multiset and yields
//! every full or partial group anchored on them, already narrowed to the
//! constraints the group respects. Groups respecting none are dropped.

use super::types::constraint::ConstraintSet;
use super::types::group::Group;
use super::types::hand::residue_after;
use super::types::tiles::{Family, Tile};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A candidate group, what remains once it is removed, and the
/// constraints still alive after choosing it.
pub struct ProtoGroup {
    pub group: Group,
    pub residue: Vec<Tile>,
    pub constraints: ConstraintSet,
}

impl ProtoGroup {
    /// `None` when `group` respects no constraint of `scope`.
    pub fn try_new(group: Group, tiles: &[Tile], scope: ConstraintSet) -> Option<Self> {
        let constraints = scope.narrowed_to(&group);
        if constraints.is_empty() {
            return None;
        }
        Some(ProtoGroup {
            residue: residue_after(tiles, group.tiles()),
            group,
            constraints,
        })
    }

    /// An empty group standing in for constraints no candidate satisfied.
    pub fn placeholder(tiles: &[Tile], constraints: ConstraintSet) -> Self {
        let mut residue = tiles.to_vec();
        residue.sort();
        ProtoGroup { group: Group::empty(), residue, constraints }
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Per-tile counts, indexed by family then number (slot 0 unused).
struct TileCounts([[u8; 11]; 4]);

impl TileCounts {
    fn of(tiles: &[Tile]) -> Self {
        let mut counts = TileCounts::default();
        for tile in tiles {
            counts.0[tile.family.index()][tile.number as usize] += 1;
        }
        counts
    }

    fn get(&self, family: Family, number: u8) -> u8 {
        self.0[family.index()].get(number as usize).copied().unwrap_or(0)
    }
}

// --- Shapes ---

fn run_shapes(counts: TileCounts, family: Family, anchor: u8) -> Vec<Group> {
    let held = |number: u8| counts.get(family, number) > 0;
    let mut shapes = Vec::with_capacity(4);
    if held(anchor + 1) && held(anchor + 2) {
        shapes.push(Group::of(family, &[anchor, anchor + 1, anchor + 2]));
    }
    if held(anchor + 1) {
        shapes.push(Group::of(family, &[anchor, anchor + 1]));
    }
    if held(anchor + 2) {
        shapes.push(Group::of(family, &[anchor, anchor + 2]));
    }
    shapes.push(Group::of(family, &[anchor]));
    shapes
}

fn triplet_shapes(count: u8, family: Family, number: u8) -> Vec<Group> {
    (1..=count.min(3))
        .rev()
        .map(|size| Group::of(family, &vec![number; size as usize]))
        .collect()
}

fn pair_shapes(count: u8, family: Family, number: u8) -> Vec<Group> {
    let size = count.min(2) as usize;
    vec![Group::of(family, &vec![number; size])]
}

// --- Enumerators ---

/// Runs (順子) and their partial shapes, anchored on suited 1-7.
///
/// For each anchor: the full run, the two-tile shapes with the next or
/// the one after, then the anchor alone. Anchors 8 and 9 never start a
/// shape; they only appear inside shapes anchored lower.
pub fn find_runs(tiles: &[Tile], scope: ConstraintSet) -> impl Iterator<Item = ProtoGroup> + '_ {
    let counts = TileCounts::of(tiles);
    Family::SUITED
        .into_iter()
        .flat_map(move |family| {
            (1..=7u8)
                .filter(move |&anchor| counts.get(family, anchor) > 0)
                .flat_map(move |anchor| run_shapes(counts, family, anchor))
        })
        .filter_map(move |group| ProtoGroup::try_new(group, tiles, scope))
}

/// Triplets (刻子) and their partial shapes: every size up to the copies held.
pub fn find_triplets(tiles: &[Tile], scope: ConstraintSet) -> impl Iterator<Item = ProtoGroup> + '_ {
    find_same_tile(tiles, scope, triplet_shapes)
}

/// Pairs (対子), or a lone tile where only one copy is held.
pub fn find_pairs(tiles: &[Tile], scope: ConstraintSet) -> impl Iterator<Item = ProtoGroup> + '_ {
    find_same_tile(tiles, scope, pair_shapes)
}

fn find_same_tile(
    tiles: &[Tile],
    scope: ConstraintSet,
    shapes: fn(u8, Family, u8) -> Vec<Group>,
) -> impl Iterator<Item = ProtoGroup> + '_ {
    let counts = TileCounts::of(tiles);
    Tile::all()
        .filter(move |tile| counts.get(tile.family, tile.number) > 0)
        .flat_map(move |tile| shapes(counts.get(tile.family, tile.number), tile.family, tile.number))
        .filter_map(move |group| ProtoGroup::try_new(group, tiles, scope))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeldKind {
    Pair,
    Run,
    Triplet,
}

impl MeldKind {
    pub fn proto_groups<'a>(self, tiles: &'a [Tile], scope: ConstraintSet) -> Box<dyn Iterator<Item = ProtoGroup> + 'a> {
        match self {
            MeldKind::Pair => Box::new(find_pairs(tiles, scope)),
            MeldKind::Run => Box::new(find_runs(tiles, scope)),
            MeldKind::Triplet => Box::new(find_triplets(tiles, scope)),
        }
    }
}

/// # Core Tile Definitions
///
/// This module defines the most basic components of a Mahjong tile.
pub mod tiles {
    use std::fmt;

    use super::errors::FormatError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    /// Represents the four tile families.
    /// Declaration order follows the family letters (m < p < s < z).
    pub enum Family {
        Manzu, // 萬子 (Characters)
        Pinzu, // 筒子 (Circles)
        Souzu, // 索子 (Bamboo)
        Jihai, // 字牌 (Honors)
    }

    impl Family {
        /// The three numbered suits.
        pub const SUITED: [Family; 3] = [Family::Manzu, Family::Pinzu, Family::Souzu];
        pub const ALL: [Family; 4] = [Family::Manzu, Family::Pinzu, Family::Souzu, Family::Jihai];

        pub fn from_letter(letter: char) -> Option<Family> {
            match letter {
                'm' => Some(Family::Manzu),
                'p' => Some(Family::Pinzu),
                's' => Some(Family::Souzu),
                'z' => Some(Family::Jihai),
                _ => None,
            }
        }

        pub fn letter(self) -> char {
            match self {
                Family::Manzu => 'm',
                Family::Pinzu => 'p',
                Family::Souzu => 's',
                Family::Jihai => 'z',
            }
        }

        pub fn is_suited(self) -> bool {
            self != Family::Jihai
        }

        /// Highest tile number in the family (9 for suits, 7 for honors).
        pub fn max_number(self) -> u8 {
            if self.is_suited() { 9 } else { 7 }
        }

        pub(crate) fn index(self) -> usize {
            self as usize
        }
    }

    impl fmt::Display for Family {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.letter())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    /// Represents a single Mahjong tile.
    ///
    /// Field order matters: tiles sort by family, then by number.
    /// Honor numbers 1-4 are the winds (東南西北), 5-7 the dragons (白發中).
    pub struct Tile {
        pub family: Family,
        pub number: u8,
    }

    /// 緑一色 tiles: 23468s and the green dragon.
    const GREEN_TILES: [Tile; 6] = [
        Tile::new(2, Family::Souzu),
        Tile::new(3, Family::Souzu),
        Tile::new(4, Family::Souzu),
        Tile::new(6, Family::Souzu),
        Tile::new(8, Family::Souzu),
        Tile::new(6, Family::Jihai),
    ];

    /// 推不倒 tiles: 1234589p, 245689s and the white dragon.
    const SYMMETRIC_TILES: [Tile; 14] = [
        Tile::new(1, Family::Pinzu),
        Tile::new(2, Family::Pinzu),
        Tile::new(3, Family::Pinzu),
        Tile::new(4, Family::Pinzu),
        Tile::new(5, Family::Pinzu),
        Tile::new(8, Family::Pinzu),
        Tile::new(9, Family::Pinzu),
        Tile::new(2, Family::Souzu),
        Tile::new(4, Family::Souzu),
        Tile::new(5, Family::Souzu),
        Tile::new(6, Family::Souzu),
        Tile::new(8, Family::Souzu),
        Tile::new(9, Family::Souzu),
        Tile::new(5, Family::Jihai),
    ];

    impl Tile {
        /// Builds a tile without range checks. Use [`Tile::try_new`] for input.
        pub const fn new(number: u8, family: Family) -> Tile {
            Tile { family, number }
        }

        pub fn try_new(number: u8, family: Family) -> Result<Tile, FormatError> {
            if (1..=family.max_number()).contains(&number) {
                Ok(Tile::new(number, family))
            } else {
                Err(FormatError::TileOutOfRange { number, family })
            }
        }

        /// All 34 distinct tiles, in sort order.
        pub fn all() -> impl Iterator<Item = Tile> {
            Family::ALL
                .into_iter()
                .flat_map(|family| (1..=family.max_number()).map(move |number| Tile::new(number, family)))
        }

        pub fn is_honor(&self) -> bool {
            self.family == Family::Jihai
        }

        pub fn is_wind(&self) -> bool {
            self.is_honor() && (1..=4).contains(&self.number)
        }

        pub fn is_dragon(&self) -> bool {
            self.is_honor() && (5..=7).contains(&self.number)
        }

        pub fn is_terminal(&self) -> bool {
            !self.is_honor() && (self.number == 1 || self.number == 9)
        }

        /// 中張牌: suited 2-8.
        pub fn is_ordinary(&self) -> bool {
            !self.is_honor() && (2..=8).contains(&self.number)
        }

        pub fn is_even(&self) -> bool {
            !self.is_honor() && self.number % 2 == 0
        }

        pub fn is_green(&self) -> bool {
            GREEN_TILES.contains(self)
        }

        pub fn is_symmetric(&self) -> bool {
            SYMMETRIC_TILES.contains(self)
        }

        /// A half flush (混一色) of `family` may hold this tile.
        pub fn is_compatible_with_half_flush(&self, family: Family) -> bool {
            self.family == family || self.is_honor()
        }

        /// Distance from the center value 5, used to rank discards.
        /// Honors rank above every suited tile.
        pub fn distance_from_center(&self) -> u8 {
            if self.is_honor() { u8::MAX } else { self.number.abs_diff(5) }
        }
    }

    impl fmt::Display for Tile {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}{}", self.number, self.family.letter())
        }
    }
}

/// # Hand Structure
///
/// A hand is an unordered multiset of tiles. These helpers treat any
/// `&[Tile]` as such a multiset.
pub mod hand {
    use std::fmt;
    use std::str::FromStr;

    use super::errors::AnalysisError;
    use super::tiles::Tile;
    use crate::implements::tile_parser::{parse_tiles, tiles_to_string};

    /// Number of tiles in a waiting hand. Anything above must discard.
    pub const HAND_SIZE: usize = 13;

    /// Removes one occurrence of `tile`. Returns false if it was absent.
    pub fn remove_tile(tiles: &mut Vec<Tile>, tile: &Tile) -> bool {
        match tiles.iter().position(|t| t == tile) {
            Some(index) => {
                tiles.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Multiset subtraction. Tiles of `removed` that are absent are ignored.
    pub fn residue_after(tiles: &[Tile], removed: &[Tile]) -> Vec<Tile> {
        let mut leftover = tiles.to_vec();
        for tile in removed {
            remove_tile(&mut leftover, tile);
        }
        leftover.sort();
        leftover
    }

    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    /// Represents a player's concealed tiles.
    pub struct Hand {
        tiles: Vec<Tile>,
    }

    impl Hand {
        pub fn new(mut tiles: Vec<Tile>) -> Self {
            tiles.sort();
            Hand { tiles }
        }

        pub fn tiles(&self) -> &[Tile] {
            &self.tiles
        }

        pub fn len(&self) -> usize {
            self.tiles.len()
        }

        pub fn is_empty(&self) -> bool {
            self.tiles.is_empty()
        }

        pub fn count(&self, tile: &Tile) -> usize {
            self.tiles.iter().filter(|t| *t == tile).count()
        }

        /// Tiles of `pattern` the hand cannot supply, with multiplicity.
        pub fn missing_tiles(&self, pattern: &[Tile]) -> Vec<Tile> {
            let mut available = self.tiles.clone();
            pattern
                .iter()
                .filter(|tile| !remove_tile(&mut available, tile))
                .copied()
                .collect()
        }

        /// The hand once every tile of `pattern` it holds is taken out.
        pub fn residue_after(&self, pattern: &[Tile]) -> Vec<Tile> {
            residue_after(&self.tiles, pattern)
        }

        /// How many tiles must go before the hand is back to 13.
        pub fn tiles_to_discard(&self) -> usize {
            self.tiles.len().saturating_sub(HAND_SIZE)
        }
    }

    impl FromStr for Hand {
        type Err = AnalysisError;

        /// Parses compact notation, case-insensitively.
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Ok(Hand::new(parse_tiles(&s.to_lowercase())?))
        }
    }

    impl fmt::Display for Hand {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", tiles_to_string(&self.tiles))
        }
    }
}

/// # Groups and Combinations
///
/// A group is a candidate meld, possibly incomplete. A combination is the
/// output unit of the group finder.
pub mod group {
    use std::fmt;

    use super::tiles::{Family, Tile};
    use crate::implements::tile_parser::tiles_to_string;

    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    /// An ordered sequence of tiles: a (partial) run, triplet or pair.
    /// An empty group is the placeholder for "nothing usable found".
    pub struct Group {
        tiles: Vec<Tile>,
    }

    impl Group {
        pub fn new(tiles: Vec<Tile>) -> Self {
            Group { tiles }
        }

        pub fn empty() -> Self {
            Group::default()
        }

        /// Group of `family` tiles with the given numbers, in that order.
        pub fn of(family: Family, numbers: &[u8]) -> Self {
            Group::new(numbers.iter().map(|&n| Tile::new(n, family)).collect())
        }

        pub fn tiles(&self) -> &[Tile] {
            &self.tiles
        }

        pub fn len(&self) -> usize {
            self.tiles.len()
        }

        pub fn is_empty(&self) -> bool {
            self.tiles.is_empty()
        }

        /// Two identical tiles (対子).
        pub fn is_pair(&self) -> bool {
            matches!(self.tiles.as_slice(), [a, b] if a == b)
        }
    }

    impl fmt::Display for Group {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if self.is_empty() {
                write!(f, "-")
            } else {
                write!(f, "{}", tiles_to_string(&self.tiles))
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    /// A set of groups plus the tiles no group uses.
    ///
    /// Both halves are kept sorted so equal decompositions compare equal.
    pub struct Combination {
        pub groups: Vec<Group>,
        pub leftover: Vec<Tile>,
    }

    impl Combination {
        pub fn new(mut groups: Vec<Group>, mut leftover: Vec<Tile>) -> Self {
            groups.sort();
            leftover.sort();
            Combination { groups, leftover }
        }

        pub fn with_group(mut self, group: Group) -> Self {
            self.groups.push(group);
            self.groups.sort();
            self
        }

        /// Concatenation of two independent decompositions.
        pub fn merge(&self, other: &Combination) -> Self {
            let groups = self.groups.iter().chain(&other.groups).cloned().collect();
            let leftover = self.leftover.iter().chain(&other.leftover).copied().collect();
            Combination::new(groups, leftover)
        }

        /// Total number of tiles, grouped or not.
        pub fn tile_count(&self) -> usize {
            self.groups.iter().map(Group::len).sum::<usize>() + self.leftover.len()
        }

        /// Groups of at most one tile.
        pub fn singleton_groups(&self) -> usize {
            self.groups.iter().filter(|g| g.len() <= 1).count()
        }

        pub fn has_empty_group(&self) -> bool {
            self.groups.iter().any(Group::is_empty)
        }
    }

    impl fmt::Display for Combination {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let groups: Vec<String> = self.groups.iter().map(Group::to_string).collect();
            let leftover = if self.leftover.is_empty() {
                "-".to_string()
            } else {
                tiles_to_string(&self.leftover)
            };
            write!(f, "({}) | {}", groups.join(" "), leftover)
        }
    }
}

/// # Group Constraints
///
/// Per-tile restrictions a group's tiles must all satisfy.
pub mod constraint {
    use strum::{EnumCount, IntoEnumIterator};
    use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

    use super::group::Group;
    use super::tiles::{Family, Tile};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCountMacro)]
    #[repr(u8)]
    pub enum Constraint {
        /// Always satisfied; requests an unconstrained search.
        None,
        FlushManzu,
        FlushPinzu,
        FlushSouzu,
        /// Suited 1-4.
        FirstFour,
        /// Suited 6-9.
        LastFour,
        /// Suited 1-3.
        FirstThree,
        /// Suited 4-6.
        MiddleThree,
        /// Suited 7-9.
        LastThree,
        Even,
        Symmetric,
        TerminalOrHonor,
        HonorOnly,
        TerminalOnly,
        Green,
        /// Suited 2-8.
        Ordinary,
    }

    impl Constraint {
        pub fn allows(self, tile: &Tile) -> bool {
            let suited_within = |low: u8, high: u8| !tile.is_honor() && (low..=high).contains(&tile.number);
            match self {
                Constraint::None => true,
                Constraint::FlushManzu => tile.is_compatible_with_half_flush(Family::Manzu),
                Constraint::FlushPinzu => tile.is_compatible_with_half_flush(Family::Pinzu),
                Constraint::FlushSouzu => tile.is_compatible_with_half_flush(Family::Souzu),
                Constraint::FirstFour => suited_within(1, 4),
                Constraint::LastFour => suited_within(6, 9),
                Constraint::FirstThree => suited_within(1, 3),
                Constraint::MiddleThree => suited_within(4, 6),
                Constraint::LastThree => suited_within(7, 9),
                Constraint::Even => tile.is_even(),
                Constraint::Symmetric => tile.is_symmetric(),
                Constraint::TerminalOrHonor => tile.is_terminal() || tile.is_honor(),
                Constraint::HonorOnly => tile.is_honor(),
                Constraint::TerminalOnly => tile.is_terminal(),
                Constraint::Green => tile.is_green(),
                Constraint::Ordinary => tile.is_ordinary(),
            }
        }

        pub fn is_respected_by(self, group: &Group) -> bool {
            group.tiles().iter().all(|tile| self.allows(tile))
        }

        /// The suit a flush constraint targets.
        pub fn flush_family(self) -> Option<Family> {
            match self {
                Constraint::FlushManzu => Some(Family::Manzu),
                Constraint::FlushPinzu => Some(Family::Pinzu),
                Constraint::FlushSouzu => Some(Family::Souzu),
                _ => None,
            }
        }

        /// Every tile kind the constraint allows.
        pub fn legal_tiles(self) -> impl Iterator<Item = Tile> {
            Tile::all().filter(move |tile| self.allows(tile))
        }

        /// How many copies of `tile` a hand shaped by this constraint can use.
        /// Honors in a flush only ever serve as the pair.
        pub fn copies_cap(self, tile: &Tile) -> usize {
            if tile.is_honor() && self.flush_family().is_some() { 2 } else { 4 }
        }

        fn bit(self) -> u32 {
            1 << (self as u8)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// An immutable set of constraints, narrowed level by level during search.
    pub struct ConstraintSet(u32);

    impl ConstraintSet {
        pub const EMPTY: ConstraintSet = ConstraintSet(0);

        pub fn single(constraint: Constraint) -> Self {
            ConstraintSet(constraint.bit())
        }

        /// The set holding only [`Constraint::None`].
        pub fn unconstrained() -> Self {
            ConstraintSet::single(Constraint::None)
        }

        pub fn contains(self, constraint: Constraint) -> bool {
            self.0 & constraint.bit() != 0
        }

        pub fn with(self, constraint: Constraint) -> Self {
            ConstraintSet(self.0 | constraint.bit())
        }

        pub fn union(self, other: ConstraintSet) -> Self {
            ConstraintSet(self.0 | other.0)
        }

        pub fn difference(self, other: ConstraintSet) -> Self {
            ConstraintSet(self.0 & !other.0)
        }

        pub fn is_empty(self) -> bool {
            self.0 == 0
        }

        pub fn len(self) -> usize {
            self.0.count_ones() as usize
        }

        pub fn iter(self) -> impl Iterator<Item = Constraint> {
            Constraint::iter().filter(move |c| self.contains(*c))
        }

        /// The subset still respected by every tile of `group`.
        pub fn narrowed_to(self, group: &Group) -> Self {
            self.iter().filter(|c| c.is_respected_by(group)).collect()
        }
    }

    impl FromIterator<Constraint> for ConstraintSet {
        fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
            iter.into_iter().fold(ConstraintSet::EMPTY, ConstraintSet::with)
        }
    }

    const _: () = assert!(Constraint::COUNT <= u32::BITS as usize);
}

/// # Archetypes
///
/// The target hand shapes the calculator knows about.
pub mod archetype {
    use strum_macros::{Display, EnumIter};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display)]
    pub enum Archetype {
        #[strum(serialize = "Mixed Straight")]
        MixedStraight, // 花龍
        #[strum(serialize = "Mixed Shifted")]
        MixedShifted, // 三色三步高
        #[strum(serialize = "Pure Straight")]
        PureStraight, // 清龍
        #[strum(serialize = "Pure Shifted")]
        PureShifted, // 一色三步高
        #[strum(serialize = "Triple Chows")]
        TripleChows, // 三色三同順
        #[strum(serialize = "All Pungs")]
        AllPungs, // 碰碰和
        #[strum(serialize = "Seven Pairs")]
        SevenPairs, // 七対
        #[strum(serialize = "Half Flush")]
        HalfFlush, // 混一色
        #[strum(serialize = "All Types")]
        AllTypes, // 五門斉
        #[strum(serialize = "Knitted")]
        Knitted, // 組合龍 + 字牌
        #[strum(serialize = "First or Last Four Tiles")]
        FirstOrLastFour, // 小于五 / 大于五
        #[strum(serialize = "Reversible Tiles")]
        Reversible, // 推不倒
        #[strum(serialize = "Upper, Middle or Lower Tiles")]
        UpperMiddleLower, // 全大 / 全中 / 全小
        #[strum(serialize = "All Green")]
        AllGreen, // 緑一色
        #[strum(serialize = "All Simples")]
        AllSimples, // 断幺
        #[strum(serialize = "All Even Pungs")]
        AllEvenPungs, // 全双刻
        #[strum(serialize = "All Terminals and Honors")]
        AllTerminalsAndHonors, // 混幺九
        #[strum(serialize = "All Honors")]
        AllHonors, // 字一色
        #[strum(serialize = "All Terminals")]
        AllTerminals, // 清幺九
    }
}

/// # Analysis Results
///
/// This module defines the output of an acceptance calculation.
pub mod analysis {
    use std::collections::BTreeSet;

    use super::archetype::Archetype;
    use super::group::Combination;
    use super::hand::Hand;
    use super::tiles::Tile;
    use crate::implements::statistics::SearchStatistics;

    #[derive(Debug, Clone)]
    /// Best decompositions of a hand for one archetype.
    pub struct ArchetypeResult {
        pub archetype: Archetype,
        /// Every decomposition reaching the minimal leftover.
        pub combinations: Vec<Combination>,
        /// Tiles that would bring the hand closer.
        pub acceptance: BTreeSet<Tile>,
        /// Leftover minus forced discards. Negative once the hand is complete.
        pub shanten: i32,
        pub statistics: SearchStatistics,
    }

    impl ArchetypeResult {
        /// Copies of each accepted tile still out there, in tile order.
        pub fn remaining_copies(&self, hand: &Hand) -> Vec<(Tile, usize)> {
            self.acceptance
                .iter()
                .map(|tile| (*tile, 4usize.saturating_sub(hand.count(tile))))
                .collect()
        }

        pub fn acceptance_count(&self, hand: &Hand) -> usize {
            self.remaining_copies(hand).iter().map(|(_, count)| count).sum()
        }
    }

    #[derive(Debug, Clone)]
    /// Represents the complete analysis of a hand.
    pub struct HandAnalysis {
        pub hand: Hand,
        /// One entry per archetype that produced a decomposition.
        pub results: Vec<ArchetypeResult>,
        /// Archetypes sharing the smallest shanten.
        pub best: Vec<Archetype>,
        pub discard: Option<Tile>,
        /// Report every archetype instead of the closest ones only.
        pub display_all: bool,
    }

    impl HandAnalysis {
        pub fn result(&self, archetype: Archetype) -> Option<&ArchetypeResult> {
            self.results.iter().find(|r| r.archetype == archetype)
        }

        /// Smallest shanten over all archetypes.
        pub fn shanten(&self) -> Option<i32> {
            self.results.iter().map(|r| r.shanten).min()
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    /// What to throw away next, and why.
    pub struct DiscardAdvice {
        pub tile: Tile,
        pub shanten: i32,
        pub archetypes: Vec<Archetype>,
    }
}

/// # Errors
pub mod errors {
    use thiserror::Error;

    use super::tiles::Family;

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    /// Malformed compact notation or pattern string.
    pub enum FormatError {
        #[error("unknown character {0:?}")]
        UnknownCharacter(char),
        #[error("missing family denomination for {0}")]
        MissingFamily(String),
        #[error("tile {number}{family} does not exist")]
        TileOutOfRange { number: u8, family: Family },
        #[error("pattern ends with unresolved block {0}")]
        UnterminatedPattern(String),
        #[error("expected exactly one tile, got {0:?}")]
        NotSingleTile(String),
    }

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum AnalysisError {
        #[error("invalid notation: {0}")]
        Format(#[from] FormatError),
        #[error("not enough tiles, need at least {needed} tiles but got {available}")]
        InsufficientTiles { needed: usize, available: usize },
        #[error("a constrained search needs at least one constraint")]
        EmptyConstraintList,
    }
}

//! # Hand Analyzer
//!
//! Runs every requested archetype on a hand, keeps the closest ones and
//! renders the text report.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use strum::IntoEnumIterator;

use super::acceptance_calculator::calculate_archetype;
use super::types::analysis::{ArchetypeResult, DiscardAdvice, HandAnalysis};
use super::types::archetype::Archetype;
use super::types::errors::AnalysisError;
use super::types::group::Combination;
use super::types::hand::{HAND_SIZE, Hand};
use super::types::tiles::Tile;
use crate::env_config;

/// Decompositions shown per archetype before the list is cut.
const MAX_SHOWN_COMBINATIONS: usize = 10;
const SEPARATOR: &str = "-----------------------------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Report every archetype, not only the closest ones.
    pub display_all: bool,
    /// Fan archetypes out over the rayon pool.
    pub parallel: bool,
    /// Print one diagnostic line per archetype to stderr.
    pub trace: bool,
    pub archetypes: Vec<Archetype>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            display_all: false,
            parallel: true,
            trace: false,
            archetypes: Archetype::iter().collect(),
        }
    }
}

impl AnalysisOptions {
    /// Options from `MAHJONG_DISPLAY_ALL`, `MAHJONG_SEQUENTIAL` and `MAHJONG_TRACE`.
    pub fn from_env() -> Self {
        AnalysisOptions {
            display_all: env_config::display_all(),
            parallel: !env_config::sequential(),
            trace: env_config::trace_enabled(),
            ..AnalysisOptions::default()
        }
    }
}

fn analyze_archetype(hand: &Hand, archetype: Archetype, trace: bool) -> Result<Option<ArchetypeResult>, AnalysisError> {
    let result = calculate_archetype(hand, archetype)?;
    if trace {
        match &result {
            Some(r) => eprintln!(
                "[acceptance] {}: shanten={} results={} {}",
                archetype,
                r.shanten,
                r.combinations.len(),
                r.statistics
            ),
            None => eprintln!("[acceptance] {}: no decomposition", archetype),
        }
    }
    Ok(result)
}

/// The tile most often left over by the best archetypes' decompositions.
/// Ties go to honors, then to the tile farthest from 5.
fn choose_discard(results: &[ArchetypeResult], best: &[Archetype]) -> Option<Tile> {
    let mut counts: BTreeMap<Tile, usize> = BTreeMap::new();
    results
        .iter()
        .filter(|r| best.contains(&r.archetype))
        .flat_map(|r| r.combinations.iter().flat_map(|c| c.leftover.iter()))
        .for_each(|tile| *counts.entry(*tile).or_default() += 1);

    counts
        .into_iter()
        .max_by_key(|(tile, count)| (*count, tile.is_honor(), tile.distance_from_center()))
        .map(|(tile, _)| tile)
}

/// Analyzes `hand` for every archetype of `options`.
///
/// # Errors
/// [`AnalysisError::InsufficientTiles`] for hands below 13 tiles.
pub fn analyze_hand(hand: &Hand, options: &AnalysisOptions) -> Result<HandAnalysis, AnalysisError> {
    if hand.len() < HAND_SIZE {
        return Err(AnalysisError::InsufficientTiles { needed: HAND_SIZE, available: hand.len() });
    }

    // 1. Scatter: archetypes are independent of each other
    let results: Vec<Option<ArchetypeResult>> = if options.parallel {
        options
            .archetypes
            .par_iter()
            .map(|&archetype| analyze_archetype(hand, archetype, options.trace))
            .collect::<Result<_, _>>()?
    } else {
        options
            .archetypes
            .iter()
            .map(|&archetype| analyze_archetype(hand, archetype, options.trace))
            .collect::<Result<_, _>>()?
    };
    let results: Vec<ArchetypeResult> = results.into_iter().flatten().collect();

    // 2. Gather: keep the closest archetypes
    let closest = results.iter().map(|r| r.shanten).min();
    let best: Vec<Archetype> = results
        .iter()
        .filter(|r| Some(r.shanten) == closest)
        .map(|r| r.archetype)
        .collect();

    // 3. Discard advice
    let discard = choose_discard(&results, &best);

    Ok(HandAnalysis { hand: hand.clone(), results, best, discard, display_all: options.display_all })
}

/// What to discard from `hand`, over all archetypes.
/// `None` when no decomposition leaves anything over.
pub fn get_tile_to_discard_from(hand: &Hand) -> Result<Option<DiscardAdvice>, AnalysisError> {
    let analysis = analyze_hand(hand, &AnalysisOptions::default())?;
    let (Some(tile), Some(shanten)) = (analysis.discard, analysis.shanten()) else {
        return Ok(None);
    };
    Ok(Some(DiscardAdvice { tile, shanten, archetypes: analysis.best }))
}

// --- Report ---

/// The decompositions worth printing: all of them up to the limit,
/// otherwise those with the fewest lone tiles.
fn shown_combinations(combinations: &[Combination]) -> (Vec<&Combination>, bool) {
    if combinations.len() <= MAX_SHOWN_COMBINATIONS {
        return (combinations.iter().collect(), false);
    }
    let fewest = combinations.iter().map(Combination::singleton_groups).min().unwrap_or(0);
    let shown = combinations
        .iter()
        .filter(|c| c.singleton_groups() == fewest)
        .take(MAX_SHOWN_COMBINATIONS)
        .collect();
    (shown, true)
}

fn write_section(f: &mut fmt::Formatter<'_>, hand: &Hand, result: &ArchetypeResult) -> fmt::Result {
    writeln!(f, "{SEPARATOR}")?;
    writeln!(f, "{}", result.archetype)?;

    let to_discard = hand.tiles_to_discard();
    if to_discard == 0 {
        writeln!(f, "{} away ({} results)", result.shanten, result.combinations.len())?;
    } else {
        writeln!(
            f,
            "{} away with {} tile to discard ({} results)",
            result.shanten,
            to_discard,
            result.combinations.len()
        )?;
    }

    let (shown, truncated) = shown_combinations(&result.combinations);
    for combination in shown {
        writeln!(f, "{combination}")?;
    }
    if truncated {
        writeln!(f, "...")?;
    }

    let acceptance: Vec<String> = result
        .remaining_copies(hand)
        .iter()
        .map(|(tile, remaining)| format!("{tile}@{remaining}"))
        .collect();
    writeln!(
        f,
        "Tile acceptance: {} ({} tiles)",
        acceptance.join(","),
        result.acceptance_count(hand)
    )
}

impl fmt::Display for HandAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analyzed hand : {}", self.hand)?;
        for result in &self.results {
            if self.display_all || self.best.contains(&result.archetype) {
                write_section(f, &self.hand, result)?;
            }
        }
        writeln!(f, "{SEPARATOR}")?;
        match self.discard {
            Some(tile) => writeln!(f, "Tile to discard next: {tile}"),
            None => writeln!(f),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::implements::tile_parser::parse_tile;

    fn sequential(archetypes: Vec<Archetype>) -> AnalysisOptions {
        AnalysisOptions { parallel: false, archetypes, ..AnalysisOptions::default() }
    }

    #[test]
    fn short_hand_is_rejected() {
        let hand: Hand = "123m456p".parse().unwrap();
        assert_eq!(
            analyze_hand(&hand, &AnalysisOptions::default()).err(),
            Some(AnalysisError::InsufficientTiles { needed: 13, available: 6 })
        );
    }

    #[test]
    fn discard_prefers_honors_on_ties() {
        let result = ArchetypeResult {
            archetype: Archetype::SevenPairs,
            combinations: vec![Combination::new(vec![], vec![parse_tile("5m").unwrap(), parse_tile("3z").unwrap()])],
            acceptance: Default::default(),
            shanten: 1,
            statistics: Default::default(),
        };
        assert_eq!(choose_discard(&[result], &[Archetype::SevenPairs]), parse_tile("3z").ok());
    }

    #[test]
    fn discard_prefers_edges_on_ties() {
        let result = ArchetypeResult {
            archetype: Archetype::AllPungs,
            combinations: vec![Combination::new(vec![], vec![parse_tile("4m").unwrap(), parse_tile("9p").unwrap()])],
            acceptance: Default::default(),
            shanten: 1,
            statistics: Default::default(),
        };
        assert_eq!(choose_discard(&[result], &[Archetype::AllPungs]), parse_tile("9p").ok());
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let hand: Hand = "1234789p1356m667s".parse().unwrap();
        let archetypes = vec![Archetype::PureStraight, Archetype::SevenPairs, Archetype::HalfFlush];
        let parallel = AnalysisOptions { parallel: true, ..sequential(archetypes.clone()) };
        let a = analyze_hand(&hand, &parallel).unwrap();
        let b = analyze_hand(&hand, &sequential(archetypes)).unwrap();
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.best, b.best);
    }

    #[test]
    fn report_layout() {
        let hand: Hand = "123456789m11z56p".parse().unwrap();
        let analysis = analyze_hand(&hand, &sequential(vec![Archetype::PureStraight])).unwrap();
        let report = analysis.to_string();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Analyzed hand : 123456789m56p11z");
        assert_eq!(lines[1], SEPARATOR);
        assert_eq!(lines[2], "Pure Straight");
        assert_eq!(lines[3], "0 away (1 results)");
        assert!(report.contains("Tile acceptance: 4p@4,7p@4 (8 tiles)"));
        assert_eq!(lines.last().copied(), Some(""));
    }

    #[test]
    fn fourteen_tiles_report_the_discard() {
        let hand: Hand = "123456789m11z56p9s".parse().unwrap();
        let analysis = analyze_hand(&hand, &sequential(vec![Archetype::PureStraight])).unwrap();
        assert_eq!(analysis.shanten(), Some(0));
        assert_eq!(analysis.discard, parse_tile("9s").ok());
        let report = analysis.to_string();
        assert!(report.contains("0 away with 1 tile to discard (1 results)"));
        assert!(report.ends_with("Tile to discard next: 9s\n"));
    }
}

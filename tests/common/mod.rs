//! Common test utilities shared across integration tests.
#![allow(dead_code)]

use mahjong_acceptance::implements::group::Combination;
use mahjong_acceptance::implements::hand::Hand;
use mahjong_acceptance::implements::tile_parser::parse_tiles;
use mahjong_acceptance::implements::tiles::Tile;

pub fn tiles(notation: &str) -> Vec<Tile> {
    parse_tiles(notation).unwrap_or_else(|e| panic!("bad test notation {notation:?}: {e}"))
}

pub fn hand(notation: &str) -> Hand {
    notation
        .parse()
        .unwrap_or_else(|e| panic!("bad test hand {notation:?}: {e}"))
}

/// All tiles of a combination, groups and leftover together, sorted.
pub fn flatten(combination: &Combination) -> Vec<Tile> {
    let mut all: Vec<Tile> = combination
        .groups
        .iter()
        .flat_map(|g| g.tiles().iter().copied())
        .chain(combination.leftover.iter().copied())
        .collect();
    all.sort();
    all
}

/// Every combination uses exactly the input tiles.
pub fn assert_conservation(input: &[Tile], combinations: &[Combination]) {
    let mut expected = input.to_vec();
    expected.sort();
    for combination in combinations {
        assert_eq!(flatten(combination), expected, "combination {combination} does not conserve tiles");
    }
}

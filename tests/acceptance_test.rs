mod common;

use std::collections::BTreeSet;

use common::{assert_conservation, hand, tiles};
use mahjong_acceptance::implements::archetype::Archetype;
use mahjong_acceptance::implements::constraint::Constraint;
use mahjong_acceptance::implements::errors::{AnalysisError, FormatError};
use mahjong_acceptance::implements::tiles::Tile;
use mahjong_acceptance::implements::{
    AnalysisOptions, analyze_hand, analyze_hand_from_string, calculate_archetype, get_tile_to_discard_from,
};
use strum::IntoEnumIterator;

fn sequential() -> AnalysisOptions {
    AnalysisOptions { parallel: false, ..AnalysisOptions::default() }
}

fn tile_set(notation: &str) -> BTreeSet<Tile> {
    tiles(notation).into_iter().collect()
}

/// Acceptance of `notation` for `archetype`, checking it sits at `shanten`.
fn acceptance_at(notation: &str, archetype: Archetype, shanten: i32) -> BTreeSet<Tile> {
    let result = calculate_archetype(&hand(notation), archetype).unwrap().unwrap();
    assert_eq!(result.shanten, shanten, "{archetype} for {notation}");
    assert_conservation(&tiles(notation), &result.combinations);
    result.acceptance
}

#[test]
fn every_archetype_conserves_the_hand() {
    // Fourteen tiles: every shanten is one below its leftover.
    let hand = hand("1234789p1356m667s");
    assert_eq!(hand.tiles_to_discard(), 1);
    let analysis = analyze_hand(&hand, &sequential()).unwrap();
    assert!(!analysis.results.is_empty());
    for result in &analysis.results {
        assert!(!result.combinations.is_empty(), "{} has no combination", result.archetype);
        assert_conservation(hand.tiles(), &result.combinations);
        let leftover = result.combinations[0].leftover.len();
        assert!(result.combinations.iter().all(|c| c.leftover.len() == leftover));
        assert_eq!(result.shanten, leftover as i32 - hand.tiles_to_discard() as i32);
    }
}

#[test]
fn best_archetypes_share_the_smallest_shanten() {
    let analysis = analyze_hand(&hand("1234789p1356m667s"), &sequential()).unwrap();
    let closest = analysis.shanten().unwrap();
    assert!(!analysis.best.is_empty());
    for result in &analysis.results {
        assert!(result.shanten >= closest);
        assert_eq!(analysis.best.contains(&result.archetype), result.shanten == closest);
    }
}

#[test]
fn report_lists_only_the_closest_archetypes() {
    let report = analyze_hand_from_string("123456789M11Z56P", false).unwrap();
    assert!(report.starts_with("Analyzed hand : 123456789m56p11z\n"));
    assert!(report.contains("Pure Straight\n0 away (1 results)\n"));
    assert!(!report.contains("Seven Pairs"));
}

#[test]
fn display_all_lists_every_archetype() {
    let report = analyze_hand_from_string("1234789p1356m667s", true).unwrap();
    for archetype in Archetype::iter() {
        assert!(report.contains(&format!("\n{archetype}\n")), "missing section for {archetype}");
    }
    assert!(report.contains("Tile to discard next: "));
}

#[test]
fn malformed_hands_are_rejected() {
    assert_eq!(
        analyze_hand_from_string("123m45", false),
        Err(AnalysisError::Format(FormatError::MissingFamily("45".to_string())))
    );
    assert_eq!(
        analyze_hand_from_string("123x", false),
        Err(AnalysisError::Format(FormatError::UnknownCharacter('x')))
    );
    assert_eq!(
        analyze_hand_from_string("123m", false),
        Err(AnalysisError::InsufficientTiles { needed: 13, available: 3 })
    );
}

#[test]
fn discard_advice_for_fourteen_tiles() {
    let advice = get_tile_to_discard_from(&hand("123456789m11z56p9s")).unwrap().unwrap();
    assert_eq!(advice.tile, tiles("9s")[0]);
    assert_eq!(advice.shanten, 0);
    assert!(advice.archetypes.contains(&Archetype::PureStraight));
}

#[test]
fn knitted_hand_with_honors() {
    let result = calculate_archetype(&hand("147m258p369s1234z"), Archetype::Knitted).unwrap().unwrap();
    // Nine knitted tiles and four distinct honors: one honor short.
    assert_eq!(result.shanten, 0);
    assert_eq!(result.acceptance, tiles("567z").into_iter().collect());
}

#[test]
fn all_pungs_waits_on_pairs() {
    let result = calculate_archetype(&hand("111m222p333s55z66z"), Archetype::AllPungs).unwrap().unwrap();
    assert_eq!(result.shanten, 0);
    assert_eq!(result.acceptance, tiles("56z").into_iter().collect());
}

#[test]
fn first_four_placeholder_accepts_low_tiles_only() {
    let result = calculate_archetype(&hand("111222333m4p5z6z7z"), Archetype::FirstOrLastFour).unwrap().unwrap();
    assert!(result.acceptance.iter().all(|t| !t.is_honor() && t.number <= 4));
    assert!(result.acceptance.contains(&tiles("4p")[0]));
}

#[test]
fn chow_templates_wait_on_the_open_run() {
    assert_eq!(acceptance_at("123m456p789s11z56m", Archetype::MixedStraight, 0), tile_set("47m"));
    assert_eq!(acceptance_at("123m234p345s11z56m", Archetype::MixedShifted, 0), tile_set("47m"));
    assert_eq!(acceptance_at("123m123p123s11z56m", Archetype::TripleChows, 0), tile_set("47m"));
}

#[test]
fn restricted_tile_sets_wait_on_both_pairs() {
    assert_eq!(acceptance_at("123345p888s99s55z", Archetype::Reversible, 0), tile_set("9s5z"));
    assert_eq!(acceptance_at("234234s666s88s66z", Archetype::AllGreen, 0), tile_set("8s6z"));
    assert_eq!(acceptance_at("234m345p456s77s88m", Archetype::AllSimples, 0), tile_set("8m7s"));
}

#[test]
fn upper_middle_lower_stays_in_its_band() {
    let acceptance = acceptance_at("123m123p123s222m1p", Archetype::UpperMiddleLower, 0);
    assert!(acceptance.contains(&tiles("1p")[0]));
    assert!(!acceptance.contains(&tiles("4p")[0]));
    assert!(acceptance.iter().all(|t| Constraint::FirstThree.allows(t)));
}

#[test]
fn pung_archetypes_wait_on_their_pairs() {
    assert_eq!(acceptance_at("222m444p666s88s22p", Archetype::AllEvenPungs, 0), tile_set("2p8s"));
    assert_eq!(acceptance_at("111z222z333z44z55z", Archetype::AllHonors, 0), tile_set("45z"));
    assert_eq!(acceptance_at("111m999m111p99p11s", Archetype::AllTerminals, 0), tile_set("9p1s"));
    assert_eq!(
        acceptance_at("111m999p111z22z99s", Archetype::AllTerminalsAndHonors, 0),
        tile_set("9s2z")
    );
}

#[test]
fn pung_archetypes_drop_tiles_outside_their_set() {
    // The stray 9m is left over, but an honors hand cannot use it.
    assert_eq!(acceptance_at("111z222z333z44z5z9m", Archetype::AllHonors, 1), tile_set("45z"));
}

mod common;

use common::{assert_conservation, tiles};
use mahjong_acceptance::implements::constraint::Constraint;
use mahjong_acceptance::implements::errors::AnalysisError;
use mahjong_acceptance::implements::statistics::Counters;
use mahjong_acceptance::implements::{GroupFinder, Requirements, all_groups_for, all_groups_for_with_constraints};

#[test]
fn three_runs_from_broken_bamboo() {
    let input = tiles("134679s1222z");
    let found = all_groups_for(&input, 3, 0, 0).unwrap();

    assert!(!found.is_empty());
    assert_conservation(&input, &found);
    // No three consecutive bamboo: every run is partial, every honor is left over.
    for combination in &found {
        assert_eq!(combination.leftover.len(), 4);
        assert!(combination.leftover.iter().all(|t| t.is_honor()));
        assert!(combination.groups.iter().all(|g| g.len() == 2));
    }
}

#[test]
fn insufficient_tiles_for_four_triplets_and_a_pair() {
    let input = tiles("11122m");
    assert_eq!(
        all_groups_for(&input, 0, 4, 1),
        Err(AnalysisError::InsufficientTiles { needed: 13, available: 5 })
    );
}

#[test]
fn constrained_search_reports_every_constraint() {
    let input = tiles("123m789p11z");
    let constraints = [Constraint::FlushManzu, Constraint::FlushPinzu, Constraint::HonorOnly];
    let found = all_groups_for_with_constraints(&input, 2, 0, 1, &constraints).unwrap();

    assert_eq!(found.len(), 3);
    for constraint in constraints {
        let best = &found[&constraint];
        assert!(!best.is_empty());
        assert_conservation(&input, best);
        let leftover = best[0].leftover.len();
        assert!(best.iter().all(|c| c.leftover.len() == leftover));
    }
    // Manzu flush keeps 123m and the honor pair; the pinzu run is left over.
    assert_eq!(found[&Constraint::FlushManzu][0].leftover, tiles("789p"));
    assert_eq!(found[&Constraint::FlushPinzu][0].leftover, tiles("123m"));
}

#[test]
fn constrained_groups_respect_their_constraint() {
    let input = tiles("1234m6789p55z");
    let constraints = [Constraint::FirstFour, Constraint::LastFour];
    let found = all_groups_for_with_constraints(&input, 2, 0, 1, &constraints).unwrap();
    for (constraint, combinations) in &found {
        for combination in combinations {
            for group in &combination.groups {
                assert!(constraint.is_respected_by(group), "{group} breaks {constraint:?}");
            }
        }
    }
}

#[test]
fn finder_accumulates_statistics() {
    let mut finder = GroupFinder::new();
    let input = tiles("123456789m123p11z");
    let found = finder.all_groups_for(&input, Requirements::new(4, 0, 1)).unwrap();
    assert!(found.iter().all(|c| c.leftover.is_empty()));
    let nodes = finder.statistics().get(Counters::Nodes);
    assert!(nodes > 0);

    finder.all_groups_for(&input, Requirements::new(0, 4, 1)).unwrap();
    assert!(finder.statistics().get(Counters::Nodes) > nodes);
}

pub mod types;
pub use types::*;
pub mod tile_parser;
pub use tile_parser::*;
pub mod proto_groups;
pub mod statistics;
pub mod group_finder;
pub use group_finder::*;
pub mod pattern_generator;
pub use pattern_generator::{PatternGenerator, pattern_generator};
pub mod acceptance_calculator;
pub use acceptance_calculator::calculate_archetype;
pub mod hand_analyzer;
pub use hand_analyzer::*;

use crate::implements::errors::AnalysisError;
use crate::implements::hand::Hand;

/// Parses a hand in compact notation (any case) and returns the text report.
///
/// With `display_all` every archetype gets a section, otherwise only the
/// closest ones do.
pub fn analyze_hand_from_string(hand: &str, display_all: bool) -> Result<String, AnalysisError> {
    // 1. Parse the hand
    let hand: Hand = hand.parse()?;

    // 2. Analyze every archetype
    let options = AnalysisOptions { display_all, ..AnalysisOptions::default() };
    let analysis = analyze_hand(&hand, &options)?;

    // 3. Render the report
    Ok(analysis.to_string())
}

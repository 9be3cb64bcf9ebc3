use mahjong_acceptance::env_config;
use mahjong_acceptance::implements::errors::AnalysisError;
use mahjong_acceptance::implements::hand::Hand;
use mahjong_acceptance::implements::{AnalysisOptions, analyze_hand};

/// A helper function to create the example hand.
fn create_example_hand() -> Result<Hand, AnalysisError> {
    // 14 tiles, no honors: 1234789p 1356m 667s
    "1234789p1356m667s".parse()
}

fn main() {
    println!("--- Mahjong Tile Acceptance Calculator ---");

    // 1. Configure the worker pool and the report
    let threads = env_config::init_thread_pool();
    let options = AnalysisOptions::from_env();
    if options.trace {
        eprintln!("[config] threads={} parallel={} display_all={}", threads, options.parallel, options.display_all);
    }

    // 2. Get the hand: first argument, or the example
    let hand = match std::env::args().nth(1) {
        Some(notation) => notation.parse::<Hand>(),
        None => create_example_hand(),
    };

    // 3. Analyze and print
    match hand.and_then(|hand| analyze_hand(&hand, &options)) {
        Ok(analysis) => {
            // Uses the `Display` implementation in `hand_analyzer.rs`
            println!("{}", analysis);
        }
        Err(error) => {
            println!("!!! Error analyzing hand: {} !!!", error);
            std::process::exit(1);
        }
    }
}

//! Mahjong tile acceptance calculator.
//!
//! Given a hand in compact notation (`123m456p789s11z`), finds how far it is
//! from each supported hand shape, which draws bring it closer and which
//! tile to throw away.

pub mod env_config;
pub mod implements;
pub use implements::*;

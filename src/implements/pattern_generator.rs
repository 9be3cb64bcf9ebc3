//! # Pattern Generator
//!
//! Expands a tile template with wildcards into every concrete compact
//! string it stands for.
//!
//! * Digits and `m`, `p`, `s`, `z` are literal.
//! * An uppercase letter is a number wildcard. Letters keep their
//!   alphabetical distance: if `A` is 3 then `C` is 5, everywhere in the
//!   template.
//! * Any other lowercase letter is a suit wildcard. Each one binds to a
//!   suit no other suit wildcard has taken.
//!
//! `"ABCaBCDbCDEc"` thus yields every mixed shifted chow shape, e.g.
//! `"123m234p345s"`.

use super::types::errors::FormatError;
use super::types::tiles::Family;

const LETTERS: usize = 26;

#[derive(Debug, Clone)]
/// One partial expansion waiting on the stack.
struct Frame {
    position: usize,
    resolved: String,
    /// Digits and number wildcards seen since the last family letter.
    block: Vec<char>,
    suits: [Option<Family>; LETTERS],
    numbers: [Option<u8>; LETTERS],
}

impl Frame {
    fn start() -> Self {
        Frame {
            position: 0,
            resolved: String::new(),
            block: vec![],
            suits: [None; LETTERS],
            numbers: [None; LETTERS],
        }
    }

    fn free_suits(&self) -> impl Iterator<Item = Family> + '_ {
        Family::SUITED.into_iter().filter(|family| !self.suits.contains(&Some(*family)))
    }

    /// Value the smallest wildcard of the block must take, if already fixed
    /// by earlier bindings.
    fn anchored_value(&self, lowest: usize) -> Option<i16> {
        if let Some(value) = self.numbers[lowest] {
            return Some(value as i16);
        }
        let (bound, value) = self
            .numbers
            .iter()
            .enumerate()
            .find_map(|(letter, value)| value.map(|v| (letter, v)))?;
        Some(value as i16 + lowest as i16 - bound as i16)
    }

    /// Closes the current block with `family`. Yields one frame per
    /// admissible value of its number wildcards.
    fn close_block(self, family: Family) -> Vec<Frame> {
        let letters: Vec<usize> = self
            .block
            .iter()
            .filter(|c| c.is_ascii_uppercase())
            .map(|c| wildcard_index(*c))
            .collect();
        let (Some(&lowest), Some(&highest)) = (letters.iter().min(), letters.iter().max()) else {
            return self.resolve_block(family, 0, 0).into_iter().collect();
        };

        let max_number = family.max_number() as i16;
        let span = (highest - lowest) as i16;
        match self.anchored_value(lowest) {
            Some(base) => self.resolve_block(family, lowest, base).into_iter().collect(),
            None => (1..=max_number - span)
                .filter_map(|base| self.resolve_block(family, lowest, base))
                .collect(),
        }
    }

    /// Writes out the block with `lowest` set to `base`. `None` when a
    /// value leaves the family's range.
    fn resolve_block(&self, family: Family, lowest: usize, base: i16) -> Option<Frame> {
        let mut next = self.clone();
        for c in &self.block {
            let value = if c.is_ascii_uppercase() {
                let letter = wildcard_index(*c);
                let value = match next.numbers[letter] {
                    Some(value) => value as i16,
                    None => base + letter as i16 - lowest as i16,
                };
                if !(1..=family.max_number() as i16).contains(&value) {
                    return None;
                }
                next.numbers[letter] = Some(value as u8);
                value as u8
            } else {
                c.to_digit(10)? as u8
            };
            next.resolved.push(char::from(b'0' + value));
        }
        next.resolved.push(family.letter());
        next.block.clear();
        next.position += 1;
        Some(next)
    }
}

fn wildcard_index(c: char) -> usize {
    (c.to_ascii_lowercase() as u8 - b'a') as usize
}

enum Step {
    Done(String),
    Branch(Vec<Frame>),
}

/// Lazy iterator over the expansions of a template. Expansions come out in
/// suit order m, p, s and ascending number shifts.
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    pattern: Vec<char>,
    stack: Vec<Frame>,
}

impl PatternGenerator {
    fn step(&self, mut frame: Frame) -> Step {
        while let Some(&c) = self.pattern.get(frame.position) {
            match c {
                '1'..='9' | 'A'..='Z' => {
                    frame.block.push(c);
                    frame.position += 1;
                }
                _ => {
                    if let Some(family) = Family::from_letter(c) {
                        return Step::Branch(frame.close_block(family));
                    }
                    let letter = wildcard_index(c);
                    if let Some(family) = frame.suits[letter] {
                        return Step::Branch(frame.close_block(family));
                    }
                    let branches = frame
                        .free_suits()
                        .flat_map(|family| {
                            let mut bound = frame.clone();
                            bound.suits[letter] = Some(family);
                            bound.close_block(family)
                        })
                        .collect();
                    return Step::Branch(branches);
                }
            }
        }
        Step::Done(frame.resolved)
    }
}

impl Iterator for PatternGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(frame) = self.stack.pop() {
            match self.step(frame) {
                Step::Done(resolved) if !resolved.is_empty() => return Some(resolved),
                Step::Done(_) => (),
                Step::Branch(branches) => self.stack.extend(branches.into_iter().rev()),
            }
        }
        None
    }
}

/// Validates `pattern` and returns the lazy expansion of it.
///
/// # Errors
/// * [`FormatError::UnknownCharacter`] for anything that is not a digit
///   1-9 or an ASCII letter.
/// * [`FormatError::UnterminatedPattern`] when digits or number wildcards
///   trail after the last family letter or suit wildcard.
pub fn pattern_generator(pattern: &str) -> Result<PatternGenerator, FormatError> {
    let pattern: Vec<char> = pattern.chars().collect();
    if let Some(&c) = pattern.iter().find(|c| !matches!(c, '1'..='9' | 'a'..='z' | 'A'..='Z')) {
        return Err(FormatError::UnknownCharacter(c));
    }

    let tail_start = pattern.iter().rposition(|c| c.is_ascii_lowercase()).map_or(0, |i| i + 1);
    if tail_start < pattern.len() {
        return Err(FormatError::UnterminatedPattern(pattern[tail_start..].iter().collect()));
    }

    Ok(PatternGenerator { pattern, stack: vec![Frame::start()] })
}

#[cfg(test)]
mod test {
    use super::*;

    fn expand(pattern: &str) -> Vec<String> {
        pattern_generator(pattern).unwrap().collect()
    }

    #[test]
    fn literal_pattern_yields_itself() {
        assert_eq!(expand("123s456p789m"), vec!["123s456p789m"]);
    }

    #[test]
    fn empty_pattern_yields_nothing() {
        assert!(expand("").is_empty());
    }

    #[test]
    fn number_wildcards_shift() {
        let found = expand("ABCm");
        assert_eq!(found.len(), 7);
        assert_eq!(found.first().map(String::as_str), Some("123m"));
        assert_eq!(found.last().map(String::as_str), Some("789m"));
    }

    #[test]
    fn honors_stay_in_range() {
        assert_eq!(expand("AAz").len(), 7);
        assert_eq!(expand("ABCz").len(), 5);
    }

    #[test]
    fn suit_wildcards_take_distinct_suits() {
        let found = expand("1a1b1c");
        assert_eq!(found.len(), 6);
        assert_eq!(found[0], "1m1p1s");
        for pattern in &found {
            let letters: Vec<char> = pattern.chars().filter(|c| c.is_ascii_lowercase()).collect();
            assert_ne!(letters[0], letters[1]);
            assert_ne!(letters[1], letters[2]);
            assert_ne!(letters[0], letters[2]);
        }
    }

    #[test]
    fn repeated_suit_wildcard_reuses_binding() {
        let found = expand("1a2a");
        assert_eq!(found, vec!["1m2m", "1p2p", "1s2s"]);
    }

    #[test]
    fn bindings_carry_across_blocks() {
        let found = expand("ABCaBCDbCDEc");
        // Six suit orders times five shifts.
        assert_eq!(found.len(), 30);
        assert!(found.contains(&"123m234p345s".to_string()));
        assert!(found.contains(&"567s678p789m".to_string()));
        assert!(!found.iter().any(|p| p.contains('0')));
    }

    #[test]
    fn out_of_range_shift_is_dropped() {
        // G is fixed by the first block; the second block would need 10.
        assert_eq!(expand("AGmGHIp"), vec!["17m789p"]);
    }

    #[test]
    fn malformed_patterns() {
        assert_eq!(pattern_generator("12#m").err(), Some(FormatError::UnknownCharacter('#')));
        assert_eq!(pattern_generator("ABCmDE").err(), Some(FormatError::UnterminatedPattern("DE".to_string())));
    }
}

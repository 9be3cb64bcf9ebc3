//! Compact tile notation: runs of digits closed by a family letter,
//! e.g. `123m456p789s11z`.

use super::types::errors::FormatError;
use super::types::tiles::{Family, Tile};

/// Parses compact notation into tiles, in input order.
///
/// Whitespace is skipped. A family letter with no digits before it is
/// accepted and adds nothing.
///
/// # Errors
/// * [`FormatError::UnknownCharacter`] for anything but 1-9, `m`, `p`, `s`, `z`.
/// * [`FormatError::MissingFamily`] when digits trail at the end.
/// * [`FormatError::TileOutOfRange`] for honors above 7.
pub fn parse_tiles(s: &str) -> Result<Vec<Tile>, FormatError> {
    let mut tiles = Vec::with_capacity(s.len());
    let mut pending: Vec<u8> = vec![];

    for c in s.chars() {
        match c {
            '1'..='9' => pending.push(c as u8 - b'0'),
            _ if c.is_whitespace() => (),
            _ => {
                let family = Family::from_letter(c).ok_or(FormatError::UnknownCharacter(c))?;
                for number in pending.drain(..) {
                    tiles.push(Tile::try_new(number, family)?);
                }
            }
        }
    }

    if !pending.is_empty() {
        let digits = pending.iter().map(|n| char::from(b'0' + n)).collect();
        return Err(FormatError::MissingFamily(digits));
    }
    Ok(tiles)
}

/// Parses exactly one tile, e.g. `5s`.
///
/// # Errors
/// Those of [`parse_tiles`], or [`FormatError::NotSingleTile`] when the
/// notation holds zero or several tiles.
pub fn parse_tile(s: &str) -> Result<Tile, FormatError> {
    match parse_tiles(s)?.as_slice() {
        [tile] => Ok(*tile),
        _ => Err(FormatError::NotSingleTile(s.to_string())),
    }
}

/// Formats tiles in canonical compact notation: families in m, p, s, z
/// order, numbers ascending within each family.
pub fn tiles_to_string(tiles: &[Tile]) -> String {
    let mut sorted = tiles.to_vec();
    sorted.sort();

    let mut out = String::with_capacity(sorted.len() + 4);
    for family in Family::ALL {
        let before = out.len();
        sorted
            .iter()
            .filter(|t| t.family == family)
            .for_each(|t| out.push(char::from(b'0' + t.number)));
        if out.len() > before {
            out.push(family.letter());
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_simple_hand() {
        let tiles = parse_tiles("123m 11z").unwrap();
        assert_eq!(
            tiles,
            vec![
                Tile::new(1, Family::Manzu),
                Tile::new(2, Family::Manzu),
                Tile::new(3, Family::Manzu),
                Tile::new(1, Family::Jihai),
                Tile::new(1, Family::Jihai),
            ]
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_tiles("123x"), Err(FormatError::UnknownCharacter('x')));
        assert_eq!(parse_tiles("0m"), Err(FormatError::UnknownCharacter('0')));
        assert_eq!(parse_tiles("12m34"), Err(FormatError::MissingFamily("34".to_string())));
        assert_eq!(
            parse_tiles("8z"),
            Err(FormatError::TileOutOfRange { number: 8, family: Family::Jihai })
        );
    }

    #[test]
    fn parse_empty() {
        assert!(parse_tiles("").unwrap().is_empty());
        assert!(parse_tiles("m").unwrap().is_empty());
    }

    #[test]
    fn format_is_canonical() {
        let tiles = parse_tiles("7z1s9m3p2m").unwrap();
        assert_eq!(tiles_to_string(&tiles), "29m3p1s7z");
        assert_eq!(tiles_to_string(&[]), "");
    }

    #[test]
    fn single_tile() {
        assert_eq!(parse_tile("5s"), Ok(Tile::new(5, Family::Souzu)));
        assert_eq!(parse_tile("55s"), Err(FormatError::NotSingleTile("55s".to_string())));
        assert_eq!(parse_tile("s"), Err(FormatError::NotSingleTile("s".to_string())));
        assert_eq!(parse_tile("5"), Err(FormatError::MissingFamily("5".to_string())));
    }
}

//! Wire encoding of dots, placements and chance tiles.
//!
//! Rows map to `'A'..='P'`, columns to `'a'..='t'`; a player move is the
//! anchor dot plus an orientation character, a chance move is six digit
//! characters naming a color permutation.

use super::tiles::TilePermutation;
use super::{Color, COLS, ROWS, TILE_DOTS};
use crate::{PaintboxError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_char(self) -> char {
        match self {
            Orientation::Horizontal => 'h',
            Orientation::Vertical => 'v',
        }
    }

    pub fn from_char(ch: char) -> Result<Self> {
        match ch {
            'h' => Ok(Orientation::Horizontal),
            'v' => Ok(Orientation::Vertical),
            _ => Err(PaintboxError::MalformedToken(ch.to_string())),
        }
    }
}

#[inline]
pub fn dot_at(row: usize, col: usize) -> u16 {
    (row * COLS + col) as u16
}

pub fn show_dot(dot: u16) -> String {
    let row = dot as usize / COLS;
    let col = dot as usize % COLS;
    let mut s = String::with_capacity(2);
    s.push((b'A' + row as u8) as char);
    s.push((b'a' + col as u8) as char);
    s
}

pub fn parse_dot(s: &str) -> Result<u16> {
    let mut chars = s.chars();
    let (Some(row_ch), Some(col_ch)) = (chars.next(), chars.next()) else {
        return Err(PaintboxError::MalformedToken(s.to_string()));
    };
    let row = (row_ch as i32) - ('A' as i32);
    let col = (col_ch as i32) - ('a' as i32);
    if !(0..ROWS as i32).contains(&row) || !(0..COLS as i32).contains(&col) {
        return Err(PaintboxError::MalformedToken(s.to_string()));
    }
    Ok(dot_at(row as usize, col as usize))
}

pub fn parse_color(ch: char) -> Result<Color> {
    match ch {
        '1'..='6' => Ok(ch as u8 - b'0'),
        _ => Err(PaintboxError::MalformedToken(ch.to_string())),
    }
}

pub fn color_char(color: Color) -> char {
    (b'0' + color) as char
}

/// A geometric placement choice: anchor dot plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMove {
    pub dot: u16,
    pub orientation: Orientation,
}

impl fmt::Display for PlayerMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", show_dot(self.dot), self.orientation.as_char())
    }
}

/// The drawn color permutation for a ply.
pub type ChanceMove = TilePermutation;

pub fn parse_chance(s: &str) -> Result<ChanceMove> {
    if s.len() != TILE_DOTS || !s.is_ascii() {
        return Err(PaintboxError::MalformedToken(s.to_string()));
    }
    let mut tile: ChanceMove = [0; TILE_DOTS];
    for (slot, ch) in tile.iter_mut().zip(s.chars()) {
        *slot = parse_color(ch)?;
    }
    Ok(tile)
}

/// Split a 9-character token `<dot><permutation><orientation>` into the
/// chance tile the mover held and the placement they made.
pub fn parse_moves(s: &str) -> Result<(ChanceMove, PlayerMove)> {
    if s.len() != 9 || !s.is_ascii() {
        return Err(PaintboxError::MalformedToken(s.to_string()));
    }
    let dot = parse_dot(&s[0..2])?;
    let chance = parse_chance(&s[2..8])?;
    let orientation = Orientation::from_char(s[8..].chars().next().unwrap_or('?'))?;
    Ok((chance, PlayerMove { dot, orientation }))
}

pub fn format_moves(chance: &ChanceMove, mv: PlayerMove) -> String {
    let digits: String = chance.iter().map(|&c| color_char(c)).collect();
    format!(
        "{}{}{}",
        show_dot(mv.dot),
        digits,
        mv.orientation.as_char()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TOTAL_DOTS;

    #[test]
    fn test_dot_roundtrip() {
        for dot in 0..TOTAL_DOTS as u16 {
            assert_eq!(parse_dot(&show_dot(dot)).unwrap(), dot);
        }
    }

    #[test]
    fn test_parse_dot_known_values() {
        assert_eq!(parse_dot("Aa").unwrap(), 0);
        assert_eq!(parse_dot("Hh").unwrap(), 147);
        assert_eq!(parse_dot("Pt").unwrap(), 319);
    }

    #[test]
    fn test_parse_dot_rejects_out_of_range() {
        assert!(parse_dot("Qa").is_err());
        assert!(parse_dot("Au").is_err());
        assert!(parse_dot("a").is_err());
    }

    #[test]
    fn test_moves_roundtrip() {
        let token = "Hh123456h";
        let (chance, mv) = parse_moves(token).unwrap();
        assert_eq!(chance, [1, 2, 3, 4, 5, 6]);
        assert_eq!(mv.dot, parse_dot("Hh").unwrap());
        assert_eq!(mv.orientation, Orientation::Horizontal);
        assert_eq!(format_moves(&chance, mv), token);
    }

    #[test]
    fn test_parse_moves_rejects_bad_tokens() {
        assert!(parse_moves("Hh12345h").is_err());
        assert!(parse_moves("Hh123457h").is_err());
        assert!(parse_moves("Hh123456x").is_err());
    }

    #[test]
    fn test_player_move_display() {
        let mv = PlayerMove {
            dot: parse_dot("Bc").unwrap(),
            orientation: Orientation::Vertical,
        };
        assert_eq!(mv.to_string(), "Bcv");
    }

    #[test]
    fn test_parse_color_bounds() {
        assert_eq!(parse_color('1').unwrap(), 1);
        assert_eq!(parse_color('6').unwrap(), 6);
        assert!(parse_color('0').is_err());
        assert!(parse_color('7').is_err());
    }
}

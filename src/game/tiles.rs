//! Precomputed placement geometry and the color-permutation table.
//!
//! A placement covers two parallel runs of six dots. Vertical placements
//! put the "top" run in the right-hand column and the "bottom" run,
//! reversed, in the anchor column; horizontal placements put the top run
//! in the anchor row and the reversed bottom run one row below. Sibling
//! pair *i* therefore receives the *i*-th color of the drawn permutation
//! on both of its dots.

use super::bitboard::Bitboard;
use super::moves::{dot_at, parse_dot, Orientation, PlayerMove};
use super::{Color, COLS, ROWS, TILE_DOTS, TOTAL_DOTS};
use std::sync::OnceLock;

/// Placements that fit the 16×20 grid: 209 vertical + 225 horizontal.
pub const ALL_TILES_COUNT: usize = 434;
pub const PERMUTATION_COUNT: usize = 720;

pub type TilePermutation = [Color; TILE_DOTS];

#[derive(Debug)]
pub struct TileInfo {
    /// Pair *i* gets the *i*-th color of the current permutation.
    pub siblings: [(u16, u16); TILE_DOTS],
    /// The 12 covered dots.
    pub bitboard: Bitboard,
    /// Orthogonal neighbors of the covered dots, minus the covered dots.
    pub neighbors: Bitboard,
    pub code: u16,
    pub dot: u16,
    pub orientation: Orientation,
}

impl TileInfo {
    pub fn player_move(&self) -> PlayerMove {
        PlayerMove {
            dot: self.dot,
            orientation: self.orientation,
        }
    }

    #[inline]
    pub fn count_matches(&self, filled: &Bitboard) -> u32 {
        self.bitboard.count_matches(filled)
    }

    #[inline]
    pub fn adjacent_to(&self, filled: &Bitboard) -> bool {
        self.neighbors.any_matches(filled)
    }
}

pub struct TileRegistry {
    infos: Vec<TileInfo>,
    vertical: Vec<Option<u16>>,
    horizontal: Vec<Option<u16>>,
    center: u16,
}

impl TileRegistry {
    pub fn all(&self) -> &[TileInfo] {
        &self.infos
    }

    #[inline]
    pub fn by_code(&self, code: u16) -> &TileInfo {
        &self.infos[code as usize]
    }

    /// Placement anchored at `dot`, if it fits the grid.
    pub fn get(&self, dot: u16, orientation: Orientation) -> Option<&TileInfo> {
        let table = match orientation {
            Orientation::Vertical => &self.vertical,
            Orientation::Horizontal => &self.horizontal,
        };
        table
            .get(dot as usize)
            .copied()
            .flatten()
            .map(|code| self.by_code(code))
    }

    /// The opening placement: horizontal at "Hh".
    pub fn center(&self) -> &TileInfo {
        self.by_code(self.center)
    }
}

fn valid_dot(row: i32, col: i32) -> bool {
    (0..ROWS as i32).contains(&row) && (0..COLS as i32).contains(&col)
}

fn orthogonal_neighbors(cover: &Bitboard) -> Bitboard {
    let mut res = Bitboard::new();
    for dot in cover.iter_ones() {
        let row = (dot as usize / COLS) as i32;
        let col = (dot as usize % COLS) as i32;
        for (r, c) in [(row + 1, col), (row - 1, col), (row, col + 1), (row, col - 1)] {
            if valid_dot(r, c) {
                res.set(dot_at(r as usize, c as usize));
            }
        }
    }
    res & !*cover
}

/// Build one placement if both six-dot runs fit the grid.
fn build_tile(anchor: u16, orientation: Orientation, code: u16) -> Option<TileInfo> {
    let row = anchor as usize / COLS;
    let col = anchor as usize % COLS;

    let run = |i: usize| match orientation {
        Orientation::Vertical => ((row + i) as i32, col as i32 + 1),
        Orientation::Horizontal => (row as i32, (col + i) as i32),
    };
    let base = |i: usize| match orientation {
        Orientation::Vertical => ((row + i) as i32, col as i32),
        Orientation::Horizontal => (row as i32 + 1, (col + i) as i32),
    };

    let mut top = [0u16; TILE_DOTS];
    let mut bottom = [0u16; TILE_DOTS];
    let mut cover = Bitboard::new();
    for i in 0..TILE_DOTS {
        let (tr, tc) = run(i);
        let (br, bc) = base(i);
        if !valid_dot(tr, tc) || !valid_dot(br, bc) {
            return None;
        }
        top[i] = dot_at(tr as usize, tc as usize);
        bottom[i] = dot_at(br as usize, bc as usize);
        cover.set(top[i]);
        cover.set(bottom[i]);
    }

    let mut siblings = [(0u16, 0u16); TILE_DOTS];
    for i in 0..TILE_DOTS {
        siblings[i] = (top[i], bottom[TILE_DOTS - 1 - i]);
    }

    Some(TileInfo {
        siblings,
        bitboard: cover,
        neighbors: orthogonal_neighbors(&cover),
        code,
        dot: anchor,
        orientation,
    })
}

fn build_registry() -> TileRegistry {
    let mut infos = Vec::with_capacity(ALL_TILES_COUNT);
    let mut vertical = vec![None; TOTAL_DOTS];
    let mut horizontal = vec![None; TOTAL_DOTS];

    // vertical placements first, then horizontal, both by anchor order;
    // codes must stay stable across runs
    for orientation in [Orientation::Vertical, Orientation::Horizontal] {
        for anchor in 0..TOTAL_DOTS as u16 {
            let code = infos.len() as u16;
            if let Some(info) = build_tile(anchor, orientation, code) {
                match orientation {
                    Orientation::Vertical => vertical[anchor as usize] = Some(code),
                    Orientation::Horizontal => horizontal[anchor as usize] = Some(code),
                }
                infos.push(info);
            }
        }
    }

    let center_dot = parse_dot("Hh").unwrap_or_default();
    let center = horizontal[center_dot as usize].unwrap_or_default();

    TileRegistry {
        infos,
        vertical,
        horizontal,
        center,
    }
}

pub fn tiles() -> &'static TileRegistry {
    static TILES: OnceLock<TileRegistry> = OnceLock::new();
    TILES.get_or_init(build_registry)
}

fn next_permutation(perm: &mut TilePermutation) -> bool {
    let mut i = perm.len() - 1;
    while i > 0 && perm[i - 1] >= perm[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = perm.len() - 1;
    while perm[j] <= perm[i - 1] {
        j -= 1;
    }
    perm.swap(i - 1, j);
    perm[i..].reverse();
    true
}

/// All 720 color permutations in lexicographic order.
pub fn permutations() -> &'static [TilePermutation] {
    static PERMUTATIONS: OnceLock<Vec<TilePermutation>> = OnceLock::new();
    PERMUTATIONS.get_or_init(|| {
        let mut perm: TilePermutation = [1, 2, 3, 4, 5, 6];
        let mut res = Vec::with_capacity(PERMUTATION_COUNT);
        loop {
            res.push(perm);
            if !next_permutation(&mut perm) {
                break;
            }
        }
        res
    })
}

pub fn find_tile_index(tile: &TilePermutation) -> Option<u16> {
    permutations().binary_search(tile).ok().map(|i| i as u16)
}

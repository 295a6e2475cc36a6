//! Mutable game state and move execution.

use super::bitboard::Bitboard;
use super::moves::{parse_moves, ChanceMove, PlayerMove};
use super::tile_set::TileSet;
use super::tiles::{find_tile_index, permutations, tiles, TileInfo, TilePermutation};
use super::zobrist::keys;
use super::{color_index, Color, Player, COLS, MAX_COLORS, TILE_DOTS, TOTAL_DOTS, WHITE};
use crate::utils::rng::FastRandom;
use crate::{PaintboxError, Result};
use std::fmt::Write as _;

/// A placement may repaint at most this many already-filled dots.
pub const MAX_OVERLAPS: u32 = 4;

/// 16-bit row-occupancy bitmap for one (color, column) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Column(pub u16);

impl Column {
    #[inline]
    pub fn set(&mut self, row: usize) {
        self.0 |= 1 << row;
    }

    #[inline]
    pub fn unset(&mut self, row: usize) {
        self.0 &= !(1 << row);
    }

    #[inline]
    pub fn test(&self, row: usize) -> bool {
        self.0 & (1 << row) != 0
    }

    #[inline]
    pub fn test_pair(&self, r0: usize, r1: usize) -> bool {
        self.test(r0) && self.test(r1)
    }
}

/// Compressed fingerprint for the transposition table. The column bitmaps
/// determine the colors exactly, so equality on columns + tile + side is
/// exact game-state identity; the Zobrist value only spreads the buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionKey {
    pub columns: [[Column; COLS]; MAX_COLORS],
    pub hash: u64,
    pub tile_index: Option<u16>,
    pub player: Player,
}

impl std::hash::Hash for PositionKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

#[derive(Debug, Clone)]
pub struct Position {
    pub colors: [Color; TOTAL_DOTS],
    pub filled: Bitboard,
    pub columns: [[Column; COLS]; MAX_COLORS],
    pub tile: TilePermutation,
    pub tile_index: Option<u16>,
    pub zobrist_hash: u64,
    pub turn: u32,
    pub player: Player,
    /// Working list of placements still worth proposing. Entries whose
    /// overlap ever exceeds [`MAX_OVERLAPS`] are removed for good: overlap
    /// only grows with `filled`.
    pub candidates: Vec<&'static TileInfo>,
}

impl Position {
    /// Board with no dot painted and every placement still a candidate.
    pub fn empty() -> Self {
        Self {
            colors: [WHITE; TOTAL_DOTS],
            filled: Bitboard::new(),
            columns: [[Column::default(); COLS]; MAX_COLORS],
            tile: [WHITE; TILE_DOTS],
            tile_index: None,
            zobrist_hash: 0,
            turn: 0,
            player: Player::One,
            candidates: tiles().all().iter().collect(),
        }
    }

    /// Build the opening position from the referee's 9-character starting
    /// descriptor: the drawn permutation is honored, the placement is the
    /// center tile, and no turn is consumed.
    pub fn new(descriptor: &str) -> Result<Self> {
        let (chance, _) = parse_moves(descriptor)?;
        let mut pos = Self::empty();
        pos.set_chance_move(&chance)?;
        let center = tiles().center();
        for i in 0..TILE_DOTS {
            pos.paint_sibling(center, i);
        }
        Ok(pos)
    }

    fn update_tile_index(&mut self, index: u16) {
        if self.tile_index == Some(index) {
            return;
        }
        let keys = keys();
        if let Some(old) = self.tile_index {
            self.zobrist_hash ^= keys.tile[old as usize];
        }
        self.zobrist_hash ^= keys.tile[index as usize];
        self.tile = permutations()[index as usize];
        self.tile_index = Some(index);
    }

    /// Draw the next permutation uniformly from the shared fast generator.
    pub fn play_chance_move(&mut self, rng: &mut FastRandom) {
        let index = rng.less_than(permutations().len()) as u16;
        self.update_tile_index(index);
    }

    /// Rotate to a known permutation (referee-provided chance move).
    pub fn set_chance_move(&mut self, chance: &ChanceMove) -> Result<()> {
        let index = find_tile_index(chance).ok_or_else(|| {
            let digits: String = chance.iter().map(|&c| (b'0' + c) as char).collect();
            PaintboxError::UnknownPermutation(digits)
        })?;
        self.update_tile_index(index);
        Ok(())
    }

    /// Legality is a function of geometry and `filled` alone: either the
    /// placement repaints 1..=MAX_OVERLAPS dots, or it repaints none and
    /// touches the existing region.
    pub fn possible_move(&self, info: &TileInfo) -> bool {
        let overlap = info.count_matches(&self.filled);
        if overlap > 0 {
            overlap <= MAX_OVERLAPS
        } else {
            info.adjacent_to(&self.filled)
        }
    }

    pub fn update_color(&mut self, dot: u16, color: Color) {
        let old = self.colors[dot as usize];
        if old == color {
            return;
        }
        self.filled.set(dot);
        let row = dot as usize / COLS;
        let col = dot as usize % COLS;
        let keys = keys();
        if old != WHITE {
            self.columns[color_index(old)][col].unset(row);
            self.zobrist_hash ^= keys.dot_color[dot as usize][color_index(old)];
        }
        self.columns[color_index(color)][col].set(row);
        self.colors[dot as usize] = color;
        self.zobrist_hash ^= keys.dot_color[dot as usize][color_index(color)];
    }

    fn paint_sibling(&mut self, info: &TileInfo, i: usize) {
        let (d1, d2) = info.siblings[i];
        let color = self.tile[i];
        self.update_color(d1, color);
        self.update_color(d2, color);
    }

    /// Paint the placement with the current permutation and pass the turn.
    pub fn do_move(&mut self, info: &TileInfo) {
        for i in 0..TILE_DOTS {
            self.paint_sibling(info, i);
        }
        self.turn += 1;
        self.player = self.player.flip();
        debug_assert_eq!(self.get_hash(), self.compute_hash());
    }

    pub fn do_player_move(&mut self, mv: PlayerMove) -> Result<()> {
        let info = tiles()
            .get(mv.dot, mv.orientation)
            .ok_or_else(|| PaintboxError::IllegalPlacement(mv.to_string()))?;
        self.do_move(info);
        Ok(())
    }

    /// Uniform random legal placement; the playout policy. Candidates found
    /// over-full are pruned permanently along the way.
    pub fn get_random_move(&mut self, rng: &mut FastRandom) -> Option<&'static TileInfo> {
        while !self.candidates.is_empty() {
            let r = rng.less_than(self.candidates.len());
            let info = self.candidates[r];
            let overlap = info.count_matches(&self.filled);
            if overlap > 0 {
                self.candidates.swap_remove(r);
                if overlap <= MAX_OVERLAPS {
                    return Some(info);
                }
            } else if info.adjacent_to(&self.filled) {
                self.candidates.swap_remove(r);
                return Some(info);
            }
        }
        None
    }

    /// Legal placements as a code set, pruning over-full candidates.
    pub fn get_possible_tiles_set(&mut self) -> TileSet {
        let mut res = TileSet::new();
        let mut i = 0;
        while i < self.candidates.len() {
            let info = self.candidates[i];
            let overlap = info.count_matches(&self.filled);
            if overlap > 0 {
                if overlap > MAX_OVERLAPS {
                    self.candidates.swap_remove(i);
                    continue;
                }
                res.set(info.code);
            } else if info.adjacent_to(&self.filled) {
                res.set(info.code);
            }
            i += 1;
        }
        res
    }

    /// Legal placements as a list, pruning over-full candidates.
    pub fn get_possible_tiles(&mut self) -> Vec<&'static TileInfo> {
        let mut res = Vec::with_capacity(self.candidates.len());
        let mut i = 0;
        while i < self.candidates.len() {
            let info = self.candidates[i];
            let overlap = info.count_matches(&self.filled);
            if overlap > 0 {
                if overlap > MAX_OVERLAPS {
                    self.candidates.swap_remove(i);
                    continue;
                }
                res.push(info);
            } else if info.adjacent_to(&self.filled) {
                res.push(info);
            }
            i += 1;
        }
        res
    }

    /// Eager prune of over-full candidates. Adjacency is deliberately not
    /// pruned here: a detached placement can become adjacent later.
    pub fn update_candidates(&mut self) {
        let mut i = 0;
        while i < self.candidates.len() {
            if self.candidates[i].count_matches(&self.filled) > MAX_OVERLAPS {
                self.candidates.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn end_game(&self) -> bool {
        !self.candidates.iter().any(|info| self.possible_move(info))
    }

    /// Incremental hash including the side to move.
    pub fn get_hash(&self) -> u64 {
        let side = match self.player {
            Player::One => keys().player[0],
            Player::Two => keys().player[1],
        };
        self.zobrist_hash ^ side
    }

    /// From-scratch hash; must always equal [`Self::get_hash`].
    pub fn compute_hash(&self) -> u64 {
        let keys = keys();
        let mut hash = 0u64;
        for dot in 0..TOTAL_DOTS {
            let color = self.colors[dot];
            if color != WHITE {
                hash ^= keys.dot_color[dot][color_index(color)];
            }
        }
        if let Some(index) = self.tile_index {
            hash ^= keys.tile[index as usize];
        }
        hash ^= match self.player {
            Player::One => keys.player[0],
            Player::Two => keys.player[1],
        };
        hash
    }

    pub fn key(&self) -> PositionKey {
        PositionKey {
            columns: self.columns,
            hash: self.get_hash(),
            tile_index: self.tile_index,
            player: self.player,
        }
    }

    /// Board sketch for the log.
    pub fn show(&self) -> String {
        let digits: String = self.tile.iter().map(|&c| (b'0' + c) as char).collect();
        let mut out = format!("tile={digits}\n");
        for (dot, &color) in self.colors.iter().enumerate() {
            let _ = write!(out, "{}|", (b'0' + color) as char);
            if (dot + 1) % COLS == 0 {
                out.push('\n');
            }
        }
        out
    }
}

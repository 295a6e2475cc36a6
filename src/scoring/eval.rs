//! Soft evaluation: rectangle-closing potential with missing corners
//! discounted geometrically.

use crate::game::position::Position;
use crate::game::tiles::TileInfo;
use crate::game::{color_index, Color, COLS, MAX_COLORS, ROWS, TILE_DOTS, WHITE};
use super::score::square_bonus;

/// Discount applied per missing corner; roughly one in seven dots ends up
/// carrying any given color.
const P: f64 = 0.142857;

/// Potential of painting `(row, col)` with `color`: every candidate square
/// through that dot contributes `(1 - P) * P^k * b` where `k` counts the
/// three other corners not already painted `color` and `b` is the side.
pub fn dot_eval(pos: &Position, row: usize, col: usize, color: Color) -> f64 {
    let columns = &pos.columns[color_index(color)];
    let mut e = 0.0;
    for r in 0..ROWS {
        if r == row {
            continue;
        }
        let b = row.abs_diff(r);
        if col + b < COLS {
            let mut m = 1.0;
            if !columns[col].test(r) {
                m *= P;
            }
            if !columns[col + b].test(row) {
                m *= P;
            }
            if !columns[col + b].test(r) {
                m *= P;
            }
            e += (1.0 - P) * m * b as f64;
        }
        if col >= b {
            let mut m = 1.0;
            if !columns[col].test(r) {
                m *= P;
            }
            if !columns[col - b].test(row) {
                m *= P;
            }
            if !columns[col - b].test(r) {
                m *= P;
            }
            e += (1.0 - P) * m * b as f64;
        }
    }
    e
}

/// Per-color soft-eval delta of a placement: each repainted dot loses the
/// old color's potential and gains the new one's.
pub fn delta_evals(pos: &Position, info: &TileInfo) -> [f64; MAX_COLORS] {
    let mut evals = [0.0; MAX_COLORS];
    for i in 0..TILE_DOTS {
        let (d1, d2) = info.siblings[i];
        let color = pos.tile[i];
        for dot in [d1, d2] {
            let old = pos.colors[dot as usize];
            if old == color {
                continue;
            }
            let row = dot as usize / COLS;
            let col = dot as usize % COLS;
            if old != WHITE {
                evals[color_index(old)] -= dot_eval(pos, row, col, old);
            }
            evals[color_index(color)] += dot_eval(pos, row, col, color);
        }
    }
    evals
}

/// Placement ranking signal: own delta against the best rival delta.
pub fn tile_eval(pos: &Position, info: &TileInfo, me: Color) -> f64 {
    let evals = delta_evals(pos, info);
    let mine = evals[color_index(me)];
    let mut best_other = f64::NEG_INFINITY;
    for (i, &e) in evals.iter().enumerate() {
        if i != color_index(me) {
            best_other = best_other.max(e);
        }
    }
    mine - best_other
}

/// Exact counterpart of [`delta_evals`]: squares actually closed or broken.
pub fn impact(pos: &Position, info: &TileInfo) -> [i32; MAX_COLORS] {
    let mut res = [0; MAX_COLORS];
    for i in 0..TILE_DOTS {
        let (d1, d2) = info.siblings[i];
        let color = pos.tile[i];
        for dot in [d1, d2] {
            let old = pos.colors[dot as usize];
            if old == color {
                continue;
            }
            let row = dot as usize / COLS;
            let col = dot as usize % COLS;
            if old != WHITE {
                res[color_index(old)] -= square_bonus(pos, row, col, old);
            }
            res[color_index(color)] += square_bonus(pos, row, col, color);
        }
    }
    res
}

/// Whole-board soft evaluation, own potential against the best rival's.
pub fn board_eval(pos: &Position, me: Color) -> f64 {
    let mut evals = [0.0; MAX_COLORS];
    for (c, eval) in evals.iter_mut().enumerate() {
        let columns = &pos.columns[c];
        for col in 0..COLS {
            for row in 0..ROWS {
                for b in 1..ROWS {
                    if row + b >= ROWS || col + b >= COLS {
                        break;
                    }
                    let mut m = 1.0;
                    if !columns[col].test(row) {
                        m *= P;
                    }
                    if !columns[col].test(row + b) {
                        m *= P;
                    }
                    if !columns[col + b].test(row) {
                        m *= P;
                    }
                    if !columns[col + b].test(row + b) {
                        m *= P;
                    }
                    *eval += m * b as f64;
                }
            }
        }
    }

    let mine = evals[color_index(me)];
    let mut best_other = 0.0f64;
    for (i, &e) in evals.iter().enumerate() {
        if i != color_index(me) {
            best_other = best_other.max(e);
        }
    }
    mine - best_other
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::dot_at;

    #[test]
    fn test_dot_eval_rewards_nearly_closed_squares() {
        let mut pos = Position::empty();
        // three corners of a unit square painted; the fourth is hot
        for (row, col) in [(3, 4), (3, 5), (4, 4)] {
            pos.update_color(dot_at(row, col), 1);
        }
        let closing = dot_eval(&pos, 4, 5, 1);
        let remote = dot_eval(&pos, 12, 15, 1);
        assert!(closing > remote);
        // closing the square dominates any single discounted term
        assert!(closing > 1.0 - P);
    }

    #[test]
    fn test_dot_eval_prefers_longer_diagonals_when_closed() {
        let mut pos = Position::empty();
        for (row, col) in [(2, 5), (5, 5), (2, 8)] {
            pos.update_color(dot_at(row, col), 2);
        }
        let mut other = Position::empty();
        for (row, col) in [(4, 5), (5, 5), (4, 6)] {
            other.update_color(dot_at(row, col), 2);
        }
        // both dots close a square; the side-3 square is worth more
        assert!(dot_eval(&pos, 5, 8, 2) > dot_eval(&other, 5, 6, 2));
    }

    #[test]
    fn test_delta_evals_signs() {
        let mut pos = Position::new("Hh123456h").unwrap();
        pos.set_chance_move(&[1, 2, 3, 4, 5, 6]).unwrap();
        // a placement over fresh ground only adds potential
        let info = crate::game::tiles::tiles()
            .get(dot_at(0, 0), crate::game::moves::Orientation::Horizontal)
            .unwrap();
        let evals = delta_evals(&pos, info);
        for &e in evals.iter() {
            assert!(e >= 0.0);
        }
        assert!(evals.iter().any(|&e| e > 0.0));
    }

    #[test]
    fn test_impact_counts_closed_squares() {
        let mut pos = Position::empty();
        // color 1 owns three corners of a unit square at (0,0)
        for (row, col) in [(0, 0), (0, 1), (1, 0)] {
            pos.update_color(dot_at(row, col), 1);
        }
        pos.set_chance_move(&[1, 2, 3, 4, 5, 6]).unwrap();
        // horizontal at (1,1): sibling pair 0 paints (1,1) with color 1,
        // closing the unit square; nothing else is on the board
        let info = crate::game::tiles::tiles()
            .get(dot_at(1, 1), crate::game::moves::Orientation::Horizontal)
            .unwrap();
        assert_eq!(impact(&pos, info), [1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_board_eval_tracks_advantage() {
        let mut pos = Position::empty();
        for (row, col) in [(3, 4), (3, 5), (4, 4), (4, 5)] {
            pos.update_color(dot_at(row, col), 1);
        }
        assert!(board_eval(&pos, 1) > 0.0);
        assert!(board_eval(&pos, 2) < 0.0);
    }
}

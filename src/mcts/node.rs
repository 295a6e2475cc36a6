//! Per-node search statistics: variance-aware UCB with a learned prior
//! and progressive unpruning.

use super::stats::DotColorStats;
use crate::game::position::Position;
use crate::game::tile_set::TileSet;
use crate::game::tiles::TileInfo;
use crate::game::Player;
use std::sync::OnceLock;

pub const K0: f64 = 10.0;
const K0_SQUARED: f64 = K0 * K0;

/// Actions considered at one node never grow beyond this.
const EXPANSION_CAP: usize = 64;

const TABLE_SIZE: usize = 200_000;

fn bonus_table() -> &'static [f64] {
    static BONUS: OnceLock<Vec<f64>> = OnceLock::new();
    BONUS.get_or_init(|| {
        (0..TABLE_SIZE)
            .map(|v| (1.0 + v as f64).ln().sqrt())
            .collect()
    })
}

fn sqrt_table() -> &'static [f64] {
    static SQRT: OnceLock<Vec<f64>> = OnceLock::new();
    SQRT.get_or_init(|| (0..TABLE_SIZE).map(|v| (v as f64).sqrt()).collect())
}

/// One candidate placement at a node.
#[derive(Debug, Clone)]
pub struct ActionInfo {
    pub tile_info: &'static TileInfo,
    pub value: f64,
    pub value_squares: f64,
    pub k: f64,
    pub bias: f64,
    pub visits: u32,
}

impl ActionInfo {
    pub fn new(tile_info: &'static TileInfo) -> Self {
        Self {
            tile_info,
            value: 0.0,
            value_squares: 0.0,
            k: K0,
            bias: 0.0,
            visits: 0,
        }
    }

    /// Welford update of mean and squared deviations; the exploration
    /// coefficient tracks the observed standard deviation.
    pub fn update(&mut self, v: f64) {
        self.visits += 1;
        let delta = v - self.value;
        self.value += delta / self.visits as f64;
        self.value_squares += delta * (v - self.value);
        self.k = ((self.value_squares + K0_SQUARED) / self.visits as f64).sqrt();
    }
}

/// Statistics of one visited position.
#[derive(Debug)]
pub struct StateInfo {
    pub unexpanded: TileSet,
    pub actions: Vec<ActionInfo>,
    pub bonus: f64,
    pub visits: u32,
    pub player: Player,
}

impl StateInfo {
    pub fn new(pos: &mut Position) -> Self {
        Self {
            unexpanded: pos.get_possible_tiles_set(),
            actions: Vec::new(),
            bonus: 0.0,
            visits: 0,
            player: pos.player,
        }
    }

    fn action_eval(&self, action: &ActionInfo) -> f64 {
        action.value
            + action.k * self.bonus / sqrt_table()[1 + action.visits as usize]
            + action.bias / (1 + action.visits) as f64
    }

    /// Progressive unpruning, then UCB: grow the action set toward
    /// `min(64, sqrt(visits + 1))`, admitting the unexpanded placement the
    /// prior likes best, then pick the action with the highest score.
    /// Ties keep the first-added action.
    pub fn select(&mut self, pos: &Position, prior: &DotColorStats) -> Option<usize> {
        let limit = (sqrt_table()[self.visits as usize + 1] as usize).min(EXPANSION_CAP);
        while self.actions.len() < limit && self.unexpanded.any() {
            let mut selected: Option<&'static TileInfo> = None;
            let mut best_value = f64::NEG_INFINITY;
            self.unexpanded.for_each(|info| {
                let value = prior.evaluate(pos, info);
                if best_value < value {
                    best_value = value;
                    selected = Some(info);
                }
            });
            let Some(info) = selected else { break };
            let mut action = ActionInfo::new(info);
            action.bias = best_value;
            self.actions.push(action);
            self.unexpanded.clear(info.code);
        }

        let mut best: Option<usize> = None;
        let mut best_value = f64::NEG_INFINITY;
        for (i, action) in self.actions.iter().enumerate() {
            let value = self.action_eval(action);
            if best_value < value {
                best_value = value;
                best = Some(i);
            }
        }
        best
    }

    /// Greedy final choice. Ties keep the first-added action.
    pub fn select_most_visited(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        let mut max_visits = -1i64;
        for (i, action) in self.actions.iter().enumerate() {
            if max_visits < action.visits as i64 {
                max_visits = action.visits as i64;
                best = Some(i);
            }
        }
        best
    }

    pub fn update(&mut self, action: usize, score: f64) {
        self.visits += 1;
        self.actions[action].update(score);
        self.bonus = bonus_table()[self.visits as usize];
    }

    /// The search has settled when greedy and UCB agree.
    pub fn consistent(&mut self, pos: &Position, prior: &DotColorStats) -> bool {
        self.select_most_visited() == self.select(pos, prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TILE_DOTS;

    fn opening() -> Position {
        Position::new("Hh123456h").unwrap()
    }

    #[test]
    fn test_welford_identity() {
        let info = crate::game::tiles::tiles().by_code(0);
        let mut action = ActionInfo::new(info);
        for v in [0.0, 2.0, 4.0] {
            action.update(v);
        }
        assert!((action.value - 2.0).abs() < 1e-9);
        assert!((action.value_squares - 8.0).abs() < 1e-9);
        assert!((action.k - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_welford_matches_direct_computation() {
        let info = crate::game::tiles::tiles().by_code(1);
        let samples = [3.5, -1.0, 0.25, 7.0, 2.0, -4.5, 1.0];
        let mut action = ActionInfo::new(info);
        for v in samples {
            action.update(v);
        }
        let mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;
        let m2: f64 = samples.iter().map(|v| (v - mean) * (v - mean)).sum();
        assert!((action.value - mean).abs() < 1e-9);
        assert!((action.value_squares - m2).abs() < 1e-9);
    }

    #[test]
    fn test_unexpanded_starts_as_legal_set() {
        let mut pos = opening();
        let state = StateInfo::new(&mut pos);
        assert_eq!(state.unexpanded.len(), 125);
        assert!(state.actions.is_empty());
        assert_eq!(state.player, Player::One);
    }

    #[test]
    fn test_progressive_unpruning_grows_with_visits() {
        let mut pos = opening();
        let prior = DotColorStats::default();
        let mut state = StateInfo::new(&mut pos);

        state.select(&pos, &prior);
        assert_eq!(state.actions.len(), 1);

        // drive visits up so sqrt(visits + 1) crosses 3
        for _ in 0..8 {
            let action = state.select(&pos, &prior).unwrap();
            state.update(action, 0.0);
        }
        state.select(&pos, &prior);
        assert_eq!(state.actions.len(), 3);
    }

    #[test]
    fn test_unpruning_follows_prior() {
        let mut pos = opening();
        let mut prior = DotColorStats::default();
        // make one placement's dots clearly attractive
        let favorite = *pos.get_possible_tiles().last().unwrap();
        for i in 0..TILE_DOTS {
            let (d1, d2) = favorite.siblings[i];
            prior.update(d1, pos.tile[i], Player::One, 50.0);
            prior.update(d2, pos.tile[i], Player::One, 50.0);
        }
        let mut state = StateInfo::new(&mut pos);
        let first = state.select(&pos, &prior).unwrap();
        assert_eq!(state.actions[first].tile_info.code, favorite.code);
        assert!(state.actions[first].bias > 0.0);
    }

    #[test]
    fn test_select_prefers_higher_value_when_visits_equal() {
        let mut pos = opening();
        let prior = DotColorStats::default();
        let mut state = StateInfo::new(&mut pos);
        for _ in 0..4 {
            let action = state.select(&pos, &prior).unwrap();
            state.update(action, 0.0);
        }
        assert!(state.actions.len() >= 2);
        state.actions[0].value = -5.0;
        state.actions[1].value = 5.0;
        state.actions[0].visits = 10;
        state.actions[1].visits = 10;
        assert_eq!(state.select(&pos, &prior), Some(1));
    }

    #[test]
    fn test_select_most_visited_ties_keep_first() {
        let mut pos = opening();
        let prior = DotColorStats::default();
        let mut state = StateInfo::new(&mut pos);
        for _ in 0..6 {
            let action = state.select(&pos, &prior).unwrap();
            state.update(action, 1.0);
        }
        let visits = state.actions[0].visits;
        for action in state.actions.iter_mut() {
            action.visits = visits;
        }
        assert_eq!(state.select_most_visited(), Some(0));
    }

    #[test]
    fn test_consistency_after_convergence() {
        let mut pos = opening();
        let prior = DotColorStats::default();
        let mut state = StateInfo::new(&mut pos);
        let action = state.select(&pos, &prior).unwrap();
        // hammer one action with outcomes beating the exploration bonus of
        // freshly admitted actions: greedy and UCB agree
        for _ in 0..50 {
            state.update(action, 25.0);
        }
        assert!(state.consistent(&pos, &prior));
    }
}

//! Opponent model: per-color weights learned from the opponent's moves.

use super::score::{color_score, scores};
use crate::game::position::Position;
use crate::game::{color_index, Color, MAX_COLORS};

const BASE: f64 = 10.0;
const TEMPERATURE: f64 = 0.2;
/// A rival carrying this much of the mixture is treated as the opponent.
const DOMINANT_THRESHOLD: f64 = -0.67;

/// Mixture over rival colors, normalised to sum to −1, with the engine's
/// own color pinned at +1. When one rival dominates, scoring collapses to
/// a two-color duel against it.
#[derive(Debug, Clone)]
pub struct ColorWeights {
    pub weights: [f64; MAX_COLORS],
    pub opponent_color_index: Option<usize>,
}

impl ColorWeights {
    pub fn init(me: Color) -> Self {
        let mut weights = [-0.2; MAX_COLORS];
        weights[color_index(me)] = 1.0;
        Self {
            weights,
            opponent_color_index: None,
        }
    }

    /// Refit from the accumulated per-color deltas of the opponent's moves:
    /// a min-shifted softmax over rivals, negated.
    pub fn update(&mut self, total_delta_evals: &[f64; MAX_COLORS], me: Color) {
        let mine = color_index(me);
        let mut min_eval = f64::MAX;
        for (i, &e) in total_delta_evals.iter().enumerate() {
            if i != mine {
                min_eval = min_eval.min(e);
            }
        }
        let mut sum = 0.0;
        for (i, &e) in total_delta_evals.iter().enumerate() {
            if i != mine {
                sum += BASE.powf(TEMPERATURE * (e - min_eval));
            }
        }
        for (i, w) in self.weights.iter_mut().enumerate() {
            *w = if i == mine {
                1.0
            } else {
                -BASE.powf(TEMPERATURE * (total_delta_evals[i] - min_eval)) / sum
            };
        }

        self.opponent_color_index = self
            .weights
            .iter()
            .position(|&w| w <= DOMINANT_THRESHOLD);

        if let Some(opp) = self.opponent_color_index {
            log::debug!("dominant opponent color index: {opp}");
        }
        log::debug!("weights: {:?}", self.weights);
    }

    /// Score driving playouts: a straight duel when a dominant rival is
    /// identified, otherwise the weighted mixture over all colors.
    pub fn expected_score(&self, pos: &Position, me: Color) -> f64 {
        if let Some(opp) = self.opponent_color_index {
            return (color_score(pos, me) - color_score(pos, opp as Color + 1)) as f64;
        }
        let scores = scores(pos);
        self.weights
            .iter()
            .zip(scores.iter())
            .map(|(&w, &s)| w * s as f64)
            .sum()
    }
}

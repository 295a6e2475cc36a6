//! Tunable search parameters.

use serde::{Deserialize, Serialize};

/// Knobs of the move-selection search. The defaults are the tournament
/// settings; `time_scale` shrinks the whole budget for local testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Hard cap on simulations per move.
    pub max_iterations: u32,

    /// Extra simulations allowed while the most-visited action and the
    /// UCB-best action disagree.
    pub consistency_iterations: u32,

    /// Pure random rollouts run before the search to seed the dot-color
    /// prior.
    pub warmup_rollouts: u32,

    /// Whole-match thinking budget in seconds.
    pub total_time: f64,

    /// Safety margin held back from the match budget, in seconds.
    pub time_margin: f64,

    /// Multiplier applied to both budget and margin.
    pub time_scale: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            consistency_iterations: 10_000,
            warmup_rollouts: 1_000,
            total_time: 30.0,
            time_margin: 0.5,
            time_scale: 1.0,
        }
    }
}

impl SearchParams {
    /// Per-move budget: the remaining match time spread over an estimate
    /// of the moves still to play.
    pub fn max_time(&self, turn: u32, consumed: f64) -> f64 {
        let remaining_plies = ((31 - turn as i32) / 2).max(2);
        let remaining_time =
            self.total_time * self.time_scale - self.time_margin * self.time_scale - consumed;
        remaining_time / remaining_plies as f64
    }
}

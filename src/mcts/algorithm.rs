//! Time-budgeted move selection.

use super::hyperparameters::SearchParams;
use super::simulation::{warmup, Simulation};
use super::state_store::StateStore;
use super::stats::DotColorStats;
use crate::game::moves::PlayerMove;
use crate::game::position::Position;
use crate::game::Color;
use crate::scoring::eval::impact;
use crate::scoring::weights::ColorWeights;
use crate::utils::rng::FastRandom;
use std::time::Instant;

/// Everything the search mutates between and during move decisions:
/// the shared generator, the opponent model, the dot-color prior and the
/// running time account.
pub struct AiContext {
    pub color: Color,
    pub params: SearchParams,
    pub rng: FastRandom,
    pub weights: ColorWeights,
    pub prior: DotColorStats,
    pub total_time: f64,
}

impl AiContext {
    pub fn new(color: Color, params: SearchParams, seed: Option<u32>) -> Self {
        let rng = match seed {
            Some(seed) => FastRandom::new(seed),
            None => FastRandom::from_entropy(),
        };
        Self {
            color,
            params,
            rng,
            weights: ColorWeights::init(color),
            prior: DotColorStats::default(),
            total_time: 0.0,
        }
    }
}

/// Pick a placement for the current position, or `None` at a terminal
/// state. Simulations run until the iteration cap, the per-move time
/// slice, or an early majority; a bounded tail keeps simulating while the
/// greedy and UCB choices disagree.
pub fn get_best_move(pos: &Position, ctx: &mut AiContext) -> Option<PlayerMove> {
    ctx.prior.reset();
    let max_iterations = ctx.params.max_iterations;
    let mut store = StateStore::with_capacity(max_iterations as usize);

    let start = Instant::now();
    let max_time = ctx.params.max_time(pos.turn, ctx.total_time);
    log::info!("max-time={max_time:.2}");

    let mut root = pos.clone();
    for _ in 0..ctx.params.warmup_rollouts {
        warmup(&root, ctx.color, &mut ctx.rng, &ctx.weights, &mut ctx.prior);
    }
    log::info!("warmup took {:.2} sec", start.elapsed().as_secs_f64());

    root.update_candidates();

    let mut iterations = 0u32;
    let mut max_depth = 0usize;
    while iterations < max_iterations && start.elapsed().as_secs_f64() < max_time {
        let depth = Simulation::new(&mut store, &root, ctx.color).run(
            &mut ctx.rng,
            &ctx.weights,
            &mut ctx.prior,
        );
        max_depth = max_depth.max(depth);
        iterations += 1;

        if let Some(state) = store.get_by_pos(&root) {
            if let Some(best) = state.select_most_visited() {
                if 2 * state.actions[best].visits > max_iterations {
                    break;
                }
            }
        }
    }

    // keep going while the greedy and UCB choices disagree
    let mut extras = 0u32;
    while extras < ctx.params.consistency_iterations
        && start.elapsed().as_secs_f64() < max_time
    {
        let settled = store
            .get_by_pos_mut(&root)
            .map_or(true, |state| state.consistent(&root, &ctx.prior));
        if settled {
            break;
        }
        let depth = Simulation::new(&mut store, &root, ctx.color).run(
            &mut ctx.rng,
            &ctx.weights,
            &mut ctx.prior,
        );
        max_depth = max_depth.max(depth);
        iterations += 1;
        extras += 1;
    }
    log::info!("extra={extras}");
    log::info!(
        "c={} ps={:.2} t={}",
        root.get_possible_tiles().len(),
        ctx.weights.expected_score(&root, ctx.color),
        root.turn
    );

    // when the budget ran dry before any simulation, fall back to the
    // prior-guided first expansion
    let (key, _) = store.try_create_state(&mut root);
    let state = store.get_mut(&key)?;
    if state.actions.is_empty() {
        state.select(&root, &ctx.prior);
    }
    let best = state.select_most_visited()?;
    let action = &state.actions[best];

    let share = 100.0 * action.visits as f64 / state.visits.max(1) as f64;
    log::info!(
        "depth={max_depth} s={iterations} v={:.2} n={} p={share:.2}% k={:.2} b={:.2} expanded={}",
        action.value,
        action.visits,
        action.k,
        action.bias,
        state.actions.len(),
    );
    log::info!("impact = {:?}", impact(&root, action.tile_info));

    let best_move = action.tile_info.player_move();
    let dt = start.elapsed().as_secs_f64();
    ctx.total_time += dt;
    store.log_stats();
    let speed = 0.001 * iterations as f64 / dt.max(1e-9);
    log::info!(
        "best-move={best_move} dt={dt:.2} tt={:.2} speed={speed:.2} Ki/s",
        ctx.total_time
    );

    Some(best_move)
}

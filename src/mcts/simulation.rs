//! One search iteration: selection and expansion through the stored tree,
//! a uniform random playout, and backup.

use super::state_store::StateStore;
use super::stats::DotColorStats;
use crate::game::position::{Position, PositionKey};
use crate::game::{Color, Player};
use crate::scoring::weights::ColorWeights;
use crate::utils::rng::FastRandom;

/// Pure random rollout seeding the dot-color prior before the search.
pub fn warmup(
    root: &Position,
    color: Color,
    rng: &mut FastRandom,
    weights: &ColorWeights,
    prior: &mut DotColorStats,
) {
    let mut pos = root.clone();
    let root_player = pos.player;
    while let Some(info) = pos.get_random_move(rng) {
        pos.do_move(info);
        pos.play_chance_move(rng);
    }
    let score = weights.expected_score(&pos, color);
    prior.update_from_terminal(&pos, root_player, score);
}

pub struct Simulation<'a> {
    store: &'a mut StateStore,
    pos: Position,
    root_player: Player,
    color: Color,
    /// Journal of visited edges; nodes are re-looked-up by key at backup
    /// rather than held as references across map growth.
    transitions: Vec<(PositionKey, usize)>,
}

impl<'a> Simulation<'a> {
    pub fn new(store: &'a mut StateStore, root: &Position, color: Color) -> Self {
        Self {
            store,
            root_player: root.player,
            pos: root.clone(),
            color,
            transitions: Vec::new(),
        }
    }

    /// Walk stored states by UCB until a fresh node is created, then stop
    /// one move past it.
    fn simulate_tree(&mut self, rng: &mut FastRandom, prior: &DotColorStats) {
        while !self.pos.end_game() {
            let (key, created) = self.store.try_create_state(&mut self.pos);
            let (action, info) = {
                let Some(state) = self.store.get_mut(&key) else {
                    return;
                };
                match state.select(&self.pos, prior) {
                    Some(action) => (action, state.actions[action].tile_info),
                    None => return,
                }
            };
            self.pos.do_move(info);
            self.pos.play_chance_move(rng);
            self.transitions.push((key, action));
            if created {
                break;
            }
        }
    }

    fn simulate_default(&mut self, rng: &mut FastRandom) {
        while let Some(info) = self.pos.get_random_move(rng) {
            self.pos.do_move(info);
            self.pos.play_chance_move(rng);
        }
    }

    /// Score the terminal board once, then feed every journaled edge with
    /// the sign of its node's side to move and refresh the prior.
    fn backup(&mut self, weights: &ColorWeights, prior: &mut DotColorStats) {
        let score = weights.expected_score(&self.pos, self.color);
        for (key, action) in self.transitions.iter() {
            if let Some(state) = self.store.get_mut(key) {
                let adjusted = if state.player == self.root_player {
                    score
                } else {
                    -score
                };
                state.update(*action, adjusted);
            }
        }
        prior.update_from_terminal(&self.pos, self.root_player, score);
    }

    /// Returns the tree depth reached, for the search log.
    pub fn run(
        &mut self,
        rng: &mut FastRandom,
        weights: &ColorWeights,
        prior: &mut DotColorStats,
    ) -> usize {
        self.simulate_tree(rng, prior);
        let depth = self.transitions.len();
        self.simulate_default(rng);
        self.backup(weights, prior);
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::WHITE;

    fn opening() -> Position {
        let mut pos = Position::new("Hh123456h").unwrap();
        pos.update_candidates();
        pos
    }

    #[test]
    fn test_warmup_is_deterministic_under_fixed_seed() {
        let pos = opening();
        let weights = ColorWeights::init(1);
        let mut prior_a = DotColorStats::default();
        let mut prior_b = DotColorStats::default();
        warmup(&pos, 1, &mut FastRandom::new(11), &weights, &mut prior_a);
        warmup(&pos, 1, &mut FastRandom::new(11), &weights, &mut prior_b);
        for info in crate::game::tiles::tiles().all() {
            assert_eq!(prior_a.evaluate(&pos, info), prior_b.evaluate(&pos, info));
        }
    }

    #[test]
    fn test_simulation_grows_store_by_one_leaf() {
        let pos = opening();
        let mut store = StateStore::with_capacity(64);
        let mut rng = FastRandom::new(5);
        let weights = ColorWeights::init(1);
        let mut prior = DotColorStats::default();
        Simulation::new(&mut store, &pos, 1).run(&mut rng, &weights, &mut prior);
        // first iteration creates exactly the root
        assert_eq!(store.len(), 1);
        Simulation::new(&mut store, &pos, 1).run(&mut rng, &weights, &mut prior);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_simulation_updates_root_visits() {
        let pos = opening();
        let mut store = StateStore::with_capacity(64);
        let mut rng = FastRandom::new(17);
        let weights = ColorWeights::init(1);
        let mut prior = DotColorStats::default();
        for expected in 1..=10u32 {
            Simulation::new(&mut store, &pos, 1).run(&mut rng, &weights, &mut prior);
            let root = store.get_by_pos(&pos).unwrap();
            assert_eq!(root.visits, expected);
        }
        let root = store.get_by_pos(&pos).unwrap();
        let visit_sum: u32 = root.actions.iter().map(|a| a.visits).sum();
        assert_eq!(visit_sum, root.visits);
    }

    #[test]
    fn test_simulation_reaches_terminal_board() {
        let pos = opening();
        let mut store = StateStore::with_capacity(64);
        let mut rng = FastRandom::new(23);
        let weights = ColorWeights::init(1);
        let mut prior = DotColorStats::default();
        let mut sim = Simulation::new(&mut store, &pos, 1);
        sim.run(&mut rng, &weights, &mut prior);
        assert!(sim.pos.end_game());
        assert!(sim.pos.colors.iter().filter(|&&c| c != WHITE).count() >= 12);
    }

    #[test]
    fn test_depth_grows_as_tree_deepens() {
        let pos = opening();
        let mut store = StateStore::with_capacity(1024);
        let mut rng = FastRandom::new(31);
        let weights = ColorWeights::init(1);
        let mut prior = DotColorStats::default();
        let mut max_depth = 0;
        for _ in 0..500 {
            let depth =
                Simulation::new(&mut store, &pos, 1).run(&mut rng, &weights, &mut prior);
            max_depth = max_depth.max(depth);
        }
        assert!(max_depth >= 2, "tree never deepened: {max_depth}");
    }
}

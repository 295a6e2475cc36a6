//! Transposition table over compressed position fingerprints.

use super::node::StateInfo;
use crate::game::position::{Position, PositionKey};
use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hasher};

/// The fingerprint already carries a Zobrist value; hashing again would
/// only dilute it.
#[derive(Default)]
pub struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.rotate_left(8) ^ b as u64;
        }
    }

    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }
}

type Map = HashMap<PositionKey, StateInfo, BuildHasherDefault<IdentityHasher>>;

/// Search tree nodes keyed by position fingerprint. Rebuilt for every
/// move decision and dropped at its end.
pub struct StateStore {
    map: Map,
}

impl StateStore {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut map = Map::default();
        map.reserve(capacity);
        Self { map }
    }

    /// Insert a fresh node for `pos` unless one exists; the flag reports
    /// whether the node was created by this call.
    pub fn try_create_state(&mut self, pos: &mut Position) -> (PositionKey, bool) {
        let key = pos.key();
        if self.map.contains_key(&key) {
            return (key, false);
        }
        let state = StateInfo::new(pos);
        self.map.insert(key.clone(), state);
        (key, true)
    }

    pub fn get(&self, key: &PositionKey) -> Option<&StateInfo> {
        self.map.get(key)
    }

    pub fn get_mut(&mut self, key: &PositionKey) -> Option<&mut StateInfo> {
        self.map.get_mut(key)
    }

    pub fn get_by_pos(&self, pos: &Position) -> Option<&StateInfo> {
        self.map.get(&pos.key())
    }

    pub fn get_by_pos_mut(&mut self, pos: &Position) -> Option<&mut StateInfo> {
        self.map.get_mut(&pos.key())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Variance extremes across the tree, for the log.
    pub fn log_stats(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let mut lowest: Option<(f64, u32)> = None;
        let mut highest: Option<(f64, u32)> = None;
        for state in self.map.values() {
            for action in state.actions.iter() {
                if lowest.map_or(true, |(k, _)| k > action.k) {
                    lowest = Some((action.k, action.visits));
                }
                if highest.map_or(true, |(k, _)| k < action.k) {
                    highest = Some((action.k, action.visits));
                }
            }
        }
        log::debug!(
            "store: {} states, k-range {:?}..{:?}",
            self.map.len(),
            lowest,
            highest
        );
    }
}

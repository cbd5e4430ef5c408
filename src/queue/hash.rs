// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Duplicate-state elimination.
//!
//! Two states are duplicates when their own rows and their parents' rows
//! agree in every phase; expanding both would explore the same subtree
//! twice. A power-of-two open-addressed table maps Zobrist sums to state
//! ids; insertion probes at most three slots, stepping by a key-derived
//! stride, and gives up quietly when all three are taken (an occasional
//! missed duplicate only costs time, never correctness).
//!
//! Hashing is switched off while the deepening pass re-executes subtrees:
//! those re-created states are transient and must not shadow the durable
//! queue entries.

use super::{StateArena, StateId};
use crate::memo::ZobristKeys;

/// Open-addressed duplicate table. Slot value 0 is "empty", which is safe
/// because the root state at offset 0 is never hashed.
#[derive(Debug)]
pub struct DedupTable {
    slots: Box<[u32]>,
    mask: u64,
    /// Cleared during the deepening pass.
    pub enabled: bool,
}

impl DedupTable {
    pub fn new(bits: u32) -> Self {
        Self {
            slots: vec![0; 1 << bits].into_boxed_slice(),
            mask: (1u64 << bits) - 1,
            enabled: true,
        }
    }

    /// Forget every stored state (queue compaction invalidates ids).
    pub fn clear(&mut self) {
        self.slots.fill(0);
    }

    /// Insert `s`, reporting whether an equal state was already present.
    /// When the probe sequence finds no free slot the state is simply not
    /// recorded.
    pub fn insert(&mut self, arena: &StateArena, keys: &ZobristKeys, s: StateId) -> bool {
        let mut key = hash_key(arena, keys, s);
        for _ in 0..3 {
            let slot = (key & self.mask) as usize;
            let occupant = self.slots[slot];
            if occupant == 0 {
                self.slots[slot] = s.raw();
                return false;
            }
            if is_duplicate(arena, s, StateId::from_raw(occupant)) {
                return true;
            }
            key = key.wrapping_add(key >> 16);
        }
        false
    }
}

/// Zobrist sum over every byte of every phase row of `s` and of its parent.
fn hash_key(arena: &StateArena, keys: &ZobristKeys, s: StateId) -> u64 {
    let parent = arena.parent(s);
    let mut key = 0u64;
    for phase in 0..arena.period() {
        let row = arena.row(s, phase);
        let parent_row = arena.row(parent, phase);
        for byte in 0..4 {
            key = key
                .wrapping_add(keys.own_key(phase, byte, row))
                .wrapping_add(keys.parent_key(phase, byte, parent_row));
        }
    }
    key
}

/// The duplicate predicate: same rows, same parent rows, in every phase.
pub fn is_duplicate(arena: &StateArena, s: StateId, t: StateId) -> bool {
    let (ps, pt) = (arena.parent(s), arena.parent(t));
    (0..arena.period()).all(|phase| {
        arena.row(s, phase) == arena.row(t, phase)
            && arena.row(ps, phase) == arena.row(pt, phase)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (StateArena, ZobristKeys, DedupTable) {
        (
            StateArena::new(2, 1 << 12, &[]),
            ZobristKeys::new(),
            DedupTable::new(12),
        )
    }

    #[test]
    fn test_first_insert_is_not_duplicate() {
        let (mut arena, keys, mut table) = setup();
        let s = arena.push(StateId::ROOT, &[3, 5]).unwrap();
        assert!(!table.insert(&arena, &keys, s));
    }

    #[test]
    fn test_equal_states_collide() {
        let (mut arena, keys, mut table) = setup();
        let a = arena.push(StateId::ROOT, &[3, 5]).unwrap();
        assert!(!table.insert(&arena, &keys, a));
        let b = arena.push(StateId::ROOT, &[3, 5]).unwrap();
        assert!(table.insert(&arena, &keys, b));
    }

    #[test]
    fn test_different_parents_do_not_collide() {
        let (mut arena, keys, mut table) = setup();
        let a = arena.push(StateId::ROOT, &[3, 5]).unwrap();
        assert!(!table.insert(&arena, &keys, a));
        let under_a = arena.push(a, &[3, 5]).unwrap();
        // Same rows as `a` but a different parent: a distinct search state.
        assert!(!table.insert(&arena, &keys, under_a));
    }

    #[test]
    fn test_clear_forgets() {
        let (mut arena, keys, mut table) = setup();
        let a = arena.push(StateId::ROOT, &[3, 5]).unwrap();
        assert!(!table.insert(&arena, &keys, a));
        table.clear();
        let b = arena.push(StateId::ROOT, &[3, 5]).unwrap();
        assert!(!table.insert(&arena, &keys, b));
    }
}

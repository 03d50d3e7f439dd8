//! Transposition table
//!
//! A plain hash → entry map with no eviction; it lives for a session and is
//! cleared at session start. Probes may tighten the caller's alpha-beta
//! window; the stored best move is always returned as an ordering hint,
//! even when the stored score is unusable.

use std::collections::HashMap;

use crate::board::Pos;

/// How a stored score bounds the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    LowerBound,
    UpperBound,
}

#[derive(Debug, Clone, Copy)]
pub struct TtEntry {
    pub score: i32,
    pub depth: i32,
    pub best_move: Option<Pos>,
    pub bound: Bound,
}

/// Outcome of a probe: a move-ordering hint, and a score when the entry is
/// deep enough and its bound closes the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct Probe {
    pub hint: Option<Pos>,
    pub score: Option<i32>,
}

#[derive(Default)]
pub struct TranspositionTable {
    map: HashMap<u64, TtEntry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `hash`. Entries shallower than `depth` contribute only the
    /// hint. For deep-enough entries: an exact score is returned directly; a
    /// lower bound raises `alpha`, an upper bound lowers `beta`, and the
    /// score is returned if the window closes.
    pub fn probe(&self, hash: u64, depth: i32, alpha: &mut i32, beta: &mut i32) -> Probe {
        let Some(entry) = self.map.get(&hash) else {
            return Probe::default();
        };
        let mut probe = Probe {
            hint: entry.best_move,
            score: None,
        };
        if entry.depth < depth {
            return probe;
        }
        match entry.bound {
            Bound::Exact => {
                probe.score = Some(entry.score);
                return probe;
            }
            Bound::LowerBound => *alpha = (*alpha).max(entry.score),
            Bound::UpperBound => *beta = (*beta).min(entry.score),
        }
        if *alpha >= *beta {
            probe.score = Some(entry.score);
        }
        probe
    }

    /// Stored best move for ordering, without touching the window.
    pub fn best_move(&self, hash: u64) -> Option<Pos> {
        self.map.get(&hash).and_then(|e| e.best_move)
    }

    /// Store a search result. The bound follows the standard alpha-beta flag
    /// rules against the node's original alpha and final beta.
    pub fn store(
        &mut self,
        hash: u64,
        depth: i32,
        best_move: Option<Pos>,
        score: i32,
        alpha0: i32,
        beta: i32,
    ) {
        let bound = if score <= alpha0 {
            Bound::UpperBound
        } else if score >= beta {
            Bound::LowerBound
        } else {
            Bound::Exact
        };
        self.map.insert(
            hash,
            TtEntry {
                score,
                depth,
                best_move,
                bound,
            },
        );
    }

    /// Store a terminal evaluation as exact.
    pub fn store_exact(&mut self, hash: u64, depth: i32, best_move: Option<Pos>, score: i32) {
        self.map.insert(
            hash,
            TtEntry {
                score,
                depth,
                best_move,
                bound: Bound::Exact,
            },
        );
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

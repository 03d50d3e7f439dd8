//! Search: move generation, transposition table, alpha-beta and PVS

pub mod alphabeta;
pub mod movegen;
pub mod pvs;
pub mod tt;

pub use alphabeta::{Searcher, MAX_DEPTH};
pub use movegen::{candidate_moves, capture_moves};
pub use tt::{Bound, TranspositionTable, TtEntry};
